//! The Store is the central container for all entities and components.
//!
//! A `Store` manages the lifecycle of entities and the component data
//! attached to them. Systems (animation, physics bridge, scripting, audio,
//! rendering) create and destroy entities here, attach and detach components,
//! and walk multi-component [views](crate::ecs::view) once per tick; they
//! never reach into pool internals.
//!
//! # Architecture
//!
//! The store coordinates three pieces:
//! - **Entity Allocator**: issues identifiers and recycles freed ones FIFO.
//! - **Component Pools**: one sparse-set [`Pool`](pool::Pool) per registered
//!   component type, held type-erased and addressed by `TypeId`. Pool order
//!   is registration order, which makes bulk destruction deterministic.
//! - **Views**: lazy intersection iterators over N pools, driven by the
//!   smallest one (see [`view`](Store::view)).
//!
//! # Registration
//!
//! The set of component types is fixed when the store is built and immutable
//! afterwards. Addressing a type that was never registered is a programming
//! error and panics immediately:
//!
//! ```rust,ignore
//! let mut store = Store::builder()
//!     .register::<Transform>()
//!     .register::<Velocity>()
//!     .build();
//!
//! let e = store.create();
//! store.set(e, Transform::default());
//! store.set(e, Velocity { dx: 1.0, dy: 0.0 });
//!
//! for (entity, (transform, velocity)) in store.view::<(&Transform, &Velocity)>() {
//!     // ...
//! }
//! ```
//!
//! # Threading
//!
//! The store is `!Send`: all operations are synchronous and intended for a
//! single logical thread per frame. There is no internal locking; the one
//! hazard, mutating pools while a view walks them, is ruled out by the
//! borrow checker, because views borrow the store for their whole lifetime.

pub mod pool;

use std::any::{self, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use log::{debug, warn};

use crate::ecs::{
    component::Component,
    entity::{Allocator, Entity},
    store::pool::{AnyPool, Pool},
    view::{ReadOnly, Select, View},
};

/// Configuration step for a [`Store`]: registers the fixed set of component
/// types, one pool apiece.
///
/// Registration order is preserved and becomes the order in which an
/// entity's components are detached on [`Store::destroy`].
#[derive(Default)]
pub struct Builder {
    pools: Vec<Box<dyn AnyPool>>,
    index: HashMap<TypeId, usize>,
}

impl Builder {
    /// Construct an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component type, binding a pool to it.
    ///
    /// # Panics
    ///
    /// Panics if the type is already registered.
    pub fn register<C: Component>(mut self) -> Self {
        let previous = self.index.insert(TypeId::of::<C>(), self.pools.len());
        if previous.is_some() {
            panic!(
                "component type `{}` is already registered",
                any::type_name::<C>()
            );
        }
        debug!("registered component pool for `{}`", any::type_name::<C>());
        self.pools.push(Box::new(Pool::<C>::new()));
        self
    }

    /// Finish configuration. The returned store's pool set is immutable.
    pub fn build(self) -> Store {
        Store {
            allocator: Allocator::new(),
            pools: self.pools,
            index: self.index,
            _not_send: PhantomData,
        }
    }
}

/// The entity/component store.
///
/// Owns the entity allocator and one sparse-set pool per registered component
/// type. See the [module documentation](self) for the overall contract.
pub struct Store {
    /// The store's entity allocator.
    allocator: Allocator,

    /// One pool per registered component type, in registration order.
    pools: Vec<Box<dyn AnyPool>>,

    /// Component type -> slot in `pools`.
    index: HashMap<TypeId, usize>,

    /// Marker to make Store !Send. The store stays on the thread that built it.
    _not_send: PhantomData<*mut ()>,
}

impl Store {
    /// Start configuring a store.
    pub fn builder() -> Builder {
        Builder::new()
    }

    // ── Entity lifecycle ─────────────────────────────────────────────

    /// Create a new entity with no components attached.
    ///
    /// Identifiers of destroyed entities are recycled oldest-freed-first; a
    /// recycled entity always starts component-free.
    pub fn create(&mut self) -> Entity {
        self.allocator.alloc()
    }

    /// Destroy an entity, detaching all of its components.
    ///
    /// Pools are visited in registration order. Destroying [`Entity::NULL`],
    /// an already-destroyed entity, or a never-created identifier is a
    /// tolerated no-op and changes no counts.
    pub fn destroy(&mut self, entity: Entity) {
        if entity.is_null() {
            return;
        }
        if !self.allocator.exists(entity) {
            warn!("attempted to destroy an entity that does not exist: {entity:?}");
            return;
        }

        // Components are detached before the identifier enters the recycle
        // queue, so the id can never be reissued while a pool still maps it.
        for pool in &mut self.pools {
            pool.evict(entity);
        }
        self.allocator.free(entity);
    }

    /// Whether the entity is currently live.
    #[inline]
    pub fn exists(&self, entity: Entity) -> bool {
        self.allocator.exists(entity)
    }

    /// Number of live entities.
    #[inline]
    pub fn entity_count(&self) -> usize {
        self.allocator.len()
    }

    // ── Components ───────────────────────────────────────────────────

    /// Attach a component to an entity, overwriting any previous value of
    /// the same type in place.
    ///
    /// # Panics
    ///
    /// Panics if the entity does not exist (a stale attachment would leak
    /// onto the identifier's next owner) or if `C` is not registered.
    pub fn set<C: Component>(&mut self, entity: Entity, value: C) {
        assert!(
            self.allocator.exists(entity),
            "cannot attach `{}` to entity {:?}: entity does not exist",
            any::type_name::<C>(),
            entity
        );
        self.pool_mut::<C>().set(entity, value);
    }

    /// Whether the entity holds a component of type `C`.
    ///
    /// `false` for destroyed entities; never an error.
    ///
    /// # Panics
    ///
    /// Panics if `C` is not registered.
    #[inline]
    pub fn has<C: Component>(&self, entity: Entity) -> bool {
        self.pool::<C>().has(entity)
    }

    /// Get the entity's component of type `C`.
    ///
    /// The reference stays valid until the next structural mutation of the
    /// pool for `C`.
    ///
    /// # Panics
    ///
    /// Panics if the entity holds no `C` or if `C` is not registered.
    #[inline]
    pub fn get<C: Component>(&self, entity: Entity) -> &C {
        self.pool::<C>().get(entity)
    }

    /// Mutable variant of [`get`](Self::get).
    ///
    /// # Panics
    ///
    /// Panics if the entity holds no `C` or if `C` is not registered.
    #[inline]
    pub fn get_mut<C: Component>(&mut self, entity: Entity) -> &mut C {
        self.pool_mut::<C>().get_mut(entity)
    }

    /// Get the entity's component of type `C`, or `None` when absent.
    ///
    /// # Panics
    ///
    /// Panics if `C` is not registered.
    #[inline]
    pub fn try_get<C: Component>(&self, entity: Entity) -> Option<&C> {
        self.pool::<C>().try_get(entity)
    }

    /// Mutable variant of [`try_get`](Self::try_get).
    ///
    /// # Panics
    ///
    /// Panics if `C` is not registered.
    #[inline]
    pub fn try_get_mut<C: Component>(&mut self, entity: Entity) -> Option<&mut C> {
        self.pool_mut::<C>().try_get_mut(entity)
    }

    /// Detach the entity's component of type `C`.
    ///
    /// # Panics
    ///
    /// Panics if the entity holds no `C` or if `C` is not registered.
    #[inline]
    pub fn remove<C: Component>(&mut self, entity: Entity) {
        self.pool_mut::<C>().remove(entity);
    }

    /// Number of entities currently holding a component of type `C`.
    ///
    /// # Panics
    ///
    /// Panics if `C` is not registered.
    #[inline]
    pub fn count<C: Component>(&self) -> usize {
        self.pool::<C>().len()
    }

    /// Detach every component of type `C` from every entity.
    ///
    /// # Panics
    ///
    /// Panics if `C` is not registered.
    pub fn clear_components<C: Component>(&mut self) {
        self.pool_mut::<C>().clear();
    }

    /// Destroy all entities and all components, returning the store to its
    /// just-built state. The registered type set is unchanged.
    pub fn clear(&mut self) {
        for pool in &mut self.pools {
            pool.clear();
        }
        self.allocator.clear();
    }

    // ── Views ────────────────────────────────────────────────────────

    /// Iterate over every entity holding all of the selected component
    /// types, yielding `(Entity, refs...)` straight out of dense storage.
    ///
    /// The selection is a shared reference or a tuple of shared references:
    /// `view::<&Transform>()`, `view::<(&Transform, &Skeleton)>()`. The walk
    /// is driven by the smallest selected pool, so intersecting a 3-entry
    /// pool with a 500-entry pool scans 3 candidates, not 500. Iteration
    /// order is arbitrary and not stable across mutations.
    ///
    /// Each call produces a fresh, finite, single-pass iterator.
    ///
    /// # Panics
    ///
    /// Panics if any selected type is not registered, or if the selection
    /// names the same component type more than once.
    pub fn view<S: ReadOnly>(&self) -> View<'_, S> {
        View::over(self)
    }

    /// Like [`view`](Self::view), but the selection may borrow components
    /// mutably: `view_mut::<(&Transform, &mut Velocity)>()`.
    ///
    /// Takes `&mut self`, so no other store access can happen while the view
    /// or any yielded reference is alive.
    ///
    /// # Panics
    ///
    /// Panics if any selected type is not registered, or if the selection
    /// names the same component type more than once.
    pub fn view_mut<S: Select>(&mut self) -> View<'_, S> {
        View::over_mut(self)
    }

    // ── Pool resolution ──────────────────────────────────────────────

    /// Resolve the pool slot for `C`, panicking when unregistered.
    fn pool_slot<C: Component>(&self) -> usize {
        match self.index.get(&TypeId::of::<C>()) {
            Some(&slot) => slot,
            None => panic!(
                "component type `{}` is not registered with this store",
                any::type_name::<C>()
            ),
        }
    }

    /// The pool for component type `C`.
    pub(crate) fn pool<C: Component>(&self) -> &Pool<C> {
        let slot = self.pool_slot::<C>();
        self.pools[slot]
            .as_any()
            .downcast_ref::<Pool<C>>()
            .expect("pool slot bound to a different component type")
    }

    /// Mutable variant of [`pool`](Self::pool).
    pub(crate) fn pool_mut<C: Component>(&mut self) -> &mut Pool<C> {
        let slot = self.pool_slot::<C>();
        self.pools[slot]
            .as_any_mut()
            .downcast_mut::<Pool<C>>()
            .expect("pool slot bound to a different component type")
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        map.entry(&"entities", &self.allocator.len());
        for pool in &self.pools {
            map.entry(&pool.type_name(), &pool.len());
        }
        map.finish()
    }
}
