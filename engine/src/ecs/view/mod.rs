//! Multi-component views: lazy intersection iteration over pools.
//!
//! A view walks every live entity that simultaneously holds all of the
//! selected component types, yielding `(Entity, refs...)` straight out of
//! dense pool storage: no materialized result set, no copies.
//!
//! # Selections
//!
//! A selection is a [`Param`] (`&C` or `&mut C`) or a tuple of params up to
//! arity 8:
//!
//! ```rust,ignore
//! // Read-only, takes &Store:
//! for (entity, transform) in store.view::<&Transform>() { ... }
//! for (entity, (transform, skeleton)) in store.view::<(&Transform, &Skeleton)>() { ... }
//!
//! // Mutating, takes &mut Store:
//! for (entity, (transform, velocity)) in store.view_mut::<(&Transform, &mut Velocity)>() {
//!     velocity.dx += transform.x * 0.1;
//! }
//! ```
//!
//! # Algorithm
//!
//! 1. Resolve the pool for every selected type.
//! 2. Pick the **driver**: the pool whose dense entity array is currently
//!    shortest. Pool sizes vary wildly at runtime (3 skeletons vs. 500
//!    transforms), so driving from the smallest candidate set bounds the
//!    scan far better than driving from the first-listed type.
//! 3. Walk the driver's dense entities; reject any candidate missing from
//!    any selected pool (sparse lookup, short-circuit on first miss).
//! 4. For survivors, resolve each pool's dense slot and yield references.
//!
//! If any selected pool is empty, the driver is empty and the view yields
//! nothing.
//!
//! # Guarantees and non-guarantees
//!
//! - **Ordering: none.** Swap-removal reorders dense arrays, so iteration
//!   order is arbitrary and not stable across mutations.
//! - **Single-pass.** A `View` is a fresh, finite iterator per
//!   `view`/`view_mut` call; re-invoke to walk again (the driver pool is
//!   re-chosen each time).
//! - **No mutation during iteration.** The view borrows the store (shared
//!   for `view`, exclusive for `view_mut`) for its whole lifetime, so the
//!   borrow checker rejects structural mutation while a walk is in flight.
//! - **Distinct types.** Selecting the same component type twice panics at
//!   view construction; with mutable params it would alias, and the sparse
//!   set has no use for a duplicate read either.

use std::any::TypeId;
use std::marker::PhantomData;

use crate::ecs::{component::Component, entity::Entity, store::Store, store::pool::Pool};

mod select;

/// Seals [`Param`] and [`Select`]: the raw-pointer contracts below are only
/// upheld by the impls in this module.
mod sealed {
    pub trait Sealed {}
}

/// One element of a view selection: `&C` or `&mut C`.
pub trait Param: sealed::Sealed {
    /// The component type this parameter accesses.
    type Component: Component;

    /// The reference type yielded for this parameter.
    type Ref<'a>;

    /// Dereference the pool entry for `entity`.
    ///
    /// # Safety
    ///
    /// `pool` must point at a live pool containing `entity`, and for mutable
    /// params the caller must guarantee no other reference to the same entry
    /// exists for `'a`.
    unsafe fn fetch<'a>(pool: *mut Pool<Self::Component>, entity: Entity) -> Self::Ref<'a>;
}

/// Marker for params that only ever take shared references.
pub trait ReadOnlyParam: Param {}

impl<'p, C: Component> sealed::Sealed for &'p C {}

impl<'p, C: Component> Param for &'p C {
    type Component = C;
    type Ref<'a> = &'a C;

    unsafe fn fetch<'a>(pool: *mut Pool<C>, entity: Entity) -> &'a C {
        // Safety: caller guarantees the pool is live and contains the entity.
        unsafe { (*pool).get(entity) }
    }
}

impl<'p, C: Component> ReadOnlyParam for &'p C {}

impl<'p, C: Component> sealed::Sealed for &'p mut C {}

impl<'p, C: Component> Param for &'p mut C {
    type Component = C;
    type Ref<'a> = &'a mut C;

    unsafe fn fetch<'a>(pool: *mut Pool<C>, entity: Entity) -> &'a mut C {
        // Safety: caller guarantees the pool is live, contains the entity,
        // and that this is the only reference to the entry.
        unsafe { (*pool).get_mut(entity) }
    }
}

/// A complete view selection: a single [`Param`] or a tuple of params.
///
/// Implemented for `&C`, `&mut C`, and tuples up to arity 8. The methods are
/// plumbing for [`View`]; callers only name a `Select` type when invoking
/// [`Store::view`]/[`Store::view_mut`].
pub trait Select: sealed::Sealed {
    /// Raw pool pointers, one per param.
    type Pools: Copy;

    /// The references yielded per matching entity.
    type Item<'a>;

    /// Resolve pools from an exclusive store borrow.
    #[doc(hidden)]
    fn pools_mut(store: &mut Store) -> Self::Pools;

    /// The dense entity list of the smallest selected pool.
    ///
    /// # Safety
    ///
    /// The pools must be live for `'a`.
    #[doc(hidden)]
    unsafe fn driver<'a>(pools: &Self::Pools) -> &'a [Entity];

    /// Whether every selected pool holds `entity`.
    ///
    /// # Safety
    ///
    /// The pools must be live.
    #[doc(hidden)]
    unsafe fn contains(pools: &Self::Pools, entity: Entity) -> bool;

    /// Yield references for an entity known to pass [`contains`](Select::contains).
    ///
    /// # Safety
    ///
    /// The pools must be live for `'a`, `entity` must be present in all of
    /// them, and the caller must not hold other references to the fetched
    /// entries when any param is mutable.
    #[doc(hidden)]
    unsafe fn fetch<'a>(pools: &Self::Pools, entity: Entity) -> Self::Item<'a>;

    /// Record every selected component type for distinctness checking.
    #[doc(hidden)]
    fn push_types(out: &mut Vec<(TypeId, &'static str)>);
}

/// Selections whose params are all read-only; only these can resolve their
/// pools from a shared store borrow, via [`Store::view`].
pub trait ReadOnly: Select {
    /// Resolve pools from a shared store borrow.
    #[doc(hidden)]
    fn pools(store: &Store) -> Self::Pools;
}

/// Panic when a selection names the same component type twice.
fn assert_distinct<S: Select>() {
    let mut types: Vec<(TypeId, &'static str)> = Vec::new();
    S::push_types(&mut types);
    for (i, &(id, name)) in types.iter().enumerate() {
        if types[i + 1..].iter().any(|&(other, _)| other == id) {
            panic!("view selects component `{name}` more than once");
        }
    }
}

/// Iterator over every entity matching a selection.
///
/// Produced by [`Store::view`] and [`Store::view_mut`]; finite, single-pass,
/// and tied to the store borrow it was created from.
pub struct View<'s, S: Select> {
    /// Raw pool pointers for the selection.
    pools: S::Pools,

    /// Dense entity list of the driver (smallest) pool.
    driver: &'s [Entity],

    /// Walk position within `driver`.
    cursor: usize,

    /// Ties the view to the store borrow.
    _store: PhantomData<&'s Store>,
}

impl<'s, S: Select> View<'s, S> {
    /// Build a read-only view. Called by [`Store::view`].
    pub(crate) fn over(store: &'s Store) -> Self
    where
        S: ReadOnly,
    {
        assert_distinct::<S>();
        let pools = S::pools(store);
        // Safety: the pools live inside `store`, borrowed for 's.
        let driver = unsafe { S::driver(&pools) };
        Self {
            pools,
            driver,
            cursor: 0,
            _store: PhantomData,
        }
    }

    /// Build a possibly-mutating view. Called by [`Store::view_mut`].
    pub(crate) fn over_mut(store: &'s mut Store) -> Self {
        assert_distinct::<S>();
        let pools = S::pools_mut(store);
        // Safety: the pools live inside `store`, borrowed exclusively for 's.
        let driver = unsafe { S::driver(&pools) };
        Self {
            pools,
            driver,
            cursor: 0,
            _store: PhantomData,
        }
    }
}

impl<'s, S: Select> Iterator for View<'s, S> {
    type Item = (Entity, S::Item<'s>);

    fn next(&mut self) -> Option<Self::Item> {
        while self.cursor < self.driver.len() {
            let entity = self.driver[self.cursor];
            self.cursor += 1;

            // Safety: the pools outlive 's and are not structurally mutated
            // while the view holds the store borrow. Distinct component
            // types (checked at construction) plus one yield per driver
            // entity mean fetched mutable references never alias.
            unsafe {
                if S::contains(&self.pools, entity) {
                    return Some((entity, S::fetch(&self.pools, entity)));
                }
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        // Every remaining driver entry is at most one yield.
        (0, Some(self.driver.len() - self.cursor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Transform {
        x: f32,
        y: f32,
    }
    impl Component for Transform {}

    struct Skeleton {
        joints: u32,
    }
    impl Component for Skeleton {}

    struct Tag;
    impl Component for Tag {}

    fn store() -> Store {
        Store::builder()
            .register::<Transform>()
            .register::<Skeleton>()
            .register::<Tag>()
            .build()
    }

    #[test]
    fn view_yields_exactly_the_intersection() {
        // Given - 500 transforms, 2 of which also have skeletons
        let mut store = store();
        let mut with_both = Vec::new();
        for i in 0..500 {
            let e = store.create();
            store.set(
                e,
                Transform {
                    x: i as f32,
                    y: 0.0,
                },
            );
            if i == 77 || i == 399 {
                store.set(e, Skeleton { joints: i });
                with_both.push(e);
            }
        }

        // When - driven by the skeleton pool (the smaller one)
        let mut hits: Vec<Entity> = store
            .view::<(&Transform, &Skeleton)>()
            .map(|(e, _)| e)
            .collect();

        // Then
        hits.sort();
        with_both.sort();
        assert_eq!(hits, with_both);

        // When - selection order reversed, result set unchanged
        let mut reversed: Vec<Entity> = store
            .view::<(&Skeleton, &Transform)>()
            .map(|(e, _)| e)
            .collect();
        reversed.sort();

        // Then
        assert_eq!(reversed, with_both);
    }

    #[test]
    fn view_yields_nothing_when_any_pool_is_empty() {
        // Given - transforms but not a single skeleton
        let mut store = store();
        for _ in 0..10 {
            let e = store.create();
            store.set(e, Transform { x: 0.0, y: 0.0 });
        }

        // When/Then
        assert_eq!(store.view::<(&Transform, &Skeleton)>().count(), 0);
        assert_eq!(store.view::<(&Skeleton, &Transform)>().count(), 0);
        assert_eq!(store.view::<&Skeleton>().count(), 0);
    }

    #[test]
    fn view_reads_component_values() {
        // Given
        let mut store = store();
        let e = store.create();
        store.set(e, Transform { x: 1.5, y: 2.5 });
        store.set(e, Skeleton { joints: 40 });

        // When
        let collected: Vec<_> = store
            .view::<(&Transform, &Skeleton)>()
            .map(|(entity, (transform, skeleton))| (entity, transform.x, skeleton.joints))
            .collect();

        // Then
        assert_eq!(collected.len(), 1);
        assert_eq!(collected[0], (e, 1.5, 40));
    }

    #[test]
    fn single_param_view_walks_one_pool() {
        // Given
        let mut store = store();
        for i in 0..5 {
            let e = store.create();
            store.set(
                e,
                Transform {
                    x: i as f32,
                    y: 0.0,
                },
            );
        }

        // When
        let total: f32 = store.view::<&Transform>().map(|(_, t)| t.x).sum();

        // Then
        assert_eq!(total, 0.0 + 1.0 + 2.0 + 3.0 + 4.0);
    }

    #[test]
    fn view_mut_writes_through_to_storage() {
        // Given
        let mut store = store();
        let e = store.create();
        store.set(e, Transform { x: 1.0, y: 1.0 });
        store.set(e, Skeleton { joints: 4 });

        // When - mutate through the view
        for (_, (transform, skeleton)) in store.view_mut::<(&mut Transform, &mut Skeleton)>() {
            transform.x += 9.0;
            skeleton.joints += 1;
        }

        // Then
        assert_eq!(store.get::<Transform>(e).x, 10.0);
        assert_eq!(store.get::<Skeleton>(e).joints, 5);
    }

    #[test]
    fn view_mut_allows_mixed_mutability() {
        // Given
        let mut store = store();
        for i in 0..4 {
            let e = store.create();
            store.set(
                e,
                Transform {
                    x: i as f32,
                    y: 0.0,
                },
            );
            store.set(e, Skeleton { joints: 0 });
        }

        // When - read transforms, write skeletons
        for (_, (transform, skeleton)) in store.view_mut::<(&Transform, &mut Skeleton)>() {
            skeleton.joints = transform.x as u32;
        }

        // Then
        let sum: u32 = store.view::<&Skeleton>().map(|(_, s)| s.joints).sum();
        assert_eq!(sum, 0 + 1 + 2 + 3);
    }

    #[test]
    fn view_survives_prior_swap_removes() {
        // Given - holders with holes punched by removal
        let mut store = store();
        let entities: Vec<_> = (0..8)
            .map(|i| {
                let e = store.create();
                store.set(
                    e,
                    Transform {
                        x: i as f32,
                        y: 0.0,
                    },
                );
                store.set(e, Tag);
                e
            })
            .collect();
        store.remove::<Transform>(entities[0]);
        store.remove::<Transform>(entities[5]);
        store.destroy(entities[2]);

        // When
        let mut hits: Vec<_> = store.view::<(&Transform, &Tag)>().map(|(e, _)| e).collect();
        hits.sort();

        // Then - exactly the survivors, each once
        let mut expected: Vec<_> = entities
            .iter()
            .copied()
            .filter(|&e| ![entities[0], entities[2], entities[5]].contains(&e))
            .collect();
        expected.sort();
        assert_eq!(hits, expected);
    }

    #[test]
    fn fresh_views_observe_mutations_between_walks() {
        // Given
        let mut store = store();
        let e = store.create();
        store.set(e, Transform { x: 0.0, y: 0.0 });

        // When - a first walk, then a mutation, then a fresh walk
        assert_eq!(store.view::<&Transform>().count(), 1);
        store.remove::<Transform>(e);

        // Then
        assert_eq!(store.view::<&Transform>().count(), 0);
    }

    #[test]
    fn size_hint_is_bounded_by_driver() {
        // Given - 3 skeletons, 100 transforms
        let mut store = store();
        for i in 0..100 {
            let e = store.create();
            store.set(e, Transform { x: 0.0, y: 0.0 });
            if i < 3 {
                store.set(e, Skeleton { joints: 0 });
            }
        }

        // When
        let view = store.view::<(&Transform, &Skeleton)>();

        // Then - the scan is bounded by the smallest pool
        assert_eq!(view.size_hint(), (0, Some(3)));
    }

    #[test]
    #[should_panic(expected = "more than once")]
    fn duplicate_selection_panics() {
        let store = store();
        let _ = store.view::<(&Transform, &Transform)>();
    }

    #[test]
    #[should_panic(expected = "more than once")]
    fn duplicate_mutable_selection_panics() {
        let mut store = store();
        let _ = store.view_mut::<(&mut Transform, &Transform)>();
    }

    #[test]
    #[should_panic(expected = "is not registered")]
    fn view_of_unregistered_type_panics() {
        struct Unregistered;
        impl Component for Unregistered {}

        let store = store();
        let _ = store.view::<&Unregistered>();
    }
}
