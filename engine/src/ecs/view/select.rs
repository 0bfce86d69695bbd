//! [`Select`] implementations for single params and param tuples.
//!
//! Singles are written out; tuple arities 1 through 8 are generated by
//! `impl_select_for_tuple!`. Every impl follows the same plan: resolve one
//! raw pool pointer per param, pick the shortest dense entity list as the
//! driver, test membership against all pools, and fetch through
//! [`Param::fetch`].

use std::any::{self, TypeId};

use crate::ecs::{
    component::Component,
    entity::Entity,
    store::Store,
    store::pool::Pool,
    view::{Param, ReadOnly, ReadOnlyParam, Select, sealed},
};

impl<'p, C: Component> Select for &'p C {
    type Pools = *mut Pool<C>;
    type Item<'a> = &'a C;

    fn pools_mut(store: &mut Store) -> Self::Pools {
        store.pool_mut::<C>() as *mut Pool<C>
    }

    unsafe fn driver<'a>(pools: &Self::Pools) -> &'a [Entity] {
        // Safety: caller keeps the pool alive for 'a.
        unsafe { (**pools).entities() }
    }

    unsafe fn contains(pools: &Self::Pools, entity: Entity) -> bool {
        // Safety: caller keeps the pool alive.
        unsafe { (**pools).has(entity) }
    }

    unsafe fn fetch<'a>(pools: &Self::Pools, entity: Entity) -> Self::Item<'a> {
        // Safety: forwarded from the caller.
        unsafe { <&C as Param>::fetch(*pools, entity) }
    }

    fn push_types(out: &mut Vec<(TypeId, &'static str)>) {
        out.push((TypeId::of::<C>(), any::type_name::<C>()));
    }
}

impl<'p, C: Component> ReadOnly for &'p C {
    fn pools(store: &Store) -> Self::Pools {
        // Never written through: read-only views fetch via `&C::fetch` only.
        store.pool::<C>() as *const Pool<C> as *mut Pool<C>
    }
}

impl<'p, C: Component> Select for &'p mut C {
    type Pools = *mut Pool<C>;
    type Item<'a> = &'a mut C;

    fn pools_mut(store: &mut Store) -> Self::Pools {
        store.pool_mut::<C>() as *mut Pool<C>
    }

    unsafe fn driver<'a>(pools: &Self::Pools) -> &'a [Entity] {
        // Safety: caller keeps the pool alive for 'a.
        unsafe { (**pools).entities() }
    }

    unsafe fn contains(pools: &Self::Pools, entity: Entity) -> bool {
        // Safety: caller keeps the pool alive.
        unsafe { (**pools).has(entity) }
    }

    unsafe fn fetch<'a>(pools: &Self::Pools, entity: Entity) -> Self::Item<'a> {
        // Safety: forwarded from the caller.
        unsafe { <&mut C as Param>::fetch(*pools, entity) }
    }

    fn push_types(out: &mut Vec<(TypeId, &'static str)>) {
        out.push((TypeId::of::<C>(), any::type_name::<C>()));
    }
}

/// Implement [`Select`] (and [`ReadOnly`] where applicable) for one tuple
/// arity. Takes `(ParamType, pool_binding)` pairs so the expansion can name
/// both the generic param and a local for its pool pointer.
macro_rules! impl_select_for_tuple {
    ($(($param:ident, $pool:ident)),+) => {
        impl<$($param: Param),+> sealed::Sealed for ($($param,)+) {}

        impl<$($param: Param),+> Select for ($($param,)+) {
            type Pools = ($(*mut Pool<$param::Component>,)+);
            type Item<'a> = ($($param::Ref<'a>,)+);

            fn pools_mut(store: &mut Store) -> Self::Pools {
                ($(store.pool_mut::<$param::Component>() as *mut Pool<$param::Component>,)+)
            }

            unsafe fn driver<'a>(pools: &Self::Pools) -> &'a [Entity] {
                let ($($pool,)+) = *pools;
                // Safety: caller keeps the pools alive for 'a.
                let candidates = [$(unsafe { (*$pool).entities() }),+];
                candidates
                    .into_iter()
                    .min_by_key(|entities| entities.len())
                    .unwrap_or(&[])
            }

            unsafe fn contains(pools: &Self::Pools, entity: Entity) -> bool {
                let ($($pool,)+) = *pools;
                // Safety: caller keeps the pools alive.
                true $(&& unsafe { (*$pool).has(entity) })+
            }

            unsafe fn fetch<'a>(pools: &Self::Pools, entity: Entity) -> Self::Item<'a> {
                let ($($pool,)+) = *pools;
                // Safety: forwarded from the caller; distinct component
                // types mean the fetches touch distinct pools.
                ($(unsafe { $param::fetch($pool, entity) },)+)
            }

            fn push_types(out: &mut Vec<(TypeId, &'static str)>) {
                $(out.push((
                    TypeId::of::<$param::Component>(),
                    any::type_name::<$param::Component>(),
                ));)+
            }
        }

        impl<$($param: ReadOnlyParam),+> ReadOnly for ($($param,)+) {
            fn pools(store: &Store) -> Self::Pools {
                // Never written through: every param here is read-only.
                ($(store.pool::<$param::Component>()
                    as *const Pool<$param::Component>
                    as *mut Pool<$param::Component>,)+)
            }
        }
    };
}

impl_select_for_tuple!((A, a));
impl_select_for_tuple!((A, a), (B, b));
impl_select_for_tuple!((A, a), (B, b), (C, c));
impl_select_for_tuple!((A, a), (B, b), (C, c), (D, d));
impl_select_for_tuple!((A, a), (B, b), (C, c), (D, d), (E, e));
impl_select_for_tuple!((A, a), (B, b), (C, c), (D, d), (E, e), (F, f));
impl_select_for_tuple!((A, a), (B, b), (C, c), (D, d), (E, e), (F, f), (G, g));
impl_select_for_tuple!(
    (A, a),
    (B, b),
    (C, c),
    (D, d),
    (E, e),
    (F, f),
    (G, g),
    (H, h)
);
