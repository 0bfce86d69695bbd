//! Component trait for the ECS.
//!
//! A component is a plain data record attached to an entity through exactly
//! one pool in the [`Store`](crate::ecs::Store). Types opt in by implementing
//! the marker trait, usually via `#[derive(Component)]` from `ember_macros`.

/// A trait representing a component in the ECS (Entity Component System).
///
/// At present this only sets the required trait bounds for a type to be used
/// as a component. The store is single-threaded and `!Send`, so components are
/// deliberately not required to be `Send`/`Sync`.
pub trait Component: 'static + Sized {}
