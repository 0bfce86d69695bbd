//! Ember engine core: the entity/component storage layer.
//!
//! Every other engine subsystem (animation, physics bridge, scripting, audio,
//! rendering, scene I/O) reads and writes simulation state through the store
//! in [`ecs`]. Those subsystems live in their own crates; this one is only the
//! storage contract they consume.

// Allow the derive macros in `ember_macros` to emit `::ember_engine::` paths
// that resolve both inside this crate and from dependent crates.
extern crate self as ember_engine;

pub mod ecs;
