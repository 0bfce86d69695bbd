//! Store setup helpers for benchmark scenarios.

use ember_engine::ecs::{Entity, Store};
use rand::seq::SliceRandom;

use crate::components::{Position, Skeleton, Transform, Velocity};

/// Build a store with every benchmark component type registered.
pub fn store() -> Store {
    Store::builder()
        .register::<Position>()
        .register::<Velocity>()
        .register::<Transform>()
        .register::<Skeleton>()
        .build()
}

/// Populate `count` entities, all holding `Position` and `Velocity`.
pub fn movers(store: &mut Store, count: usize) -> Vec<Entity> {
    (0..count)
        .map(|i| {
            let e = store.create();
            store.set(
                e,
                Position {
                    x: i as f32,
                    ..Position::default()
                },
            );
            store.set(
                e,
                Velocity {
                    x: 1.0,
                    ..Velocity::default()
                },
            );
            e
        })
        .collect()
}

/// Populate a skewed scene: `total` entities hold `Transform`, and a random
/// subset of `rare` of them also holds `Skeleton`. Views over both types get
/// their worst case when the rare pool drives the scan.
pub fn skewed(store: &mut Store, total: usize, rare: usize) -> Vec<Entity> {
    let mut entities = movers(store, total);
    for e in &entities {
        store.set(*e, Transform::default());
    }

    entities.shuffle(&mut rand::thread_rng());
    for e in entities.iter().take(rare) {
        store.set(*e, Skeleton { joint_count: 64 });
    }
    entities
}
