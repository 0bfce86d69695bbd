//! A small particle swarm driven entirely through the store's public
//! contract: create entities, attach components, walk views each tick,
//! destroy expired particles, and let identifier recycling keep the id space
//! compact.

use ember_engine::ecs::Store;
use ember_macros::Component;

const TICKS: u32 = 120;
const SWARM_SIZE: usize = 256;

#[derive(Component)]
struct Position {
    x: f32,
    y: f32,
}

#[derive(Component)]
struct Velocity {
    dx: f32,
    dy: f32,
}

#[derive(Component)]
struct Fuel {
    remaining: u32,
}

fn spawn_particle(store: &mut Store, seed: u32) {
    let e = store.create();
    let angle = seed as f32 * 0.618;
    store.set(e, Position { x: 0.0, y: 0.0 });
    store.set(
        e,
        Velocity {
            dx: angle.cos(),
            dy: angle.sin(),
        },
    );
    // Roughly a third of the swarm burns out and respawns over a run.
    store.set(
        e,
        Fuel {
            remaining: 40 + seed % 300,
        },
    );
}

fn main() {
    let mut store = Store::builder()
        .register::<Position>()
        .register::<Velocity>()
        .register::<Fuel>()
        .build();

    for seed in 0..SWARM_SIZE as u32 {
        spawn_particle(&mut store, seed);
    }

    let mut respawn_seed = SWARM_SIZE as u32;
    for tick in 0..TICKS {
        // Integrate positions and burn fuel.
        for (_, (position, velocity, fuel)) in
            store.view_mut::<(&mut Position, &Velocity, &mut Fuel)>()
        {
            position.x += velocity.dx;
            position.y += velocity.dy;
            fuel.remaining = fuel.remaining.saturating_sub(1);
        }

        // Collect burnouts first; destroying while a view is walking the
        // pools is rejected by the borrow checker.
        let expired: Vec<_> = store
            .view::<&Fuel>()
            .filter(|(_, fuel)| fuel.remaining == 0)
            .map(|(entity, _)| entity)
            .collect();

        for entity in expired {
            store.destroy(entity);
            spawn_particle(&mut store, respawn_seed);
            respawn_seed += 1;
        }

        if tick % 30 == 0 {
            let drift: f32 = store
                .view::<&Position>()
                .map(|(_, p)| (p.x * p.x + p.y * p.y).sqrt())
                .sum::<f32>()
                / store.count::<Position>() as f32;
            println!(
                "tick {tick:3}: {} particles, mean drift {drift:.1}",
                store.entity_count()
            );
        }
    }

    println!(
        "done: {} particles live, highest id stayed near {}",
        store.entity_count(),
        SWARM_SIZE
    );
}
