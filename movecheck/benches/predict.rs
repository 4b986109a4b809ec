#![allow(missing_docs)]

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use euclid::{point3, vec3};

use movecheck::Engine;
use movecheck::block::{Block, BlockKind};
use movecheck::engine::EntityId;
use movecheck::math::{Cube, CubeRange};
use movecheck::physics::EntityPhysicsState;
use movecheck::predict::{PredictionSearch, Scratch};
use movecheck::version::ObserverVersion;
use movecheck::violation::NullSink;
use movecheck::world::ChunkedWorld;

fn floor_world() -> ChunkedWorld {
    let mut world = ChunkedWorld::new(-64, 320);
    let floor = CubeRange::new(Cube::new(-16, -1, -16), Cube::new(15, -1, 15));
    world.load_columns_covering(floor);
    world.fill(floor, Block::new(BlockKind::Solid)).unwrap();
    world
}

fn standing() -> EntityPhysicsState {
    let mut state = EntityPhysicsState::new(ObserverVersion::LATEST, point3(0.5, 0.0, 0.5));
    state.on_ground = true;
    state.last_on_ground = true;
    state.claimed_on_ground = true;
    state
}

pub fn predict_bench(c: &mut Criterion) {
    let world = floor_world();
    let state = standing();

    c.bench_function("predict: standing still", |b| {
        let search = PredictionSearch::new(36);
        let mut scratch = Scratch::new();
        b.iter(|| search.predict(&mut scratch, &world, &state, black_box(vec3(0.0, 0.0, 0.0))));
    });

    // Matches no branch, so every branch is evaluated.
    c.bench_function("predict: exhaustive", |b| {
        let search = PredictionSearch::new(36);
        let mut scratch = Scratch::new();
        b.iter(|| search.predict(&mut scratch, &world, &state, black_box(vec3(3.0, 1.0, 3.0))));
    });

    c.bench_function("predict: engine tick", |b| {
        let id = EntityId::new(1);
        b.iter_batched_ref(
            || {
                let mut engine = Engine::default();
                engine.track(id, standing());
                engine
            },
            |engine| engine.predict_movement(&world, id, black_box(vec3(0.0, 0.0, 0.098)), &mut NullSink),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, predict_bench);
criterion_main!(benches);
