//! Tests of memory allocation behavior.
//!
//! In a separate test crate to avoid modifying the global allocator elsewhere.

use allocation_counter::{AllocationInfo, measure};
use euclid::{point3, vec3};

use movecheck::Engine;
use movecheck::block::{Block, BlockKind};
use movecheck::collision::{CollideRequest, CollisionScratch, collide};
use movecheck::engine::EntityId;
use movecheck::math::{Cube, CubeRange, FreeVector};
use movecheck::physics::EntityPhysicsState;
use movecheck::version::ObserverVersion;
use movecheck::violation::NullSink;
use movecheck::world::ChunkedWorld;

/// A floor with a wall to walk into. Only full blocks, whose shapes never allocate.
fn world() -> ChunkedWorld {
    let mut world = ChunkedWorld::new(-64, 320);
    let floor = CubeRange::new(Cube::new(-16, -1, -16), Cube::new(15, -1, 15));
    world.load_columns_covering(floor);
    world.fill(floor, Block::new(BlockKind::Solid)).unwrap();
    world
        .fill(
            CubeRange::new(Cube::new(-16, 0, 2), Cube::new(15, 1, 2)),
            Block::new(BlockKind::Solid),
        )
        .unwrap();
    world
}

/// Once an entity's scratch buffers have grown, checking its movement allocates nothing.
#[test]
fn warm_prediction_does_not_allocate() {
    let world = world();
    let id = EntityId::new(1);
    let mut engine = Engine::default();
    let mut state = EntityPhysicsState::new(ObserverVersion::LATEST, point3(0.5, 0.0, 1.5));
    state.on_ground = true;
    state.last_on_ground = true;
    state.claimed_on_ground = true;
    engine.track(id, state);

    // Standing beside the wall; the same movement every tick.
    let observed = vec3(0.0, 0.0, 0.0);
    for _ in 0..3 {
        engine
            .predict_movement(&world, id, observed, &mut NullSink)
            .unwrap();
    }

    let info = measure(|| {
        engine
            .predict_movement(&world, id, observed, &mut NullSink)
            .unwrap();
    });
    assert_eq!(info.count_total, 0, "{info:?}");
}

#[test]
fn warm_collide_does_not_allocate() {
    let world = world();
    let aab = movecheck::math::Aab::new(0.2, 0.8, 0.0, 1.8, 1.2, 1.8);
    let mut request = CollideRequest::new(ObserverVersion::LATEST, aab, vec3(0.1, -0.08, 0.3));
    request.step_height = 0.6;
    request.last_on_ground = true;
    let mut scratch = CollisionScratch::new();
    collide(&world, &request, &mut scratch);

    let mut result = FreeVector::zero();
    let info: AllocationInfo = measure(|| {
        result = collide(&world, &request, &mut scratch).displacement;
    });
    assert_eq!(info.count_total, 0, "{info:?}");
    assert!((result.z - 0.2).abs() < 1e-9, "{result:?}");
}
