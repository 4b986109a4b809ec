//! Multi-tick movement driven through [`Engine`], as a host would.

use euclid::{point3, vec3};
use pretty_assertions::assert_eq;

use movecheck::Engine;
use movecheck::block::{Block, BlockKind};
use movecheck::engine::{EntityId, Verdict};
use movecheck::math::{Cube, CubeRange, FreeCoordinate, FreeVector};
use movecheck::physics::{EntityPhysicsState, VERTICAL_DRAG};
use movecheck::version::ObserverVersion;
use movecheck::violation::{CheckKind, ViolationLog};
use movecheck::world::ChunkedWorld;

const ID: EntityId = EntityId::new(1);

fn world_with_floor(kind: BlockKind) -> ChunkedWorld {
    let mut world = ChunkedWorld::new(-64, 320);
    let floor = CubeRange::new(Cube::new(-16, -1, -16), Cube::new(15, -1, 15));
    world.load_columns_covering(floor);
    world.fill(floor, Block::new(kind)).unwrap();
    world
}

fn standing_at_origin() -> EntityPhysicsState {
    let mut state = EntityPhysicsState::new(ObserverVersion::LATEST, point3(0.5, 0.0, 0.5));
    state.on_ground = true;
    state.last_on_ground = true;
    state.claimed_on_ground = true;
    state
}

fn cutoff(v: FreeCoordinate) -> FreeCoordinate {
    if v.abs() < 0.003 { 0.0 } else { v }
}

#[track_caller]
fn assert_exact(engine: &mut Engine, world: &ChunkedWorld, observed: FreeVector, log: &mut ViolationLog) {
    let report = engine.predict_movement(world, ID, observed, log).unwrap();
    assert_eq!(report.verdict, Verdict::Clean, "{report:?}");
    assert!(report.offset.unwrap() < 1e-9, "{report:?}");
}

/// Released on ice, an entity keeps sliding, losing only the ice's friction each tick.
#[test]
fn ice_slide() {
    let world = world_with_floor(BlockKind::PackedIce);
    let mut engine = Engine::default();
    let mut state = standing_at_origin();
    state.last_velocity = vec3(0.3, 0.0, 0.0);
    engine.track(ID, state);
    let mut log = ViolationLog::new();

    let friction = f64::from(0.98_f32 * 0.91);
    let mut vx = 0.3;
    let mut travelled = 0.0;
    for _ in 0..30 {
        vx = cutoff(vx * friction);
        travelled += vx;
        assert_exact(&mut engine, &world, vec3(vx, 0.0, 0.0), &mut log);
    }

    assert!(travelled > 2.0, "{travelled}");
    assert!(log.as_slice().is_empty());
    let after = &engine.entity(ID).unwrap().state;
    assert!((after.position.x - (0.5 + travelled)).abs() < 1e-9);
    assert!(after.on_ground);
}

/// A standing jump rises, falls, and lands back on the floor.
#[test]
fn jump_and_land() {
    let world = world_with_floor(BlockKind::Solid);
    let mut engine = Engine::default();
    engine.track(ID, standing_at_origin());
    let mut log = ViolationLog::new();

    let mut vy = f64::from(0.42_f32);
    let mut y = 0.0;
    let mut ticks = 0;
    loop {
        ticks += 1;
        let landing = y + vy <= 0.0;
        let observed_y = if landing { -y } else { vy };
        engine.entity_mut(ID).unwrap().state.claimed_on_ground = landing;
        assert_exact(&mut engine, &world, vec3(0.0, observed_y, 0.0), &mut log);
        y += observed_y;
        if landing {
            break;
        }
        vy = cutoff((vy - 0.08) * VERTICAL_DRAG);
        assert!(ticks < 40, "never landed");
    }

    assert_eq!(ticks, 12);
    let state = &engine.entity(ID).unwrap().state;
    assert_eq!(state.position.y, 0.0);
    assert!(state.on_ground);
    assert_eq!(engine.violation_level(ID, CheckKind::Prediction).get(), 0);
    assert_eq!(engine.violation_level(ID, CheckKind::GroundSpoof).get(), 0);
    assert!(log.as_slice().is_empty());
}

/// Honest ticks pay down violations accumulated earlier.
#[test]
fn violations_decay() {
    let world = world_with_floor(BlockKind::Solid);
    let mut engine = Engine::default();
    engine.track(ID, standing_at_origin());
    let mut log = ViolationLog::new();

    for dz in [3.0, -3.0, 3.0] {
        engine
            .predict_movement(&world, ID, vec3(0.0, 0.0, dz), &mut log)
            .unwrap();
    }
    assert_eq!(engine.violation_level(ID, CheckKind::Prediction).get(), 3);

    engine.teleport(ID, point3(0.5, 0.0, 0.5)).unwrap();
    engine.entity_mut(ID).unwrap().state.on_ground = true;
    for _ in 0..5 {
        engine
            .predict_movement(&world, ID, FreeVector::zero(), &mut log)
            .unwrap();
    }
    assert_eq!(engine.violation_level(ID, CheckKind::Prediction).get(), 0);
    assert!(log.as_slice().is_empty());
}
