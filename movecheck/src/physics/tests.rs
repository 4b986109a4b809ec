use euclid::{point3, vec3};
use pretty_assertions::assert_eq;
use rstest::rstest;

use super::*;
use crate::block::{Block, BlockKind};
use crate::collision::{CollideRequest, CollisionScratch, collide};
use crate::math::{Cube, CubeRange, FreeVector};
use crate::traverse::Traversal;
use crate::world::ChunkedWorld;

use ObserverVersion as V;

/// A loaded world with a floor of `floor` whose top is at y = 0.
fn world_with_floor(floor: BlockKind) -> ChunkedWorld {
    let mut world = ChunkedWorld::new(-64, 320);
    let range = CubeRange::new(Cube::new(-16, -1, -16), Cube::new(15, -1, 15));
    world.load_columns_covering(range);
    if !floor.is_air() {
        world.fill(range, Block::new(floor)).unwrap();
    }
    world
}

fn standing(version: ObserverVersion) -> EntityPhysicsState {
    let mut state = EntityPhysicsState::new(version, point3(0.5, 0.0, 0.5));
    state.on_ground = true;
    state.last_on_ground = true;
    state
}

#[track_caller]
fn assert_close(actual: FreeVector, expected: FreeVector, tolerance: FreeCoordinate) {
    assert!(
        (actual - expected).length() < tolerance,
        "expected {expected:?}, got {actual:?}"
    );
}

#[test]
fn ice_keeps_sliding() {
    let world = world_with_floor(BlockKind::PackedIce);
    let mut state = standing(V::LATEST);
    state.last_velocity = vec3(0.2, 0.0, 0.0);
    let integrator = Integrator::new(&world, &state);

    let start = integrator.carry_over(&state, state.last_velocity);
    let v = integrator.integrate(&state, start, MoveInput::NONE);

    assert_eq!(v.x, 0.2 * f64::from(0.98_f32 * 0.91));
    assert!(v.x > 0.17);
    assert_eq!(v.z, 0.0);
}

#[test]
fn ordinary_ground_stops_quickly() {
    let world = world_with_floor(BlockKind::Solid);
    let mut state = standing(V::LATEST);
    state.last_velocity = vec3(0.2, 0.0, 0.0);
    let integrator = Integrator::new(&world, &state);
    let start = integrator.carry_over(&state, state.last_velocity);
    assert_eq!(start.x, 0.2 * f64::from(0.6_f32 * 0.91));
}

#[test]
fn jump_arc_in_open_air() {
    let world = world_with_floor(BlockKind::Air);
    let mut state = EntityPhysicsState::new(V::LATEST, point3(0.5, 100.0, 0.5));
    let integrator = Integrator::new(&world, &state);

    let mut velocity = vec3(0.0, 0.42, 0.0);
    let mut expected: FreeCoordinate = 0.42;
    for tick in 0..10 {
        velocity = integrator.carry_over(&state, velocity);
        // Drag is the single-precision 0.98, widened.
        expected = (expected - 0.08) * f64::from(0.98_f32);
        assert!(
            (velocity.y - expected).abs() < 1e-9,
            "tick {tick}: expected {expected}, got {}",
            velocity.y
        );
        assert_eq!((velocity.x, velocity.z), (0.0, 0.0));
        state.last_velocity = velocity;
    }
}

#[rstest]
#[case::plain(false, None, 0.42)]
#[case::jump_boost(false, Some(1), 0.62)]
#[case::honey(true, None, 0.21)]
fn jump_power(
    #[case] honey: bool,
    #[case] jump_boost: Option<u8>,
    #[case] expected: f32,
) {
    let world = world_with_floor(if honey {
        BlockKind::HoneyBlock
    } else {
        BlockKind::Solid
    });
    let mut state = standing(V::LATEST);
    state.effects.jump_boost = jump_boost;
    let integrator = Integrator::new(&world, &state);
    let jumped = integrator.jump(&state, FreeVector::zero()).unwrap();
    assert!((jumped.y - f64::from(expected)).abs() < 1e-6, "{jumped:?}");
}

#[test]
fn sprint_jump_boosts_along_facing() {
    let world = world_with_floor(BlockKind::Solid);
    let mut state = standing(V::LATEST);
    state.sprinting = true;
    state.yaw = 90.0;
    let integrator = Integrator::new(&world, &state);
    let jumped = integrator.jump(&state, FreeVector::zero()).unwrap();
    assert_close(jumped, vec3(-0.2, f64::from(0.42_f32), 0.0), 1e-6);
}

#[test]
fn no_jump_in_midair() {
    let world = world_with_floor(BlockKind::Air);
    let state = EntityPhysicsState::new(V::LATEST, point3(0.5, 10.0, 0.5));
    let integrator = Integrator::new(&world, &state);
    assert_eq!(integrator.jump(&state, FreeVector::zero()), None);
}

#[test]
fn jumping_keeps_faster_rise_only_on_new_clients() {
    let world = world_with_floor(BlockKind::Solid);
    let rising = vec3(0.0, 0.5, 0.0);
    let new = standing(V::V1_21_2);
    let old = standing(V::V1_21);
    assert_eq!(Integrator::new(&world, &new).jump(&new, rising).unwrap().y, 0.5);
    assert_eq!(
        Integrator::new(&world, &old).jump(&old, rising).unwrap().y,
        f64::from(0.42_f32)
    );
}

#[test]
fn swim_hop() {
    let mut world = world_with_floor(BlockKind::Solid);
    world
        .fill(
            CubeRange::new(Cube::new(-1, 0, -1), Cube::new(1, 2, 1)),
            Block::new(BlockKind::Water),
        )
        .unwrap();
    let mut state = standing(V::LATEST);
    state.on_ground = false;
    let integrator = Integrator::new(&world, &state);
    assert_eq!(integrator.medium(), crate::effects::Medium::Water);
    let hopped = integrator.jump(&state, vec3(0.0, -0.1, 0.0)).unwrap();
    assert_eq!(hopped.y, -0.1 + f64::from(0.04_f32));
}

#[rstest]
#[case::walk(false, false, None, 0.098)]
#[case::sprint(true, false, None, 0.1274)]
#[case::sneak(false, true, None, 0.0294)]
#[case::speed_two(false, false, Some(1), 0.1372)]
fn ground_acceleration(
    #[case] sprinting: bool,
    #[case] sneaking: bool,
    #[case] speed: Option<u8>,
    #[case] expected_forward: FreeCoordinate,
) {
    let world = world_with_floor(BlockKind::Solid);
    let mut state = standing(V::LATEST);
    state.sprinting = sprinting;
    state.sneaking = sneaking;
    state.effects.speed = speed;
    let integrator = Integrator::new(&world, &state);
    let v = integrator.integrate(&state, FreeVector::zero(), MoveInput::new(1, 0));
    assert_close(v, vec3(0.0, 0.0, expected_forward), 1e-6);
}

#[test]
fn slowness_reduces_acceleration() {
    let world = world_with_floor(BlockKind::Solid);
    let mut state = standing(V::LATEST);
    state.effects.slowness = Some(0);
    let integrator = Integrator::new(&world, &state);
    let v = integrator.integrate(&state, FreeVector::zero(), MoveInput::new(1, 0));
    assert_close(v, vec3(0.0, 0.0, 0.098 * 0.85), 1e-6);
}

#[test]
fn input_rotates_with_yaw() {
    let world = world_with_floor(BlockKind::Solid);
    let mut state = standing(V::LATEST);
    state.yaw = 90.0;
    let integrator = Integrator::new(&world, &state);
    let forward = integrator.integrate(&state, FreeVector::zero(), MoveInput::new(1, 0));
    assert_close(forward, vec3(-0.098, 0.0, 0.0), 1e-6);
    // Strafing left while facing west is moving south.
    let left = integrator.integrate(&state, FreeVector::zero(), MoveInput::new(0, 1));
    assert_close(left, vec3(0.0, 0.0, 0.098), 1e-6);
}

#[test]
fn diagonal_input_is_normalized() {
    let world = world_with_floor(BlockKind::Solid);
    let state = standing(V::LATEST);
    let integrator = Integrator::new(&world, &state);
    let v = integrator.integrate(&state, FreeVector::zero(), MoveInput::new(1, 1));
    assert!((v.length() - 0.1).abs() < 1e-6, "{v:?}");
    assert!((v.x - v.z).abs() < 1e-9);
}

#[test]
fn air_acceleration() {
    let world = world_with_floor(BlockKind::Air);
    let mut state = EntityPhysicsState::new(V::LATEST, point3(0.5, 10.0, 0.5));
    let integrator = Integrator::new(&world, &state);
    let walk = integrator.integrate(&state, FreeVector::zero(), MoveInput::new(1, 0));
    assert_close(walk, vec3(0.0, 0.0, 0.02 * 0.98), 1e-6);
    state.sprinting = true;
    let sprint = integrator.integrate(&state, FreeVector::zero(), MoveInput::new(1, 0));
    assert_close(sprint, vec3(0.0, 0.0, 0.026 * 0.98), 1e-6);
}

#[test]
fn levitation_and_slow_falling() {
    let world = world_with_floor(BlockKind::Air);
    let mut state = EntityPhysicsState::new(V::LATEST, point3(0.5, 10.0, 0.5));
    state.effects.levitation = Some(0);
    let integrator = Integrator::new(&world, &state);
    let v = integrator.carry_over(&state, vec3(0.0, -0.2, 0.0));
    assert_close(v, vec3(0.0, (-0.2 + 0.25 * 0.2) * VERTICAL_DRAG, 0.0), 1e-12);

    state.effects.levitation = None;
    state.effects.slow_falling = true;
    let v = integrator.carry_over(&state, vec3(0.0, -0.2, 0.0));
    assert_close(v, vec3(0.0, -0.21 * VERTICAL_DRAG, 0.0), 1e-12);
    // Rising, normal gravity applies.
    let v = integrator.carry_over(&state, vec3(0.0, 0.2, 0.0));
    assert_close(v, vec3(0.0, 0.12 * VERTICAL_DRAG, 0.0), 1e-12);
}

#[test]
fn no_gravity_uses_exact_drag() {
    let world = world_with_floor(BlockKind::Air);
    let mut state = EntityPhysicsState::new(V::LATEST, point3(0.5, 10.0, 0.5));
    state.no_gravity = true;
    let integrator = Integrator::new(&world, &state);
    let v = integrator.carry_over(&state, vec3(0.0, 0.5, 0.0));
    assert_eq!(v.y, 0.5 * 0.98);
    assert_ne!(v.y, 0.5 * VERTICAL_DRAG);
}

#[rstest]
#[case::modern(V::LATEST, vec3(0.08, -0.085, 0.0))]
#[case::legacy(V::V1_12, vec3(0.08, -0.1, 0.0))]
fn water_drag(#[case] version: ObserverVersion, #[case] expected: FreeVector) {
    let mut world = world_with_floor(BlockKind::Solid);
    world
        .fill(
            CubeRange::new(Cube::new(-1, 0, -1), Cube::new(1, 3, 1)),
            Block::new(BlockKind::Water),
        )
        .unwrap();
    let state = EntityPhysicsState::new(version, point3(0.5, 1.0, 0.5));
    let integrator = Integrator::new(&world, &state);
    assert_close(integrator.carry_over(&state, vec3(0.1, -0.1, 0.0)), expected, 1e-12);
}

#[test]
fn lava_drag() {
    let mut world = world_with_floor(BlockKind::Solid);
    world
        .fill(
            CubeRange::new(Cube::new(-1, 0, -1), Cube::new(1, 3, 1)),
            Block::new(BlockKind::Lava),
        )
        .unwrap();
    let state = EntityPhysicsState::new(V::LATEST, point3(0.5, 1.0, 0.5));
    let integrator = Integrator::new(&world, &state);
    assert_close(
        integrator.carry_over(&state, vec3(0.1, 0.0, 0.0)),
        vec3(0.05, -0.02, 0.0),
        1e-12,
    );
}

#[test]
fn small_components_are_dropped() {
    let world = world_with_floor(BlockKind::Air);
    let new = EntityPhysicsState::new(V::V1_9, point3(0.5, 10.0, 0.5));
    let old = EntityPhysicsState::new(V::V1_8, point3(0.5, 10.0, 0.5));
    let v = vec3(0.004, 0.002, -0.1);
    assert_eq!(Integrator::new(&world, &new).cutoff(v), vec3(0.004, 0.0, -0.1));
    assert_eq!(Integrator::new(&world, &old).cutoff(v), vec3(0.0, 0.0, -0.1));
}

#[test]
fn climbing_limits_speed() {
    let mut world = world_with_floor(BlockKind::Solid);
    world.set(Cube::new(0, 0, 0), Block::new(BlockKind::Ladder)).unwrap();
    let mut state = standing(V::LATEST);
    state.on_ground = false;
    let integrator = Integrator::new(&world, &state);
    assert!(integrator.climbing());

    let limit = f64::from(0.15_f32);
    let v = integrator.integrate(&state, vec3(0.3, -0.5, -0.3), MoveInput::NONE);
    assert_eq!(v, vec3(limit, -limit, -limit));
    state.sneaking = true;
    let v = integrator.integrate(&state, vec3(0.0, -0.5, 0.0), MoveInput::NONE);
    assert_eq!(v.y, 0.0);
}

#[test]
fn stuck_speed_scales_last() {
    let world = world_with_floor(BlockKind::Air);
    let mut state = EntityPhysicsState::new(V::LATEST, point3(0.5, 10.0, 0.5));
    state.stuck_speed = Some(vec3(0.25, 0.05, 0.25));
    let integrator = Integrator::new(&world, &state);
    let v = integrator.integrate(&state, vec3(0.4, -0.4, 0.0), MoveInput::NONE);
    assert_close(v, vec3(0.1, -0.02, 0.0), 1e-12);
}

#[test]
fn input_grid_is_complete() {
    let mut cells: Vec<(i8, i8)> = MoveInput::GRID
        .iter()
        .map(|input| (input.forward, input.strafe))
        .collect();
    assert_eq!(cells[0], (0, 0));
    cells.sort_unstable();
    cells.dedup();
    assert_eq!(cells.len(), 9);
}

// -------------------------------------------------------------------------------------------------

fn settle_after(
    world: &ChunkedWorld,
    state: &EntityPhysicsState,
    desired: FreeVector,
) -> Settled {
    let integrator = Integrator::new(world, state);
    let mut request = CollideRequest::new(state.version, state.aab(), desired);
    request.step_height = state.attributes.step_height;
    request.last_on_ground = state.on_ground;
    let collided = collide(world, &request, &mut CollisionScratch::new());
    integrator.settle(world, state, &collided, false, &mut Traversal::new())
}

#[test]
fn landing_stops_vertical_velocity() {
    let world = world_with_floor(BlockKind::Solid);
    let mut state = EntityPhysicsState::new(V::LATEST, point3(0.5, 0.5, 0.5));
    state.fall_distance = 2.0;
    let settled = settle_after(&world, &state, vec3(0.1, -1.0, 0.0));
    assert_close(settled.position.to_vector(), vec3(0.6, 0.0, 0.5), 1e-9);
    assert_eq!(settled.velocity, vec3(0.1, 0.0, 0.0));
    assert!(settled.on_ground);
    assert_eq!(settled.fall_distance, 0.0);
}

#[test]
fn falling_accumulates_distance() {
    let world = world_with_floor(BlockKind::Solid);
    let mut state = EntityPhysicsState::new(V::LATEST, point3(0.5, 5.0, 0.5));
    state.fall_distance = 1.0;
    let settled = settle_after(&world, &state, vec3(0.0, -0.5, 0.0));
    assert!(!settled.on_ground);
    assert_eq!(settled.velocity, vec3(0.0, -0.5, 0.0));
    assert_eq!(settled.fall_distance, 1.5);
}

#[test]
fn wall_stops_horizontal_velocity() {
    let mut world = world_with_floor(BlockKind::Solid);
    world
        .fill(
            CubeRange::new(Cube::new(1, 0, -2), Cube::new(1, 2, 2)),
            Block::new(BlockKind::Solid),
        )
        .unwrap();
    let state = standing(V::LATEST);
    let settled = settle_after(&world, &state, vec3(0.5, 0.0, 0.1));
    assert_eq!(settled.velocity.x, 0.0);
    assert_eq!(settled.velocity.z, 0.1);
}

#[rstest]
#[case::bounce(false, 0.5)]
#[case::sneaking(true, 0.0)]
fn slime_bounces(#[case] sneaking: bool, #[case] expected_y: FreeCoordinate) {
    let world = world_with_floor(BlockKind::SlimeBlock);
    let mut state = EntityPhysicsState::new(V::LATEST, point3(0.5, 0.25, 0.5));
    state.sneaking = sneaking;
    let settled = settle_after(&world, &state, vec3(0.0, -0.5, 0.0));
    assert!(settled.on_ground);
    assert_eq!(settled.velocity.y, expected_y);
}

#[test]
fn soul_sand_slows_after_moving() {
    let world = world_with_floor(BlockKind::SoulSand);
    let state = standing(V::LATEST);
    let settled = settle_after(&world, &state, vec3(0.1, 0.0, 0.0));
    assert_close(settled.velocity, vec3(0.04, 0.0, 0.0), 1e-7);
}

#[test]
fn climbing_into_wall_rises() {
    let mut world = world_with_floor(BlockKind::Solid);
    world.set(Cube::new(0, 0, 0), Block::new(BlockKind::Ladder)).unwrap();
    world.set(Cube::new(1, 0, 0), Block::new(BlockKind::Solid)).unwrap();
    world.set(Cube::new(1, 1, 0), Block::new(BlockKind::Solid)).unwrap();
    let state = standing(V::LATEST);
    let settled = settle_after(&world, &state, vec3(0.5, 0.0, 0.0));
    assert_eq!(settled.velocity.y, 0.2);
    assert_eq!(settled.fall_distance, 0.0);
}

#[test]
fn commit_shifts_history() {
    let mut state = standing(V::LATEST);
    state.uncertain_ticks = 2;
    state.pending_velocity = Some(ServerVelocity::Add(vec3(0.0, 1.0, 0.0)));
    let settled = Settled {
        position: point3(0.6, 0.0, 0.5),
        velocity: vec3(0.1, 0.0, 0.0),
        on_ground: false,
        fall_distance: 0.0,
        stuck_speed: None,
    };
    state.commit(&settled);
    assert_eq!(state.last_position, point3(0.5, 0.0, 0.5));
    assert_eq!(state.position, point3(0.6, 0.0, 0.5));
    assert!(state.last_on_ground);
    assert!(!state.on_ground);
    assert_eq!(state.pending_velocity, None);
    assert_eq!(state.uncertain_ticks, 1);
}

#[test]
fn teleport_resets_motion() {
    let mut state = standing(V::LATEST);
    state.last_velocity = vec3(1.0, 1.0, 1.0);
    state.teleport(point3(10.0, 64.0, 10.0), 10);
    assert_eq!(state.position, state.last_position);
    assert_eq!(state.last_velocity, FreeVector::zero());
    assert_eq!(state.uncertain_ticks, 10);
}
