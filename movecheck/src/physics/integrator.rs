use euclid::vec3;

use crate::block::BlockKind;
use crate::collision::Collided;
use crate::effects::{
    InsideBlocks, Medium, block_speed_factor, medium_at, on_climbable, supporting_cube,
};
use crate::math::{Cube, FreeCoordinate, FreeVector, table_cos, table_sin};
use crate::physics::{
    BASE_FRICTION, EntityPhysicsState, MoveInput, NO_GRAVITY_DRAG, Settled, VERTICAL_DRAG,
};
use crate::traverse::Traversal;
use crate::version::ObserverVersion;
use crate::world::WorldQuery;

use ObserverVersion as V;

/// From this version, velocity components smaller than 0.003 rather than 0.005 are
/// dropped at the start of each tick.
const SMALLER_CUTOFF: V = V::V1_9;
/// From this version, gravity in water is a sixteenth of normal gravity, and sprinting
/// (swimming) entities have less water drag and are not pulled down at all.
const SWIMMING: V = V::V1_13;
/// From this version, honey blocks halve jump height.
const JUMP_FACTOR: V = V::V1_15;
/// From this version, a jump too weak to matter is not performed at all.
const SKIP_NEGLIGIBLE_JUMP: V = V::V1_20_5;
/// From this version, jumping does not reduce an upward velocity the entity already has.
const JUMP_KEEPS_FASTER_RISE: V = V::V1_21_2;

/// Single-tick physics of one entity, sampled from the world at the start of the tick.
///
/// The velocity the entity carries into a tick is computed by [`Self::carry_over()`]:
/// (a) horizontal friction and (b) gravity with medium drag, using the conditions of
/// the previous tick. Then, for each input the player might have pressed,
/// [`Self::integrate()`] adds (c) input acceleration scaled by status effects, limits
/// climbing speed, and applies (d) the stuck-speed multiplier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Integrator {
    version: ObserverVersion,
    /// Medium at the previous tick's position.
    carry_medium: Medium,
    /// Horizontal friction for the carried-over velocity.
    carry_friction: f32,
    medium: Medium,
    on_ground: bool,
    /// Slipperiness of the block currently stood on.
    slipperiness: f32,
    jump_factor: f32,
    climbing: bool,
    stuck_speed: Option<FreeVector>,
}

impl Integrator {
    /// Samples the conditions affecting `state`'s next tick from `world`.
    pub fn new<W>(world: &W, state: &EntityPhysicsState) -> Self
    where
        W: WorldQuery + ?Sized,
    {
        let version = state.version;
        let kind_at = |cube| world.block_at(cube).kind;
        let support = |position| supporting_cube(version, position).map_or(BlockKind::Air, kind_at);

        let carry_friction = if state.last_on_ground {
            support(state.last_position).slipperiness() * BASE_FRICTION
        } else {
            BASE_FRICTION
        };

        let jump_factor = if version.since(JUMP_FACTOR) {
            let factor = |kind| if kind == BlockKind::HoneyBlock { 0.5 } else { 1.0 };
            let at_feet = Cube::containing(state.position).map_or(1.0, |c| factor(kind_at(c)));
            if at_feet == 1.0 {
                factor(support(state.position))
            } else {
                at_feet
            }
        } else {
            1.0
        };

        Self {
            version,
            carry_medium: medium_at(world, state.aab_at(state.last_position)),
            carry_friction,
            medium: medium_at(world, state.aab()),
            on_ground: state.on_ground,
            slipperiness: support(state.position).slipperiness(),
            jump_factor,
            climbing: on_climbable(world, version, state.position),
            stuck_speed: state.stuck_speed,
        }
    }

    /// The fluid the entity is in at the start of the tick.
    #[inline]
    pub fn medium(&self) -> Medium {
        self.medium
    }

    /// Whether the entity is on something climbable at the start of the tick.
    #[inline]
    pub fn climbing(&self) -> bool {
        self.climbing
    }

    /// Applies friction, gravity, and drag to `velocity`, the velocity the entity had
    /// at the end of the previous tick, giving the velocity it starts this tick with.
    #[must_use]
    pub fn carry_over(&self, state: &EntityPhysicsState, velocity: FreeVector) -> FreeVector {
        let gravity = state.gravity(velocity);
        match self.carry_medium {
            Medium::Water => {
                let horizontal = if state.sprinting && self.version.since(SWIMMING) {
                    0.9
                } else {
                    0.8
                };
                let mut v = vec3(velocity.x * horizontal, velocity.y * 0.8, velocity.z * horizontal);
                if self.version.since(SWIMMING) {
                    if gravity != 0.0 && !state.sprinting {
                        let sink = gravity / 16.0;
                        v.y = if velocity.y <= 0.0
                            && (v.y - 0.005).abs() >= 0.003
                            && (v.y - sink).abs() < 0.003
                        {
                            -0.003
                        } else {
                            v.y - sink
                        };
                    }
                } else if gravity != 0.0 {
                    v.y -= 0.02;
                }
                v
            }
            Medium::Lava => {
                let mut v = velocity * 0.5;
                v.y -= gravity / 4.0;
                v
            }
            Medium::Air => {
                let y = match state.levitation_target() {
                    Some(target) => velocity.y + (target - velocity.y) * 0.2,
                    None => velocity.y - gravity,
                };
                let friction = FreeCoordinate::from(self.carry_friction);
                let drag = if state.no_gravity {
                    NO_GRAVITY_DRAG
                } else {
                    VERTICAL_DRAG
                };
                vec3(velocity.x * friction, y * drag, velocity.z * friction)
            }
        }
    }

    /// Drops velocity components too small for the client to keep.
    #[must_use]
    pub fn cutoff(&self, velocity: FreeVector) -> FreeVector {
        let limit = if self.version.since(SMALLER_CUTOFF) {
            0.003
        } else {
            0.005
        };
        velocity.map(|c| if c.abs() < limit { 0.0 } else { c })
    }

    /// Returns `velocity` modified by a jump, or [`None`] if the entity cannot jump.
    ///
    /// In a fluid, jumping is a small upward push available at any time.
    pub fn jump(&self, state: &EntityPhysicsState, velocity: FreeVector) -> Option<FreeVector> {
        if self.medium != Medium::Air {
            return Some(velocity + vec3(0.0, f64::from(0.04_f32), 0.0));
        }
        if !state.on_ground {
            return None;
        }
        let power = state.jump_power(self.jump_factor);
        if self.version.since(SKIP_NEGLIGIBLE_JUMP) && power <= 1.0e-5 {
            return None;
        }
        let power = f64::from(power);
        let mut jumped = vec3(
            velocity.x,
            if self.version.since(JUMP_KEEPS_FASTER_RISE) {
                power.max(velocity.y)
            } else {
                power
            },
            velocity.z,
        );
        if state.sprinting {
            let yaw = state.yaw * (core::f32::consts::PI / 180.0);
            jumped.x -= f64::from(table_sin(yaw) * 0.2);
            jumped.z += f64::from(table_cos(yaw) * 0.2);
        }
        Some(jumped)
    }

    /// Adds the acceleration from `input` to `start`, then applies climbing limits and
    /// the stuck-speed multiplier, giving the movement the entity attempts this tick.
    #[must_use]
    pub fn integrate(
        &self,
        state: &EntityPhysicsState,
        start: FreeVector,
        input: MoveInput,
    ) -> FreeVector {
        let mut v = start + self.acceleration(state, input);

        if self.climbing {
            let limit = f64::from(0.15_f32);
            v.x = v.x.clamp(-limit, limit);
            v.z = v.z.clamp(-limit, limit);
            v.y = v.y.max(-limit);
            if v.y < 0.0 && state.sneaking {
                v.y = 0.0;
            }
        }

        if let Some(stuck) = self.stuck_speed {
            v = vec3(v.x * stuck.x, v.y * stuck.y, v.z * stuck.z);
        }
        v
    }

    /// Acceleration from input, rotated to world coordinates.
    fn acceleration(&self, state: &EntityPhysicsState, input: MoveInput) -> FreeVector {
        let speed: f32 = match self.medium {
            Medium::Water | Medium::Lava => 0.02,
            Medium::Air if self.on_ground => {
                let f = self.slipperiness;
                state.movement_speed() * (0.21600002 / (f * f * f))
            }
            Medium::Air if state.sprinting => 0.025999999,
            Medium::Air => 0.02,
        };

        let raw = input.scaled(state.sneaking);
        let length_squared = raw.square_length();
        if length_squared < 1.0e-7 {
            return FreeVector::zero();
        }
        let scaled = if length_squared > 1.0 {
            raw.normalize()
        } else {
            raw
        } * f64::from(speed);

        let yaw = state.yaw * (core::f32::consts::PI / 180.0);
        let sin = f64::from(table_sin(yaw));
        let cos = f64::from(table_cos(yaw));
        vec3(
            scaled.x * cos - scaled.z * sin,
            scaled.y,
            scaled.z * cos + scaled.x * sin,
        )
    }

    /// Computes what `state` becomes after moving as described by `collided`.
    ///
    /// `jumping` is whether the chosen input included jumping, which lets a climbing
    /// entity rise. `traversal` is scratch space for finding the blocks passed through.
    pub fn settle<W>(
        &self,
        world: &W,
        state: &EntityPhysicsState,
        collided: &Collided,
        jumping: bool,
        traversal: &mut Traversal,
    ) -> Settled
    where
        W: WorldQuery + ?Sized,
    {
        let version = self.version;
        let desired = collided.desired;
        let moved = collided.displacement;
        let position = state.position + moved;
        let on_ground = collided.on_ground();

        let mut v = if self.stuck_speed.is_some() {
            FreeVector::zero()
        } else {
            desired
        };
        if moved.x != desired.x {
            v.x = 0.0;
        }
        if moved.z != desired.z {
            v.z = 0.0;
        }

        let below = supporting_cube(version, position).map_or(BlockKind::Air, |c| world.block_at(c).kind);
        let on_slime = below == BlockKind::SlimeBlock && !state.sneaking;
        if collided.vertical_collision() {
            v.y = if on_slime && v.y < 0.0 { -v.y } else { 0.0 };
        }
        if on_ground && on_slime && v.y.abs() < 0.1 {
            let scale = 0.4 + v.y.abs() * 0.2;
            v.x *= scale;
            v.z *= scale;
        }

        let speed_factor = f64::from(block_speed_factor(world, version, position));
        v.x *= speed_factor;
        v.z *= speed_factor;

        let aab = state.aab_at(position);
        let inside = InsideBlocks::scan_path(
            world,
            version,
            aab,
            state.position,
            position,
            state.effects.weaving,
            traversal,
        );
        v = inside.apply_to_velocity(v, position, state.width, on_ground);

        let climbing = on_climbable(world, version, position);
        if climbing && (collided.horizontal_collision() || jumping) {
            v.y = 0.2;
        }

        let fall_distance = if on_ground
            || climbing
            || inside.medium != Medium::Air
            || inside.resets_fall_distance()
            || (state.effects.slow_falling && moved.y < 0.0)
        {
            0.0
        } else if moved.y < 0.0 {
            state.fall_distance - moved.y
        } else {
            state.fall_distance
        };

        Settled {
            position,
            velocity: v,
            on_ground,
            fall_distance,
            stuck_speed: inside.stuck_speed,
        }
    }
}
