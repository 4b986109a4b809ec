//! Per-tick physics of a moving entity, before and after collision.
//!
//! An [`EntityPhysicsState`] is what is remembered about an entity between ticks. At
//! the start of a tick an [`Integrator`] is built from it and the world; the
//! [`predict`](crate::predict) module then uses the integrator to compute each
//! candidate's velocity before collision, and to settle the velocity that is carried
//! over to the next tick after collision.

use euclid::vec3;

use crate::math::{Aab, FreeCoordinate, FreePoint, FreeVector};
use crate::version::ObserverVersion;

mod integrator;
pub use integrator::*;

#[cfg(test)]
mod tests;

/// Vertical acceleration due to gravity, in blocks per tick squared.
pub const GRAVITY: FreeCoordinate = 0.08;

/// Gravity while descending under the slow falling effect.
pub const SLOW_FALLING_GRAVITY: FreeCoordinate = 0.01;

/// Fraction of vertical velocity kept per tick in air.
///
/// This is `0.98_f32` widened to `f64`, which is what clients multiply by; it differs
/// from `0.98` in the ninth decimal place. Entities without gravity use the exact
/// [`NO_GRAVITY_DRAG`] instead.
pub const VERTICAL_DRAG: FreeCoordinate = 0.9800000190734863;

/// Fraction of vertical velocity kept per tick in air by entities without gravity.
pub const NO_GRAVITY_DRAG: FreeCoordinate = 0.98;

/// Multiplier applied to the surface friction of the block being stood on, and the
/// whole horizontal friction when not on the ground.
pub const BASE_FRICTION: f32 = 0.91;

/// Status effects which alter movement, with their amplifiers.
///
/// An amplifier of 0 is level I of the effect.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub struct StatusEffects {
    #[allow(missing_docs)]
    pub speed: Option<u8>,
    #[allow(missing_docs)]
    pub slowness: Option<u8>,
    #[allow(missing_docs)]
    pub jump_boost: Option<u8>,
    #[allow(missing_docs)]
    pub levitation: Option<u8>,
    #[allow(missing_docs)]
    pub slow_falling: bool,
    /// Makes cobwebs less sticky.
    pub weaving: bool,
}

impl StatusEffects {
    /// No effects.
    pub const NONE: Self = Self {
        speed: None,
        slowness: None,
        jump_boost: None,
        levitation: None,
        slow_falling: false,
        weaving: false,
    };
}

/// Level (amplifier plus one) of an effect, or 0 if absent.
fn level(amplifier: Option<u8>) -> u16 {
    amplifier.map_or(0, |a| u16::from(a) + 1)
}

/// Attribute values which scale movement.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub struct Attributes {
    /// Base walking speed, before effects and sprinting.
    pub movement_speed: FreeCoordinate,
    /// Vertical velocity of a jump, before jump boost and block jump factors.
    pub jump_strength: FreeCoordinate,
    /// How tall a ledge the entity may walk up without jumping.
    pub step_height: FreeCoordinate,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            movement_speed: 0.1,
            jump_strength: 0.42,
            step_height: 0.6,
        }
    }
}

/// A velocity the server told the client to take on.
#[expect(clippy::exhaustive_enums)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ServerVelocity {
    /// Replaces the entity's velocity; sent for knockback.
    Replace(FreeVector),
    /// Adds to the entity's velocity; sent for explosions.
    Add(FreeVector),
}

/// Everything remembered about an entity's movement between ticks.
///
/// The host updates the descriptive fields (effects, attributes, flags, dimensions) as
/// it learns about changes; the engine updates the rest after each prediction.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct EntityPhysicsState {
    /// The rules the entity's client follows.
    pub version: ObserverVersion,
    /// Position of the bottom center of the entity's box, at the end of the last tick.
    pub position: FreePoint,
    /// Position one tick before [`Self::position`].
    pub last_position: FreePoint,
    /// Velocity at the end of the last tick, after collision and block effects but
    /// before friction and gravity.
    pub last_velocity: FreeVector,
    /// Facing, in degrees; 0 is south (+Z), 90 is west (−X).
    pub yaw: f32,
    #[allow(missing_docs)]
    pub pitch: f32,
    /// Whether the entity ended the last tick standing on something.
    pub on_ground: bool,
    /// [`Self::on_ground`] as of one tick earlier.
    pub last_on_ground: bool,
    /// What the client claimed for [`Self::on_ground`] in its latest movement.
    pub claimed_on_ground: bool,
    /// Distance fallen since last on the ground or in a fluid.
    pub fall_distance: FreeCoordinate,
    #[allow(missing_docs)]
    pub effects: StatusEffects,
    /// Multiplier for the next tick's movement, if the entity is in a cobweb or similar.
    pub stuck_speed: Option<FreeVector>,
    /// Horizontal size of the entity's box.
    pub width: FreeCoordinate,
    /// Vertical size of the entity's box.
    pub height: FreeCoordinate,
    #[allow(missing_docs)]
    pub attributes: Attributes,
    #[allow(missing_docs)]
    pub sprinting: bool,
    #[allow(missing_docs)]
    pub sneaking: bool,
    /// Creative or spectator flight; movement is not predicted while flying.
    pub flying: bool,
    #[allow(missing_docs)]
    pub no_gravity: bool,
    /// A velocity from the server which the client may have applied this tick.
    pub pending_velocity: Option<ServerVelocity>,
    /// Whether the client may have skipped sending a tick, so that the observed movement
    /// may span more than one.
    pub possible_skipped_tick: bool,
    /// Remaining ticks during which extra tolerance is granted, after a teleport or a
    /// server velocity.
    pub uncertain_ticks: u32,
}

impl EntityPhysicsState {
    /// A standing player-sized entity at `position`, at rest.
    pub fn new(version: ObserverVersion, position: FreePoint) -> Self {
        Self {
            version,
            position,
            last_position: position,
            last_velocity: FreeVector::zero(),
            yaw: 0.0,
            pitch: 0.0,
            on_ground: false,
            last_on_ground: false,
            claimed_on_ground: false,
            fall_distance: 0.0,
            effects: StatusEffects::NONE,
            stuck_speed: None,
            width: 0.6,
            height: 1.8,
            attributes: Attributes::default(),
            sprinting: false,
            sneaking: false,
            flying: false,
            no_gravity: false,
            pending_velocity: None,
            possible_skipped_tick: false,
            uncertain_ticks: 0,
        }
    }

    /// Returns the entity's box at its current position.
    ///
    /// Panics if the position or dimensions are not finite.
    pub fn aab(&self) -> Aab {
        self.aab_at(self.position)
    }

    /// Returns the box the entity would have if its bottom center were at `position`.
    ///
    /// Panics if the position or dimensions are not finite.
    pub fn aab_at(&self, position: FreePoint) -> Aab {
        let half = self.width / 2.0;
        Aab::new(
            position.x - half,
            position.x + half,
            position.y,
            position.y + self.height,
            position.z - half,
            position.z + half,
        )
    }

    /// Whether the position, velocity, fall distance, and size are all finite, as they
    /// must be for [`Self::aab()`] not to panic.
    pub fn is_finite(&self) -> bool {
        let EntityPhysicsState {
            position,
            last_position,
            last_velocity,
            fall_distance,
            width,
            height,
            ..
        } = *self;
        [position.to_vector(), last_position.to_vector(), last_velocity]
            .iter()
            .all(|v| v.x.is_finite() && v.y.is_finite() && v.z.is_finite())
            && [fall_distance, width, height].iter().all(|c| c.is_finite())
            && width >= 0.0
            && height >= 0.0
    }

    /// Moves the entity without any movement physics, as the server does when
    /// teleporting it, and grants `uncertain_ticks` ticks of extra tolerance.
    pub fn teleport(&mut self, position: FreePoint, uncertain_ticks: u32) {
        self.position = position;
        self.last_position = position;
        self.last_velocity = FreeVector::zero();
        self.fall_distance = 0.0;
        self.pending_velocity = None;
        self.uncertain_ticks = self.uncertain_ticks.max(uncertain_ticks);
    }

    /// Records a velocity sent by the server, and grants `uncertain_ticks` ticks of
    /// extra tolerance.
    pub fn receive_velocity(&mut self, velocity: ServerVelocity, uncertain_ticks: u32) {
        self.pending_velocity = Some(velocity);
        self.uncertain_ticks = self.uncertain_ticks.max(uncertain_ticks);
    }

    /// Records the outcome of a tick of movement.
    pub fn commit(&mut self, settled: &Settled) {
        self.last_position = self.position;
        self.position = settled.position;
        self.last_velocity = settled.velocity;
        self.last_on_ground = self.on_ground;
        self.on_ground = settled.on_ground;
        self.fall_distance = settled.fall_distance;
        self.stuck_speed = settled.stuck_speed;
        self.pending_velocity = None;
        self.possible_skipped_tick = false;
        self.uncertain_ticks = self.uncertain_ticks.saturating_sub(1);
    }

    /// Records a tick of movement which was not simulated, taking the observed
    /// displacement and the claimed ground state as fact.
    pub fn follow(&mut self, observed: FreeVector) {
        let fall_distance = if self.claimed_on_ground || observed.y >= 0.0 {
            0.0
        } else {
            self.fall_distance - observed.y
        };
        self.commit(&Settled {
            position: self.position + observed,
            velocity: observed,
            on_ground: self.claimed_on_ground,
            fall_distance,
            stuck_speed: None,
        });
    }

    /// Walking speed with status effects and sprinting applied.
    pub fn movement_speed(&self) -> f32 {
        let mut speed = self.attributes.movement_speed;
        speed *= 1.0 + 0.2 * f64::from(level(self.effects.speed));
        speed *= (1.0 - 0.15 * f64::from(level(self.effects.slowness))).max(0.0);
        if self.sprinting {
            speed *= 1.3;
        }
        speed as f32
    }

    /// Vertical velocity gained by jumping, before block jump factors.
    pub(crate) fn jump_power(&self, block_factor: f32) -> f32 {
        self.attributes.jump_strength as f32 * block_factor
            + 0.1 * f32::from(level(self.effects.jump_boost))
    }

    /// Extra distance the entity may fall without taking damage: one block per level
    /// of jump boost.
    pub(crate) fn safe_fall_bonus(&self) -> FreeCoordinate {
        FreeCoordinate::from(level(self.effects.jump_boost))
    }

    /// Gravity for the coming tick, given the velocity it starts with.
    pub(crate) fn gravity(&self, velocity: FreeVector) -> FreeCoordinate {
        if self.no_gravity {
            0.0
        } else if self.effects.slow_falling && velocity.y <= 0.0 {
            SLOW_FALLING_GRAVITY
        } else {
            GRAVITY
        }
    }

    /// Vertical velocity to which levitation pulls the entity, if it is levitating.
    pub(crate) fn levitation_target(&self) -> Option<FreeCoordinate> {
        self.effects
            .levitation
            .map(|a| 0.05 * FreeCoordinate::from(level(Some(a))))
    }
}

/// What an entity's state becomes after a tick of movement; produced by
/// [`Integrator::settle()`] and recorded with [`EntityPhysicsState::commit()`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[non_exhaustive]
pub struct Settled {
    /// Position after moving.
    pub position: FreePoint,
    /// Velocity carried over to the next tick.
    pub velocity: FreeVector,
    #[allow(missing_docs)]
    pub on_ground: bool,
    #[allow(missing_docs)]
    pub fall_distance: FreeCoordinate,
    /// Stuck-speed multiplier for the next tick.
    pub stuck_speed: Option<FreeVector>,
}

/// Horizontal input a player may have been pressing, each component −1, 0, or 1.
///
/// `forward` is along the facing direction and `strafe` is to the left of it.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub struct MoveInput {
    #[allow(missing_docs)]
    pub forward: i8,
    #[allow(missing_docs)]
    pub strafe: i8,
}

impl MoveInput {
    /// No keys pressed.
    pub const NONE: Self = Self {
        forward: 0,
        strafe: 0,
    };

    /// The nine combinations of forward and strafe input, with no input first and
    /// then forward, sideways, and backward input.
    pub const GRID: [Self; 9] = [
        Self::NONE,
        Self::new(1, 0),
        Self::new(1, 1),
        Self::new(1, -1),
        Self::new(0, 1),
        Self::new(0, -1),
        Self::new(-1, 0),
        Self::new(-1, 1),
        Self::new(-1, -1),
    ];

    /// Constructs an input, clamping each component to −1..=1.
    pub const fn new(forward: i8, strafe: i8) -> Self {
        Self {
            forward: clamp_unit(forward),
            strafe: clamp_unit(strafe),
        }
    }

    #[allow(missing_docs)]
    pub const fn is_none(self) -> bool {
        self.forward == 0 && self.strafe == 0
    }

    /// The input as the client scales it: sneaking slows it, and it is always reduced
    /// by 2%.
    pub(crate) fn scaled(self, sneaking: bool) -> FreeVector {
        let sneak: f32 = if sneaking { 0.3 } else { 1.0 };
        let component = |c: i8| f64::from(f32::from(c) * sneak * 0.98);
        vec3(component(self.strafe), 0.0, component(self.forward))
    }
}

const fn clamp_unit(value: i8) -> i8 {
    if value < -1 {
        -1
    } else if value > 1 {
        1
    } else {
        value
    }
}
