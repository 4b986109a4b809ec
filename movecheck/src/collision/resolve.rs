use euclid::vec3;
use manyfmt::Refmt as _;

use crate::collision::gather::gather_all;
use crate::collision::{CollisionError, Gathered, step_up};
use crate::math::{Aab, Axis, AxisOrder, FreeCoordinate, FreeVector};
use crate::util::ConciseDebug;
use crate::version::ObserverVersion;
use crate::world::WorldQuery;

/// Scores below this are considered an exact match, and no further axis orders are
/// tried.
const EXACT_SCORE: FreeCoordinate = 1e-5 * 1e-5;

/// Moves `aab` by `desired`, one axis at a time in the given `order`, stopping each
/// axis's movement where it would enter one of the `obstacles`.
///
/// Each axis is clamped against every obstacle, and the box is moved by the result
/// before the next axis is considered. Obstacles the box already overlaps do not stop
/// it. The magnitude of the result never exceeds that of `desired` on any axis.
///
/// ```
/// use movecheck::collision::collide_with_order;
/// use movecheck::math::{Aab, AxisOrder, FreeVector};
///
/// let floor = Aab::new(-5.0, 5.0, -1.0, 0.0, -5.0, 5.0);
/// let player = Aab::new(-0.3, 0.3, 0.5, 2.3, -0.3, 0.3);
/// assert_eq!(
///     collide_with_order(FreeVector::new(0.1, -1.0, 0.0), player, &[floor], AxisOrder::YXZ),
///     FreeVector::new(0.1, -0.5, 0.0),
/// );
/// ```
#[allow(clippy::missing_inline_in_public_items)]
pub fn collide_with_order(
    desired: FreeVector,
    aab: Aab,
    obstacles: &[Aab],
    order: AxisOrder,
) -> FreeVector {
    let mut moving = aab;
    let mut result = FreeVector::zero();
    for axis in order.axes() {
        let mut offset = desired[axis];
        if offset == 0.0 {
            continue;
        }
        for obstacle in obstacles {
            offset = obstacle.clip_axis_offset(axis, &moving, offset);
        }
        result[axis] = offset;
        let mut step = FreeVector::zero();
        step[axis] = offset;
        moving = moving.translate(step);
    }
    result
}

/// A movement to be resolved by [`collide()`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[non_exhaustive]
pub struct CollideRequest {
    /// The rules in effect.
    pub version: ObserverVersion,
    /// The entity's box before moving.
    pub aab: Aab,
    /// The displacement the entity would make if nothing were in the way.
    pub desired: FreeVector,
    /// How tall a ledge the entity may step up onto while moving horizontally.
    pub step_height: FreeCoordinate,
    /// Whether the entity was on the ground at the end of the previous tick.
    pub last_on_ground: bool,
    /// Whether the entity was moving downward during the previous tick.
    pub falling_last_tick: bool,
    /// Try all six axis orders instead of the two the client normally could have used.
    /// Needed when the client may have skipped a tick, since older clients resolved
    /// each such movement separately.
    pub all_orders: bool,
    /// The displacement that was actually observed. When known, the axis order whose
    /// result is closest to it is chosen.
    pub observed: Option<FreeVector>,
    /// Whether the client claimed to be on the ground. When known, axis orders whose
    /// result contradicts the claim are penalized.
    pub claimed_on_ground: Option<bool>,
}

impl CollideRequest {
    /// Constructs a request with no stepping and no observation.
    #[inline]
    pub fn new(version: ObserverVersion, aab: Aab, desired: FreeVector) -> Self {
        Self {
            version,
            aab,
            desired,
            step_height: 0.0,
            last_on_ground: false,
            falling_last_tick: false,
            all_orders: false,
            observed: None,
            claimed_on_ground: None,
        }
    }

    fn can_step(&self) -> bool {
        self.step_height > 0.0
            && (self.last_on_ground || self.desired.y < 0.0 || self.falling_last_tick)
    }

    /// The region in which obstacles may affect this movement.
    fn grab_volume(&self) -> Aab {
        let d = self.desired;
        if d.x == 0.0 && d.z == 0.0 {
            self.aab.expand_towards(vec3(0.0, d.y, 0.0))
        } else if self.can_step() {
            if d.y <= 0.0 {
                self.aab
                    .expand_towards(d)
                    .expand_towards(vec3(0.0, self.step_height, 0.0))
            } else {
                self.aab
                    .expand_towards(vec3(d.x, self.step_height.max(d.y), d.z))
            }
        } else {
            self.aab.expand_towards(d)
        }
    }

    /// The best result any order could give: the observed movement, limited to what the
    /// desired movement (plus stepping) could possibly achieve.
    fn ideal(&self) -> FreeVector {
        let d = self.desired;
        let target = self.observed.unwrap_or(d);
        let clamp = |value: FreeCoordinate, a: FreeCoordinate, b: FreeCoordinate| {
            value.clamp(a.min(b), a.max(b))
        };
        vec3(
            clamp(target.x, 0.0, d.x),
            clamp(target.y, d.y.min(0.0), self.step_height.max(d.y)),
            clamp(target.z, 0.0, d.z),
        )
    }

    /// Whether a movement ending in `result` would contradict the client's claim of
    /// being or not being on the ground.
    pub(super) fn contradicts_ground_claim(&self, result: FreeVector) -> bool {
        let Some(claimed) = self.claimed_on_ground else {
            return false;
        };
        if self.desired.y == 0.0 && result.y == 0.0 {
            // Resting exactly level; either claim is plausible.
            return false;
        }
        claimed != (self.desired.y < 0.0 && result.y != self.desired.y)
    }
}

/// Outcome of [`collide()`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[non_exhaustive]
pub struct Collided {
    /// The displacement requested.
    pub desired: FreeVector,
    /// The displacement actually achieved.
    pub displacement: FreeVector,
    /// The axis order which produced `displacement`.
    pub order: AxisOrder,
    /// Whether the entity stepped up a ledge.
    pub stepped: bool,
    /// Summary of the obstacles considered.
    pub gathered: Gathered,
}

impl Collided {
    fn unobstructed(desired: FreeVector) -> Self {
        Self {
            desired,
            displacement: desired,
            order: AxisOrder::YXZ,
            stepped: false,
            gathered: Gathered::default(),
        }
    }

    /// Whether the vertical movement was stopped.
    #[inline]
    pub fn vertical_collision(&self) -> bool {
        self.displacement.y != self.desired.y
    }

    /// Whether either horizontal movement was stopped.
    #[inline]
    pub fn horizontal_collision(&self) -> bool {
        self.displacement.x != self.desired.x || self.displacement.z != self.desired.z
    }

    /// Whether the entity landed on something.
    #[inline]
    pub fn on_ground(&self) -> bool {
        self.desired.y < 0.0 && self.vertical_collision()
    }
}

/// Reusable buffers for [`collide()`].
#[derive(Clone, Debug, Default)]
#[allow(clippy::module_name_repetitions)]
pub struct CollisionScratch {
    pub(crate) boxes: Vec<Aab>,
    pub(crate) step_boxes: Vec<Aab>,
    pub(crate) step_heights: Vec<f32>,
}

impl CollisionScratch {
    /// Constructs empty buffers.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets contents but keeps allocations.
    #[inline]
    pub fn clear(&mut self) {
        self.boxes.clear();
        self.step_boxes.clear();
        self.step_heights.clear();
    }
}

/// Resolves the movement described by `request` against the blocks of `world`.
///
/// Each permitted [`AxisOrder`] is tried, stepping up ledges where allowed, and the
/// result closest to the observed movement is returned. If no movement was observed,
/// the result closest to the desired movement is returned. Among equally close
/// results the one that moved along fewer axes wins, and then the one from the
/// earlier order.
///
/// If an order produces a non-finite result it is skipped; if all do, the entity does
/// not move.
#[allow(clippy::missing_inline_in_public_items)]
pub fn collide<W>(world: &W, request: &CollideRequest, scratch: &mut CollisionScratch) -> Collided
where
    W: WorldQuery + ?Sized,
{
    let desired = request.desired;
    if desired == FreeVector::zero() {
        return Collided::unobstructed(desired);
    }

    scratch.boxes.clear();
    let mut gathered = gather_all(
        world,
        request.version,
        request.aab,
        request.grab_volume(),
        &mut scratch.boxes,
    );

    let ideal = request.ideal();
    let orders: &[AxisOrder] = if request.all_orders {
        &AxisOrder::ALL
    } else {
        &AxisOrder::REDUCED
    };
    let still_axes = Axis::ALL.iter().filter(|&&axis| desired[axis] == 0.0).count();

    let mut best: Option<(FreeCoordinate, usize, Collided)> = None;
    for &order in orders {
        let mut displacement = collide_with_order(desired, request.aab, &scratch.boxes, order);
        let mut stepped = false;

        let moving_into_ground = request.last_on_ground
            || (displacement.y != desired.y && (desired.y < 0.0 || request.falling_last_tick));
        if request.step_height > 0.0
            && moving_into_ground
            && (displacement.x != desired.x || displacement.z != desired.z)
        {
            let (step, step_gathered) = step_up::step_up(
                world,
                request,
                order,
                displacement,
                &scratch.boxes,
                &mut scratch.step_boxes,
                &mut scratch.step_heights,
            );
            gathered = gathered.merge(step_gathered);
            if let Some(step) = step {
                displacement = step;
                stepped = true;
            }
        }

        if !(displacement.x.is_finite() && displacement.y.is_finite() && displacement.z.is_finite())
        {
            log::debug!(
                "skipping axis order: {}",
                CollisionError::Degenerate {
                    order,
                    displacement
                }
            );
            continue;
        }

        let mut score = (displacement - ideal).square_length();
        if request.contradicts_ground_claim(displacement) {
            score += 1.0;
        }
        let moved_axes = Axis::ALL
            .iter()
            .filter(|&&axis| displacement[axis] != 0.0)
            .count();
        log::trace!(
            "order {order} gave {:?} with score {score}",
            displacement.refmt(&ConciseDebug)
        );

        let better = match best {
            None => true,
            Some((best_score, best_moved, _)) => {
                score < best_score || (score == best_score && moved_axes < best_moved)
            }
        };
        if better {
            best = Some((
                score,
                moved_axes,
                Collided {
                    desired,
                    displacement,
                    order,
                    stepped,
                    gathered,
                },
            ));
            if score < EXACT_SCORE {
                break;
            }
        }
        if still_axes >= 2 {
            // Only one axis moves, so the order cannot matter.
            break;
        }
    }

    match best {
        Some((_, _, mut collided)) => {
            collided.gathered = gathered;
            collided
        }
        None => Collided {
            desired,
            displacement: FreeVector::zero(),
            order: AxisOrder::YXZ,
            stepped: false,
            gathered,
        },
    }
}

