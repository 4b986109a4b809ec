//! Stepping up onto ledges while moving horizontally.
//!
//! Two algorithms exist. Older clients retry the movement raised by the full step
//! height and then settle back down; newer clients instead try each height at which
//! some nearby box has a top or bottom face, lowest first.

use euclid::vec3;

use crate::collision::gather::gather_all;
use crate::collision::{CollideRequest, Gathered, collide_with_order};
use crate::math::{Aab, Axis, AxisOrder, FreeVector, horizontal_length_squared};
use crate::version::ObserverVersion;
use crate::world::WorldQuery;

/// Clients from this version on use the candidate-height algorithm.
const CANDIDATE_HEIGHTS: ObserverVersion = ObserverVersion::V1_21;

/// Clients from this version on also try rising before moving horizontally.
const RISE_FIRST: ObserverVersion = ObserverVersion::V1_8;

/// Clients from this version on include the desired vertical movement when settling
/// back down after a step.
const SETTLE_WITH_DESIRED: ObserverVersion = ObserverVersion::V1_14;

/// Tries to step up, given that resolving `request` under `order` without stepping
/// gave `collided`.
///
/// Returns the stepped displacement if it goes further horizontally than `collided`,
/// and a summary of any additional obstacles gathered.
pub(super) fn step_up<W>(
    world: &W,
    request: &CollideRequest,
    order: AxisOrder,
    collided: FreeVector,
    boxes: &[Aab],
    step_boxes: &mut Vec<Aab>,
    heights: &mut Vec<f32>,
) -> (Option<FreeVector>, Gathered)
where
    W: WorldQuery + ?Sized,
{
    if request.version.since(CANDIDATE_HEIGHTS) {
        by_candidate_heights(world, request, order, collided, step_boxes, heights)
    } else {
        (
            by_full_height(request, order, collided, boxes),
            Gathered::default(),
        )
    }
}

fn by_candidate_heights<W>(
    world: &W,
    request: &CollideRequest,
    order: AxisOrder,
    collided: FreeVector,
    step_boxes: &mut Vec<Aab>,
    heights: &mut Vec<f32>,
) -> (Option<FreeVector>, Gathered)
where
    W: WorldQuery + ?Sized,
{
    let desired = request.desired;
    let step = request.step_height;
    let vertical_collision = collided.y != desired.y;

    let start = if vertical_collision {
        request.aab.translate(vec3(0.0, collided.y, 0.0))
    } else {
        request.aab
    };
    let mut sweep = start.expand_towards(vec3(desired.x, step, desired.z));
    if !vertical_collision {
        sweep = sweep.expand_towards(vec3(0.0, f64::from(-1.0e-5_f32), 0.0));
    }

    step_boxes.clear();
    let gathered = gather_all(world, request.version, start, sweep, step_boxes);

    // Heights are compared in single precision, as the client does.
    let current = collided.y as f32;
    let max = step as f32;
    let floor = start.lower(Axis::Y);
    heights.clear();
    for obstacle in step_boxes.iter() {
        for y in obstacle.y_points() {
            let h = (y - floor) as f32;
            if (0.0..=max).contains(&h) && h != current && !heights.contains(&h) {
                heights.push(h);
            }
        }
    }
    heights.sort_unstable_by(f32::total_cmp);

    let reached = horizontal_length_squared(collided);
    for &h in heights.iter() {
        let attempt = collide_with_order(
            vec3(desired.x, f64::from(h), desired.z),
            start,
            step_boxes,
            order,
        );
        if horizontal_length_squared(attempt) > reached {
            let lowered = request.aab.lower(Axis::Y) - floor;
            return (Some(attempt - vec3(0.0, lowered, 0.0)), gathered);
        }
    }
    (None, gathered)
}

fn by_full_height(
    request: &CollideRequest,
    order: AxisOrder,
    collided: FreeVector,
    boxes: &[Aab],
) -> Option<FreeVector> {
    let desired = request.desired;
    let step = request.step_height;
    let aab = request.aab;

    let mut stepped = collide_with_order(vec3(desired.x, step, desired.z), aab, boxes, order);

    if request.version.since(RISE_FIRST) {
        let rise = collide_with_order(
            vec3(0.0, step, 0.0),
            aab.expand_towards(vec3(desired.x, 0.0, desired.z)),
            boxes,
            order,
        );
        if rise.y < step {
            let risen = collide_with_order(
                vec3(desired.x, 0.0, desired.z),
                aab.translate(vec3(0.0, rise.y, 0.0)),
                boxes,
                order,
            ) + rise;
            if horizontal_length_squared(risen) > horizontal_length_squared(stepped) {
                stepped = risen;
            }
        }
    }

    if horizontal_length_squared(stepped) <= horizontal_length_squared(collided) {
        return None;
    }
    let settle = -stepped.y
        + if request.version.since(SETTLE_WITH_DESIRED) {
            desired.y
        } else {
            0.0
        };
    let settled = collide_with_order(vec3(0.0, settle, 0.0), aab.translate(stepped), boxes, order);
    Some(stepped + settled)
}
