//! Geometry of fences, panes, walls, and fence gates, whose shape depends on which
//! neighbors they connect to.
//!
//! The block state records the connected sides; the host derives them from the
//! neighboring blocks, and this module does not look at neighbors itself.

use crate::block::{BlockKind, BlockState};
use crate::hitbox::fixtures::px;
use crate::hitbox::{HitboxCatalog, HitboxQuery, HitboxRule, Shape};
use crate::math::{Aab, Face6, FreeCoordinate};

use BlockKind as K;
use HitboxRule::Dynamic;

/// Height of the collision shape of fences, walls, and closed fence gates, in pixels.
const BARRIER_HEIGHT: FreeCoordinate = 24.;

pub(super) fn register(catalog: &mut HitboxCatalog) {
    catalog.hitbox(&[K::Fence], Dynamic(|q| fence(q.state, 16.)));
    catalog.collision(&[K::Fence], Dynamic(|q| fence(q.state, BARRIER_HEIGHT)));
    catalog.hitbox(&[K::Pane], Dynamic(pane));
    catalog.hitbox(&[K::Wall], Dynamic(|q| wall(q.state, None)));
    catalog.collision(&[K::Wall], Dynamic(|q| wall(q.state, Some(BARRIER_HEIGHT))));
    catalog.hitbox(&[K::FenceGate], Dynamic(fence_gate));
    catalog.collision(&[K::FenceGate], Dynamic(fence_gate_collision));
}

/// A center post of the given half-width, plus an arm of the given half-width towards
/// each connected horizontal side.
fn cross(
    state: BlockState,
    post_half_width: FreeCoordinate,
    arm_half_width: FreeCoordinate,
    post_height: Option<FreeCoordinate>,
    arm_height: impl Fn(Face6) -> FreeCoordinate,
) -> Shape {
    let p0 = 8. - post_half_width;
    let p1 = 8. + post_half_width;
    let a0 = 8. - arm_half_width;
    let a1 = 8. + arm_half_width;

    let mut shape = match post_height {
        Some(h) => Shape::Single(px(p0, 0., p0, p1, h, p1)),
        None => Shape::Empty,
    };
    for side in Face6::HORIZONTAL {
        if !state.faces.contains(side) {
            continue;
        }
        let h = arm_height(side);
        let arm: Aab = match side {
            Face6::NORTH => px(a0, 0., 0., a1, h, a1),
            Face6::SOUTH => px(a0, 0., a0, a1, h, 16.),
            Face6::WEST => px(0., 0., a0, a1, h, a1),
            _ => px(a0, 0., a0, 16., h, a1),
        };
        shape = shape.with(arm);
    }
    shape
}

fn fence(state: BlockState, height: FreeCoordinate) -> Shape {
    cross(state, 2., 2., Some(height), |_| height)
}

fn pane(q: &HitboxQuery) -> Shape {
    cross(q.state, 1., 1., Some(16.), |_| 16.)
}

/// Walls have a post only when [`Face6::UP`] is in the state's faces, and arms that are
/// either low or tall.
fn wall(state: BlockState, collision_height: Option<FreeCoordinate>) -> Shape {
    let post = state
        .faces
        .contains(Face6::UP)
        .then_some(collision_height.unwrap_or(16.));
    let shape = cross(state, 4., 3., post, |side| {
        collision_height.unwrap_or(if state.tall_sides.contains(side) {
            16.
        } else {
            14.
        })
    });
    // An isolated wall is always drawn with its post.
    if shape.is_empty() {
        Shape::Single(px(4., 0., 4., 12., collision_height.unwrap_or(16.), 12.))
    } else {
        shape
    }
}

fn gate_box(state: BlockState, height: FreeCoordinate) -> Shape {
    if matches!(state.facing, Face6::EAST | Face6::WEST) {
        Shape::pixels(6., 0., 0., 10., height, 16.)
    } else {
        Shape::pixels(0., 0., 6., 16., height, 10.)
    }
}

fn fence_gate(q: &HitboxQuery) -> Shape {
    gate_box(q.state, if q.state.in_wall { 13. } else { 16. })
}

fn fence_gate_collision(q: &HitboxQuery) -> Shape {
    if q.state.open {
        Shape::Empty
    } else {
        gate_box(q.state, BARRIER_HEIGHT)
    }
}
