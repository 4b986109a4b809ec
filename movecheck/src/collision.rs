//! Collision of moving entity boxes with the world.
//!
//! Resolving one tick of movement happens in two phases:
//!
//! 1. [`collect_collision_boxes()`] gathers every block collision box near the path of
//!    the entity, plus the world border.
//! 2. [`collide()`] clamps the desired displacement against those boxes one axis at a
//!    time ([`collide_with_order()`]), trying several [`AxisOrder`]s and stepping up
//!    ledges where the entity is allowed to.
//!
//! [`AxisOrder`]: crate::math::AxisOrder

mod gather;
pub use gather::*;

mod resolve;
pub use resolve::*;

mod step_up;


/// A failure to resolve a movement under one axis order.
///
/// This is never returned to callers of [`collide()`]; the order is skipped instead
/// and the failure is logged.
#[derive(Clone, Copy, Debug, PartialEq, displaydoc::Display)]
#[non_exhaustive]
#[allow(clippy::module_name_repetitions)]
pub enum CollisionError {
    /// collision under {order} produced a non-finite displacement {displacement:?}
    Degenerate {
        /// The order which was being evaluated.
        order: crate::math::AxisOrder,
        /// The resulting displacement.
        displacement: crate::math::FreeVector,
    },
}

impl core::error::Error for CollisionError {}
