//! Numeric types used for coordinates and related quantities.

use euclid::{Point3D, Vector3D};

use crate::math::Cube;

/// Coordinates that are locked to the block grid.
pub type GridCoordinate = i32;

/// Positions that are locked to the block grid.
pub type GridPoint = Point3D<GridCoordinate, Cube>;

/// Vectors that are locked to the block grid.
pub type GridVector = Vector3D<GridCoordinate, Cube>;

/// Coordinates that are not locked to the block grid.
///
/// Note: Because `GridCoordinate = i32` and `FreeCoordinate = f64`, which has
/// more than 32 bits of mantissa, the infallible conversion
/// `From<GridCoordinate> for FreeCoordinate` exists, which is often convenient.
pub type FreeCoordinate = f64;

/// Positions that are not locked to the block grid but may interact with it.
pub type FreePoint = Point3D<FreeCoordinate, Cube>;

/// Vectors that are not locked to the block grid but may interact with it.
///
/// Velocities are expressed in blocks per tick.
pub type FreeVector = Vector3D<FreeCoordinate, Cube>;

/// Squared length of the horizontal (X and Z) components of a vector.
#[inline]
pub fn horizontal_length_squared(v: FreeVector) -> FreeCoordinate {
    v.x * v.x + v.z * v.z
}
