//! Geometry: boxes, cubes, axes, faces, and the coordinate types they are built from.

#[cfg(not(any(feature = "std", test)))]
#[allow(unused_imports)]
use num_traits::float::FloatCore as _;

mod aab;
pub use aab::*;
mod axis;
pub use axis::*;
mod coord;
pub use coord::*;
mod cube;
pub use cube::*;
mod face;
pub use face::*;
mod trig;
pub use trig::*;

/// Distance within which two surfaces are considered to be touching rather than
/// overlapping or separated.
///
/// Collision clamps, ray clipping, and the block range of spatial queries all use this
/// same value, so changing it changes which movements are accepted.
pub const COLLISION_EPSILON: FreeCoordinate = 1.0e-7;

/// Returns −1, 0, or 1 according to the sign of `x`; both zeroes give 0.
#[inline]
pub fn signum_101(x: FreeCoordinate) -> GridCoordinate {
    if x == 0.0 {
        0
    } else {
        x.signum() as GridCoordinate
    }
}

/// Fractional part of `x`, always in `[0, 1)` (unlike [`f64::fract`], which keeps the
/// sign of the input).
#[inline]
pub fn frac(x: FreeCoordinate) -> FreeCoordinate {
    x - libm::floor(x)
}

/// Swaps `a` and `b` if `a > b`.
#[inline]
#[doc(hidden)]
pub fn sort_two<T: PartialOrd>(a: &mut T, b: &mut T) {
    if *a > *b {
        core::mem::swap(a, b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frac_of_negative_is_positive() {
        assert_eq!(frac(-0.25), 0.75);
        assert_eq!(frac(1.5), 0.5);
        assert_eq!(frac(-2.0), 0.0);
    }

    #[test]
    fn signum_101_zero() {
        assert_eq!(signum_101(0.0), 0);
        assert_eq!(signum_101(-0.0), 0);
        assert_eq!(signum_101(-3.5), -1);
        assert_eq!(signum_101(0.001), 1);
    }
}
