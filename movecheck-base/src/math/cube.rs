use core::fmt;

#[cfg(not(any(feature = "std", test)))]
#[allow(unused_imports)]
use num_traits::float::FloatCore as _;

use crate::math::{Aab, Face6, FreeCoordinate, FreePoint, FreeVector, GridCoordinate, GridPoint, GridVector};
use crate::util::ConciseDebug;

/// Side length, in blocks, of a chunk column and of each of its sections.
pub const SECTION_SIZE: GridCoordinate = 16;

/// The position of a block, which occupies the unit cube extending in the positive
/// direction from these coordinates.
///
/// A cube includes its lower faces and excludes its upper faces, so every point
/// belongs to exactly one cube.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
#[allow(missing_docs, clippy::exhaustive_structs)]
pub struct Cube {
    pub x: GridCoordinate,
    pub y: GridCoordinate,
    pub z: GridCoordinate,
}

impl Cube {
    /// The block at the origin.
    pub const ORIGIN: Self = Self::new(0, 0, 0);

    #[allow(missing_docs)]
    #[inline]
    pub const fn new(x: GridCoordinate, y: GridCoordinate, z: GridCoordinate) -> Self {
        Self { x, y, z }
    }

    /// Returns the cube containing `point`, or [`None`] if any coordinate is NaN or
    /// outside the range of [`GridCoordinate`].
    ///
    /// ```
    /// # extern crate movecheck_base as movecheck;
    /// use movecheck::math::{Cube, FreePoint};
    ///
    /// assert_eq!(
    ///     Cube::containing(FreePoint::new(0.5, -0.25, 15.0)),
    ///     Some(Cube::new(0, -1, 15)),
    /// );
    /// ```
    #[inline]
    pub fn containing(point: FreePoint) -> Option<Self> {
        const RANGE: core::ops::Range<FreeCoordinate> =
            GridCoordinate::MIN as FreeCoordinate..GridCoordinate::MAX as FreeCoordinate + 1.0;
        if [point.x, point.y, point.z].iter().all(|c| RANGE.contains(c)) {
            Some(Self::new(
                point.x.floor() as GridCoordinate,
                point.y.floor() as GridCoordinate,
                point.z.floor() as GridCoordinate,
            ))
        } else {
            None
        }
    }

    /// The cube's most negative corner.
    #[inline]
    pub fn lower_bounds(self) -> GridPoint {
        self.into()
    }

    /// The cube's most negative corner, as an offset from the origin.
    #[inline]
    pub fn lower_bounds_f(self) -> FreeVector {
        FreeVector::new(self.x.into(), self.y.into(), self.z.into())
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn center(self) -> FreePoint {
        (self.lower_bounds_f() + FreeVector::splat(0.5)).to_point()
    }

    /// The volume this cube occupies.
    ///
    /// ```
    /// # extern crate movecheck_base as movecheck;
    /// use movecheck::math::{Aab, Cube};
    ///
    /// assert_eq!(Cube::new(3, -1, 0).aab(), Aab::new(3.0, 4.0, -1.0, 0.0, 0.0, 1.0));
    /// ```
    #[inline]
    pub fn aab(self) -> Aab {
        Aab::UNIT.translate(self.lower_bounds_f())
    }

    /// The coordinates of the chunk column containing this cube.
    #[inline]
    pub const fn column(self) -> (GridCoordinate, GridCoordinate) {
        (self.x >> 4, self.z >> 4)
    }

    /// The index of the section (16-block-tall slice of a column) containing this cube.
    #[inline]
    pub const fn section_y(self) -> GridCoordinate {
        self.y >> 4
    }

    /// The position of this cube within its section, each coordinate in `0..16`.
    #[inline]
    pub const fn within_section(self) -> [usize; 3] {
        [
            (self.x & 15) as usize,
            (self.y & 15) as usize,
            (self.z & 15) as usize,
        ]
    }
}

impl fmt::Debug for Cube {
    #[allow(clippy::missing_inline_in_public_items)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { x, y, z } = self;
        write!(f, "({x:+.3?}, {y:+.3?}, {z:+.3?})")
    }
}
impl manyfmt::Fmt<ConciseDebug> for Cube {
    #[allow(clippy::missing_inline_in_public_items)]
    #[mutants::skip]
    fn fmt(&self, f: &mut fmt::Formatter<'_>, _: &ConciseDebug) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

mod arithmetic {
    use super::*;
    use core::ops;

    impl ops::Add<GridVector> for Cube {
        type Output = Self;
        #[inline]
        fn add(self, rhs: GridVector) -> Self::Output {
            Self::from(self.lower_bounds() + rhs)
        }
    }

    impl ops::Add<Face6> for Cube {
        type Output = Self;
        #[inline]
        fn add(self, rhs: Face6) -> Self::Output {
            self + rhs.normal_vector()
        }
    }
}

mod conversion {
    use super::*;

    impl From<Cube> for [GridCoordinate; 3] {
        #[inline]
        fn from(Cube { x, y, z }: Cube) -> [GridCoordinate; 3] {
            [x, y, z]
        }
    }
    impl From<Cube> for GridPoint {
        #[inline]
        fn from(Cube { x, y, z }: Cube) -> GridPoint {
            GridPoint::new(x, y, z)
        }
    }

    impl From<[GridCoordinate; 3]> for Cube {
        #[inline]
        fn from([x, y, z]: [GridCoordinate; 3]) -> Self {
            Self { x, y, z }
        }
    }
    impl From<GridPoint> for Cube {
        #[inline]
        fn from(GridPoint { x, y, z, _unit }: GridPoint) -> Self {
            Self { x, y, z }
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// An inclusive box of cubes, from [`CubeRange::lower()`] to
/// [`CubeRange::upper_inclusive()`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct CubeRange {
    lower: Cube,
    upper: Cube,
}

impl CubeRange {
    /// Constructs a range from its two inclusive corners.
    ///
    /// If `upper` is less than `lower` on some axis, the range is empty.
    #[inline]
    pub const fn new(lower: Cube, upper_inclusive: Cube) -> Self {
        Self {
            lower,
            upper: upper_inclusive,
        }
    }

    /// The most negative cube in the range.
    #[inline]
    pub const fn lower(self) -> Cube {
        self.lower
    }

    /// The most positive cube in the range.
    #[inline]
    pub const fn upper_inclusive(self) -> Cube {
        self.upper
    }

    /// Returns whether the cube lies within this range.
    #[inline]
    pub fn contains(self, cube: Cube) -> bool {
        (self.lower.x..=self.upper.x).contains(&cube.x)
            && (self.lower.y..=self.upper.y).contains(&cube.y)
            && (self.lower.z..=self.upper.z).contains(&cube.z)
    }

    /// Iterates over every cube in the range, Y outermost and X innermost.
    #[inline]
    pub fn cubes(self) -> impl Iterator<Item = Cube> + Clone {
        let Self { lower, upper } = self;
        (lower.y..=upper.y).flat_map(move |y| {
            (lower.z..=upper.z)
                .flat_map(move |z| (lower.x..=upper.x).map(move |x| Cube::new(x, y, z)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use euclid::point3;

    #[test]
    fn containing() {
        assert_eq!(
            Cube::containing(point3(1.5, -2.0, -3.5)),
            Some(Cube::new(1, -2, -4))
        );
        assert_eq!(Cube::containing(point3(0.0, 3e9, 0.0)), None);
        assert_eq!(Cube::containing(point3(0.0, 0.0, FreeCoordinate::NAN)), None);
    }


    #[test]
    fn section_coordinates_of_negative_cube() {
        let cube = Cube::new(-1, -17, 33);
        assert_eq!(cube.column(), (-1, 2));
        assert_eq!(cube.section_y(), -2);
        assert_eq!(cube.within_section(), [15, 15, 1]);
    }

    #[test]
    fn range_iteration_order() {
        let range = CubeRange::new(Cube::new(0, 0, 0), Cube::new(1, 1, 0));
        assert_eq!(
            range.cubes().collect::<Vec<_>>(),
            vec![
                Cube::new(0, 0, 0),
                Cube::new(1, 0, 0),
                Cube::new(0, 1, 0),
                Cube::new(1, 1, 0),
            ]
        );
        assert!(range.contains(Cube::new(1, 1, 0)));
        assert!(!range.contains(Cube::new(1, 1, 1)));
    }

    #[test]
    fn empty_range() {
        let range = CubeRange::new(Cube::new(0, 0, 0), Cube::new(-1, 0, 0));
        assert_eq!(range.cubes().count(), 0);
    }
}
