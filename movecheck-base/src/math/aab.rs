use core::fmt;

use euclid::{Point3D, Size3D, Vector3D};

#[cfg(not(any(feature = "std", test)))]
#[allow(unused_imports)]
use num_traits::float::FloatCore as _;

use crate::math::{
    Axis, COLLISION_EPSILON, Cube, CubeRange, FreeCoordinate, FreePoint, FreeVector,
    GridCoordinate, sort_two,
};

/// An axis-aligned box, used for entity bounding boxes and the parts of block shapes.
///
/// The bounds are never NaN and never misordered; every constructor checks this.
/// A box with zero size on some axis is valid and is used, for example, for the
/// infinitely tall but zero-thickness walls of the world border.
#[derive(Copy, Clone, PartialEq)]
pub struct Aab {
    lower_bounds: FreePoint,
    upper_bounds: FreePoint,
}

impl Aab {
    /// A box of zero size at the origin.
    pub const ZERO: Aab = Aab {
        lower_bounds: Point3D::new(0., 0., 0.),
        upper_bounds: Point3D::new(0., 0., 0.),
    };

    /// The unit cube with its lower corner at the origin; the shape of an ordinary
    /// full block.
    pub const UNIT: Aab = Aab {
        lower_bounds: Point3D::new(0., 0., 0.),
        upper_bounds: Point3D::new(1., 1., 1.),
    };

    /// Constructs a box from its bounds, grouped by axis: lower X, upper X, lower Y, and so
    /// on.
    ///
    /// Panics if a lower bound is greater than its upper bound, or any bound is NaN.
    #[inline]
    #[track_caller]
    pub fn new(
        lx: FreeCoordinate,
        hx: FreeCoordinate,
        ly: FreeCoordinate,
        hy: FreeCoordinate,
        lz: FreeCoordinate,
        hz: FreeCoordinate,
    ) -> Self {
        Self::from_lower_upper(Point3D::new(lx, ly, lz), Point3D::new(hx, hy, hz))
    }

    /// Constructs an [`Aab`] from two corners given as `(x, y, z, x, y, z)`.
    ///
    /// Unlike [`Aab::new()`], the corners may be given in either order on each axis;
    /// they are sorted. This matches how block geometry tables are usually written.
    #[inline]
    #[track_caller]
    pub fn from_corners(
        mut x1: FreeCoordinate,
        mut y1: FreeCoordinate,
        mut z1: FreeCoordinate,
        mut x2: FreeCoordinate,
        mut y2: FreeCoordinate,
        mut z2: FreeCoordinate,
    ) -> Self {
        sort_two(&mut x1, &mut x2);
        sort_two(&mut y1, &mut y2);
        sort_two(&mut z1, &mut z2);
        Self::new(x1, x2, y1, y2, z1, z2)
    }

    /// Constructs an [`Aab`] from two corners given in sixteenths of a block
    /// (“pixels”), as `(x, y, z, x, y, z)`.
    ///
    /// ```
    /// # extern crate movecheck_base as movecheck;
    /// use movecheck::math::Aab;
    ///
    /// assert_eq!(
    ///     Aab::pixels(0.0, 0.0, 0.0, 16.0, 8.0, 16.0),
    ///     Aab::new(0.0, 1.0, 0.0, 0.5, 0.0, 1.0),
    /// );
    /// ```
    #[inline]
    #[track_caller]
    pub fn pixels(
        x1: FreeCoordinate,
        y1: FreeCoordinate,
        z1: FreeCoordinate,
        x2: FreeCoordinate,
        y2: FreeCoordinate,
        z2: FreeCoordinate,
    ) -> Self {
        Self::from_corners(
            x1 / 16.0,
            y1 / 16.0,
            z1 / 16.0,
            x2 / 16.0,
            y2 / 16.0,
            z2 / 16.0,
        )
    }

    /// Constructs a box from its lower and upper corners.
    ///
    /// Panics under the same conditions as [`Aab::new()`].
    #[inline]
    #[track_caller]
    pub fn from_lower_upper(lower: impl Into<FreePoint>, upper: impl Into<FreePoint>) -> Self {
        let (lower, upper) = (lower.into(), upper.into());
        Self::checked_from_lower_upper(lower, upper)
            .unwrap_or_else(|| panic!("box bounds misordered or NaN: {lower:?} to {upper:?}"))
    }

    /// Constructs a box from its lower and upper corners, or returns [`None`] if a lower
    /// bound is greater than its upper bound or any bound is NaN.
    #[inline]
    pub fn checked_from_lower_upper(lower: FreePoint, upper: FreePoint) -> Option<Self> {
        // Written so that NaN fails every comparison.
        let ordered = Axis::ALL.iter().all(|&axis| lower[axis] <= upper[axis]);
        ordered.then_some(Self {
            lower_bounds: lower,
            upper_bounds: upper,
        })
    }

    #[allow(missing_docs)]
    #[inline]
    pub const fn lower_bounds_p(&self) -> FreePoint {
        self.lower_bounds
    }

    #[allow(missing_docs)]
    #[inline]
    pub const fn upper_bounds_p(&self) -> FreePoint {
        self.upper_bounds
    }

    /// The lower bound on `axis`.
    #[inline]
    pub fn lower(&self, axis: Axis) -> FreeCoordinate {
        self.lower_bounds[axis]
    }

    /// The upper bound on `axis`.
    #[inline]
    pub fn upper(&self, axis: Axis) -> FreeCoordinate {
        self.upper_bounds[axis]
    }

    /// Extent of the box on each axis.
    ///
    /// Collision code compares corners rather than sizes, since adding the size to one
    /// corner does not always exactly reproduce the other.
    #[inline]
    pub fn size(&self) -> Size3D<FreeCoordinate, Cube> {
        Size3D::from(self.upper_bounds - self.lower_bounds)
    }

    /// The center of the box.
    ///
    /// ```
    /// # extern crate movecheck_base as movecheck;
    /// use movecheck::math::{Aab, FreePoint};
    ///
    /// let player = Aab::new(-0.3, 0.3, 64.0, 65.8, -0.3, 0.3);
    /// assert_eq!(player.center(), FreePoint::new(0.0, 64.9, 0.0));
    /// ```
    #[inline]
    pub fn center(&self) -> FreePoint {
        (self.lower_bounds + self.upper_bounds.to_vector()) * 0.5
    }

    /// The lower and upper Y coordinates; the heights at which something could rest on
    /// or hang from this box.
    #[inline]
    pub fn y_points(&self) -> [FreeCoordinate; 2] {
        [self.lower_bounds.y, self.upper_bounds.y]
    }

    /// Returns whether `point` is inside the box or on its surface.
    #[inline]
    pub fn contains(&self, point: FreePoint) -> bool {
        Axis::ALL
            .iter()
            .all(|&axis| (self.lower_bounds[axis]..=self.upper_bounds[axis]).contains(&point[axis]))
    }

    /// Returns whether the two boxes have any point in common, including their surfaces.
    ///
    /// Boxes which merely touch intersect; see [`Aab::overlaps()`] for the strict
    /// version used to decide whether a block is actually entered.
    #[inline]
    pub fn intersects(&self, other: Aab) -> bool {
        Axis::ALL.iter().all(|&axis| {
            self.lower_bounds[axis] <= other.upper_bounds[axis]
                && other.lower_bounds[axis] <= self.upper_bounds[axis]
        })
    }

    /// Returns whether this AAB and the other share some interior volume.
    ///
    /// Boxes which merely touch do not overlap.
    #[inline]
    pub fn overlaps(&self, other: Aab) -> bool {
        for axis in Axis::ALL {
            if !(self.lower_bounds[axis] < other.upper_bounds[axis]
                && self.upper_bounds[axis] > other.lower_bounds[axis])
            {
                return false;
            }
        }
        true
    }

    /// Moves the box by `offset`. Rounding may change its size slightly.
    #[inline]
    #[must_use]
    #[track_caller]
    pub fn translate(self, offset: FreeVector) -> Self {
        Self::from_lower_upper(self.lower_bounds + offset, self.upper_bounds + offset)
    }

    /// Moves every face outward by `distance`, or inward if it is negative.
    ///
    /// A box shrunk past zero size, or expanded by NaN, collapses to its center.
    #[must_use]
    #[inline]
    pub fn expand(self, distance: FreeCoordinate) -> Self {
        self.inflate(Vector3D::splat(distance))
    }

    /// Moves the faces on each axis outward by that axis's component of `distance`.
    ///
    /// ```
    /// # extern crate movecheck_base as movecheck;
    /// use movecheck::math::{Aab, FreeVector};
    ///
    /// assert_eq!(
    ///     Aab::UNIT.inflate(FreeVector::new(0.5, 0.0, -0.25)),
    ///     Aab::new(-0.5, 1.5, 0.0, 1.0, 0.25, 0.75),
    /// );
    /// ```
    #[must_use]
    #[inline]
    pub fn inflate(self, distance: FreeVector) -> Self {
        match Self::checked_from_lower_upper(
            self.lower_bounds - distance,
            self.upper_bounds + distance,
        ) {
            Some(aab) => aab,
            None => {
                let center = self.center();
                Aab::from_lower_upper(center, center)
            }
        }
    }

    /// Extends the box so that it also covers every position it would occupy while
    /// moving by `displacement`: on each axis, the face in the direction of motion is
    /// moved by the displacement and the other face is left alone.
    ///
    /// If the displacement contains NaN, returns `self` unchanged.
    ///
    /// ```
    /// # extern crate movecheck_base as movecheck;
    /// use movecheck::math::{Aab, FreeVector};
    ///
    /// assert_eq!(
    ///     Aab::new(0.0, 1.0, 0.0, 1.0, 0.0, 1.0).expand_towards(FreeVector::new(0.5, -2.0, 0.0)),
    ///     Aab::new(0.0, 1.5, -2.0, 1.0, 0.0, 1.0),
    /// );
    /// ```
    #[must_use]
    #[inline]
    pub fn expand_towards(self, displacement: FreeVector) -> Self {
        let mut lower = self.lower_bounds;
        let mut upper = self.upper_bounds;
        for axis in Axis::ALL {
            let d = displacement[axis];
            if d < 0.0 {
                lower[axis] += d;
            } else {
                upper[axis] += d;
            }
        }
        Self::checked_from_lower_upper(lower, upper).unwrap_or(self)
    }

    /// Given `mover`, a box moving by `offset` along `axis`, returns how far it may
    /// move before it would enter `self`.
    ///
    /// The result always has the same sign as `offset` (or is zero) and is never
    /// greater in magnitude. If `mover` does not overlap `self` on both of the other
    /// axes by more than [`COLLISION_EPSILON`], or `self` lies behind the mover,
    /// `offset` is returned unchanged.
    #[inline]
    pub fn clip_axis_offset(&self, axis: Axis, mover: &Aab, offset: FreeCoordinate) -> FreeCoordinate {
        if offset == 0.0 {
            return offset;
        }
        for other in [axis.increment(), axis.decrement()] {
            if !(mover.lower_bounds[other] - self.upper_bounds[other] < -COLLISION_EPSILON
                && mover.upper_bounds[other] - self.lower_bounds[other] > COLLISION_EPSILON)
            {
                return offset;
            }
        }

        if offset > 0.0 {
            let max_move = self.lower_bounds[axis] - mover.upper_bounds[axis];
            if max_move < -COLLISION_EPSILON {
                offset
            } else {
                max_move.min(offset).max(0.0)
            }
        } else {
            let max_move = self.upper_bounds[axis] - mover.lower_bounds[axis];
            if max_move > COLLISION_EPSILON {
                offset
            } else {
                max_move.max(offset).min(0.0)
            }
        }
    }

    /// Returns the inclusive range of cubes whose closed volume touches this box;
    /// that is, from the cube containing the lower corner to the cube containing the
    /// upper corner.
    ///
    /// ```
    /// # extern crate movecheck_base as movecheck;
    /// use movecheck::math::{Aab, Cube};
    ///
    /// let range = Aab::new(0.5, 2.0, 0.0, 0.9, -0.5, 0.5).touched_cubes();
    /// assert_eq!(range.lower(), Cube::new(0, 0, -1));
    /// assert_eq!(range.upper_inclusive(), Cube::new(2, 0, 0));
    /// ```
    ///
    /// Coordinates out of the range of [`GridCoordinate`] are clamped.
    #[inline]
    pub fn touched_cubes(self) -> CubeRange {
        CubeRange::new(
            Cube::from(self.lower_bounds.map(|c| c.floor() as GridCoordinate)),
            Cube::from(self.upper_bounds.map(|c| c.floor() as GridCoordinate)),
        )
    }

    /// Returns the range of cubes that this box has volume inside of; integer upper
    /// bounds are excluded.
    ///
    /// Returns [`None`] if the box has zero size on any axis.
    #[inline]
    pub fn interior_cubes(self) -> Option<CubeRange> {
        let lower = self.lower_bounds.map(|c| c.floor() as GridCoordinate);
        let upper = self.upper_bounds.map(|c| c.ceil() as GridCoordinate - 1);
        if lower.x > upper.x || lower.y > upper.y || lower.z > upper.z {
            return None;
        }
        Some(CubeRange::new(Cube::from(lower), Cube::from(upper)))
    }
}

impl fmt::Debug for Aab {
    #[allow(clippy::missing_inline_in_public_items)]
    #[mutants::skip]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Aab {
            lower_bounds: l,
            upper_bounds: u,
        } = *self;
        f.debug_tuple("Aab")
            .field(&(l.x..=u.x))
            .field(&(l.y..=u.y))
            .field(&(l.z..=u.z))
            .finish()
    }
}

/// [`Aab`] rejects NaN values, so it can implement [`Eq`]
/// even though it contains floats.
impl Eq for Aab {}
