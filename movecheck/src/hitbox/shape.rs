use core::fmt;

use manyfmt::Refmt as _;

use crate::math::{Aab, FreeCoordinate, FreeVector};
use crate::util::ConciseDebug;

/// The geometry of a block: zero or more boxes, in the coordinate system where the
/// block's cube is `0..1` on every axis.
///
/// Boxes may extend outside that cube (see [`Shape::exceeds_cube()`]) and may overlap
/// each other. Their order is the order they were added in, and is preserved.
#[derive(Clone, Eq, PartialEq)]
#[non_exhaustive]
pub enum Shape {
    /// No geometry at all; nothing collides with it.
    Empty,
    /// A single box.
    Single(Aab),
    /// Two or more boxes.
    Composite(Vec<Aab>),
}

impl Shape {
    /// The shape of a full cube.
    pub const FULL: Self = Self::Single(Aab::UNIT);

    /// A single box given in sixteenths of a block, as `(x, y, z, x, y, z)`.
    ///
    /// ```
    /// use movecheck::hitbox::Shape;
    /// use movecheck::math::Aab;
    ///
    /// assert_eq!(
    ///     Shape::pixels(0., 0., 0., 16., 8., 16.),
    ///     Shape::Single(Aab::new(0., 1., 0., 0.5, 0., 1.)),
    /// );
    /// ```
    #[inline]
    pub fn pixels(
        x1: FreeCoordinate,
        y1: FreeCoordinate,
        z1: FreeCoordinate,
        x2: FreeCoordinate,
        y2: FreeCoordinate,
        z2: FreeCoordinate,
    ) -> Self {
        Self::Single(Aab::pixels(x1, y1, z1, x2, y2, z2))
    }

    /// A single box given in blocks, as `(x, y, z, x, y, z)`.
    #[inline]
    pub fn blocks(
        x1: FreeCoordinate,
        y1: FreeCoordinate,
        z1: FreeCoordinate,
        x2: FreeCoordinate,
        y2: FreeCoordinate,
        z2: FreeCoordinate,
    ) -> Self {
        Self::Single(Aab::from_corners(x1, y1, z1, x2, y2, z2))
    }

    /// Constructs the shape made of the given boxes, choosing the simplest variant
    /// that can represent them.
    pub fn from_boxes(boxes: impl IntoIterator<Item = Aab>) -> Self {
        let mut boxes = boxes.into_iter();
        let Some(first) = boxes.next() else {
            return Self::Empty;
        };
        let Some(second) = boxes.next() else {
            return Self::Single(first);
        };
        let mut all = Vec::with_capacity(2 + boxes.size_hint().0);
        all.push(first);
        all.push(second);
        all.extend(boxes);
        Self::Composite(all)
    }

    /// Returns the boxes of this shape, in order.
    #[inline]
    pub fn boxes(&self) -> &[Aab] {
        match self {
            Shape::Empty => &[],
            Shape::Single(aab) => core::slice::from_ref(aab),
            Shape::Composite(boxes) => boxes,
        }
    }

    /// Returns whether the shape has no boxes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Shape::Empty)
    }

    /// Returns this shape with `aab` added after its existing boxes.
    #[must_use]
    pub fn with(self, aab: Aab) -> Self {
        match self {
            Shape::Empty => Shape::Single(aab),
            Shape::Single(first) => Shape::Composite(vec![first, aab]),
            Shape::Composite(mut boxes) => {
                boxes.push(aab);
                Shape::Composite(boxes)
            }
        }
    }

    /// Returns the shape containing the boxes of `self` followed by those of `other`.
    #[must_use]
    pub fn union(self, other: Shape) -> Self {
        match other {
            Shape::Empty => self,
            Shape::Single(aab) => self.with(aab),
            Shape::Composite(boxes) => boxes.into_iter().fold(self, Shape::with),
        }
    }

    /// Translates every box of the shape.
    #[must_use]
    pub fn translate(&self, offset: FreeVector) -> Self {
        match self {
            Shape::Empty => Shape::Empty,
            Shape::Single(aab) => Shape::Single(aab.translate(offset)),
            Shape::Composite(boxes) => {
                Shape::Composite(boxes.iter().map(|aab| aab.translate(offset)).collect())
            }
        }
    }

    /// Returns whether some box of this shape shares interior volume with `aab`.
    ///
    /// Boxes which merely touch `aab` do not count.
    #[inline]
    pub fn intersects(&self, aab: Aab) -> bool {
        self.boxes().iter().any(|b| b.overlaps(aab))
    }

    /// Returns whether this shape is exactly one box filling the whole cube.
    #[inline]
    pub fn is_full_block(&self) -> bool {
        *self == Self::FULL
    }

    /// Returns whether some box of this shape extends outside the `0..1` cube.
    pub fn exceeds_cube(&self) -> bool {
        self.boxes().iter().any(|aab| {
            let lower = aab.lower_bounds_p();
            let upper = aab.upper_bounds_p();
            lower.x < 0.0
                || lower.y < 0.0
                || lower.z < 0.0
                || upper.x > 1.0
                || upper.y > 1.0
                || upper.z > 1.0
        })
    }
}

impl fmt::Debug for Shape {
    #[allow(clippy::missing_inline_in_public_items)]
    #[mutants::skip]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Empty => write!(f, "Shape::Empty"),
            Shape::Single(aab) => f.debug_tuple("Shape::Single").field(aab).finish(),
            Shape::Composite(boxes) => f.debug_tuple("Shape::Composite").field(boxes).finish(),
        }
    }
}

impl manyfmt::Fmt<ConciseDebug> for Shape {
    #[allow(clippy::missing_inline_in_public_items)]
    #[mutants::skip]
    fn fmt(&self, f: &mut fmt::Formatter<'_>, fopt: &ConciseDebug) -> fmt::Result {
        let mut list = f.debug_list();
        for aab in self.boxes() {
            let lower = aab.lower_bounds_p();
            let upper = aab.upper_bounds_p();
            list.entry(&format_args!(
                "{:?}..{:?}",
                lower.refmt(fopt),
                upper.refmt(fopt)
            ));
        }
        list.finish()
    }
}
