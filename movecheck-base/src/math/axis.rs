use core::fmt;

/// Acts as polyfill for float methods
#[cfg(not(any(feature = "std", test)))]
#[allow(unused_imports)]
use num_traits::float::FloatCore as _;

use crate::math::FreeVector;

/// Enumeration of the axes of three-dimensional space.
///
/// Can be used to infallibly index 3-component arrays and vectors. See [`AxisOrder`] for
/// the sequences in which axes are resolved during collision.
#[expect(clippy::exhaustive_enums)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, exhaust::Exhaust)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    /// All three axes in the standard order, [X, Y, Z].
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// Convert the axis to a number for indexing 3-element arrays.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns whether this is one of the two horizontal axes.
    #[inline]
    pub const fn is_horizontal(self) -> bool {
        !matches!(self, Axis::Y)
    }

    /// Maps X to Y, Y to Z, and Z to X.
    #[inline]
    #[must_use]
    pub const fn increment(self) -> Self {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::Z,
            Axis::Z => Axis::X,
        }
    }

    /// Maps X to Z, Y to X, and Z to Y.
    #[inline]
    #[must_use]
    pub const fn decrement(self) -> Self {
        match self {
            Axis::X => Axis::Z,
            Axis::Y => Axis::X,
            Axis::Z => Axis::Y,
        }
    }
}

/// Formats the axis as "X", "Y", or "Z".
impl fmt::UpperHex for Axis {
    #[allow(clippy::missing_inline_in_public_items)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        })
    }
}

mod impl_index_axis {
    use super::Axis;
    use core::ops;

    impl<T> ops::Index<Axis> for [T; 3] {
        type Output = T;

        #[inline]
        fn index(&self, index: Axis) -> &Self::Output {
            &self[index as usize]
        }
    }
    impl<T> ops::IndexMut<Axis> for [T; 3] {
        #[inline]
        fn index_mut(&mut self, index: Axis) -> &mut Self::Output {
            &mut self[index as usize]
        }
    }

    macro_rules! impl_xyz_e {
        ($x:ident $y:ident $z:ident, $($type:tt)*) => {
            impl<T, U> ops::Index<Axis> for $($type)*<T, U> {
                type Output = T;

                #[inline]
                fn index(&self, index: Axis) -> &Self::Output {
                    match index {
                        Axis::X => &self.$x,
                        Axis::Y => &self.$y,
                        Axis::Z => &self.$z,
                    }
                }
            }
            impl<T, U> ops::IndexMut<Axis> for $($type)*<T, U> {
                #[inline]
                fn index_mut(&mut self, index: Axis) -> &mut Self::Output {
                    match index {
                        Axis::X => &mut self.$x,
                        Axis::Y => &mut self.$y,
                        Axis::Z => &mut self.$z,
                    }
                }
            }
        };
    }
    impl_xyz_e!(x y z, euclid::Vector3D);
    impl_xyz_e!(x y z, euclid::Point3D);
    impl_xyz_e!(width height depth, euclid::Size3D);
}

// -------------------------------------------------------------------------------------------------

/// A sequence in which the three components of a displacement are resolved against
/// obstacles, one axis at a time.
///
/// The name lists the axes in the order they are applied.
/// Resolving the same displacement in different orders can give different results
/// when the mover slides along a corner.
#[expect(clippy::exhaustive_enums)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, exhaust::Exhaust)]
#[allow(missing_docs)]
pub enum AxisOrder {
    YXZ,
    YZX,
    XYZ,
    XZY,
    ZXY,
    ZYX,
}

impl AxisOrder {
    /// The orders that are normally attempted: vertical first, then either horizontal axis.
    pub const REDUCED: [Self; 2] = [Self::YXZ, Self::YZX];

    /// All six orders, in the order they are attempted when the reduced set is not
    /// sufficient. The first two are [`AxisOrder::REDUCED`].
    pub const ALL: [Self; 6] = [
        Self::YXZ,
        Self::YZX,
        Self::XYZ,
        Self::XZY,
        Self::ZXY,
        Self::ZYX,
    ];

    /// The axes in the order they are applied.
    #[inline]
    pub const fn axes(self) -> [Axis; 3] {
        use Axis::*;
        match self {
            Self::YXZ => [Y, X, Z],
            Self::YZX => [Y, Z, X],
            Self::XYZ => [X, Y, Z],
            Self::XZY => [X, Z, Y],
            Self::ZXY => [Z, X, Y],
            Self::ZYX => [Z, Y, X],
        }
    }

    /// The order in which a movement is split into axis-aligned steps when checking
    /// which blocks it passes through: vertical first, then the horizontal axis with
    /// the larger component.
    #[inline]
    pub fn for_step(displacement: FreeVector) -> Self {
        if displacement.x.abs() < displacement.z.abs() {
            Self::YZX
        } else {
            Self::YXZ
        }
    }
}

impl fmt::Display for AxisOrder {
    #[allow(clippy::missing_inline_in_public_items)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.axes();
        write!(f, "{a:X}{b:X}{c:X}")
    }
}
