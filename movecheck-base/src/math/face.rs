//! Axis-aligned unit vectors: the [`Face6`] type, and the [`FaceSet`] of them.
//! This module is private but reexported by its parent.

use core::fmt;

use crate::math::{Axis, GridCoordinate, GridVector};

/// Identifies a face of a cube or an orthogonal unit vector.
///
/// Block states name their orientation with compass directions; those are available as
/// the associated constants [`Face6::NORTH`] and so on, where north is −Z and east is +X.
#[expect(clippy::exhaustive_enums)]
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, exhaust::Exhaust)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Face6 {
    /// Negative X; the face whose normal vector is `(-1, 0, 0)`; west.
    NX = 1,
    /// Negative Y; the face whose normal vector is `(0, -1, 0)`; downward.
    NY = 2,
    /// Negative Z; the face whose normal vector is `(0, 0, -1)`; north.
    NZ = 3,
    /// Positive X; the face whose normal vector is `(1, 0, 0)`; east.
    PX = 4,
    /// Positive Y; the face whose normal vector is `(0, 1, 0)`; upward.
    PY = 5,
    /// Positive Z; the face whose normal vector is `(0, 0, 1)`; south.
    PZ = 6,
}

impl Face6 {
    /// All the values of [`Face6`].
    pub const ALL: [Face6; 6] = [
        Face6::NX,
        Face6::NY,
        Face6::NZ,
        Face6::PX,
        Face6::PY,
        Face6::PZ,
    ];

    /// −Z.
    pub const NORTH: Self = Self::NZ;
    /// +Z.
    pub const SOUTH: Self = Self::PZ;
    /// −X.
    pub const WEST: Self = Self::NX;
    /// +X.
    pub const EAST: Self = Self::PX;
    /// +Y.
    pub const UP: Self = Self::PY;
    /// −Y.
    pub const DOWN: Self = Self::NY;

    /// The four horizontal faces, in the order north, south, west, east.
    pub const HORIZONTAL: [Face6; 4] = [Self::NORTH, Self::SOUTH, Self::WEST, Self::EAST];

    /// Returns which axis this face's normal vector is parallel to.
    #[inline]
    #[must_use]
    pub const fn axis(self) -> Axis {
        match self {
            Self::NX | Self::PX => Axis::X,
            Self::NY | Self::PY => Axis::Y,
            Self::NZ | Self::PZ => Axis::Z,
        }
    }

    /// Returns whether this face is a “positive” face: one whose unit vector's nonzero
    /// coordinate is positive.
    ///
    /// ```
    /// # extern crate movecheck_base as movecheck;
    /// use movecheck::math::Face6;
    ///
    /// assert_eq!(Face6::PX.is_positive(), true);
    /// assert_eq!(Face6::NX.is_positive(), false);
    /// ```
    #[inline]
    pub const fn is_positive(self) -> bool {
        matches!(self, Self::PX | Self::PY | Self::PZ)
    }

    /// Returns the opposite face (maps [`PX`](Self::PX) to [`NX`](Self::NX) and so on).
    #[inline]
    #[must_use]
    pub const fn opposite(self) -> Face6 {
        match self {
            Face6::NX => Face6::PX,
            Face6::NY => Face6::PY,
            Face6::NZ => Face6::PZ,
            Face6::PX => Face6::NX,
            Face6::PY => Face6::NY,
            Face6::PZ => Face6::NZ,
        }
    }

    /// Returns the vector normal to this face.
    #[inline]
    pub fn normal_vector(self) -> GridVector {
        let sign: GridCoordinate = if self.is_positive() { 1 } else { -1 };
        let mut v = GridVector::zero();
        v[self.axis()] = sign;
        v
    }

    /// Whether this face is one of the four horizontal ones.
    #[inline]
    pub const fn is_horizontal(self) -> bool {
        self.axis().is_horizontal()
    }
}

/// A set of [`Face6`]s, such as the sides of a block to which a vine is attached.
#[derive(Clone, Copy, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FaceSet(u8);

impl FaceSet {
    /// The set containing no faces.
    pub const EMPTY: Self = Self(0);

    /// The set containing every face.
    pub const ALL: Self = Self(0b111_1110);

    /// Constructs a set from a list of faces.
    #[inline]
    pub fn from_faces(faces: impl IntoIterator<Item = Face6>) -> Self {
        faces
            .into_iter()
            .fold(Self::EMPTY, |set, face| set.with(face))
    }

    /// Returns a copy of this set which also contains `face`.
    #[inline]
    #[must_use]
    pub const fn with(self, face: Face6) -> Self {
        Self(self.0 | (1 << face as u8))
    }

    /// Returns whether `face` is in the set.
    #[inline]
    pub const fn contains(self, face: Face6) -> bool {
        self.0 & (1 << face as u8) != 0
    }

    /// Number of faces in the set.
    #[inline]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Whether the set contains no faces.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates over the faces in the set, in the order of [`Face6::ALL`].
    #[inline]
    pub fn faces(self) -> impl Iterator<Item = Face6> {
        Face6::ALL.into_iter().filter(move |&face| self.contains(face))
    }
}

impl fmt::Debug for FaceSet {
    #[allow(clippy::missing_inline_in_public_items)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.faces()).finish()
    }
}

impl FromIterator<Face6> for FaceSet {
    #[inline]
    fn from_iter<T: IntoIterator<Item = Face6>>(iter: T) -> Self {
        Self::from_faces(iter)
    }
}
