//! [`ObserverVersion`], the release of the game whose movement rules apply to an entity.

use core::fmt;
use core::str::FromStr;

/// A release of the game at which some movement rule changed.
///
/// Only releases where something this crate models changed are listed. A client running
/// a release in between uses the rules of the nearest listed release at or below it;
/// [`FromStr`] performs that mapping.
///
/// Variants are declared oldest first, so `<` and `>=` compare release order. Rule code
/// names each change as a constant and asks [`ObserverVersion::since()`] or
/// [`ObserverVersion::before()`] about it, rather than comparing against literal variants.
///
/// ```
/// use movecheck::version::ObserverVersion;
///
/// let version: ObserverVersion = "1.20.4".parse().unwrap();
/// assert_eq!(version, ObserverVersion::V1_20_3);
/// assert!(version.since(ObserverVersion::V1_20));
/// assert!(version.before(ObserverVersion::V1_20_5));
/// ```
#[expect(clippy::exhaustive_enums)]
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, exhaust::Exhaust)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(missing_docs)]
pub enum ObserverVersion {
    V1_7_10,
    V1_8,
    V1_9,
    V1_10,
    V1_11,
    V1_12,
    V1_13,
    V1_13_2,
    V1_14,
    V1_15,
    V1_16,
    V1_16_2,
    V1_17,
    V1_18,
    V1_19,
    V1_19_3,
    V1_19_4,
    V1_20,
    V1_20_2,
    V1_20_3,
    V1_20_5,
    V1_21,
    V1_21_2,
    V1_21_4,
    V1_21_5,
}

impl ObserverVersion {
    /// The oldest supported release.
    pub const OLDEST: Self = Self::V1_7_10;

    /// The newest release whose rules are known.
    pub const LATEST: Self = Self::V1_21_5;

    /// All variants, oldest first.
    pub const ALL: [Self; 25] = {
        use ObserverVersion::*;
        [
            V1_7_10, V1_8, V1_9, V1_10, V1_11, V1_12, V1_13, V1_13_2, V1_14, V1_15, V1_16,
            V1_16_2, V1_17, V1_18, V1_19, V1_19_3, V1_19_4, V1_20, V1_20_2, V1_20_3, V1_20_5,
            V1_21, V1_21_2, V1_21_4, V1_21_5,
        ]
    };

    /// Returns whether this version is `boundary` or newer.
    #[inline]
    pub fn since(self, boundary: Self) -> bool {
        self >= boundary
    }

    /// Returns whether this version is older than `boundary`.
    #[inline]
    pub fn before(self, boundary: Self) -> bool {
        self < boundary
    }

    /// The `(major, minor, patch)` release numbers this variant stands for.
    pub const fn release(self) -> (u16, u16, u16) {
        use ObserverVersion::*;
        match self {
            V1_7_10 => (1, 7, 10),
            V1_8 => (1, 8, 0),
            V1_9 => (1, 9, 0),
            V1_10 => (1, 10, 0),
            V1_11 => (1, 11, 0),
            V1_12 => (1, 12, 0),
            V1_13 => (1, 13, 0),
            V1_13_2 => (1, 13, 2),
            V1_14 => (1, 14, 0),
            V1_15 => (1, 15, 0),
            V1_16 => (1, 16, 0),
            V1_16_2 => (1, 16, 2),
            V1_17 => (1, 17, 0),
            V1_18 => (1, 18, 0),
            V1_19 => (1, 19, 0),
            V1_19_3 => (1, 19, 3),
            V1_19_4 => (1, 19, 4),
            V1_20 => (1, 20, 0),
            V1_20_2 => (1, 20, 2),
            V1_20_3 => (1, 20, 3),
            V1_20_5 => (1, 20, 5),
            V1_21 => (1, 21, 0),
            V1_21_2 => (1, 21, 2),
            V1_21_4 => (1, 21, 4),
            V1_21_5 => (1, 21, 5),
        }
    }
}

impl fmt::Display for ObserverVersion {
    #[allow(clippy::missing_inline_in_public_items)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.release() {
            (major, minor, 0) => write!(f, "{major}.{minor}"),
            (major, minor, patch) => write!(f, "{major}.{minor}.{patch}"),
        }
    }
}

impl FromStr for ObserverVersion {
    type Err = UnknownVersion;

    /// Parses a release string such as `"1.20.4"` or `"1.8"`, and returns the newest
    /// variant which is not newer than it.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || UnknownVersion::Malformed(s.to_owned());

        let mut parts = s.trim().split('.');
        let mut next = |required: bool| -> Result<u16, UnknownVersion> {
            match parts.next() {
                Some(part) => part.parse().map_err(|_| malformed()),
                None if required => Err(malformed()),
                None => Ok(0),
            }
        };
        let release = (next(true)?, next(true)?, next(false)?);
        if parts.next().is_some() {
            return Err(malformed());
        }

        Self::ALL
            .into_iter()
            .rev()
            .find(|v| v.release() <= release)
            .ok_or_else(|| UnknownVersion::TooOld(s.to_owned()))
    }
}

/// Error from parsing an [`ObserverVersion`].
#[derive(Clone, Debug, Eq, PartialEq, displaydoc::Display)]
#[non_exhaustive]
pub enum UnknownVersion {
    /// version string {0:?} is not of the form “major.minor” or “major.minor.patch”
    Malformed(String),
    /// version {0} is older than the oldest supported version, 1.7.10
    TooOld(String),
}

impl core::error::Error for UnknownVersion {}
