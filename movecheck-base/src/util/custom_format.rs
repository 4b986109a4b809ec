#![allow(clippy::missing_inline_in_public_items)]

use core::fmt;

use manyfmt::{Fmt, Refmt as _};

/// Format type for [`manyfmt::Fmt`] which is similar to [`fmt::Debug`], but uses an
/// alternate concise format.
///
/// Used for log messages, where a position or velocity should read at a glance:
/// coordinates are shown signed and to three decimal places.
///
/// ```
/// # extern crate movecheck_base as movecheck;
/// use manyfmt::Refmt as _;
/// use movecheck::math::FreeVector;
/// use movecheck::util::ConciseDebug;
///
/// assert_eq!(
///     format!("{}", FreeVector::new(0.1, -0.0784, 0.0).refmt(&ConciseDebug)),
///     "(+0.100, -0.078, +0.000)"
/// );
/// ```
#[expect(clippy::exhaustive_structs)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ConciseDebug;

impl<T: Fmt<ConciseDebug>, const N: usize> Fmt<ConciseDebug> for [T; N] {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>, fopt: &ConciseDebug) -> fmt::Result {
        fmt.debug_list().entries(self.iter().map(|item| item.refmt(fopt))).finish()
    }
}

impl<T: Fmt<ConciseDebug>> Fmt<ConciseDebug> for [T] {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>, fopt: &ConciseDebug) -> fmt::Result {
        fmt.debug_list().entries(self.iter().map(|item| item.refmt(fopt))).finish()
    }
}

impl<T: fmt::Debug, U> Fmt<ConciseDebug> for euclid::Point3D<T, U> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>, _: &ConciseDebug) -> fmt::Result {
        write!(fmt, "({:+.3?}, {:+.3?}, {:+.3?})", self.x, self.y, self.z)
    }
}
impl<T: fmt::Debug, U> Fmt<ConciseDebug> for euclid::Vector3D<T, U> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>, _: &ConciseDebug) -> fmt::Result {
        write!(fmt, "({:+.3?}, {:+.3?}, {:+.3?})", self.x, self.y, self.z)
    }
}
impl<T: fmt::Debug, U> Fmt<ConciseDebug> for euclid::Size3D<T, U> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>, _: &ConciseDebug) -> fmt::Result {
        write!(
            fmt,
            "({:+.3?}, {:+.3?}, {:+.3?})",
            self.width, self.height, self.depth
        )
    }
}
