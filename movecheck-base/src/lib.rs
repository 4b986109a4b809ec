//! This library is an internal component of [`movecheck`],
//! which defines the geometric types and the voxel traversal used by the movement checks.
//! Do not depend on this library; use only [`movecheck`] instead.
//!
//! [`movecheck`]: ../movecheck/index.html

#![no_std]
// Crate-specific lint settings. (General settings can be found in the workspace manifest.)
#![cfg_attr(
    not(test),
    warn(clippy::std_instead_of_core, clippy::std_instead_of_alloc)
)]
#![warn(clippy::missing_inline_in_public_items)]

#[cfg(any(feature = "std", test))]
#[cfg_attr(test, macro_use)]
extern crate std;
#[macro_use]
extern crate alloc;

/// Do not use this module directly; its contents are re-exported from `movecheck`.
pub mod math;

/// Do not use this module directly; its contents are re-exported from `movecheck`.
pub mod traverse;

/// Do not use this module directly; its contents are re-exported from `movecheck`.
pub mod util;

// reexport for convenience of our tests
#[doc(hidden)]
pub use euclid;
