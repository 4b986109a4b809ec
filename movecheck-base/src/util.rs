//! Formatting helpers and test utilities.

mod custom_format;
pub use custom_format::*;

#[doc(hidden)] // for use in internal tests only
#[allow(clippy::missing_inline_in_public_items)]
pub fn assert_send_sync<T: Send + Sync>() {
    // The call to this function compiling is the assertion.
}
