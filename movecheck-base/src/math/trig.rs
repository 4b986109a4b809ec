use alloc::boxed::Box;
use alloc::vec::Vec;

use once_cell::race::OnceBox;

/// Number of entries in the sine lookup table; one full turn.
const TABLE_SIZE: usize = 65536;

/// Table index units per radian (`TABLE_SIZE / 2π`, rounded to `f32`).
const INDEX_PER_RADIAN: f32 = 10430.378;

static SIN_TABLE: OnceBox<Vec<f32>> = OnceBox::new();

fn sin_table() -> &'static [f32] {
    SIN_TABLE.get_or_init(|| {
        Box::new(
            (0..TABLE_SIZE)
                .map(|i| libm::sin(i as f64 * core::f64::consts::PI * 2.0 / TABLE_SIZE as f64) as f32)
                .collect(),
        )
    })
}

#[inline]
fn lookup(index: f32) -> f32 {
    // `as i32` saturates, and the mask then wraps into the table.
    sin_table()[(index as i32 & (TABLE_SIZE as i32 - 1)) as usize]
}

/// Sine of an angle in radians, computed by the same 65536-entry table lookup that
/// clients use for movement, including its quantization error.
///
/// ```
/// # extern crate movecheck_base as movecheck;
/// use movecheck::math::table_sin;
///
/// assert_eq!(table_sin(0.0), 0.0);
/// assert!((table_sin(core::f32::consts::FRAC_PI_2) - 1.0).abs() < 1e-6);
/// ```
#[inline]
pub fn table_sin(radians: f32) -> f32 {
    lookup(radians * INDEX_PER_RADIAN)
}

/// Cosine counterpart of [`table_sin()`].
#[inline]
pub fn table_cos(radians: f32) -> f32 {
    lookup(radians * INDEX_PER_RADIAN + 16384.0)
}
