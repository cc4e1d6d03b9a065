//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Tolerance below which a magnitude is treated as zero.
pub const TINY: f64 = 1.0e-12;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Return true if the magnitude of `value` is below [`TINY`].
pub fn is_tiny<T>(value: T) -> bool
where
    T: Float,
{
    value.abs() < T::from(TINY).unwrap_or_else(T::epsilon)
}

/// Return true if `value` is strictly positive and not tiny.
///
/// This is the validity test used for masses, time steps and heights.
pub fn is_positive<T>(value: T) -> bool
where
    T: Float,
{
    !is_tiny(value) && value > T::zero()
}

/// Divide `num` by `den`, or return `None` if `den` is tiny.
pub fn checked_div<T>(num: T, den: T) -> Option<T>
where
    T: Float,
{
    if is_tiny(den) {
        None
    } else {
        Some(num / den)
    }
}
