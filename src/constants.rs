//! Physical and numerical constants shared across the crate.

/// Gravitational acceleration (m/s²) used by the hydrostatic integrator.
pub const GRAVITY: f64 = 9.80616;

/// Sentinel written to remapped levels the interpolator did not fill.
pub const FILL_VALUE: f64 = -9.969209968386869e+36;

/// Returns true if `value` is not the fill sentinel.
#[inline]
pub fn is_valid(value: f64) -> bool {
    value != FILL_VALUE
}
