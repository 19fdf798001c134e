//! Hydrostatic pressure in a single water column.
//!
//! Both functions walk the column from the top (z = 0) downward, summing
//! `ρ_k · g · h_k` one layer at a time. The sum is strictly sequential so
//! that results are bit-for-bit reproducible regardless of how columns are
//! scheduled.
//!
//! # Outside the column
//!
//! Neither function clamps. A depth above the surface gets a negative
//! pressure through the first layer's partial term; a depth (or pressure)
//! beyond the bottom is extrapolated linearly with the deepest layer's
//! density. Callers that need a non-negative pressure clamp it themselves.
//!
//! ```
//! use landice_balance::vertical::{depth_at_pressure, pressure_at_depth};
//!
//! let density = [1000.0, 1010.0];
//! let thickness = [10.0, 10.0];
//!
//! let p = pressure_at_depth(-15.0, &density, &thickness, 2, 9.80616);
//! let z = depth_at_pressure(p, &density, &thickness, 2, 9.80616);
//! assert!((z + 15.0).abs() < 1e-9);
//! ```

/// Hydrostatic pressure (Pa) at depth `z` (m, negative down).
///
/// Only the first `max_level` entries of `density` and `layer_thickness`
/// are read. Returns 0 for an inactive column (`max_level == 0`).
///
/// # Panics
///
/// Panics if `density` or `layer_thickness` is shorter than `max_level`.
pub fn pressure_at_depth(
    z: f64,
    density: &[f64],
    layer_thickness: &[f64],
    max_level: usize,
    gravity: f64,
) -> f64 {
    if max_level == 0 {
        return 0.0;
    }
    check_levels(density, layer_thickness, max_level);

    let mut pressure = 0.0;
    let mut z_bot = 0.0;
    for k in 0..max_level {
        let z_top = z_bot;
        z_bot = z_top - layer_thickness[k];
        if z > z_bot {
            // Unclamped: negative when z lies above the surface.
            pressure += density[k] * gravity * (z_top - z);
            return pressure;
        }
        pressure += density[k] * gravity * layer_thickness[k];
    }

    // Below the deepest interface.
    pressure + density[max_level - 1] * gravity * (z_bot - z)
}

/// Depth (m, negative down) at which the column reaches `pressure` (Pa).
///
/// Inverse of [`pressure_at_depth`]: linear within the layer whose pressure
/// range contains `pressure`. Returns 0 for an inactive column.
///
/// # Panics
///
/// Panics if `density` or `layer_thickness` is shorter than `max_level`.
pub fn depth_at_pressure(
    pressure: f64,
    density: &[f64],
    layer_thickness: &[f64],
    max_level: usize,
    gravity: f64,
) -> f64 {
    if max_level == 0 {
        return 0.0;
    }
    check_levels(density, layer_thickness, max_level);

    let mut pressure_bot = 0.0;
    let mut z_bot = 0.0;
    for k in 0..max_level {
        let pressure_top = pressure_bot;
        let z_top = z_bot;
        pressure_bot = pressure_top + density[k] * gravity * layer_thickness[k];
        z_bot = z_top - layer_thickness[k];
        if pressure < pressure_bot {
            return z_top
                - (pressure - pressure_top) / (pressure_bot - pressure_top) * layer_thickness[k];
        }
    }

    // Heavier than the whole column.
    z_bot - (pressure - pressure_bot) / (density[max_level - 1] * gravity)
}

/// Total hydrostatic weight of the active column (Pa).
///
/// # Panics
///
/// Panics if `density` or `layer_thickness` is shorter than `max_level`.
pub fn column_weight(
    density: &[f64],
    layer_thickness: &[f64],
    max_level: usize,
    gravity: f64,
) -> f64 {
    check_levels(density, layer_thickness, max_level);
    density[..max_level]
        .iter()
        .zip(&layer_thickness[..max_level])
        .fold(0.0, |acc, (&rho, &h)| acc + rho * gravity * h)
}

fn check_levels(density: &[f64], layer_thickness: &[f64], max_level: usize) {
    assert!(
        density.len() >= max_level && layer_thickness.len() >= max_level,
        "max_level {} exceeds column length (density {}, layerThickness {})",
        max_level,
        density.len(),
        layer_thickness.len()
    );
}
