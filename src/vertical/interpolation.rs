//! One-dimensional linear interpolation of vertical profiles.

/// Interpolates a sampled column onto target depths.
///
/// `dst_values` has one slot per target depth. Slots the interpolator does
/// not write keep whatever the caller put there (typically a fill value).
pub trait ColumnInterpolator: Send + Sync {
    fn interpolate_column(
        &self,
        src_depths: &[f64],
        src_values: &[f64],
        dst_depths: &[f64],
        dst_values: &mut [f64],
        extrapolate: bool,
    );
}

/// Piecewise-linear interpolation between samples.
///
/// Source depths must be monotonic (increasing or decreasing). A target that
/// coincides with a sample gets that sample's value exactly. Outside the
/// sampled range the end segment is extended when `extrapolate` is set;
/// otherwise the slot is left untouched.
///
/// # Example
///
/// ```
/// use landice_balance::vertical::{ColumnInterpolator, LinearInterpolator};
///
/// let z = [-5.0, -15.0, -25.0];
/// let t = [1.0, 0.0, -1.0];
/// let mut out = [0.0; 2];
/// LinearInterpolator.interpolate_column(&z, &t, &[-10.0, -30.0], &mut out, true);
/// assert_eq!(out, [0.5, -1.5]);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct LinearInterpolator;

impl ColumnInterpolator for LinearInterpolator {
    fn interpolate_column(
        &self,
        src_depths: &[f64],
        src_values: &[f64],
        dst_depths: &[f64],
        dst_values: &mut [f64],
        extrapolate: bool,
    ) {
        let n = src_depths.len().min(src_values.len());
        if n == 0 {
            return;
        }
        if n == 1 {
            for (value, &z) in dst_values.iter_mut().zip(dst_depths) {
                if extrapolate || z == src_depths[0] {
                    *value = src_values[0];
                }
            }
            return;
        }

        // Work in a coordinate that increases with index.
        let sign = if src_depths[0] > src_depths[n - 1] { -1.0 } else { 1.0 };
        let x = |k: usize| sign * src_depths[k];

        for (value, &z) in dst_values.iter_mut().zip(dst_depths) {
            let target = sign * z;
            let segment = if target < x(0) {
                if !extrapolate {
                    continue;
                }
                0
            } else if target > x(n - 1) {
                if !extrapolate {
                    continue;
                }
                n - 2
            } else {
                (0..n - 1)
                    .find(|&k| target <= x(k + 1))
                    .unwrap_or(n - 2)
            };

            let (x0, x1) = (x(segment), x(segment + 1));
            let w = (target - x0) / (x1 - x0);
            *value = (1.0 - w) * src_values[segment] + w * src_values[segment + 1];
        }
    }
}
