//! Z-star column construction.
//!
//! The reference levels `refBottomDepth` are stretched uniformly between the
//! (possibly displaced) sea surface and the sea floor:
//!
//! ```text
//! h_k = h⁰_k × (η + H) / H
//! ```
//!
//! where `h⁰_k` is the resting thickness of level k, η the SSH and H the
//! bottom depth. The deepest active level is a partial cell whose resting
//! thickness runs from the previous reference interface down to H.

use crate::error::GridError;

/// Output slices for one column, each of length `nVertLevels`.
pub struct ColumnSlices<'a> {
    pub layer_thickness: &'a mut [f64],
    pub z_mid: &'a mut [f64],
    /// Written only when building the reference (no SSH) grid.
    pub resting_thickness: &'a mut [f64],
}

/// An owned z-star column.
#[derive(Clone, Debug, PartialEq)]
pub struct ZStarColumn {
    pub layer_thickness: Vec<f64>,
    pub z_mid: Vec<f64>,
    /// Present only for the reference grid (`ssh` omitted).
    pub resting_thickness: Option<Vec<f64>>,
}

/// Build one column, allocating the output.
///
/// With `ssh = None` the reference grid (η = 0) is built and the resting
/// thickness is returned alongside it.
///
/// # Example
///
/// ```
/// use landice_balance::vertical::build_column;
///
/// let ref_bottom_depth = [10.0, 30.0, 60.0];
/// let col = build_column(&ref_bottom_depth, 50.0, 3, None).unwrap();
/// assert_eq!(col.layer_thickness, vec![10.0, 20.0, 20.0]);
/// assert_eq!(col.resting_thickness, Some(vec![10.0, 20.0, 20.0]));
/// ```
pub fn build_column(
    ref_bottom_depth: &[f64],
    bottom_depth: f64,
    max_level: usize,
    ssh: Option<f64>,
) -> Result<ZStarColumn, GridError> {
    let n = ref_bottom_depth.len();
    let mut layer_thickness = vec![0.0; n];
    let mut z_mid = vec![0.0; n];
    let mut resting_thickness = vec![0.0; n];

    build_column_into(
        ref_bottom_depth,
        bottom_depth,
        max_level,
        ssh,
        ColumnSlices {
            layer_thickness: &mut layer_thickness,
            z_mid: &mut z_mid,
            resting_thickness: &mut resting_thickness,
        },
    )?;

    Ok(ZStarColumn {
        layer_thickness,
        z_mid,
        resting_thickness: ssh.is_none().then_some(resting_thickness),
    })
}

/// Build one column into caller-provided buffers.
///
/// Levels at or below `max_level` are zeroed. An inactive column
/// (`max_level == 0`) is all zeros and never fails.
pub fn build_column_into(
    ref_bottom_depth: &[f64],
    bottom_depth: f64,
    max_level: usize,
    ssh: Option<f64>,
    out: ColumnSlices<'_>,
) -> Result<(), GridError> {
    let n = ref_bottom_depth.len();
    for (what, len) in [
        ("layerThickness", out.layer_thickness.len()),
        ("zMid", out.z_mid.len()),
        ("restingThickness", out.resting_thickness.len()),
    ] {
        if len != n {
            return Err(GridError::DimensionMismatch {
                what,
                expected: n,
                actual: len,
            });
        }
    }
    if max_level > n {
        return Err(GridError::TooManyLevels {
            max_level,
            n_vert_levels: n,
        });
    }

    let write_resting = ssh.is_none();
    out.layer_thickness[max_level..].fill(0.0);
    out.z_mid[max_level..].fill(0.0);
    if write_resting {
        out.resting_thickness[max_level..].fill(0.0);
    }
    if max_level == 0 {
        return Ok(());
    }

    if !(bottom_depth > 0.0) {
        return Err(GridError::NonPositiveBottomDepth { bottom_depth });
    }

    let ssh = ssh.unwrap_or(0.0);
    let stretch = (ssh + bottom_depth) / bottom_depth;

    let mut z_top = ssh;
    for k in 0..max_level {
        let ref_top = if k == 0 { 0.0 } else { ref_bottom_depth[k - 1] };
        let ref_bot = if k + 1 == max_level {
            bottom_depth
        } else {
            ref_bottom_depth[k]
        };
        let resting = ref_bot - ref_top;
        let thickness = resting * stretch;
        if !(thickness > 0.0) {
            return Err(GridError::NonPositiveThickness {
                level: k,
                thickness,
            });
        }

        out.layer_thickness[k] = thickness;
        out.z_mid[k] = z_top - 0.5 * thickness;
        if write_resting {
            out.resting_thickness[k] = resting;
        }
        z_top -= thickness;
    }
    Ok(())
}
