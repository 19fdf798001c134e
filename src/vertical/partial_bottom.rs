//! Bottom-depth adjustment for partial bottom cells.
//!
//! Before the reference grid is built, each active column's bottom depth is
//! moved into the deepest active level so that the partial cell is neither
//! thicker than the full level nor thinner than a minimum fraction of it.

use crate::error::CollaboratorError;

/// Adjusts a column's bottom depth given its reference levels.
pub trait BottomDepthAdjuster: Send + Sync {
    fn adjust_bottom_depth(
        &self,
        bottom_depth: &mut f64,
        ref_bottom_depth: &[f64],
        max_level: usize,
    ) -> Result<(), CollaboratorError>;
}

/// Partial bottom cells with a minimum thickness fraction.
///
/// For the deepest active level k the bottom depth is clamped into
/// `[ref[k-1] + min_fraction·Δz_k, ref[k]]`.
///
/// # Example
///
/// ```
/// use landice_balance::vertical::{BottomDepthAdjuster, PartialBottomCells};
///
/// let pbc = PartialBottomCells::new(0.25);
/// let mut bottom_depth = 31.0;
/// pbc.adjust_bottom_depth(&mut bottom_depth, &[10.0, 30.0, 60.0], 3).unwrap();
/// assert_eq!(bottom_depth, 37.5);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct PartialBottomCells {
    /// Minimum partial-cell thickness as a fraction of the full level (0 to 1).
    pub min_fraction: f64,
}

impl Default for PartialBottomCells {
    fn default() -> Self {
        Self { min_fraction: 0.1 }
    }
}

impl PartialBottomCells {
    pub fn new(min_fraction: f64) -> Self {
        Self { min_fraction }
    }
}

impl BottomDepthAdjuster for PartialBottomCells {
    fn adjust_bottom_depth(
        &self,
        bottom_depth: &mut f64,
        ref_bottom_depth: &[f64],
        max_level: usize,
    ) -> Result<(), CollaboratorError> {
        if !(0.0..=1.0).contains(&self.min_fraction) {
            return Err(CollaboratorError::new(
                1,
                format!("minimum partial-cell fraction {} outside [0, 1]", self.min_fraction),
            ));
        }
        let Some((ref_top, ref_bot)) = deepest_level(ref_bottom_depth, max_level)? else {
            return Ok(());
        };

        let min_depth = ref_top + self.min_fraction * (ref_bot - ref_top);
        *bottom_depth = bottom_depth.max(min_depth).min(ref_bot);
        Ok(())
    }
}

/// Full cells: the bottom depth snaps to the bottom of the deepest level.
#[derive(Clone, Copy, Debug, Default)]
pub struct FullBottomCells;

impl BottomDepthAdjuster for FullBottomCells {
    fn adjust_bottom_depth(
        &self,
        bottom_depth: &mut f64,
        ref_bottom_depth: &[f64],
        max_level: usize,
    ) -> Result<(), CollaboratorError> {
        if let Some((_, ref_bot)) = deepest_level(ref_bottom_depth, max_level)? {
            *bottom_depth = ref_bot;
        }
        Ok(())
    }
}

/// Reference top and bottom of the deepest active level, `None` for land.
fn deepest_level(
    ref_bottom_depth: &[f64],
    max_level: usize,
) -> Result<Option<(f64, f64)>, CollaboratorError> {
    if max_level == 0 {
        return Ok(None);
    }
    if max_level > ref_bottom_depth.len() {
        return Err(CollaboratorError::new(
            1,
            format!(
                "maxLevelCell {} exceeds {} reference levels",
                max_level,
                ref_bottom_depth.len()
            ),
        ));
    }
    let k = max_level - 1;
    let ref_top = if k == 0 { 0.0 } else { ref_bottom_depth[k - 1] };
    Ok(Some((ref_top, ref_bottom_depth[k])))
}
