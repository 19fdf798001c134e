//! Diagnostics of a balance pass.

use std::fmt;

use super::config::InitVariable;

/// What a balance pass did, for logging and convergence checks.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceSummary {
    /// Mode the pass ran in.
    pub init_variable: InitVariable,
    /// Blocks visited.
    pub n_blocks: usize,
    /// Cells inside the balance mask.
    pub cells_modified: usize,
    /// Cells forced to zero SSH / pressure.
    pub cells_masked_out: usize,
    /// Largest |ssh| after the pass (m).
    pub max_abs_ssh: f64,
    /// Largest land-ice pressure after the pass (Pa).
    pub max_land_ice_pressure: f64,
    /// Largest |ssh_after - ssh_before| (m).
    pub max_ssh_change: f64,
    /// Whether the vertical grid was rebuilt.
    pub grid_rebuilt: bool,
    /// Columns remapped, summed over blocks (per tracer).
    pub columns_remapped: usize,
}

impl fmt::Display for BalanceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} cells balanced, {} masked out in {} blocks; max |ssh| = {:.4} m, \
             max landIcePressure = {:.1} Pa, max |Δssh| = {:.3e} m",
            self.init_variable,
            self.cells_modified,
            self.cells_masked_out,
            self.n_blocks,
            self.max_abs_ssh,
            self.max_land_ice_pressure,
            self.max_ssh_change
        )?;
        if self.grid_rebuilt {
            write!(f, ", grid rebuilt, {} columns remapped", self.columns_remapped)?;
        }
        Ok(())
    }
}
