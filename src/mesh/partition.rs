//! Mesh partition ("block") holding the per-cell state touched by the balance.
//!
//! The host model allocates partitions; the balance only reads and writes
//! the arrays inside them. All arrays are plain named fields so that a
//! missing field is a compile error rather than a runtime lookup failure.

use crate::error::BalanceError;
use crate::mesh::field::{ActiveTracers, ColumnField};

/// A subset of mesh cells processed as one independent unit of work.
#[derive(Clone, Debug)]
pub struct MeshPartition {
    n_cells: usize,
    n_vert_levels: usize,

    /// Reference depth (positive down) of the bottom of each level.
    pub ref_bottom_depth: Vec<f64>,
    /// Bottom depth (positive down) per cell.
    pub bottom_depth: Vec<f64>,
    /// Number of active levels per cell; 0 marks land.
    pub max_level_cell: Vec<usize>,
    /// Whether the cell takes part in the SSH / land-ice pressure balance.
    pub modify_ssh_mask: Vec<bool>,

    /// Layer thickness (m).
    pub layer_thickness: ColumnField,
    /// Layer thickness of the reference (ssh = 0) grid (m).
    pub resting_thickness: ColumnField,
    /// Mid-layer depth (m, negative down).
    pub z_mid: ColumnField,
    /// In-situ density (kg/m³).
    pub density: ColumnField,

    /// Sea-surface height (m).
    pub ssh: Vec<f64>,
    /// Pressure exerted by the overlying ice (Pa).
    pub land_ice_pressure: Vec<f64>,
    /// Ice draft; mirrors `ssh` after a balance pass.
    pub land_ice_draft: Vec<f64>,
    /// `-landIcePressure / (g·ssh)` (kg/m³); only kept up to date when tracked.
    pub effective_density_in_land_ice: Vec<f64>,

    /// Active tracers, remapped in place when the grid moves.
    pub active_tracers: ActiveTracers,
}

impl MeshPartition {
    /// Allocate a partition of `n_cells` cells on the reference levels
    /// `ref_bottom_depth`.
    ///
    /// Every cell starts as land (`max_level_cell = 0`), outside the
    /// balance mask, with all fields zeroed.
    pub fn new<S: AsRef<str>>(
        n_cells: usize,
        ref_bottom_depth: Vec<f64>,
        tracer_names: &[S],
    ) -> Self {
        let n_vert_levels = ref_bottom_depth.len();
        Self {
            n_cells,
            n_vert_levels,
            ref_bottom_depth,
            bottom_depth: vec![0.0; n_cells],
            max_level_cell: vec![0; n_cells],
            modify_ssh_mask: vec![false; n_cells],
            layer_thickness: ColumnField::new(n_cells, n_vert_levels),
            resting_thickness: ColumnField::new(n_cells, n_vert_levels),
            z_mid: ColumnField::new(n_cells, n_vert_levels),
            density: ColumnField::new(n_cells, n_vert_levels),
            ssh: vec![0.0; n_cells],
            land_ice_pressure: vec![0.0; n_cells],
            land_ice_draft: vec![0.0; n_cells],
            effective_density_in_land_ice: vec![0.0; n_cells],
            active_tracers: ActiveTracers::new(tracer_names, n_cells, n_vert_levels),
        }
    }

    #[inline]
    pub fn n_cells(&self) -> usize {
        self.n_cells
    }

    #[inline]
    pub fn n_vert_levels(&self) -> usize {
        self.n_vert_levels
    }

    /// Number of cells inside the balance mask.
    pub fn n_masked_in(&self) -> usize {
        self.modify_ssh_mask.iter().filter(|&&m| m).count()
    }

    /// Check that every array agrees with `n_cells` and `n_vert_levels`.
    ///
    /// The fields are public, so a host can resize one by accident; this is
    /// run once per block before any computation.
    pub fn validate(&self) -> Result<(), BalanceError> {
        let per_cell: [(&'static str, usize); 7] = [
            ("bottomDepth", self.bottom_depth.len()),
            ("maxLevelCell", self.max_level_cell.len()),
            ("modifySSHMask", self.modify_ssh_mask.len()),
            ("ssh", self.ssh.len()),
            ("landIcePressure", self.land_ice_pressure.len()),
            ("landIceDraft", self.land_ice_draft.len()),
            (
                "effectiveDensityInLandIce",
                self.effective_density_in_land_ice.len(),
            ),
        ];
        for (what, len) in per_cell {
            if len != self.n_cells {
                return Err(BalanceError::dimension_mismatch(what, self.n_cells, len));
            }
        }

        let columns = [
            ("layerThickness", &self.layer_thickness),
            ("restingThickness", &self.resting_thickness),
            ("zMid", &self.z_mid),
            ("density", &self.density),
        ];
        for (what, field) in columns
            .into_iter()
            .chain(self.active_tracers.fields().iter().map(|f| ("activeTracers", f)))
        {
            if field.n_cells() != self.n_cells {
                return Err(BalanceError::dimension_mismatch(
                    what,
                    self.n_cells,
                    field.n_cells(),
                ));
            }
            if field.n_levels() != self.n_vert_levels {
                return Err(BalanceError::dimension_mismatch(
                    what,
                    self.n_vert_levels,
                    field.n_levels(),
                ));
            }
        }

        if let Some(&max_level) = self.max_level_cell.iter().max() {
            if max_level > self.n_vert_levels {
                return Err(BalanceError::dimension_mismatch(
                    "maxLevelCell",
                    self.n_vert_levels,
                    max_level,
                ));
            }
        }
        Ok(())
    }
}
