//! Domain-level vertical grid construction.
//!
//! [`VerticalGridBuilder::build_grid_for_domain`] regenerates
//! `layerThickness` and `zMid` (and, for the reference grid,
//! `restingThickness`) for every cell of every block. New values are staged
//! per block and committed only once every column has been built, so a
//! failure anywhere leaves the domain exactly as it was.

use log::debug;

use super::constrained::ConstrainedGridGenerator;
use super::partial_bottom::BottomDepthAdjuster;
use super::zstar::{ColumnSlices, build_column_into};
use crate::error::{BalanceError, Stage};
use crate::mesh::{ColumnField, Domain, MeshPartition};
use crate::types::{BlockIndex, CellIndex};

/// Which grid to build.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridMode {
    /// Reference grid with ssh = 0; also sets `restingThickness` and, unless
    /// the rx1 constraint is active, adjusts bottom depths for partial cells.
    Initial,
    /// Grid hanging from the current `ssh` of each cell.
    SshUpdated,
}

/// Builds the vertical grid for a whole domain.
#[derive(Clone, Copy)]
pub struct VerticalGridBuilder<'a> {
    bottom_adjuster: &'a dyn BottomDepthAdjuster,
    constrained: Option<&'a dyn ConstrainedGridGenerator>,
    use_rx1_constraint: bool,
}

/// New grid arrays for one block, not yet written back.
struct StagedBlock {
    bottom_depth: Vec<f64>,
    layer_thickness: ColumnField,
    z_mid: ColumnField,
    resting_thickness: ColumnField,
}

impl<'a> VerticalGridBuilder<'a> {
    /// Builder that always uses the per-column z-star path.
    pub fn new(bottom_adjuster: &'a dyn BottomDepthAdjuster) -> Self {
        Self {
            bottom_adjuster,
            constrained: None,
            use_rx1_constraint: false,
        }
    }

    /// Hand SSH-updated grids to `generator` (rx1 constraint).
    pub fn with_rx1_constraint(mut self, generator: &'a dyn ConstrainedGridGenerator) -> Self {
        self.constrained = Some(generator);
        self.use_rx1_constraint = true;
        self
    }

    /// Whether the rx1-constrained path is active.
    pub fn uses_rx1_constraint(&self) -> bool {
        self.use_rx1_constraint
    }

    /// Rebuild the vertical grid of every block in `domain`.
    ///
    /// With the rx1 constraint and `GridMode::SshUpdated` the constrained
    /// generator replaces the per-column loop entirely. Any failure aborts
    /// with nothing committed.
    pub fn build_grid_for_domain(
        &self,
        domain: &mut Domain,
        mode: GridMode,
    ) -> Result<(), BalanceError> {
        if self.use_rx1_constraint && mode == GridMode::SshUpdated {
            let generator = self
                .constrained
                .ok_or(BalanceError::MissingConstrainedGenerator)?;
            debug!("building rx1-constrained grid for {} blocks", domain.n_blocks());
            return generator
                .build_constrained_grid(domain)
                .map_err(|source| BalanceError::DomainUpstream {
                    stage: Stage::ConstrainedGrid,
                    source,
                });
        }

        debug!(
            "building {:?} z-star grid for {} blocks ({} cells)",
            mode,
            domain.n_blocks(),
            domain.n_cells()
        );

        let staged = self.stage_domain(domain, mode)?;
        for (block, staged) in domain.blocks.iter_mut().zip(staged) {
            block.bottom_depth = staged.bottom_depth;
            block.layer_thickness = staged.layer_thickness;
            block.z_mid = staged.z_mid;
            block.resting_thickness = staged.resting_thickness;
        }
        Ok(())
    }

    #[cfg(not(feature = "parallel"))]
    fn stage_domain(
        &self,
        domain: &Domain,
        mode: GridMode,
    ) -> Result<Vec<StagedBlock>, BalanceError> {
        domain
            .iter()
            .map(|(index, block)| self.stage_block(index, block, mode))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn stage_domain(
        &self,
        domain: &Domain,
        mode: GridMode,
    ) -> Result<Vec<StagedBlock>, BalanceError> {
        use rayon::prelude::*;

        domain
            .blocks
            .par_iter()
            .enumerate()
            .map(|(i, block)| self.stage_block(BlockIndex::new(i), block, mode))
            .collect()
    }

    fn stage_block(
        &self,
        index: BlockIndex,
        block: &MeshPartition,
        mode: GridMode,
    ) -> Result<StagedBlock, BalanceError> {
        let mut bottom_depth = block.bottom_depth.clone();
        if mode == GridMode::Initial && !self.use_rx1_constraint {
            for (depth, &max_level) in bottom_depth.iter_mut().zip(&block.max_level_cell) {
                self.bottom_adjuster
                    .adjust_bottom_depth(depth, &block.ref_bottom_depth, max_level)
                    .map_err(|source| BalanceError::Upstream {
                        stage: Stage::BottomDepth,
                        block: index,
                        source,
                    })?;
            }
        }

        let mut layer_thickness = block.layer_thickness.clone();
        let mut z_mid = block.z_mid.clone();
        let mut resting_thickness = block.resting_thickness.clone();

        for cell in CellIndex::iter(block.n_cells()) {
            let ssh = match mode {
                GridMode::Initial => None,
                GridMode::SshUpdated => Some(block.ssh[cell]),
            };
            let c = cell.get();
            build_column_into(
                &block.ref_bottom_depth,
                bottom_depth[cell],
                block.max_level_cell[cell],
                ssh,
                ColumnSlices {
                    layer_thickness: layer_thickness.column_mut(c),
                    z_mid: z_mid.column_mut(c),
                    resting_thickness: resting_thickness.column_mut(c),
                },
            )
            .map_err(|source| BalanceError::Grid {
                block: index,
                cell,
                source,
            })?;
        }

        Ok(StagedBlock {
            bottom_depth,
            layer_thickness,
            z_mid,
            resting_thickness,
        })
    }
}
