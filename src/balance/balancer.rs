//! SSH / land-ice pressure balance.
//!
//! One call to [`SshBalancer::balance`] runs a straight pipeline over the
//! whole domain:
//!
//! 1. compute density in every block
//! 2. (`landIcePressure_from_top_density` only) set the pressure from the
//!    top-layer density and stop
//! 3. snapshot `zMid` / `maxLevelCell`
//! 4. recompute density, then derive SSH from pressure or pressure from SSH
//!    in every masked-in cell
//! 5. rebuild the vertical grid around the new SSH
//! 6. remap active tracers from the snapshot grid onto the new one
//!
//! Each stage completes for all blocks before the next one starts. The
//! first failure aborts the pass and is returned unchanged; arrays already
//! written by earlier stages are not rolled back.

use log::{debug, error, info};

use super::config::{BalanceConfig, InitVariable};
use super::snapshot::ReferenceGridSnapshot;
use super::summary::BalanceSummary;
use crate::equations::DensityEvaluator;
use crate::error::{BalanceError, Stage};
use crate::mesh::{ColumnField, Domain, MeshPartition};
use crate::tracer::TracerRemapper;
use crate::types::BlockIndex;
use crate::vertical::{
    BottomDepthAdjuster, ColumnInterpolator, ConstrainedGridGenerator, GridMode,
    VerticalGridBuilder, depth_at_pressure, pressure_at_depth,
};

/// External services the balance depends on.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    /// Equation of state.
    pub density: &'a dyn DensityEvaluator,
    /// 1-D vertical interpolation used by the tracer remap.
    pub interpolator: &'a dyn ColumnInterpolator,
    /// Partial-bottom-cell adjustment for the reference grid.
    pub bottom_adjuster: &'a dyn BottomDepthAdjuster,
    /// Rx1-constrained grid generator, required when the constraint is on.
    pub constrained_grid: Option<&'a dyn ConstrainedGridGenerator>,
}

impl<'a> Collaborators<'a> {
    pub fn new(
        density: &'a dyn DensityEvaluator,
        interpolator: &'a dyn ColumnInterpolator,
        bottom_adjuster: &'a dyn BottomDepthAdjuster,
    ) -> Self {
        Self {
            density,
            interpolator,
            bottom_adjuster,
            constrained_grid: None,
        }
    }

    pub fn with_constrained_grid(mut self, generator: &'a dyn ConstrainedGridGenerator) -> Self {
        self.constrained_grid = Some(generator);
        self
    }
}

/// Quantity derived from the water column in the full balance path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Derived {
    /// SSH from the known land-ice pressure.
    Ssh,
    /// Land-ice pressure from the known SSH.
    LandIcePressure,
}

/// Drives the balance between vertical grid, SSH and land-ice pressure.
pub struct SshBalancer<'a> {
    config: BalanceConfig,
    collaborators: Collaborators<'a>,
}

/// Log a fatal stage failure and hand it back.
fn fatal(err: BalanceError) -> BalanceError {
    error!("land-ice balance aborted: {err}");
    err
}

impl<'a> SshBalancer<'a> {
    /// Create a balancer.
    ///
    /// Fails if the rx1 constraint is enabled but no constrained grid
    /// generator was supplied.
    pub fn new(config: BalanceConfig, collaborators: Collaborators<'a>) -> Result<Self, BalanceError> {
        if config.use_rx1_constraint && collaborators.constrained_grid.is_none() {
            return Err(fatal(BalanceError::MissingConstrainedGenerator));
        }
        Ok(Self {
            config,
            collaborators,
        })
    }

    pub fn config(&self) -> &BalanceConfig {
        &self.config
    }

    /// Vertical grid builder wired to this balancer's collaborators.
    pub fn grid_builder(&self) -> VerticalGridBuilder<'a> {
        let builder = VerticalGridBuilder::new(self.collaborators.bottom_adjuster);
        match self.collaborators.constrained_grid {
            Some(generator) if self.config.use_rx1_constraint => {
                builder.with_rx1_constraint(generator)
            }
            _ => builder,
        }
    }

    /// Build the reference (ssh = 0) grid for the whole domain.
    pub fn build_initial_grid(&self, domain: &mut Domain) -> Result<(), BalanceError> {
        domain.validate().map_err(fatal)?;
        self.grid_builder()
            .build_grid_for_domain(domain, GridMode::Initial)
            .map_err(fatal)
    }

    /// Run one balance pass over `domain`.
    pub fn balance(&self, domain: &mut Domain) -> Result<BalanceSummary, BalanceError> {
        domain.validate().map_err(fatal)?;

        let mode = self.config.init_variable;
        debug!("land-ice balance pass ({mode}) over {} blocks", domain.n_blocks());
        let ssh_before: Vec<Vec<f64>> = domain.blocks.iter().map(|b| b.ssh.clone()).collect();

        self.compute_density(domain)?;

        let derived = match mode {
            InitVariable::Ssh => Derived::LandIcePressure,
            InitVariable::LandIcePressure => Derived::Ssh,
            InitVariable::LandIcePressureFromTopDensity => {
                self.for_each_block(domain, |block| self.apply_top_density(block));
                let summary = self.summarize(domain, &ssh_before, false, 0);
                info!("{summary}");
                return Ok(summary);
            }
        };

        let snapshot = ReferenceGridSnapshot::capture(domain);

        self.compute_density(domain)?;
        self.for_each_block(domain, |block| self.derive_block(block, derived));

        debug!("rebuilding vertical grid around derived ssh");
        self.grid_builder()
            .build_grid_for_domain(domain, GridMode::SshUpdated)
            .map_err(fatal)?;

        let columns_remapped = self.remap_tracers(domain, &snapshot)?;
        drop(snapshot);

        let summary = self.summarize(domain, &ssh_before, true, columns_remapped);
        info!("{summary}");
        Ok(summary)
    }

    /// Repeat balance passes until the largest SSH change falls below
    /// `tolerance` or `max_passes` passes have run.
    ///
    /// Returns the summary of every pass. The fast top-density mode never
    /// moves SSH, so it stops after one pass.
    pub fn iterate(
        &self,
        domain: &mut Domain,
        max_passes: usize,
        tolerance: f64,
    ) -> Result<Vec<BalanceSummary>, BalanceError> {
        let mut history = Vec::with_capacity(max_passes);
        for pass in 1..=max_passes {
            let summary = self.balance(domain)?;
            let converged = summary.max_ssh_change < tolerance;
            debug!(
                "pass {pass}/{max_passes}: max |Δssh| = {:.3e} m",
                summary.max_ssh_change
            );
            history.push(summary);
            if converged || !self.config.init_variable.is_iterative() {
                info!("land-ice balance converged after {pass} passes");
                return Ok(history);
            }
        }
        info!(
            "land-ice balance stopped after {max_passes} passes without reaching {:.3e} m",
            tolerance
        );
        Ok(history)
    }

    fn compute_density(&self, domain: &mut Domain) -> Result<(), BalanceError> {
        let eos = self.collaborators.density;
        let evaluate = |(i, block): (usize, &mut MeshPartition)| -> Result<(), BalanceError> {
            let mut density = ColumnField::new(block.n_cells(), block.n_vert_levels());
            eos.compute_density(block, &mut density)
                .map_err(|source| BalanceError::Upstream {
                    stage: Stage::Density,
                    block: BlockIndex::new(i),
                    source,
                })?;
            block.density = density;
            Ok(())
        };

        #[cfg(feature = "parallel")]
        let result = {
            use rayon::prelude::*;
            domain.blocks.par_iter_mut().enumerate().try_for_each(evaluate)
        };
        #[cfg(not(feature = "parallel"))]
        let result = domain.blocks.iter_mut().enumerate().try_for_each(evaluate);

        result.map_err(fatal)
    }

    fn for_each_block<F>(&self, domain: &mut Domain, f: F)
    where
        F: Fn(&mut MeshPartition) + Sync + Send,
    {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            domain.blocks.par_iter_mut().for_each(f);
        }
        #[cfg(not(feature = "parallel"))]
        domain.blocks.iter_mut().for_each(f);
    }

    /// `landIcePressure = max(0, -ρ_top·g·ssh)` without touching the grid.
    fn apply_top_density(&self, block: &mut MeshPartition) {
        let g = self.config.gravity;
        let track = self.config.track_effective_density;

        for cell in 0..block.n_cells() {
            if !block.modify_ssh_mask[cell] {
                mask_out(block, cell);
                continue;
            }
            let top_density = block.density.column(cell).first().copied().unwrap_or(0.0);
            block.land_ice_pressure[cell] = (-top_density * g * block.ssh[cell]).max(0.0);
            if track {
                block.effective_density_in_land_ice[cell] = top_density;
            }
        }
        block.land_ice_draft.copy_from_slice(&block.ssh);
    }

    /// Derive SSH or land-ice pressure in every masked-in cell.
    fn derive_block(&self, block: &mut MeshPartition, derived: Derived) {
        let g = self.config.gravity;
        let track = self.config.track_effective_density;

        for cell in 0..block.n_cells() {
            if !block.modify_ssh_mask[cell] {
                mask_out(block, cell);
                continue;
            }

            let max_level = block.max_level_cell[cell];
            let density = block.density.column(cell);
            let thickness = block.layer_thickness.column(cell);
            match derived {
                Derived::Ssh => {
                    block.ssh[cell] = depth_at_pressure(
                        block.land_ice_pressure[cell],
                        density,
                        thickness,
                        max_level,
                        g,
                    );
                }
                Derived::LandIcePressure => {
                    block.land_ice_pressure[cell] =
                        pressure_at_depth(block.ssh[cell], density, thickness, max_level, g)
                            .max(0.0);
                }
            }

            if track {
                let ssh = block.ssh[cell];
                block.effective_density_in_land_ice[cell] = if ssh != 0.0 {
                    -block.land_ice_pressure[cell] / (g * ssh)
                } else {
                    0.0
                };
            }
        }
        block.land_ice_draft.copy_from_slice(&block.ssh);
    }

    fn remap_tracers(
        &self,
        domain: &mut Domain,
        snapshot: &ReferenceGridSnapshot,
    ) -> Result<usize, BalanceError> {
        let remapper = TracerRemapper::new(self.collaborators.interpolator);
        let remap = |(i, block): (usize, &mut MeshPartition)| -> Result<usize, BalanceError> {
            let (old_z_mid, old_max_level) = snapshot.block(i);
            remapper
                .remap(
                    old_z_mid,
                    &block.z_mid,
                    old_max_level,
                    &block.max_level_cell,
                    &mut block.active_tracers,
                )
                .map_err(|source| BalanceError::Upstream {
                    stage: Stage::Remap,
                    block: BlockIndex::new(i),
                    source,
                })
        };

        if snapshot.n_blocks() != domain.n_blocks() {
            return Err(fatal(BalanceError::dimension_mismatch(
                "blocks after grid rebuild",
                snapshot.n_blocks(),
                domain.n_blocks(),
            )));
        }

        #[cfg(feature = "parallel")]
        let counts: Result<Vec<usize>, BalanceError> = {
            use rayon::prelude::*;
            domain.blocks.par_iter_mut().enumerate().map(remap).collect()
        };
        #[cfg(not(feature = "parallel"))]
        let counts: Result<Vec<usize>, BalanceError> =
            domain.blocks.iter_mut().enumerate().map(remap).collect();

        Ok(counts.map_err(fatal)?.into_iter().sum())
    }

    fn summarize(
        &self,
        domain: &Domain,
        ssh_before: &[Vec<f64>],
        grid_rebuilt: bool,
        columns_remapped: usize,
    ) -> BalanceSummary {
        let mut summary = BalanceSummary {
            init_variable: self.config.init_variable,
            n_blocks: domain.n_blocks(),
            cells_modified: 0,
            cells_masked_out: 0,
            max_abs_ssh: 0.0,
            max_land_ice_pressure: 0.0,
            max_ssh_change: 0.0,
            grid_rebuilt,
            columns_remapped,
        };

        for (block, before) in domain.blocks.iter().zip(ssh_before) {
            let masked_in = block.n_masked_in();
            summary.cells_modified += masked_in;
            summary.cells_masked_out += block.n_cells() - masked_in;
            for cell in 0..block.n_cells() {
                let ssh = block.ssh[cell];
                summary.max_abs_ssh = summary.max_abs_ssh.max(ssh.abs());
                summary.max_land_ice_pressure =
                    summary.max_land_ice_pressure.max(block.land_ice_pressure[cell]);
                summary.max_ssh_change = summary.max_ssh_change.max((ssh - before[cell]).abs());
            }
        }
        summary
    }
}

/// Cells outside the mask carry no SSH, no ice load and no effective density.
///
/// Applies whether or not effective density is tracked; the flag only gates
/// deriving it for cells inside the mask.
fn mask_out(block: &mut MeshPartition, cell: usize) {
    block.ssh[cell] = 0.0;
    block.land_ice_pressure[cell] = 0.0;
    block.effective_density_in_land_ice[cell] = 0.0;
}
