//! Remapping of active tracers between vertical grids.
//!
//! After the grid is rebuilt around a new SSH, each tracer column still holds
//! values sampled at the old `zMid`. The remapper re-samples every column at
//! the new `zMid` with linear interpolation, extrapolating beyond the old
//! depth range. Columns that are inactive on either grid are left alone.

use crate::constants::FILL_VALUE;
use crate::error::CollaboratorError;
use crate::mesh::{ActiveTracers, ColumnField};
use crate::vertical::ColumnInterpolator;

/// Remaps tracer columns from one grid to another.
#[derive(Clone, Copy)]
pub struct TracerRemapper<'a> {
    interpolator: &'a dyn ColumnInterpolator,
}

impl<'a> TracerRemapper<'a> {
    pub fn new(interpolator: &'a dyn ColumnInterpolator) -> Self {
        Self { interpolator }
    }

    /// Remap every tracer of every cell from `old_z_mid` to `new_z_mid`.
    ///
    /// Target levels the interpolator leaves unwritten are set to
    /// [`FILL_VALUE`]. Returns the number of columns remapped (per tracer).
    pub fn remap(
        &self,
        old_z_mid: &ColumnField,
        new_z_mid: &ColumnField,
        old_max_level: &[usize],
        new_max_level: &[usize],
        tracers: &mut ActiveTracers,
    ) -> Result<usize, CollaboratorError> {
        let n_cells = old_z_mid.n_cells();
        let n_levels = old_z_mid.n_levels();
        if new_z_mid.n_cells() != n_cells
            || old_max_level.len() != n_cells
            || new_max_level.len() != n_cells
        {
            return Err(CollaboratorError::new(1, "remap: cell counts disagree"));
        }
        if new_z_mid.n_levels() != n_levels {
            return Err(CollaboratorError::new(1, "remap: level counts disagree"));
        }
        if old_max_level.iter().chain(new_max_level).any(|&m| m > n_levels) {
            return Err(CollaboratorError::new(1, "remap: maxLevelCell exceeds nVertLevels"));
        }
        if tracers
            .fields()
            .iter()
            .any(|f| f.n_cells() != n_cells || f.n_levels() != n_levels)
        {
            return Err(CollaboratorError::new(1, "remap: tracer field has wrong shape"));
        }

        let remap_field = |field: &mut ColumnField| {
            let mut source = Vec::with_capacity(n_levels);
            let mut target = Vec::with_capacity(n_levels);
            for cell in 0..n_cells {
                let (old_max, new_max) = (old_max_level[cell], new_max_level[cell]);
                if old_max == 0 || new_max == 0 {
                    continue;
                }

                let column = field.column_mut(cell);
                source.clear();
                source.extend_from_slice(&column[..old_max]);
                target.clear();
                target.resize(new_max, FILL_VALUE);

                self.interpolator.interpolate_column(
                    &old_z_mid.column(cell)[..old_max],
                    &source,
                    &new_z_mid.column(cell)[..new_max],
                    &mut target,
                    true,
                );
                column[..new_max].copy_from_slice(&target);
            }
        };

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            tracers.fields_mut().par_iter_mut().for_each(remap_field);
        }
        #[cfg(not(feature = "parallel"))]
        tracers.fields_mut().iter_mut().for_each(remap_field);

        let active = old_max_level
            .iter()
            .zip(new_max_level)
            .filter(|&(&o, &n)| o > 0 && n > 0)
            .count();
        Ok(active)
    }
}
