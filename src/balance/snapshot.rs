//! Saved reference grid for tracer remapping.

use log::trace;

use crate::mesh::{ColumnField, Domain};

/// Copy of every block's `zMid` and `maxLevelCell` taken before the grid is
/// rebuilt.
///
/// Lives for one balance pass. Dropping it releases the storage, which
/// happens on every exit path including early error returns.
#[derive(Debug)]
pub struct ReferenceGridSnapshot {
    z_mid: Vec<ColumnField>,
    max_level_cell: Vec<Vec<usize>>,
}

impl ReferenceGridSnapshot {
    /// Snapshot the current grid of `domain`.
    pub fn capture(domain: &Domain) -> Self {
        trace!("saving reference grid for {} blocks", domain.n_blocks());
        #[cfg(test)]
        snapshot_counts::CAPTURED.with(|c| c.set(c.get() + 1));
        Self {
            z_mid: domain.blocks.iter().map(|b| b.z_mid.clone()).collect(),
            max_level_cell: domain
                .blocks
                .iter()
                .map(|b| b.max_level_cell.clone())
                .collect(),
        }
    }

    /// Number of blocks captured.
    pub fn n_blocks(&self) -> usize {
        self.z_mid.len()
    }

    /// Saved `zMid` and `maxLevelCell` of block `index`.
    pub fn block(&self, index: usize) -> (&ColumnField, &[usize]) {
        (&self.z_mid[index], &self.max_level_cell[index])
    }
}

impl Drop for ReferenceGridSnapshot {
    fn drop(&mut self) {
        trace!("releasing reference grid for {} blocks", self.z_mid.len());
        #[cfg(test)]
        snapshot_counts::RELEASED.with(|c| c.set(c.get() + 1));
    }
}
