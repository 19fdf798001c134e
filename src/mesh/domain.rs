//! Ordered collection of mesh partitions owned by one process.

use crate::error::BalanceError;
use crate::mesh::MeshPartition;
use crate::types::BlockIndex;

/// The blocks of the mesh handled locally.
///
/// Blocks never share mutable state during a balance pass; each one is
/// visited in index order (or concurrently with the `parallel` feature).
#[derive(Clone, Debug, Default)]
pub struct Domain {
    pub blocks: Vec<MeshPartition>,
}

impl Domain {
    pub fn new(blocks: Vec<MeshPartition>) -> Self {
        Self { blocks }
    }

    /// Domain made of a single block.
    pub fn single(block: MeshPartition) -> Self {
        Self {
            blocks: vec![block],
        }
    }

    #[inline]
    pub fn n_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Total number of cells over all blocks.
    pub fn n_cells(&self) -> usize {
        self.blocks.iter().map(MeshPartition::n_cells).sum()
    }

    /// Block at `index`.
    pub fn block(&self, index: BlockIndex) -> &MeshPartition {
        &self.blocks[index]
    }

    /// Mutable block at `index`.
    pub fn block_mut(&mut self, index: BlockIndex) -> &mut MeshPartition {
        &mut self.blocks[index]
    }

    /// Blocks paired with their index.
    pub fn iter(&self) -> impl Iterator<Item = (BlockIndex, &MeshPartition)> {
        self.blocks
            .iter()
            .enumerate()
            .map(|(i, b)| (BlockIndex::new(i), b))
    }

    /// Mutable blocks paired with their index.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (BlockIndex, &mut MeshPartition)> {
        self.blocks
            .iter_mut()
            .enumerate()
            .map(|(i, b)| (BlockIndex::new(i), b))
    }

    /// Validate every block's array dimensions.
    pub fn validate(&self) -> Result<(), BalanceError> {
        self.blocks.iter().try_for_each(MeshPartition::validate)
    }
}
