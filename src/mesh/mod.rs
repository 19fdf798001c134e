//! Mesh partitions and their per-cell storage.
//!
//! - [`ColumnField`]: per-cell vertical profiles, one contiguous column per cell
//! - [`ActiveTracers`]: named tracer fields, remapped in place
//! - [`MeshPartition`]: a block of cells with every array the balance touches
//! - [`Domain`]: the ordered list of blocks owned by this process

mod domain;
mod field;
mod partition;

pub use domain::Domain;
pub use field::{ActiveTracers, ColumnField};
pub use partition::MeshPartition;
