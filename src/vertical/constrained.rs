//! Rx1-constrained grid generation.
//!
//! When a Haney-number (rx1) limit on the slope of layer interfaces between
//! neighbouring columns is configured, the whole-domain grid is produced by
//! an external generator instead of the column-by-column z-star builder.
//! The generator needs neighbour information the balance never sees, so it
//! operates on the full [`Domain`].

use crate::error::CollaboratorError;
use crate::mesh::Domain;

/// Builds `layerThickness`, `zMid` (and related fields) for every block
/// under an rx1 constraint, given the current SSH.
pub trait ConstrainedGridGenerator: Send + Sync {
    fn build_constrained_grid(&self, domain: &mut Domain) -> Result<(), CollaboratorError>;
}
