//! Equation-of-state evaluators.
//!
//! The balance treats density as the output of an external collaborator
//! behind the [`DensityEvaluator`] trait. Two implementations ship with the
//! crate: the UNESCO EOS-80 [`EquationOfState`] and the
//! [`LinearEquationOfState`].

mod equation_of_state;

pub use equation_of_state::{EquationOfState, LinearEquationOfState, RHO_0, SALINITY, TEMPERATURE};

use crate::error::CollaboratorError;
use crate::mesh::{ColumnField, MeshPartition};

/// Populates in-situ density from the current state of a partition.
///
/// `density` has the same shape as the partition's column fields. Any
/// nonzero code in the returned error aborts the balance.
pub trait DensityEvaluator: Send + Sync {
    fn compute_density(
        &self,
        block: &MeshPartition,
        density: &mut ColumnField,
    ) -> Result<(), CollaboratorError>;
}
