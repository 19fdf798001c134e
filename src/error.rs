//! Error types for the land-ice balance.
//!
//! Every external collaborator reports failure through [`CollaboratorError`],
//! which carries the host model's numeric error code. The balance wraps that
//! in [`BalanceError`] together with the stage and block that failed, and
//! [`BalanceError::code`] hands the original code back to the host.

use std::fmt;

use thiserror::Error;

use crate::types::{BlockIndex, CellIndex};

/// Failure reported by an external collaborator (EOS, bottom-depth adjuster,
/// constrained grid generator, interpolator).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("error code {code}: {message}")]
pub struct CollaboratorError {
    /// Nonzero error code, passed through unchanged to the caller.
    pub code: i32,
    /// Human-readable description.
    pub message: String,
}

impl CollaboratorError {
    /// Create a collaborator error with the given code.
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Degenerate geometry found while building a single column.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    /// Bottom depth is zero or negative for an active column.
    #[error("bottom depth {bottom_depth} must be positive for an active column")]
    NonPositiveBottomDepth { bottom_depth: f64 },

    /// A layer ended up with zero or negative thickness.
    #[error("layer {level} has non-positive thickness {thickness}")]
    NonPositiveThickness { level: usize, thickness: f64 },

    /// More active levels than the partition has storage for.
    #[error("maxLevelCell {max_level} exceeds nVertLevels {n_vert_levels}")]
    TooManyLevels {
        max_level: usize,
        n_vert_levels: usize,
    },

    /// Output buffer or reference profile has the wrong length.
    #[error("{what}: expected length {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}

impl GridError {
    /// Numeric code reported to the host for any column failure.
    pub fn code(&self) -> i32 {
        1
    }
}

/// Pipeline stage in which an upstream collaborator failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Equation-of-state evaluation.
    Density,
    /// Partial-bottom-cell adjustment of the bottom depth.
    BottomDepth,
    /// Rx1-constrained grid generation.
    ConstrainedGrid,
    /// Tracer remapping onto the rebuilt grid.
    Remap,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Density => "density computation",
            Stage::BottomDepth => "partial-bottom-cell adjustment",
            Stage::ConstrainedGrid => "rx1-constrained grid generation",
            Stage::Remap => "tracer remapping",
        };
        f.write_str(name)
    }
}

/// Errors surfaced by the balance and the vertical-grid builder.
#[derive(Debug, Error)]
pub enum BalanceError {
    /// Unrecognized initialization variable in the configuration.
    #[error(
        "invalid init variable '{0}': expected 'ssh', 'landIcePressure' or \
         'landIcePressure_from_top_density'"
    )]
    InvalidMode(String),

    /// The rx1 constraint was requested without a generator to run it.
    #[error("rx1 constraint enabled but no constrained grid generator was supplied")]
    MissingConstrainedGenerator,

    /// Configuration could not be parsed.
    #[error("could not parse balance configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// A collaborator returned a nonzero code.
    #[error("{stage} failed in block {block}: {source}")]
    Upstream {
        stage: Stage,
        block: BlockIndex,
        #[source]
        source: CollaboratorError,
    },

    /// A domain-wide collaborator returned a nonzero code.
    #[error("{stage} failed: {source}")]
    DomainUpstream {
        stage: Stage,
        #[source]
        source: CollaboratorError,
    },

    /// A column could not be built.
    #[error("vertical grid failed in block {block}, cell {cell}: {source}")]
    Grid {
        block: BlockIndex,
        cell: CellIndex,
        #[source]
        source: GridError,
    },

    /// Arrays that must agree in size do not.
    #[error("dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}

impl BalanceError {
    /// Create a dimension mismatch error.
    pub fn dimension_mismatch(what: &'static str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            what,
            expected,
            actual,
        }
    }

    /// Numeric error code handed back to the host model.
    ///
    /// Upstream failures return the collaborator's own code unchanged.
    pub fn code(&self) -> i32 {
        match self {
            BalanceError::Upstream { source, .. } => source.code,
            BalanceError::DomainUpstream { source, .. } => source.code,
            BalanceError::Grid { source, .. } => source.code(),
            _ => 1,
        }
    }
}
