//! # landice-balance
//!
//! Balances sea-surface height against the land-ice pressure of an
//! overlying ice shelf for an ocean model with a z-star vertical
//! coordinate.
//!
//! This crate provides:
//! - Hydrostatic integration of a water column and its inverse
//! - Z-star vertical grid construction with partial bottom cells
//! - Linear remapping of active tracers when the grid moves
//! - The balance driver that ties these together over a partitioned domain
//!
//! Density, bottom-depth adjustment, profile interpolation and the
//! rx1-constrained grid generator are collaborators behind traits; the
//! crate ships default implementations of the first three.
//!
//! # Example
//!
//! ```
//! use landice_balance::{
//!     BalanceConfig, Collaborators, Domain, InitVariable, LinearEquationOfState,
//!     LinearInterpolator, MeshPartition, PartialBottomCells, SshBalancer,
//! };
//!
//! let mut block = MeshPartition::new(1, vec![50.0, 100.0, 200.0], &["temperature", "salinity"]);
//! block.bottom_depth[0] = 180.0;
//! block.max_level_cell[0] = 3;
//! block.modify_ssh_mask[0] = true;
//! block.active_tracers.column_mut(0, 0).fill(-1.8);
//! block.active_tracers.column_mut(1, 0).fill(34.5);
//! block.land_ice_pressure[0] = 1.0e6;
//! let mut domain = Domain::single(block);
//!
//! let eos = LinearEquationOfState::new();
//! let pbc = PartialBottomCells::default();
//! let balancer = SshBalancer::new(
//!     BalanceConfig::new(InitVariable::LandIcePressure),
//!     Collaborators::new(&eos, &LinearInterpolator, &pbc),
//! )
//! .unwrap();
//!
//! balancer.build_initial_grid(&mut domain).unwrap();
//! let summary = balancer.balance(&mut domain).unwrap();
//!
//! assert!(summary.grid_rebuilt);
//! assert!(domain.blocks[0].ssh[0] < -90.0);
//! ```

pub mod balance;
pub mod constants;
pub mod equations;
pub mod error;
pub mod mesh;
pub mod tracer;
pub mod types;
pub mod vertical;

pub use balance::{
    BalanceConfig, BalanceSummary, Collaborators, InitVariable, ReferenceGridSnapshot, SshBalancer,
};
pub use constants::{FILL_VALUE, GRAVITY};
pub use equations::{DensityEvaluator, EquationOfState, LinearEquationOfState};
pub use error::{BalanceError, CollaboratorError, GridError, Stage};
pub use mesh::{ActiveTracers, ColumnField, Domain, MeshPartition};
pub use tracer::TracerRemapper;
pub use types::{BlockIndex, CellIndex};
pub use vertical::{
    BottomDepthAdjuster, ColumnInterpolator, ConstrainedGridGenerator, FullBottomCells, GridMode,
    LinearInterpolator, PartialBottomCells, VerticalGridBuilder, depth_at_pressure,
    pressure_at_depth,
};
