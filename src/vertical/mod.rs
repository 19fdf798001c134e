//! Vertical coordinate and water-column utilities.
//!
//! This module provides the z-star (terrain-following) vertical grid used
//! under ice shelves, together with the column-wise hydrostatic integrator
//! that ties sea-surface height to the overlying land-ice pressure.
//!
//! # Z-star Coordinates
//!
//! Reference level interfaces `refBottomDepth` are stretched proportionally
//! between the sea surface η and the sea floor -H:
//!
//! ```text
//! h_k = h⁰_k × (η + H) / H
//! ```
//!
//! Under an ice shelf η is the ice draft, often hundreds of meters below
//! zero, so every layer is compressed by the same factor.
//!
//! # Components
//!
//! - [`pressure_at_depth`] / [`depth_at_pressure`]: hydrostatic integration
//!   and its inverse for one column
//! - [`build_column`] / [`build_column_into`]: one z-star column
//! - [`VerticalGridBuilder`]: the whole domain, with partial-bottom-cell
//!   adjustment and optional rx1-constrained generation
//! - [`ColumnInterpolator`] / [`LinearInterpolator`]: profile interpolation
//!   used when tracers are remapped
//!
//! # Example
//!
//! ```
//! use landice_balance::mesh::{Domain, MeshPartition};
//! use landice_balance::vertical::{GridMode, PartialBottomCells, VerticalGridBuilder};
//!
//! let mut block = MeshPartition::new(1, vec![10.0, 30.0, 60.0], &["temperature", "salinity"]);
//! block.bottom_depth[0] = 50.0;
//! block.max_level_cell[0] = 3;
//! let mut domain = Domain::single(block);
//!
//! let pbc = PartialBottomCells::default();
//! let builder = VerticalGridBuilder::new(&pbc);
//! builder.build_grid_for_domain(&mut domain, GridMode::Initial).unwrap();
//!
//! // Ice draft of 20 m compresses the column
//! domain.blocks[0].ssh[0] = -20.0;
//! builder.build_grid_for_domain(&mut domain, GridMode::SshUpdated).unwrap();
//!
//! let total: f64 = domain.blocks[0].layer_thickness.column(0).iter().sum();
//! assert!((total - 30.0).abs() < 1e-10);
//! ```

mod constrained;
mod grid;
mod hydrostatics;
mod interpolation;
mod partial_bottom;
mod zstar;

pub use constrained::ConstrainedGridGenerator;
pub use grid::{GridMode, VerticalGridBuilder};
pub use hydrostatics::{column_weight, depth_at_pressure, pressure_at_depth};
pub use interpolation::{ColumnInterpolator, LinearInterpolator};
pub use partial_bottom::{BottomDepthAdjuster, FullBottomCells, PartialBottomCells};
pub use zstar::{ColumnSlices, ZStarColumn, build_column, build_column_into};
