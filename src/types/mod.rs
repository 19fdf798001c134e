//! Strongly-typed domain types for safer APIs.
//!
//! Index newtypes keep cell, block and level indices from being mixed up
//! when errors and diagnostics report *where* something went wrong.
//!
//! ```
//! use landice_balance::types::{BlockIndex, CellIndex};
//!
//! let block = BlockIndex::new(0);
//! let cell = CellIndex::new(17);
//! assert_eq!(format!("{block}/{cell}"), "B0/C17");
//! ```

mod indices;

pub use indices::{BlockIndex, CellIndex};
