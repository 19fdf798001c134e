//! Tracer handling when the vertical grid moves.
//!
//! - [`TracerRemapper`]: re-interpolates active tracer columns from an old
//!   set of mid-layer depths onto a new one

mod remap;

pub use remap::TracerRemapper;
