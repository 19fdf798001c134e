//! SSH / land-ice pressure balance under ice shelves.
//!
//! - [`BalanceConfig`] / [`InitVariable`]: which quantity is known
//! - [`SshBalancer`]: runs the density, derivation, grid rebuild and remap
//!   stages over a [`crate::mesh::Domain`]
//! - [`ReferenceGridSnapshot`]: grid saved for the remap
//! - [`BalanceSummary`]: per-pass diagnostics

mod balancer;
mod config;
mod snapshot;
mod summary;

pub use balancer::{Collaborators, SshBalancer};
pub use config::{BalanceConfig, InitVariable};
pub use snapshot::ReferenceGridSnapshot;
pub use summary::BalanceSummary;
