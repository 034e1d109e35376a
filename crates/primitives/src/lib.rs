//! This crate contains general types, constants and pure functions that need to be shared across
//! multiple crates of the payment channel node.
//!
//! It lies at the bottom of the crate-hierarchy in this workspace i.e., it does not depend on any
//! other crate in this workspace.

pub mod constants;
pub mod outpoint;
pub mod types;

pub use types::{PeerId, PeerIdx, StateIdx};
