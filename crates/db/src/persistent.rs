//! Persistent storage of channels on disk.

pub mod config;
pub mod constants;
pub mod errors;
pub mod sled_store;

pub use sled_store::SledChannelDb;
