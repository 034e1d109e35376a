//! Persistence of payment channels.
//!
//! Channels are saved after every accepted state transition and loaded before the next one.

pub mod channel;
pub mod errors;
pub mod inmemory;
pub mod persistent;

#[cfg(test)]
pub(crate) mod testing;
