//! This crate implements the state machine that updates the balance split of a payment channel.
//!
//! A channel moves from one state to the next in a round of three messages. The party pushing
//! funds proposes the new split with a signature over the counterparty's next commitment
//! ([`DeltaSig`](paychan_wire::DeltaSig)). The counterparty answers with its own signature and
//! revokes its previous commitment ([`SigRev`](paychan_wire::SigRev)). The proposer then revokes
//! its previous commitment ([`Rev`](paychan_wire::Rev)), which completes the round.
//!
//! The state machine is pure: it validates events against the current state, mutates the state
//! and emits duties (messages to send) and signals (round outcomes). Persistence and transport are
//! handled by its owner.

pub mod config;
pub mod context;
pub mod duties;
pub mod errors;
pub mod events;
pub mod machine;
pub mod signals;
pub mod signer;
pub mod state;
pub mod state_machine;
pub mod transitions;

#[cfg(test)]
pub(crate) mod testing;

pub use machine::{Channel, ChannelSummary};
pub use state::{ChannelState, UpdatePhase};
