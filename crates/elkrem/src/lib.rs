//! # Elkrem revocation chains
//!
//! Every update of a payment channel makes the previous commitment stale. To make a stale
//! commitment punishable, the party that holds it reveals a secret that the counterparty can use
//! to claim all funds should the stale commitment ever be broadcast.
//!
//! Those secrets come from an elkrem tree: a binary hash tree numbered in post-order, where every
//! child is derived from its parent with a one-way function. The owner of the root can compute
//! the secret at any index, while the receiver only needs to keep the roots of the subtrees it has
//! seen so far (at most one per height) to reproduce every secret it has ever received. Each newly
//! received secret is checked against the ones already stored, so a sender cannot hand out secrets
//! from two different trees.
//!
//! The public counterpart of a secret is its revocation point, which can be shared before the
//! secret itself so the counterparty can build the commitment that the secret will later revoke.

pub mod chain;
pub mod errors;
pub mod receiver;
pub mod sender;
mod tree;

pub use chain::{point_from_secret, RevocationChain, RevocationSecret};
pub use errors::{ElkremError, ElkremResult};
pub use receiver::ElkremReceiver;
pub use sender::ElkremSender;
pub use tree::{MAX_HEIGHT, MAX_INDEX};
