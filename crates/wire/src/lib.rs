//! Fixed-layout binary codec for the three messages of a channel update round.
//!
//! Every message begins with the 36-byte funding outpoint of the channel it refers to:
//!
//! | Message     | Fields after the outpoint                           | Total |
//! |-------------|-----------------------------------------------------|-------|
//! | [`DeltaSig`] | delta (4), signature (64)                          | 104   |
//! | [`SigRev`]   | signature (64), revealed secret (32), next point (33) | 165 |
//! | [`Rev`]      | revealed secret (32), next point (33)              | 101   |
//!
//! Payloads are rejected unless their length matches the layout exactly.

pub mod errors;
pub mod messages;

pub use errors::{WireError, WireResult};
pub use messages::{ChannelMessage, DeltaSig, MessageType, Rev, SigRev};
