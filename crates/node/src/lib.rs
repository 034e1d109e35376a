//! The payment channel node.
//!
//! A [`Node`](node::Node) owns the channels of one identity. It runs update rounds on behalf of
//! local callers ([`Node::request_push`](node::Node::request_push)) and answers rounds started by
//! its peers (one reader task per peer, see
//! [`Node::run_peer_reader`](node::Node::run_peer_reader)).
//! Channels are persisted after every accepted transition. Outgoing messages are handed to a
//! single non-blocking [`Outbox`](transport::Outbox) that the transport layer drains.

pub mod config;
pub mod constants;
pub mod errors;
pub mod node;
pub mod peers;
pub mod registry;
pub mod router;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use node::Node;
