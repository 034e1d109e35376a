//! Errors that can occur while deriving or receiving revocation secrets.

use std::fmt;

use thiserror::Error;

use crate::tree::MAX_INDEX;

/// Which child of a parent node failed a consistency check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildSide {
    /// The left child.
    Left,
    /// The right child.
    Right,
}

impl fmt::Display for ChildSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildSide::Left => write!(f, "left"),
            ChildSide::Right => write!(f, "right"),
        }
    }
}

/// Errors that can occur in the elkrem sender, receiver and revocation chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ElkremError {
    /// The requested index is beyond the capacity of the tree.
    #[error("index {0} exceeds the maximum elkrem index {MAX_INDEX}")]
    IndexOutOfRange(u64),

    /// The requested index cannot be reached from the given subtree root.
    #[error("index {target} is not in the subtree rooted at {root}")]
    NotInSubtree {
        /// The index that was requested.
        target: u64,
        /// The index of the subtree root.
        root: u64,
    },

    /// The receiver has not been given the secret for the requested index yet.
    #[error("secret for index {requested} not received yet")]
    NotReceived {
        /// The index that was requested.
        requested: u64,
    },

    /// A newly received secret is not the parent of the two subtrees on top of the stack.
    #[error("{side} child mismatch when adding secret for index {index}")]
    ChildMismatch {
        /// The index of the secret being added.
        index: u64,
        /// The child that did not match.
        side: ChildSide,
    },

    /// The secret cannot be used as a secp256k1 scalar.
    #[error("secret is not a valid secp256k1 scalar")]
    InvalidScalar,

    /// A revealed secret failed verification against its committed point or the chain.
    ///
    /// The receive chain is append-only, so this cannot be recovered from by retrying.
    #[error("revocation chain verification failed at index {index}: {reason}")]
    ChainVerificationFailed {
        /// The index of the secret that failed verification.
        index: u64,
        /// Why the verification failed.
        reason: String,
    },
}

/// The result type for elkrem operations.
pub type ElkremResult<T> = Result<T, ElkremError>;
