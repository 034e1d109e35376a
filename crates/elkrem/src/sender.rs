//! The sending side of an elkrem tree.

use std::fmt;

use bitcoin::hashes::{
    hmac::{Hmac, HmacEngine},
    sha256, sha256d, Hash, HashEngine,
};
use serde::{Deserialize, Serialize};

use crate::{
    errors::{ElkremError, ElkremResult},
    tree::{descend, MAX_HEIGHT, MAX_INDEX},
};

/// Domain separation tag for deriving elkrem roots from a seed.
const ROOT_TAG: &[u8] = b"paychan/elkrem-root";

/// The owner of an elkrem tree.
///
/// Holds only the root hash, from which every secret in the tree can be derived on demand. The
/// same root always yields the same secrets, so the sender survives restarts as long as the root
/// (or the seed and context it was derived from) is kept.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElkremSender {
    root: sha256d::Hash,
}

impl ElkremSender {
    /// Creates a new sender from a root hash.
    pub const fn new(root: sha256d::Hash) -> Self {
        Self { root }
    }

    /// Deterministically derives a sender from a private seed and a public context, such as the
    /// funding outpoint of the channel the tree is used for.
    pub fn from_seed(seed: &[u8], context: &[u8]) -> Self {
        let mut engine = HmacEngine::<sha256::Hash>::new(seed);
        engine.input(ROOT_TAG);
        engine.input(context);
        let root = Hmac::<sha256::Hash>::from_engine(engine);

        Self::new(sha256d::Hash::from_byte_array(root.to_byte_array()))
    }

    /// Returns the secret at the given index.
    pub fn at_index(&self, index: u64) -> ElkremResult<sha256d::Hash> {
        if index > MAX_INDEX {
            return Err(ElkremError::IndexOutOfRange(index));
        }

        descend(index, MAX_INDEX, MAX_HEIGHT, self.root)
    }
}

impl fmt::Debug for ElkremSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElkremSender")
            .field("root", &"<redacted>")
            .finish()
    }
}
