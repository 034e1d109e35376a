//! Shape of the elkrem tree and the one-way child derivation.

use bitcoin::hashes::{sha256d, Hash, HashEngine};

use crate::errors::{ElkremError, ElkremResult};

/// Height of the root node. Leaves have height zero.
pub const MAX_HEIGHT: u8 = 47;

/// Index of the root node, which is also the largest usable index (`2^48 - 2`).
pub const MAX_INDEX: u64 = (1 << (MAX_HEIGHT as u64 + 1)) - 2;

/// Derives the left child of a node.
pub(crate) fn left_child(parent: &sha256d::Hash) -> sha256d::Hash {
    child(parent, b'l')
}

/// Derives the right child of a node.
pub(crate) fn right_child(parent: &sha256d::Hash) -> sha256d::Hash {
    child(parent, b'r')
}

fn child(parent: &sha256d::Hash, tag: u8) -> sha256d::Hash {
    let mut engine = sha256d::Hash::engine();
    engine.input(parent.as_byte_array());
    engine.input(&[tag]);
    sha256d::Hash::from_engine(engine)
}

/// Walks down from the node at `index` with the given `height` and `hash` to `target`.
///
/// Nodes are numbered in post-order: the right child of `i` is `i - 1` and the left child is
/// `i - 2^h`.
pub(crate) fn descend(
    target: u64,
    mut index: u64,
    mut height: u8,
    mut hash: sha256d::Hash,
) -> ElkremResult<sha256d::Hash> {
    let root = index;
    if target > index {
        return Err(ElkremError::NotInSubtree { target, root });
    }

    while target < index {
        if height == 0 {
            return Err(ElkremError::NotInSubtree { target, root });
        }

        let left_index = index - (1u64 << height);
        if target <= left_index {
            hash = left_child(&hash);
            index = left_index;
        } else {
            hash = right_child(&hash);
            index -= 1;
        }
        height -= 1;
    }

    Ok(hash)
}
