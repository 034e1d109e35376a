//! The receiving side of an elkrem tree.

use bitcoin::hashes::sha256d;
use serde::{Deserialize, Serialize};

use crate::{
    errors::{ChildSide, ElkremError, ElkremResult},
    tree::{descend, left_child, right_child, MAX_INDEX},
};

/// A subtree root kept by the receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct ElkremNode {
    index: u64,
    height: u8,
    hash: sha256d::Hash,
}

/// Collects secrets revealed by the owner of an elkrem tree, in index order.
///
/// Only the roots of the complete subtrees received so far are stored, so the memory needed is
/// logarithmic in the number of secrets received.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElkremReceiver {
    nodes: Vec<ElkremNode>,
}

impl ElkremReceiver {
    /// Creates an empty receiver.
    pub const fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// The index the next received secret is expected to have.
    pub fn next_index(&self) -> u64 {
        self.nodes.last().map_or(0, |node| node.index + 1)
    }

    /// The highest index received so far, if any.
    pub fn upto(&self) -> Option<u64> {
        self.nodes.last().map(|node| node.index)
    }

    /// Adds the next secret.
    ///
    /// If the two subtrees on top of the stack have the same height, the new secret must be their
    /// parent. It is checked against both before they are replaced by it. The receiver is left
    /// untouched on error.
    pub fn add_next(&mut self, hash: sha256d::Hash) -> ElkremResult<()> {
        let index = self.next_index();
        if index > MAX_INDEX {
            return Err(ElkremError::IndexOutOfRange(index));
        }

        let mut node = ElkremNode {
            index,
            height: 0,
            hash,
        };

        let len = self.nodes.len();
        if len >= 2 && self.nodes[len - 2].height == self.nodes[len - 1].height {
            let left = self.nodes[len - 2];
            let right = self.nodes[len - 1];

            if left_child(&hash) != left.hash {
                return Err(ElkremError::ChildMismatch {
                    index,
                    side: ChildSide::Left,
                });
            }
            if right_child(&hash) != right.hash {
                return Err(ElkremError::ChildMismatch {
                    index,
                    side: ChildSide::Right,
                });
            }

            node.height = right.height + 1;
            self.nodes.truncate(len - 2);
        }

        self.nodes.push(node);

        Ok(())
    }

    /// Returns a previously received secret.
    pub fn at_index(&self, index: u64) -> ElkremResult<sha256d::Hash> {
        let node = self
            .nodes
            .iter()
            .find(|node| node.index >= index)
            .ok_or(ElkremError::NotReceived { requested: index })?;

        descend(index, node.index, node.height, node.hash)
    }
}

#[cfg(test)]
mod tests {
    use bitcoin::hashes::Hash;

    use super::*;
    use crate::sender::ElkremSender;

    fn sender() -> ElkremSender {
        ElkremSender::new(sha256d::Hash::hash(b"receiver tests"))
    }

    #[test]
    fn receives_and_reproduces_every_secret() {
        let sender = sender();
        let mut receiver = ElkremReceiver::new();

        for index in 0..300 {
            receiver
                .add_next(sender.at_index(index).unwrap())
                .expect("secrets from the same tree must be accepted");
            assert_eq!(receiver.upto(), Some(index));
        }

        for index in 0..300 {
            assert_eq!(
                receiver.at_index(index).unwrap(),
                sender.at_index(index).unwrap()
            );
        }

        // 300 secrets need at most one stored subtree per bit of 300
        assert!(receiver.nodes.len() <= 9);
        assert_eq!(
            receiver.at_index(300),
            Err(ElkremError::NotReceived { requested: 300 })
        );
    }

    #[test]
    fn rejects_secret_from_another_tree() {
        let sender = sender();
        let other = ElkremSender::new(sha256d::Hash::hash(b"another tree"));
        let mut receiver = ElkremReceiver::new();

        receiver.add_next(sender.at_index(0).unwrap()).unwrap();
        receiver.add_next(sender.at_index(1).unwrap()).unwrap();

        // index 2 is the parent of 0 and 1 and must be consistent with them
        let before = receiver.clone();
        let err = receiver.add_next(other.at_index(2).unwrap()).unwrap_err();
        assert!(matches!(err, ElkremError::ChildMismatch { index: 2, .. }));
        assert_eq!(receiver, before, "receiver must not change on error");

        receiver.add_next(sender.at_index(2).unwrap()).unwrap();
        assert_eq!(receiver.next_index(), 3);
    }

    #[test]
    fn empty_receiver_expects_index_zero() {
        let receiver = ElkremReceiver::default();
        assert_eq!(receiver.next_index(), 0);
        assert_eq!(receiver.upto(), None);
        assert!(receiver.at_index(0).is_err());
    }
}
