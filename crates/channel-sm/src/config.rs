//! Configuration shared by every channel of a node.

use std::sync::Arc;

use bitcoin::Amount;
use paychan_primitives::constants::DEFAULT_MIN_BAL;

use crate::signer::CommitmentSigner;

/// Configuration shared by every channel of a node.
///
/// These stay the same over the lifetime of the node.
#[derive(Debug, Clone)]
pub struct ChannelCfg {
    /// The balance each party has to keep in a channel after any update.
    pub min_bal: Amount,
    /// Signs commitments with the node's identity key.
    pub signer: Arc<dyn CommitmentSigner>,
}

impl ChannelCfg {
    /// Creates a configuration with the default reserve.
    pub fn new(signer: Arc<dyn CommitmentSigner>) -> Self {
        Self {
            min_bal: DEFAULT_MIN_BAL,
            signer,
        }
    }

    /// Overrides the reserve.
    pub fn with_min_bal(mut self, min_bal: Amount) -> Self {
        self.min_bal = min_bal;
        self
    }

    /// Returns the reserve.
    pub const fn min_bal(&self) -> Amount {
        self.min_bal
    }

    /// Returns the commitment signer.
    pub fn signer(&self) -> &dyn CommitmentSigner {
        self.signer.as_ref()
    }
}
