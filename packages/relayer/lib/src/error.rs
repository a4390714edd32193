//! Errors returned by the relay pipeline.

use alloy::primitives::TxHash;
use neo_apis::Uint256;

use crate::{
    chain::{ChainError, DestinationError},
    tasks::SyncMethod,
};

/// A source event whose arguments do not match the bridge protocol.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed {event} event in tx {txid}: {reason}")]
pub struct ProtocolViolation {
    /// The transaction that emitted the event.
    pub txid: Uint256,
    /// The event name.
    pub event: String,
    /// What was wrong with it.
    pub reason: String,
}

/// The error type of every relay operation.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs, clippy::module_name_repetitions)]
pub enum RelayError {
    #[error(transparent)]
    Protocol(#[from] ProtocolViolation),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error("state root {index} is not available yet")]
    StateRootNotYetAvailable { index: u32 },

    #[error("no verified state root in [{from}, {to})")]
    NoVerifiedStateRoot { from: u32, to: u32 },

    #[error("no storage proof for key 0x{key} at state root {root}")]
    ProofUnavailable { root: Uint256, key: String },

    #[error("transaction {txid} is not in block {block}")]
    TransactionNotInBlock { txid: Uint256, block: u32 },

    #[error("{method} rejected by the destination: {reason}")]
    Rejected { method: SyncMethod, reason: String },

    #[error("failed to sign {method} transaction: {source}")]
    Signing {
        method: SyncMethod,
        #[source]
        source: alloy::signers::Error,
    },

    #[error("transactions not confirmed after {rounds} rounds: {hashes:?}")]
    CommitExhausted { rounds: usize, hashes: Vec<TxHash> },

    #[error("block {index} is the last representable block index")]
    IndexSpaceExhausted { index: u32 },
}

impl RelayError {
    /// Whether the scanner should sleep and retry the same block.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Chain(e) => e.is_transient(),
            Self::StateRootNotYetAvailable { .. } => true,
            _ => false,
        }
    }

    /// Maps a destination error for `method`, keeping transport failures transient.
    #[must_use]
    pub fn from_destination(method: SyncMethod, error: DestinationError) -> Self {
        match error {
            DestinationError::Rejected(reason) => Self::Rejected { method, reason },
            DestinationError::Chain(e) => Self::Chain(e),
        }
    }
}
