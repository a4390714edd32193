//! The boundary between the relay pipeline and the two chains.
//!
//! [`SourceChain`] reads blocks, logs, state roots and storage proofs from the
//! source ledger. [`DestinationChain`] estimates, broadcasts and polls
//! transactions on the destination, and [`TransactionSigner`] signs them.

use alloy::{
    consensus::TxLegacy,
    primitives::{Address, Bytes, TxHash, U256},
};
use neo_apis::{ApplicationLog, Block, StateRoot, Uint160, Uint256};

pub mod evm;
pub mod neo;
pub mod rejection;

pub use rejection::Rejection;

/// A failure talking to either chain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[allow(clippy::module_name_repetitions)]
pub enum ChainError {
    /// The node could not be reached or is lagging; retrying may succeed.
    #[error("chain unavailable: {0}")]
    Unavailable(String),

    /// The node answered with something that cannot be used.
    #[error("malformed chain response: {0}")]
    Malformed(String),
}

impl ChainError {
    /// Whether retrying later may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// A failure of a destination call that may carry a contract rejection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DestinationError {
    /// The call reverted or the node refused the transaction.
    #[error("rejected: {0}")]
    Rejected(String),

    /// Any other failure.
    #[error(transparent)]
    Chain(#[from] ChainError),
}

/// A message call used for gas estimation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallRequest {
    /// The sender.
    pub from: Address,
    /// The bridge contract.
    pub to: Address,
    /// The gas price the transaction will pay.
    pub gas_price: u128,
    /// The value transferred.
    pub value: U256,
    /// The calldata.
    pub input: Bytes,
}

/// A signed transaction ready to broadcast.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedTransaction {
    /// The transaction hash.
    pub hash: TxHash,
    /// The EIP-2718 encoded transaction.
    pub raw: Bytes,
}

/// Read access to the source ledger.
#[async_trait::async_trait]
pub trait SourceChain: Send + Sync {
    /// The block at `index`, or `None` if it has not been produced yet.
    async fn block(&self, index: u32) -> Result<Option<Block>, ChainError>;

    /// The execution log of the transaction `txid`.
    async fn application_log(&self, txid: Uint256) -> Result<ApplicationLog, ChainError>;

    /// The state root at `index`, or `None` if it has not been computed yet.
    async fn state_root(&self, index: u32) -> Result<Option<StateRoot>, ChainError>;

    /// The storage proof of `key` in `contract` against the trie `root`.
    async fn proof(
        &self,
        root: Uint256,
        contract: Uint160,
        key: &[u8],
    ) -> Result<Option<Vec<u8>>, ChainError>;
}

/// Transaction access to the destination ledger.
#[async_trait::async_trait]
pub trait DestinationChain: Send + Sync {
    /// The EIP-155 chain id.
    async fn chain_id(&self) -> Result<u64, ChainError>;

    /// The current gas price.
    async fn gas_price(&self) -> Result<u128, ChainError>;

    /// The next nonce of `address`, counting pending transactions.
    async fn nonce(&self, address: Address) -> Result<u64, ChainError>;

    /// Dry-runs `call` and returns its gas usage. A revert is reported as
    /// [`DestinationError::Rejected`] carrying the revert reason.
    async fn estimate_gas(&self, call: &CallRequest) -> Result<u64, DestinationError>;

    /// Broadcasts an encoded signed transaction.
    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<TxHash, DestinationError>;

    /// Whether the transaction has been included in a block.
    async fn is_confirmed(&self, hash: TxHash) -> Result<bool, ChainError>;
}

/// Signs destination transactions.
pub trait TransactionSigner: Send + Sync {
    /// The sender address.
    fn address(&self) -> Address;

    /// Signs `tx` for `chain_id` (EIP-155).
    ///
    /// # Errors
    /// Returns an error if the signer fails.
    fn sign(&self, chain_id: u64, tx: TxLegacy) -> Result<SignedTransaction, alloy::signers::Error>;
}
