//! Relay tasks and the per-block batch they are collected into.

use std::fmt;

use neo_apis::{Block, Uint256};

/// Storage key prefix of a deposit record in the bridge contract.
pub const DEPOSIT_PREFIX: u8 = 0x01;
/// Storage key of the bridge validator set.
pub const VALIDATORS_KEY: u8 = 0x03;
/// Storage key prefix of a state validator set, followed by its index.
pub const STATE_VALIDATORS_PREFIX: u8 = 0x04;

/// A bridge contract method on the destination chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SyncMethod {
    /// `syncHeader`
    Header,
    /// `syncStateRoot`
    StateRoot,
    /// `syncValidators`
    Validators,
    /// `syncStateRootValidatorsAddress`
    StateValidators,
    /// `requestMint`
    RequestMint,
}

impl SyncMethod {
    /// The contract method name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Header => "syncHeader",
            Self::StateRoot => "syncStateRoot",
            Self::Validators => "syncValidators",
            Self::StateValidators => "syncStateRootValidatorsAddress",
            Self::RequestMint => "requestMint",
        }
    }
}

impl fmt::Display for SyncMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A source event that must be registered on the destination chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Task {
    /// A deposit above the mint threshold.
    Deposit {
        /// The transaction that emitted the deposit.
        txid: Uint256,
        /// The bridge request id.
        request_id: u64,
    },
    /// The bridge validator set changed.
    ValidatorsDesignate {
        /// The transaction that emitted the change.
        txid: Uint256,
    },
    /// The state validator role was designated anew.
    StateValidatorsChange {
        /// The transaction that emitted the designation.
        txid: Uint256,
        /// The block index the designation takes effect at.
        validator_set_index: u32,
    },
}

impl Task {
    /// The transaction the task's event was emitted in.
    #[must_use]
    pub const fn txid(&self) -> Uint256 {
        match self {
            Self::Deposit { txid, .. }
            | Self::ValidatorsDesignate { txid }
            | Self::StateValidatorsChange { txid, .. } => *txid,
        }
    }

    /// The destination method that registers the task.
    #[must_use]
    pub const fn method(&self) -> SyncMethod {
        match self {
            Self::Deposit { .. } => SyncMethod::RequestMint,
            Self::ValidatorsDesignate { .. } => SyncMethod::Validators,
            Self::StateValidatorsChange { .. } => SyncMethod::StateValidators,
        }
    }

    /// A short label for logs and metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Deposit { .. } => "deposit",
            Self::ValidatorsDesignate { .. } => "validators_designate",
            Self::StateValidatorsChange { .. } => "state_validators_change",
        }
    }

    /// The bridge contract storage key whose proof accompanies the task.
    #[must_use]
    pub fn storage_key(&self) -> Vec<u8> {
        match self {
            Self::Deposit { request_id, .. } => {
                let be = request_id.to_be_bytes();
                let first = be.iter().position(|&b| b != 0).unwrap_or(be.len());
                let mut key = Vec::with_capacity(1 + be.len() - first);
                key.push(DEPOSIT_PREFIX);
                key.extend_from_slice(&be[first..]);
                key
            }
            Self::ValidatorsDesignate { .. } => vec![VALIDATORS_KEY],
            Self::StateValidatorsChange {
                validator_set_index,
                ..
            } => {
                let mut key = Vec::with_capacity(5);
                key.push(STATE_VALIDATORS_PREFIX);
                key.extend_from_slice(&validator_set_index.to_be_bytes());
                key
            }
        }
    }
}

/// The outcome of classifying one block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskBatch {
    /// The block.
    pub block: Block,
    /// Whether the block's header must be synced because the committee changed.
    pub is_joint: bool,
    /// Tasks in block, execution and notification order.
    pub tasks: Vec<Task>,
}

impl TaskBatch {
    /// An empty batch for `block`.
    #[must_use]
    pub const fn new(block: Block, is_joint: bool) -> Self {
        Self {
            block,
            is_joint,
            tasks: Vec::new(),
        }
    }

    /// The block index.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.block.header.index
    }

    /// Whether any task was found.
    #[must_use]
    pub fn has_tasks(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Whether the destination needs this block's header, either to follow a
    /// committee change or to verify the tasks' inclusion proofs.
    #[must_use]
    pub fn needs_header_sync(&self) -> bool {
        self.is_joint || self.has_tasks()
    }
}
