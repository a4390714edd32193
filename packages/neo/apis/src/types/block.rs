//! Blocks and headers as returned by `getblock` in verbose mode.

use serde::{Deserialize, Serialize};

use super::{Uint160, Uint256};
use crate::serde_utils;

/// A verification witness: the invocation script carries the signatures,
/// the verification script the multi-signature contract they satisfy.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Witness {
    /// The invocation script.
    #[serde(with = "serde_utils::base64_bytes")]
    pub invocation: Vec<u8>,
    /// The verification script.
    #[serde(with = "serde_utils::base64_bytes")]
    pub verification: Vec<u8>,
}

/// A block header.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// The block hash.
    pub hash: Uint256,
    /// The header version.
    pub version: u32,
    /// The hash of the previous block.
    #[serde(rename = "previousblockhash")]
    pub prev_hash: Uint256,
    /// The merkle root of the block's transactions.
    #[serde(rename = "merkleroot")]
    pub merkle_root: Uint256,
    /// Block timestamp in milliseconds.
    #[serde(rename = "time")]
    pub timestamp: u64,
    /// The block nonce.
    #[serde(with = "serde_utils::hex_u64")]
    pub nonce: u64,
    /// The block index.
    pub index: u32,
    /// Index of the primary consensus node.
    #[serde(rename = "primary")]
    pub primary_index: u8,
    /// Script hash of the committee that must sign the next block.
    #[serde(rename = "nextconsensus", with = "serde_utils::address")]
    pub next_consensus: Uint160,
    /// The header witnesses.
    pub witnesses: Vec<Witness>,
}

/// The part of a verbose transaction the relayer needs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInfo {
    /// The transaction id.
    pub hash: Uint256,
}

/// A block with its transaction list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// The block header.
    #[serde(flatten)]
    pub header: Header,
    /// The transactions in block order.
    #[serde(rename = "tx")]
    pub transactions: Vec<TransactionInfo>,
}

impl Block {
    /// Returns the block index.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.header.index
    }

    /// Returns the transaction ids in block order.
    #[must_use]
    pub fn txids(&self) -> Vec<Uint256> {
        self.transactions.iter().map(|tx| tx.hash).collect()
    }
}
