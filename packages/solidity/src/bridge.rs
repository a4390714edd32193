//! Solidity bindings for the `Bridge` contract on the destination chain.
//!
//! The header and state root sync methods take the canonical binary encoding of
//! the source chain entity. The remaining methods take a transaction inclusion
//! proof together with a storage proof anchored at a verified state root.

use alloy_primitives::{Bytes, U256};
use alloy_sol_types::SolCall;

alloy_sol_types::sol!(
    #[derive(Debug, PartialEq, Eq)]
    #[allow(missing_docs)]
    interface IBridge {
        function syncHeader(bytes rawHeader) external;
        function syncStateRoot(bytes rawStateRoot) external;
        function syncValidators(
            uint32 blockIndex,
            uint256 txid,
            bytes txProof,
            uint32 stateRootIndex,
            bytes stateProof
        ) external;
        function syncStateRootValidatorsAddress(
            uint32 blockIndex,
            uint256 txid,
            bytes txProof,
            uint32 stateRootIndex,
            bytes stateProof
        ) external;
        function requestMint(
            uint32 blockIndex,
            uint256 txid,
            bytes txProof,
            uint32 stateRootIndex,
            bytes stateProof
        ) external;
    }
);

/// The arguments shared by every state synchronization call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StateSyncArgs {
    /// Index of the source block holding the transaction.
    pub block_index: u32,
    /// Source transaction id, read as a big-endian integer.
    pub txid: U256,
    /// Merkle path of the transaction within the block.
    pub tx_proof: Bytes,
    /// Index of the verified state root the storage proof is anchored at.
    pub state_root_index: u32,
    /// Storage proof of the bridge contract key.
    pub state_proof: Bytes,
}

/// Encodes a `syncHeader` call.
#[must_use]
pub fn sync_header_calldata(raw_header: Vec<u8>) -> Vec<u8> {
    IBridge::syncHeaderCall {
        rawHeader: raw_header.into(),
    }
    .abi_encode()
}

/// Encodes a `syncStateRoot` call.
#[must_use]
pub fn sync_state_root_calldata(raw_state_root: Vec<u8>) -> Vec<u8> {
    IBridge::syncStateRootCall {
        rawStateRoot: raw_state_root.into(),
    }
    .abi_encode()
}

/// Encodes a `syncValidators` call.
#[must_use]
pub fn sync_validators_calldata(args: StateSyncArgs) -> Vec<u8> {
    IBridge::syncValidatorsCall {
        blockIndex: args.block_index,
        txid: args.txid,
        txProof: args.tx_proof,
        stateRootIndex: args.state_root_index,
        stateProof: args.state_proof,
    }
    .abi_encode()
}

/// Encodes a `syncStateRootValidatorsAddress` call.
#[must_use]
pub fn sync_state_root_validators_calldata(args: StateSyncArgs) -> Vec<u8> {
    IBridge::syncStateRootValidatorsAddressCall {
        blockIndex: args.block_index,
        txid: args.txid,
        txProof: args.tx_proof,
        stateRootIndex: args.state_root_index,
        stateProof: args.state_proof,
    }
    .abi_encode()
}

/// Encodes a `requestMint` call.
#[must_use]
pub fn request_mint_calldata(args: StateSyncArgs) -> Vec<u8> {
    IBridge::requestMintCall {
        blockIndex: args.block_index,
        txid: args.txid,
        txProof: args.tx_proof,
        stateRootIndex: args.state_root_index,
        stateProof: args.state_proof,
    }
    .abi_encode()
}
