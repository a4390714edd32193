//! Transaction inclusion proofs and storage proofs.

use neo_apis::{Block, StateRoot, Uint160, Uint256};
use sha2::{Digest, Sha256};

use crate::{chain::SourceChain, encoding::BinWriter, error::RelayError};

/// A 32-byte node of the transaction merkle tree.
pub type Node = [u8; 32];

fn hash_pair(left: &Node, right: &Node) -> Node {
    let first = Sha256::new().chain_update(left).chain_update(right).finalize();
    Sha256::digest(first).into()
}

/// The merkle tree over a block's transaction ids.
///
/// Leaves are the ids in their internal byte order. A node without a sibling
/// is paired with itself.
#[derive(Clone, Debug)]
pub struct MerkleTree {
    levels: Vec<Vec<Node>>,
}

impl MerkleTree {
    /// Builds the tree over `leaves`.
    #[must_use]
    pub fn new(leaves: &[Uint256]) -> Self {
        let mut levels = vec![leaves.iter().map(|l| l.to_le_bytes()).collect::<Vec<_>>()];
        while levels.last().is_some_and(|level| level.len() > 1) {
            let next = levels[levels.len() - 1]
                .chunks(2)
                .map(|pair| hash_pair(&pair[0], pair.get(1).unwrap_or(&pair[0])))
                .collect();
            levels.push(next);
        }
        Self { levels }
    }

    /// The root, or `None` for an empty tree.
    #[must_use]
    pub fn root(&self) -> Option<Node> {
        self.levels.last().and_then(|level| level.first()).copied()
    }

    /// The path from leaf `index` to the root.
    #[must_use]
    pub fn proof(&self, index: usize) -> Option<MerkleProof> {
        if index >= self.levels[0].len() {
            return None;
        }
        let mut siblings = Vec::with_capacity(self.levels.len() - 1);
        let mut position = index;
        for level in &self.levels[..self.levels.len() - 1] {
            let sibling = level.get(position ^ 1).unwrap_or(&level[position]);
            siblings.push(*sibling);
            position /= 2;
        }
        Some(MerkleProof {
            index: u32::try_from(index).ok()?,
            siblings,
        })
    }
}

/// An inclusion proof: the leaf position and its siblings, bottom-up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleProof {
    /// The leaf position.
    pub index: u32,
    /// Sibling hashes from the leaf level upwards.
    pub siblings: Vec<Node>,
}

impl MerkleProof {
    /// `u32 index ‖ varint count ‖ siblings`.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut writer = BinWriter::new();
        writer.write_u32(self.index);
        writer.write_var_int(self.siblings.len() as u64);
        for sibling in &self.siblings {
            writer.write_bytes(sibling);
        }
        writer.into_bytes()
    }
}

/// Builds the proofs accompanying the tasks of one block.
#[derive(Debug)]
pub struct ProofBuilder {
    block_index: u32,
    txids: Vec<Uint256>,
    tree: MerkleTree,
}

impl ProofBuilder {
    /// Builds the transaction tree of `block` once, for all of its tasks.
    #[must_use]
    pub fn new(block: &Block) -> Self {
        let txids = block.txids();
        let tree = MerkleTree::new(&txids);
        Self {
            block_index: block.index(),
            txids,
            tree,
        }
    }

    /// The encoded inclusion proof of `txid`.
    ///
    /// # Errors
    /// Returns [`RelayError::TransactionNotInBlock`] if `txid` is not in the block.
    pub fn prove_inclusion(&self, txid: Uint256) -> Result<Vec<u8>, RelayError> {
        self.txids
            .iter()
            .position(|id| *id == txid)
            .and_then(|index| self.tree.proof(index))
            .map(|proof| proof.encode())
            .ok_or(RelayError::TransactionNotInBlock {
                txid,
                block: self.block_index,
            })
    }

    /// The storage proof of `key` in `contract` against `root`.
    ///
    /// # Errors
    /// Returns [`RelayError::ProofUnavailable`] if the source has no proof, or
    /// the source error if the request fails.
    pub async fn storage_proof<S: SourceChain + ?Sized>(
        &self,
        source: &S,
        root: &StateRoot,
        contract: Uint160,
        key: &[u8],
    ) -> Result<Vec<u8>, RelayError> {
        source
            .proof(root.root_hash, contract, key)
            .await?
            .ok_or_else(|| RelayError::ProofUnavailable {
                root: root.root_hash,
                key: alloy::hex::encode(key),
            })
    }
}
