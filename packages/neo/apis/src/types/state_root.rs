//! State roots as returned by `getstateroot`.

use serde::{Deserialize, Serialize};

use super::{Uint256, Witness};

/// The root of the ledger's global storage trie after a given block.
///
/// Roots are produced unsigned and later witnessed by the state validators;
/// only a witnessed root can anchor a storage proof on the destination.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRoot {
    /// The state root version.
    pub version: u8,
    /// The block index the root was computed for.
    pub index: u32,
    /// The trie root hash.
    #[serde(rename = "roothash")]
    pub root_hash: Uint256,
    /// The state validators' witnesses, empty until the root is signed.
    #[serde(default)]
    pub witnesses: Vec<Witness>,
}

impl StateRoot {
    /// Whether the root carries at least one witness.
    #[must_use]
    pub fn is_witnessed(&self) -> bool {
        !self.witnesses.is_empty()
    }
}
