//! [`SourceChain`] over the JSON-RPC client.

use neo_apis::{ApplicationLog, Block, NeoRpcClient, NeoRpcError, StateRoot, Uint160, Uint256};

use super::{ChainError, SourceChain};

impl From<NeoRpcError> for ChainError {
    fn from(e: NeoRpcError) -> Self {
        // An unknown item reaching here was requested as mandatory, which
        // means the node has not indexed it yet.
        if e.is_transient() || e.is_unknown_item() {
            Self::Unavailable(e.to_string())
        } else {
            Self::Malformed(e.to_string())
        }
    }
}

#[async_trait::async_trait]
impl SourceChain for NeoRpcClient {
    async fn block(&self, index: u32) -> Result<Option<Block>, ChainError> {
        Ok(self.get_block(index).await?)
    }

    async fn application_log(&self, txid: Uint256) -> Result<ApplicationLog, ChainError> {
        Ok(self.get_application_log(txid).await?)
    }

    async fn state_root(&self, index: u32) -> Result<Option<StateRoot>, ChainError> {
        Ok(self.get_state_root(index).await?)
    }

    async fn proof(
        &self,
        root: Uint256,
        contract: Uint160,
        key: &[u8],
    ) -> Result<Option<Vec<u8>>, ChainError> {
        Ok(self.get_proof(root, contract, key).await?)
    }
}
