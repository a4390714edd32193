//! [`DestinationChain`] over an alloy provider and a local private key signer.

use alloy::{
    consensus::{SignableTransaction, TxEnvelope, TxLegacy},
    eips::eip2718::Encodable2718,
    network::{TransactionBuilder, TxSignerSync},
    primitives::{Address, TxHash},
    providers::Provider,
    rpc::types::TransactionRequest,
    signers::local::{LocalSignerError, PrivateKeySigner},
    sol_types::decode_revert_reason,
    transports::TransportError,
};

use super::{
    CallRequest, ChainError, DestinationChain, DestinationError, SignedTransaction,
    TransactionSigner,
};

/// The destination chain, reached through an alloy [`Provider`].
#[derive(Clone, Debug)]
pub struct EvmDestination<P> {
    provider: P,
}

impl<P: Provider> EvmDestination<P> {
    /// Wraps `provider`.
    #[must_use]
    pub const fn new(provider: P) -> Self {
        Self { provider }
    }

    /// The underlying provider.
    #[must_use]
    pub const fn provider(&self) -> &P {
        &self.provider
    }
}

#[async_trait::async_trait]
impl<P: Provider + Send + Sync> DestinationChain for EvmDestination<P> {
    async fn chain_id(&self) -> Result<u64, ChainError> {
        self.provider.get_chain_id().await.map_err(unavailable)
    }

    async fn gas_price(&self) -> Result<u128, ChainError> {
        self.provider.get_gas_price().await.map_err(unavailable)
    }

    async fn nonce(&self, address: Address) -> Result<u64, ChainError> {
        self.provider
            .get_transaction_count(address)
            .pending()
            .await
            .map_err(unavailable)
    }

    async fn estimate_gas(&self, call: &CallRequest) -> Result<u64, DestinationError> {
        let request = TransactionRequest::default()
            .with_from(call.from)
            .with_to(call.to)
            .with_gas_price(call.gas_price)
            .with_value(call.value)
            .with_input(call.input.clone());
        self.provider
            .estimate_gas(request)
            .await
            .map_err(classify_error)
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<TxHash, DestinationError> {
        let pending = self
            .provider
            .send_raw_transaction(raw)
            .await
            .map_err(classify_error)?;
        Ok(*pending.tx_hash())
    }

    async fn is_confirmed(&self, hash: TxHash) -> Result<bool, ChainError> {
        let tx = self
            .provider
            .get_transaction_by_hash(hash)
            .await
            .map_err(unavailable)?;
        Ok(tx.is_some_and(|tx| tx.block_number.is_some()))
    }
}

#[allow(clippy::needless_pass_by_value)]
fn unavailable(e: TransportError) -> ChainError {
    ChainError::Unavailable(e.to_string())
}

/// JSON-RPC error code of a reverted call.
const REVERT_CODE: i64 = 3;

/// Only a contract revert is a rejection. Any other error object, such as
/// throttling or a missing header, is the node being unavailable.
fn classify_error(e: TransportError) -> DestinationError {
    let reason = e.as_error_resp().and_then(|payload| {
        let revert_data = payload.as_revert_data();
        let reverted = payload.code == REVERT_CODE
            || revert_data.is_some()
            || payload.message.contains("execution reverted");
        if !reverted {
            return None;
        }
        let decoded = revert_data.and_then(|data| decode_revert_reason(&data));
        Some(match decoded {
            Some(decoded) if !payload.message.contains(&decoded) => {
                format!("{}: {decoded}", payload.message)
            }
            _ => payload.message.to_string(),
        })
    });
    reason.map_or_else(
        || DestinationError::Chain(unavailable(e)),
        DestinationError::Rejected,
    )
}

/// Signs legacy transactions with a secp256k1 key held in memory.
#[derive(Clone, Debug)]
pub struct LocalSigner {
    signer: PrivateKeySigner,
}

impl LocalSigner {
    /// Wraps `signer`.
    #[must_use]
    pub const fn new(signer: PrivateKeySigner) -> Self {
        Self { signer }
    }

    /// Parses a hex encoded private key, with or without `0x`.
    ///
    /// # Errors
    /// Returns an error if the key is not a valid secp256k1 scalar.
    pub fn from_hex(key: &str) -> Result<Self, LocalSignerError> {
        Ok(Self::new(key.trim().parse()?))
    }
}

impl TransactionSigner for LocalSigner {
    fn address(&self) -> Address {
        self.signer.address()
    }

    fn sign(
        &self,
        chain_id: u64,
        mut tx: TxLegacy,
    ) -> Result<SignedTransaction, alloy::signers::Error> {
        tx.chain_id = Some(chain_id);
        let signature = self.signer.sign_transaction_sync(&mut tx)?;
        let signed = tx.into_signed(signature);
        let hash = *signed.hash();
        let raw = TxEnvelope::Legacy(signed).encoded_2718();
        Ok(SignedTransaction {
            hash,
            raw: raw.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use alloy::{
        eips::eip2718::Decodable2718,
        primitives::{Bytes, TxKind, U256},
        rpc::json_rpc::ErrorPayload,
        transports::{RpcError, TransportErrorKind},
    };

    use super::*;
    use crate::{error::RelayError, tasks::SyncMethod};

    const KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    #[test]
    fn signs_eip155_legacy_transaction() {
        let signer = LocalSigner::from_hex(KEY).unwrap();
        let tx = TxLegacy {
            chain_id: None,
            nonce: 7,
            gas_price: 1_000_000_000,
            gas_limit: 100_000,
            to: TxKind::Call(Address::repeat_byte(0x11)),
            value: U256::ZERO,
            input: Bytes::from_static(&[0xde, 0xad]),
        };

        let signed = signer.sign(47_763, tx).unwrap();
        let envelope = TxEnvelope::decode_2718(&mut signed.raw.as_ref()).unwrap();
        let legacy = envelope.as_legacy().unwrap();

        assert_eq!(*legacy.hash(), signed.hash);
        assert_eq!(legacy.tx().chain_id, Some(47_763));
        assert_eq!(legacy.tx().nonce, 7);
        assert_eq!(legacy.tx().input, Bytes::from_static(&[0xde, 0xad]));
    }

    #[test]
    fn rejects_invalid_key() {
        assert!(LocalSigner::from_hex("0x1234").is_err());
    }

    #[test]
    fn error_response_is_a_rejection() {
        let err: TransportError = RpcError::ErrorResp(ErrorPayload {
            code: 3,
            message: "execution reverted: already synced".into(),
            data: None,
        });
        assert_eq!(
            classify_error(err),
            DestinationError::Rejected("execution reverted: already synced".to_string())
        );
    }

    #[test]
    fn reverted_message_without_revert_code_is_a_rejection() {
        let err: TransportError = RpcError::ErrorResp(ErrorPayload {
            code: -32000,
            message: "execution reverted: already minted".into(),
            data: None,
        });
        assert_eq!(
            classify_error(err),
            DestinationError::Rejected("execution reverted: already minted".to_string())
        );
    }

    #[test]
    fn node_errors_are_transient() {
        for (code, message) in [(-32005, "limit exceeded"), (-32000, "header not found")] {
            let err: TransportError = RpcError::ErrorResp(ErrorPayload {
                code,
                message: message.into(),
                data: None,
            });
            let DestinationError::Chain(chain) = classify_error(err) else {
                panic!("{message} must not be a rejection");
            };
            assert!(chain.is_transient(), "{message}");
            assert!(
                RelayError::from_destination(SyncMethod::Header, DestinationError::Chain(chain))
                    .is_transient()
            );
        }
    }

    #[test]
    fn transport_failure_is_transient() {
        let err = TransportErrorKind::custom_str("connection refused");
        let DestinationError::Chain(chain) = classify_error(err) else {
            panic!("expected chain error");
        };
        assert!(chain.is_transient());
    }
}
