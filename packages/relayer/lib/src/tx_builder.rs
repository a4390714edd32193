//! Builds the signed destination transactions that sync source state.

use alloy::{
    consensus::TxLegacy,
    primitives::{Address, TxKind, U256},
};
use bridge_solidity_types::bridge::{
    request_mint_calldata, sync_header_calldata, sync_state_root_calldata,
    sync_state_root_validators_calldata, sync_validators_calldata, StateSyncArgs,
};
use neo_apis::{Header, StateRoot};

use crate::{
    chain::{
        CallRequest, DestinationChain, DestinationError, Rejection, SignedTransaction,
        TransactionSigner,
    },
    encoding::CanonicalEncode,
    error::RelayError,
    metrics,
    tasks::{SyncMethod, Task},
};

/// Destination parameters shared by the transactions of one commit round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TxContext {
    /// The EIP-155 chain id.
    pub chain_id: u64,
    /// The gas price every transaction of the round pays.
    pub gas_price: u128,
    /// The nonce of the next transaction.
    pub nonce: u64,
}

impl TxContext {
    /// Reads the chain id, gas price and pending nonce of `from`.
    ///
    /// # Errors
    /// Returns an error if any destination query fails.
    pub async fn fetch<D: DestinationChain + ?Sized>(
        destination: &D,
        from: Address,
    ) -> Result<Self, RelayError> {
        Ok(Self {
            chain_id: destination.chain_id().await?,
            gas_price: destination.gas_price().await?,
            nonce: destination.nonce(from).await?,
        })
    }
}

/// A signed transaction together with the method it calls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncTransaction {
    /// The bridge method.
    pub method: SyncMethod,
    /// The signed transaction.
    pub signed: SignedTransaction,
}

/// Turns headers, state roots and tasks into signed bridge calls.
pub struct TxSynthesizer<'a, D: ?Sized, T: ?Sized> {
    destination: &'a D,
    signer: &'a T,
    bridge: Address,
}

impl<'a, D, T> TxSynthesizer<'a, D, T>
where
    D: DestinationChain + ?Sized,
    T: TransactionSigner + ?Sized,
{
    /// A synthesizer calling the bridge contract at `bridge`.
    #[must_use]
    pub const fn new(destination: &'a D, signer: &'a T, bridge: Address) -> Self {
        Self {
            destination,
            signer,
            bridge,
        }
    }

    /// Fetches a fresh [`TxContext`] for the signer.
    ///
    /// # Errors
    /// Returns an error if any destination query fails.
    pub async fn context(&self) -> Result<TxContext, RelayError> {
        TxContext::fetch(self.destination, self.signer.address()).await
    }

    /// Builds a `syncHeader` transaction, or `None` if the header is already synced.
    ///
    /// # Errors
    /// See [`Self::build`].
    pub async fn sync_header(
        &self,
        ctx: &mut TxContext,
        header: &Header,
    ) -> Result<Option<SyncTransaction>, RelayError> {
        let calldata = sync_header_calldata(header.to_canonical_bytes());
        self.build(ctx, SyncMethod::Header, calldata).await
    }

    /// Builds a `syncStateRoot` transaction, or `None` if the root is already synced.
    ///
    /// # Errors
    /// See [`Self::build`].
    pub async fn sync_state_root(
        &self,
        ctx: &mut TxContext,
        root: &StateRoot,
    ) -> Result<Option<SyncTransaction>, RelayError> {
        let calldata = sync_state_root_calldata(root.to_canonical_bytes());
        self.build(ctx, SyncMethod::StateRoot, calldata).await
    }

    /// Builds the transaction registering `task`, or `None` if the destination
    /// already holds it.
    ///
    /// # Errors
    /// See [`Self::build`].
    pub async fn sync_task(
        &self,
        ctx: &mut TxContext,
        task: &Task,
        block_index: u32,
        tx_proof: Vec<u8>,
        state_root: &StateRoot,
        state_proof: Vec<u8>,
    ) -> Result<Option<SyncTransaction>, RelayError> {
        let args = StateSyncArgs {
            block_index,
            txid: U256::from_be_bytes(task.txid().to_be_bytes()),
            tx_proof: tx_proof.into(),
            state_root_index: state_root.index,
            state_proof: state_proof.into(),
        };
        let calldata = match task {
            Task::Deposit { .. } => request_mint_calldata(args),
            Task::ValidatorsDesignate { .. } => sync_validators_calldata(args),
            Task::StateValidatorsChange { .. } => sync_state_root_validators_calldata(args),
        };
        self.build(ctx, task.method(), calldata).await
    }

    /// Dry-runs `calldata` against the bridge, then signs it with the next nonce.
    ///
    /// A rejection meaning the destination already holds the state yields
    /// `None` and consumes no nonce.
    ///
    /// # Errors
    /// - [`RelayError::Rejected`] for any other rejection.
    /// - [`RelayError::Signing`] if the signer fails.
    /// - [`RelayError::Chain`] if the destination cannot be reached.
    pub async fn build(
        &self,
        ctx: &mut TxContext,
        method: SyncMethod,
        calldata: Vec<u8>,
    ) -> Result<Option<SyncTransaction>, RelayError> {
        let call = CallRequest {
            from: self.signer.address(),
            to: self.bridge,
            gas_price: ctx.gas_price,
            value: U256::ZERO,
            input: calldata.into(),
        };

        let gas_limit = match self.destination.estimate_gas(&call).await {
            Ok(gas) => gas,
            Err(DestinationError::Rejected(reason))
                if Rejection::classify(method, &reason) == Rejection::AlreadyApplied =>
            {
                tracing::warn!(%method, %reason, "destination already synced, skipping");
                metrics::IDEMPOTENT_SKIPS
                    .with_label_values(&[method.name()])
                    .inc();
                return Ok(None);
            }
            Err(e) => return Err(RelayError::from_destination(method, e)),
        };

        let tx = TxLegacy {
            chain_id: None,
            nonce: ctx.nonce,
            gas_price: ctx.gas_price,
            gas_limit,
            to: TxKind::Call(self.bridge),
            value: U256::ZERO,
            input: call.input,
        };
        let signed = self
            .signer
            .sign(ctx.chain_id, tx)
            .map_err(|source| RelayError::Signing { method, source })?;
        tracing::debug!(
            %method,
            nonce = ctx.nonce,
            gas_limit,
            hash = %signed.hash,
            "signed transaction"
        );
        ctx.nonce += 1;

        Ok(Some(SyncTransaction { method, signed }))
    }
}
