//! The relay loop: scans source blocks in order and commits what each one
//! requires on the destination chain before moving to the next.

use std::time::Duration;

use alloy::primitives::Address;
use neo_apis::{Header, Uint160};

use crate::{
    chain::{ChainError, DestinationChain, SourceChain, TransactionSigner},
    error::RelayError,
    events::EventClassifier,
    metrics,
    proof::ProofBuilder,
    state_root::StateRootResolver,
    submitter::Committer,
    tasks::TaskBatch,
    tx_builder::TxSynthesizer,
};

/// Static parameters of the relay loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScannerConfig {
    /// The bridge contract on the source chain.
    pub bridge_contract: Uint160,
    /// The bridge contract on the destination chain.
    pub bridge_address: Address,
    /// Time between source blocks; the retry delay of the loop.
    pub source_block_time: Duration,
    /// Time between destination blocks; the confirmation polling period.
    pub destination_block_time: Duration,
    /// The first block to relay.
    pub start: u32,
    /// The block to stop before, or `None` to follow the chain.
    pub end: Option<u32>,
}

/// Mutable state of the relay loop.
///
/// The last verified state root is kept by the [`StateRootResolver`], whose
/// cache only moves forward; see [`Scanner::resolver`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RelayerState {
    /// The next block to relay.
    pub cursor: u32,
    /// The block to stop before.
    pub end: Option<u32>,
    /// The header of the last relayed block, the committee baseline.
    pub last_header: Option<Header>,
}

impl RelayerState {
    /// Whether the cursor has reached the end of the range.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.end.is_some_and(|end| self.cursor >= end)
    }
}

/// Relays source blocks to the destination chain one at a time.
pub struct Scanner<S, D, T> {
    source: S,
    destination: D,
    signer: T,
    config: ScannerConfig,
    classifier: EventClassifier,
    resolver: StateRootResolver,
    state: RelayerState,
}

impl<S, D, T> Scanner<S, D, T>
where
    S: SourceChain,
    D: DestinationChain,
    T: TransactionSigner,
{
    /// A scanner positioned at `config.start`.
    #[must_use]
    pub fn new(source: S, destination: D, signer: T, config: ScannerConfig) -> Self {
        let state = RelayerState {
            cursor: config.start,
            end: config.end,
            last_header: None,
        };
        Self {
            source,
            destination,
            signer,
            classifier: EventClassifier::new(config.bridge_contract),
            resolver: StateRootResolver::default(),
            config,
            state,
        }
    }

    /// The loop state.
    #[must_use]
    pub const fn state(&self) -> &RelayerState {
        &self.state
    }

    /// The state root resolver and its cache.
    #[must_use]
    pub const fn resolver(&self) -> &StateRootResolver {
        &self.resolver
    }

    /// The source chain.
    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// The destination chain.
    #[must_use]
    pub const fn destination(&self) -> &D {
        &self.destination
    }

    /// Relays blocks until the end of the range or a fatal error.
    ///
    /// # Errors
    /// Returns the first error that is not transient.
    pub async fn run(&mut self) -> Result<(), RelayError> {
        tracing::info!(
            start = self.state.cursor,
            end = ?self.state.end,
            signer = %self.signer.address(),
            "starting relay loop"
        );
        while !self.state.is_done() {
            self.step().await?;
        }
        tracing::info!(cursor = self.state.cursor, "reached the end of the range");
        Ok(())
    }

    /// Tries to relay the block at the cursor once, returning whether the
    /// cursor advanced. Missing blocks and transient failures wait one source
    /// block period and leave the cursor in place.
    ///
    /// # Errors
    /// Returns any error that is not transient.
    pub async fn step(&mut self) -> Result<bool, RelayError> {
        let index = self.state.cursor;
        match self.relay_block(index).await {
            Ok(true) => {
                self.state.cursor = index
                    .checked_add(1)
                    .ok_or(RelayError::IndexSpaceExhausted { index })?;
                Ok(true)
            }
            Ok(false) => {
                tracing::debug!(index, "block not produced yet");
                tokio::time::sleep(self.config.source_block_time).await;
                Ok(false)
            }
            Err(e) if e.is_transient() => {
                tracing::warn!(index, error = %e, "transient failure, retrying block");
                metrics::TRANSIENT_RETRIES.inc();
                tokio::time::sleep(self.config.source_block_time).await;
                Ok(false)
            }
            Err(e) => {
                tracing::error!(index, error = %e, "failed to relay block");
                Err(e)
            }
        }
    }

    async fn relay_block(&mut self, index: u32) -> Result<bool, RelayError> {
        let Some(batch) = self.next_batch(index).await? else {
            return Ok(false);
        };
        self.sync(&batch).await?;

        metrics::CURRENT_BLOCK.set(i64::from(index));
        tracing::info!(
            index,
            joint = batch.is_joint,
            tasks = batch.tasks.len(),
            "block relayed"
        );
        self.state.last_header = Some(batch.block.header);
        Ok(true)
    }

    /// Fetches the block at `index` and classifies the events of its
    /// transactions, or returns `None` if the block does not exist yet.
    ///
    /// # Errors
    /// Returns an error if a source request fails or an event is malformed.
    pub async fn next_batch(&mut self, index: u32) -> Result<Option<TaskBatch>, RelayError> {
        let Some(block) = self.source.block(index).await? else {
            return Ok(None);
        };
        let is_joint = self.is_joint(&block.header).await?;
        let mut batch = TaskBatch::new(block, is_joint);

        for txid in batch.block.txids() {
            let log = self.source.application_log(txid).await?;
            for task in self.classifier.classify(&log)? {
                tracing::info!(index, kind = task.kind(), %txid, "found relay task");
                metrics::TASKS.with_label_values(&[task.kind()]).inc();
                batch.tasks.push(task);
            }
        }
        Ok(Some(batch))
    }

    /// Whether `header` starts a new committee: it is the genesis header or
    /// its next consensus differs from the last relayed header's. Without a
    /// last header the previous one is fetched as the baseline.
    ///
    /// # Errors
    /// Returns an error if the baseline header cannot be fetched.
    pub async fn is_joint(&mut self, header: &Header) -> Result<bool, RelayError> {
        if header.index == 0 {
            return Ok(true);
        }
        if self.state.last_header.is_none() {
            let previous = header.index - 1;
            let block = self.source.block(previous).await?.ok_or_else(|| {
                ChainError::Unavailable(format!("baseline block {previous} is not available"))
            })?;
            tracing::debug!(index = previous, "fetched baseline header");
            self.state.last_header = Some(block.header);
        }
        Ok(self
            .state
            .last_header
            .as_ref()
            .is_some_and(|last| last.next_consensus != header.next_consensus))
    }

    /// Commits the header, the state root and the task transactions of
    /// `batch`, each round confirmed before the next one is built.
    ///
    /// # Errors
    /// Returns an error if a proof is missing, a transaction is rejected or a
    /// round is not confirmed.
    #[tracing::instrument(
        skip_all,
        fields(block = batch.index(), joint = batch.is_joint, tasks = batch.tasks.len())
    )]
    pub async fn sync(&mut self, batch: &TaskBatch) -> Result<(), RelayError> {
        if !batch.needs_header_sync() {
            tracing::debug!("nothing to sync");
            return Ok(());
        }

        // Resolved first so that a root still being produced sends nothing.
        let state_root = if batch.has_tasks() {
            Some(
                self.resolver
                    .verified_state_root(&self.source, batch.index())
                    .await?,
            )
        } else {
            None
        };

        let synthesizer =
            TxSynthesizer::new(&self.destination, &self.signer, self.config.bridge_address);
        let committer = Committer::new(&self.destination, self.config.destination_block_time);

        let mut ctx = synthesizer.context().await?;
        let header = synthesizer
            .sync_header(&mut ctx, &batch.block.header)
            .await?;
        committer.commit(header.into_iter().collect()).await?;

        let Some(state_root) = state_root else {
            return Ok(());
        };

        let mut ctx = synthesizer.context().await?;
        let root = synthesizer.sync_state_root(&mut ctx, &state_root).await?;
        committer.commit(root.into_iter().collect()).await?;

        let proofs = ProofBuilder::new(&batch.block);
        let mut ctx = synthesizer.context().await?;
        let mut transactions = Vec::with_capacity(batch.tasks.len());
        for task in &batch.tasks {
            let tx_proof = proofs.prove_inclusion(task.txid())?;
            let state_proof = proofs
                .storage_proof(
                    &self.source,
                    &state_root,
                    self.config.bridge_contract,
                    &task.storage_key(),
                )
                .await?;
            let tx = synthesizer
                .sync_task(
                    &mut ctx,
                    task,
                    batch.index(),
                    tx_proof,
                    &state_root,
                    state_proof,
                )
                .await?;
            transactions.extend(tx);
        }
        committer.commit(transactions).await
    }
}
