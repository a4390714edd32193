//! Broadcasts signed transactions and waits for their confirmation.

use std::time::Duration;

use alloy::primitives::TxHash;

use crate::{
    chain::DestinationChain,
    error::RelayError,
    metrics,
    tx_builder::SyncTransaction,
};

/// How many destination block periods the committer waits for confirmations.
pub const COMMIT_ROUNDS: usize = 3;

/// Commits batches of transactions to the destination chain.
pub struct Committer<'a, D: ?Sized> {
    destination: &'a D,
    block_time: Duration,
    rounds: usize,
}

impl<'a, D: DestinationChain + ?Sized> Committer<'a, D> {
    /// A committer polling once per `block_time`, [`COMMIT_ROUNDS`] times.
    #[must_use]
    pub const fn new(destination: &'a D, block_time: Duration) -> Self {
        Self {
            destination,
            block_time,
            rounds: COMMIT_ROUNDS,
        }
    }

    /// Broadcasts every transaction, then polls until all are confirmed.
    ///
    /// # Errors
    /// - [`RelayError::CommitExhausted`] listing the hashes still pending
    ///   after the last round.
    /// - [`RelayError::Rejected`] if the destination refuses a transaction.
    /// - [`RelayError::Chain`] if the destination cannot be reached.
    pub async fn commit(&self, transactions: Vec<SyncTransaction>) -> Result<(), RelayError> {
        if transactions.is_empty() {
            return Ok(());
        }

        let mut pending = Vec::with_capacity(transactions.len());
        for tx in transactions {
            let hash = self
                .destination
                .send_raw_transaction(&tx.signed.raw)
                .await
                .map_err(|e| RelayError::from_destination(tx.method, e))?;
            tracing::info!(method = %tx.method, %hash, "transaction submitted");
            metrics::TRANSACTIONS_SUBMITTED
                .with_label_values(&[tx.method.name()])
                .inc();
            pending.push(hash);
        }

        for round in 1..=self.rounds {
            tokio::time::sleep(self.block_time).await;
            pending = self.unconfirmed(pending).await;
            if pending.is_empty() {
                tracing::debug!(round, "all transactions confirmed");
                return Ok(());
            }
            tracing::debug!(round, pending = pending.len(), "waiting for confirmations");
        }

        Err(RelayError::CommitExhausted {
            rounds: self.rounds,
            hashes: pending,
        })
    }

    async fn unconfirmed(&self, hashes: Vec<TxHash>) -> Vec<TxHash> {
        let mut still_pending = Vec::new();
        for hash in hashes {
            match self.destination.is_confirmed(hash).await {
                Ok(true) => tracing::info!(%hash, "transaction confirmed"),
                Ok(false) => still_pending.push(hash),
                Err(e) => {
                    tracing::warn!(%hash, error = %e, "failed to poll transaction");
                    still_pending.push(hash);
                }
            }
        }
        still_pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        tasks::SyncMethod,
        test_utils::{signed_call, Call, MockDestination},
    };

    fn transaction(nonce: u64) -> SyncTransaction {
        signed_call(SyncMethod::Header, nonce)
    }

    #[tokio::test]
    async fn empty_input_succeeds_immediately() {
        let destination = MockDestination::default();
        let committer = Committer::new(&destination, Duration::from_secs(3600));
        committer.commit(vec![]).await.unwrap();
        assert!(destination.journal().is_empty());
    }

    #[tokio::test]
    async fn confirmed_after_first_round() {
        let destination = MockDestination::default();
        let committer = Committer::new(&destination, Duration::ZERO);
        committer
            .commit(vec![transaction(1), transaction(2)])
            .await
            .unwrap();

        let polls = destination
            .journal()
            .into_iter()
            .filter(|c| matches!(c, Call::Poll(_)))
            .count();
        assert_eq!(polls, 2);
    }

    #[tokio::test]
    async fn polls_three_rounds_then_lists_pending() {
        let destination = MockDestination::default();
        destination.set_confirming(false);
        let committer = Committer::new(&destination, Duration::ZERO);

        let (first, second) = (transaction(1), transaction(2));
        let expected = vec![first.signed.hash, second.signed.hash];
        let err = committer.commit(vec![first, second]).await.unwrap_err();

        let RelayError::CommitExhausted { rounds, hashes } = err else {
            panic!("expected commit exhaustion");
        };
        assert_eq!(rounds, 3);
        assert_eq!(hashes, expected);
        let polls = destination
            .journal()
            .into_iter()
            .filter(|c| matches!(c, Call::Poll(_)))
            .count();
        assert_eq!(polls, 6);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_one_block_per_round() {
        let destination = MockDestination::default();
        destination.set_confirming(false);
        let committer = Committer::new(&destination, Duration::from_secs(15));

        let started = tokio::time::Instant::now();
        committer.commit(vec![transaction(1)]).await.unwrap_err();
        assert_eq!(started.elapsed(), Duration::from_secs(45));
    }
}
