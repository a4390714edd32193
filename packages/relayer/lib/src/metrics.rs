//! Prometheus metrics of the relay loop.

#![allow(missing_docs)]

use lazy_static::lazy_static;
use prometheus::{register_int_counter, register_int_counter_vec, register_int_gauge};
use prometheus::{IntCounter, IntCounterVec, IntGauge};

lazy_static! {
    pub static ref CURRENT_BLOCK: IntGauge =
        register_int_gauge!("relayer_current_block", "Index of the block being relayed").unwrap();
    pub static ref TASKS: IntCounterVec = register_int_counter_vec!(
        "relayer_tasks_total",
        "Relay tasks found, by kind",
        &["kind"]
    )
    .unwrap();
    pub static ref SKIPPED_DEPOSITS: IntCounter = register_int_counter!(
        "relayer_skipped_deposits_total",
        "Deposits below the mint threshold"
    )
    .unwrap();
    pub static ref TRANSACTIONS_SUBMITTED: IntCounterVec = register_int_counter_vec!(
        "relayer_transactions_submitted_total",
        "Transactions broadcast to the destination, by method",
        &["method"]
    )
    .unwrap();
    pub static ref IDEMPOTENT_SKIPS: IntCounterVec = register_int_counter_vec!(
        "relayer_idempotent_skips_total",
        "Sync calls skipped because the destination already had the state, by method",
        &["method"]
    )
    .unwrap();
    pub static ref TRANSIENT_RETRIES: IntCounter = register_int_counter!(
        "relayer_transient_retries_total",
        "Block retries after a transient failure"
    )
    .unwrap();
}
