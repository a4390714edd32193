//! The bridge relayer binary: command line, observability and the metrics endpoint.

#![deny(
    clippy::nursery,
    clippy::pedantic,
    warnings,
    missing_docs,
    unused_crate_dependencies
)]

pub mod cli;
pub mod observability;

// Used by the `relayer` binary.
use dotenv as _;
use prometheus as _;
use tokio as _;
use tracing as _;
use warp as _;

#[cfg(test)]
use serde_json as _;
