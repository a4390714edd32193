#![doc = include_str!("../README.md")]
#![deny(
    clippy::nursery,
    clippy::pedantic,
    warnings,
    missing_docs,
    unused_crate_dependencies
)]

pub mod chain;
pub mod encoding;
pub mod error;
pub mod events;
pub mod metrics;
pub mod proof;
pub mod scanner;
pub mod state_root;
pub mod submitter;
pub mod tasks;
pub mod tx_builder;

#[cfg(test)]
mod test_utils;
