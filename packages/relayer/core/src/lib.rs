//! Configuration and assembly of the bridge relayer.

#![deny(
    clippy::nursery,
    clippy::pedantic,
    warnings,
    missing_docs,
    unused_crate_dependencies
)]

pub mod builder;
pub mod config;
