//! Client and types for the JSON-RPC API of a Neo N3 style source chain.

#![deny(
    clippy::nursery,
    clippy::pedantic,
    warnings,
    missing_docs,
    unused_crate_dependencies
)]

pub mod client;
pub mod error;
pub mod serde_utils;
pub mod types;

pub use client::NeoRpcClient;
pub use error::NeoRpcError;
pub use types::{
    ApplicationLog, Block, Execution, Header, Notification, StackItem, StateRoot,
    TransactionInfo, Trigger, Uint160, Uint256, VmState, Witness,
};
