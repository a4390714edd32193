//! Solidity types for the side chain bridge contract.

#![deny(clippy::nursery, clippy::pedantic, warnings, unused_crate_dependencies)]

pub mod bridge;
