//! This module defines errors for `NeoRpcClient`.

/// The range of RPC error codes the node uses for "unknown block",
/// "unknown transaction", "unknown state root", "unknown storage item" and
/// related lookups of items that do not exist (yet).
const UNKNOWN_ITEM_CODES: std::ops::RangeInclusive<i64> = -109..=-100;

/// Errors returned by [`NeoRpcClient`](crate::NeoRpcClient).
#[derive(Debug, thiserror::Error)]
#[allow(clippy::module_name_repetitions)]
pub enum NeoRpcError {
    /// The client was built without any seed URL.
    #[error("no rpc seeds configured")]
    NoSeeds,

    /// Every seed failed at the transport level.
    #[error("all {seeds} rpc seeds unreachable, last error: {last}")]
    Unreachable {
        /// How many seeds were tried.
        seeds: usize,
        /// The last transport error observed.
        last: String,
    },

    /// The node answered with a JSON-RPC error object.
    #[error("rpc error {code} on {method}: {message}")]
    Rpc {
        /// The RPC method.
        method: &'static str,
        /// The JSON-RPC error code.
        code: i64,
        /// The error message.
        message: String,
    },

    /// The response could not be decoded into the expected type.
    #[error("failed to decode {method} response: {reason}")]
    Decode {
        /// The RPC method.
        method: &'static str,
        /// Why decoding failed.
        reason: String,
    },

    /// The response carried neither a result nor an error.
    #[error("{method} returned an empty result")]
    EmptyResult {
        /// The RPC method.
        method: &'static str,
    },
}

impl NeoRpcError {
    /// Whether retrying the same call later may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Unreachable { .. })
    }

    /// Whether the node reported that the requested item does not exist.
    #[must_use]
    pub fn is_unknown_item(&self) -> bool {
        matches!(self, Self::Rpc { code, .. } if UNKNOWN_ITEM_CODES.contains(code))
    }
}
