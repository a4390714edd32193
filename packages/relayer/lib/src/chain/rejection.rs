//! Interpretation of destination contract rejections.

use crate::tasks::SyncMethod;

/// Revert reason of any sync method whose object is already registered.
pub const ALREADY_SYNCED: &str = "already synced";
/// Revert reason of `syncValidators` when a newer validator set is registered.
pub const SYNCED_VALIDATORS_OUTDATED: &str = "synced validators outdated";
/// Revert reason of `requestMint` when the deposit was already minted.
pub const ALREADY_MINTED: &str = "already minted";

/// How to treat a rejection of a sync method.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// The destination already holds this state; nothing to submit.
    AlreadyApplied,
    /// A genuine failure.
    Fatal,
}

impl Rejection {
    /// Classifies the rejection `reason` returned for `method`.
    #[must_use]
    pub fn classify(method: SyncMethod, reason: &str) -> Self {
        let idempotent = reason.contains(ALREADY_SYNCED)
            || (method == SyncMethod::Validators && reason.contains(SYNCED_VALIDATORS_OUTDATED))
            || (method == SyncMethod::RequestMint && reason.contains(ALREADY_MINTED));
        if idempotent {
            Self::AlreadyApplied
        } else {
            Self::Fatal
        }
    }
}
