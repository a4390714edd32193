//! Resolution of witnessed state roots.

use neo_apis::StateRoot;

use crate::{chain::SourceChain, error::RelayError};

/// How many state roots after the target index are searched for a witness.
pub const STATE_ROOT_WINDOW: u32 = 1000;

/// Finds state roots the destination can verify, remembering the highest one.
#[derive(Clone, Debug)]
pub struct StateRootResolver {
    window: u32,
    last_verified: Option<StateRoot>,
}

impl Default for StateRootResolver {
    fn default() -> Self {
        Self::new(STATE_ROOT_WINDOW)
    }
}

impl StateRootResolver {
    /// A resolver searching `window` roots past each target.
    #[must_use]
    pub const fn new(window: u32) -> Self {
        Self {
            window,
            last_verified: None,
        }
    }

    /// The highest witnessed root found so far.
    #[must_use]
    pub const fn last_verified(&self) -> Option<&StateRoot> {
        self.last_verified.as_ref()
    }

    /// Returns a witnessed state root with index at least `target`.
    ///
    /// # Errors
    /// - [`RelayError::StateRootNotYetAvailable`] if the search reaches a root
    ///   the source has not computed yet.
    /// - [`RelayError::NoVerifiedStateRoot`] if no root in the window is witnessed.
    pub async fn verified_state_root<S: SourceChain + ?Sized>(
        &mut self,
        source: &S,
        target: u32,
    ) -> Result<StateRoot, RelayError> {
        if let Some(root) = self.last_verified.as_ref().filter(|r| r.index >= target) {
            tracing::debug!(target, index = root.index, "using cached state root");
            return Ok(root.clone());
        }

        let end = target.saturating_add(self.window);
        for index in target..end {
            let Some(root) = source.state_root(index).await? else {
                return Err(RelayError::StateRootNotYetAvailable { index });
            };
            if !root.is_witnessed() {
                tracing::debug!(index, "state root not witnessed yet");
                continue;
            }

            tracing::info!(target, index, root = %root.root_hash, "verified state root found");
            self.remember(root.clone());
            return Ok(root);
        }

        Err(RelayError::NoVerifiedStateRoot {
            from: target,
            to: end,
        })
    }

    fn remember(&mut self, root: StateRoot) {
        if self
            .last_verified
            .as_ref()
            .is_none_or(|cached| root.index >= cached.index)
        {
            self.last_verified = Some(root);
        }
    }
}
