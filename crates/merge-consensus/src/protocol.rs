//! Protocol context handed to consensus components.

use crate::chain::TotalDifficultyProvider;
use crate::context::MergeState;
use std::sync::Arc;

/// Handles to the chain store and the merge state.
#[derive(Clone)]
pub struct ProtocolContext {
    chain: Arc<dyn TotalDifficultyProvider>,
    merge_state: Arc<dyn MergeState>,
}

impl ProtocolContext {
    /// Creates a new protocol context.
    pub fn new(chain: Arc<dyn TotalDifficultyProvider>, merge_state: Arc<dyn MergeState>) -> Self {
        Self { chain, merge_state }
    }

    /// Returns the chain store.
    pub fn chain(&self) -> &Arc<dyn TotalDifficultyProvider> {
        &self.chain
    }

    /// Returns the merge state.
    pub fn merge_state(&self) -> &Arc<dyn MergeState> {
        &self.merge_state
    }
}

impl std::fmt::Debug for ProtocolContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtocolContext")
            .field("terminal_total_difficulty", self.merge_state.terminal_total_difficulty())
            .field("post_merge", &self.merge_state.is_post_merge())
            .finish_non_exhaustive()
    }
}
