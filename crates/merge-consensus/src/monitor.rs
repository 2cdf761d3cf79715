//! Header-import hook that drives the merge transition.

use crate::context::{MergeContext, MergeState};
use crate::protocol::ProtocolContext;
use crate::terminal::is_terminal_pow_block_in;
use merge_types::BlockHeader;
use std::sync::Arc;

/// Runs terminal block detection on imported headers and feeds the result
/// into the merge context.
#[derive(Debug, Clone)]
pub struct TransitionMonitor {
    protocol: ProtocolContext,
    merge: Arc<MergeContext>,
}

impl TransitionMonitor {
    /// Creates a monitor. `merge` must be the merge state held by `protocol`.
    pub fn new(protocol: ProtocolContext, merge: Arc<MergeContext>) -> Self {
        Self { protocol, merge }
    }

    /// Returns the merge context.
    pub fn merge_context(&self) -> &Arc<MergeContext> {
        &self.merge
    }

    /// Called when a header is imported.
    ///
    /// Returns true if `header` is the terminal proof-of-work block and was
    /// recorded as such. A crossing header that loses to an already recorded
    /// candidate still moves the node to the post-merge phase but returns
    /// false, so exactly one caller observes the terminal block.
    pub fn on_header_imported(&self, header: &BlockHeader) -> bool {
        if self.merge.is_post_merge() {
            tracing::debug!(number = header.number, "already post-merge, skipping terminal check");
            return false;
        }

        if !is_terminal_pow_block_in(header, &self.protocol) {
            return false;
        }

        let recorded = self.merge.set_terminal_pow_block(header.clone());
        self.merge.set_post_merge();
        recorded
    }
}
