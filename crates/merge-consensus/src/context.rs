//! Merge state shared across consensus components.
//!
//! The phase flag is owned here, not by the components that read it. Every
//! dispatcher in the node holds a handle to the same [`MergeState`] so they
//! all agree on which side of the transition the node is on.

use crate::config::MergeConfig;
use merge_types::{BlockHash, BlockHeader, Difficulty};
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Which side of the proof-of-work to proof-of-stake transition is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Blocks are validated and produced under proof-of-work.
    PreMerge,
    /// Blocks are validated and produced under proof-of-stake.
    PostMerge,
}

impl Phase {
    /// Maps the phase flag to a phase.
    pub fn from_post_merge(post_merge: bool) -> Self {
        if post_merge {
            Phase::PostMerge
        } else {
            Phase::PreMerge
        }
    }

    /// Returns true for [`Phase::PostMerge`].
    pub fn is_post_merge(self) -> bool {
        self == Phase::PostMerge
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::PreMerge => f.write_str("pre-merge"),
            Phase::PostMerge => f.write_str("post-merge"),
        }
    }
}

/// Read access to the consensus context.
///
/// Implementations must make a `true` written by one thread visible to later
/// reads on other threads, and must never report `false` after `true`.
pub trait MergeState: Send + Sync {
    /// The configured terminal total difficulty, fixed at startup.
    fn terminal_total_difficulty(&self) -> &Difficulty;

    /// Whether the node has observed the transition.
    fn is_post_merge(&self) -> bool;

    /// The currently active phase.
    fn phase(&self) -> Phase {
        Phase::from_post_merge(self.is_post_merge())
    }
}

impl<T: MergeState + ?Sized> MergeState for Arc<T> {
    fn terminal_total_difficulty(&self) -> &Difficulty {
        (**self).terminal_total_difficulty()
    }

    fn is_post_merge(&self) -> bool {
        (**self).is_post_merge()
    }
}

/// Events emitted by the merge context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeEvent {
    /// The terminal proof-of-work block was recorded.
    TerminalBlockDetected {
        /// Hash of the terminal block.
        hash: BlockHash,
        /// Number of the terminal block.
        number: u64,
    },
    /// The phase flag flipped to post-merge.
    TransitionReached {
        /// Total difficulty that triggered the flip, if any.
        total_difficulty: Option<Difficulty>,
    },
}

/// In-process consensus context holding the phase flag.
pub struct MergeContext {
    /// Configured terminal total difficulty.
    terminal_total_difficulty: Difficulty,

    /// The phase flag. Only ever goes from false to true.
    post_merge: AtomicBool,

    /// First terminal block recorded.
    terminal_block: RwLock<Option<BlockHeader>>,

    /// Event broadcaster.
    events: broadcast::Sender<MergeEvent>,
}

impl MergeContext {
    /// Creates a context in the pre-merge phase.
    pub fn new(terminal_total_difficulty: impl Into<Difficulty>) -> Self {
        let (events, _) = broadcast::channel(64);

        Self {
            terminal_total_difficulty: terminal_total_difficulty.into(),
            post_merge: AtomicBool::new(false),
            terminal_block: RwLock::new(None),
            events,
        }
    }

    /// Creates a context for a node resuming after the network transitioned.
    pub fn resumed_post_merge(terminal_total_difficulty: impl Into<Difficulty>) -> Self {
        let context = Self::new(terminal_total_difficulty);
        context.post_merge.store(true, Ordering::Release);
        context
    }

    /// Creates a context from configuration.
    ///
    /// Starts post-merge when configured to, or when the terminal total
    /// difficulty is zero: every chain has already reached it and no parent
    /// can be below it, so no terminal block will ever be detected.
    pub fn from_config(config: &MergeConfig) -> Self {
        let ttd = config.terminal_total_difficulty.clone();
        if config.post_merge_at_startup || ttd.is_zero() {
            Self::resumed_post_merge(ttd)
        } else {
            Self::new(ttd)
        }
    }

    /// Subscribes to merge events.
    pub fn subscribe(&self) -> broadcast::Receiver<MergeEvent> {
        self.events.subscribe()
    }

    /// Flips the phase flag to post-merge.
    ///
    /// Returns true only for the call that performed the flip.
    pub fn set_post_merge(&self) -> bool {
        self.flip(None)
    }

    /// Flips the phase flag once `total_difficulty` reaches the terminal total
    /// difficulty. Returns true only for the call that performed the flip.
    pub fn observe_total_difficulty(&self, total_difficulty: &Difficulty) -> bool {
        if *total_difficulty >= self.terminal_total_difficulty {
            self.flip(Some(total_difficulty.clone()))
        } else {
            false
        }
    }

    /// Records the terminal proof-of-work block.
    ///
    /// The first block recorded wins. Returns true if `header` was recorded.
    pub fn set_terminal_pow_block(&self, header: BlockHeader) -> bool {
        let hash = header.hash();
        let number = header.number;

        {
            let mut slot = self.terminal_block.write();
            if let Some(existing) = slot.as_ref() {
                let existing_hash = existing.hash();
                if existing_hash != hash {
                    tracing::warn!(
                        recorded = %existing_hash,
                        candidate = %hash,
                        "terminal block already recorded, ignoring candidate"
                    );
                }
                return false;
            }
            *slot = Some(header);
        }

        tracing::info!(%hash, number, "terminal proof-of-work block recorded");
        let _ = self
            .events
            .send(MergeEvent::TerminalBlockDetected { hash, number });
        true
    }

    /// Returns the recorded terminal proof-of-work block.
    pub fn terminal_pow_block(&self) -> Option<BlockHeader> {
        self.terminal_block.read().clone()
    }

    fn flip(&self, total_difficulty: Option<Difficulty>) -> bool {
        if self
            .post_merge
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        tracing::info!(
            total_difficulty = ?total_difficulty.as_ref().map(ToString::to_string),
            ttd = %self.terminal_total_difficulty,
            "merge transition reached"
        );
        let _ = self
            .events
            .send(MergeEvent::TransitionReached { total_difficulty });
        true
    }
}

impl MergeState for MergeContext {
    fn terminal_total_difficulty(&self) -> &Difficulty {
        &self.terminal_total_difficulty
    }

    fn is_post_merge(&self) -> bool {
        self.post_merge.load(Ordering::Acquire)
    }
}

impl fmt::Debug for MergeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergeContext")
            .field("terminal_total_difficulty", &self.terminal_total_difficulty)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}
