//! Merge Transition Core
//!
//! This crate decides when a chain leaves proof-of-work for proof-of-stake
//! and routes consensus behavior to the right side of that switch.
//!
//! # Components
//!
//! - [`terminal`]: terminal proof-of-work block detection
//! - [`TransitionDispatcher`]: routes calls to the pre-merge or post-merge
//!   behavior object according to the shared phase flag
//! - [`MergeContext`]: the phase flag, the configured terminal total
//!   difficulty and the recorded terminal block
//! - [`InMemoryChainStore`]: total difficulty index for wiring and tests
//! - [`TransitionMonitor`]: header-import hook feeding detection results into
//!   the merge context
//! - [`MergeConfig`]: file-backed configuration
//!
//! # Transition Flow
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │   Header     │────▶│  Transition  │────▶│   Terminal   │
//! │   Import     │     │   Monitor    │     │   Detector   │
//! └──────────────┘     └──────┬───────┘     └──────────────┘
//!                             │ terminal
//!                             ▼
//!                      ┌──────────────┐     ┌──────────────┐
//!                      │    Merge     │◀────│  Transition  │
//!                      │   Context    │     │  Dispatchers │
//!                      │ (phase flag) │     │ (validators, │
//!                      └──────────────┘     │  proposers)  │
//!                                           └──────────────┘
//! ```

mod chain;
mod config;
mod context;
mod error;
mod monitor;
mod protocol;
pub mod terminal;
mod transition;

pub use chain::{InMemoryChainStore, TotalDifficultyProvider};
pub use config::MergeConfig;
pub use context::{MergeContext, MergeEvent, MergeState, Phase};
pub use error::{ConsensusError, Result};
pub use monitor::TransitionMonitor;
pub use protocol::ProtocolContext;
pub use terminal::{
    crosses_terminal_total_difficulty, is_terminal_pow_block, is_terminal_pow_block_in,
};
pub use transition::TransitionDispatcher;

pub use merge_types::{BlockHash, BlockHeader, Difficulty};
