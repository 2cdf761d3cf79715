//! Common types used throughout the merge transition crates.
//!
//! This crate provides the value types the consensus layer reads while
//! deciding which side of the proof-of-work to proof-of-stake transition a
//! block belongs to:
//!
//! - [`BlockHash`]: 32-byte block identity
//! - [`Difficulty`]: arbitrary-precision, non-negative difficulty and total
//!   difficulty values
//! - [`BlockHeader`]: the read-only header fields the transition rule needs

mod difficulty;
mod hash;
mod header;

pub use difficulty::{Difficulty, ParseDifficultyError};
pub use hash::BlockHash;
pub use header::BlockHeader;
