//! Terminal proof-of-work block detection.
//!
//! A header is terminal when its parent's total difficulty is still strictly
//! below the terminal total difficulty (TTD) and adding the header's own
//! difficulty reaches or exceeds it:
//!
//! ```text
//! parent_td < ttd  &&  parent_td + difficulty >= ttd
//! ```
//!
//! Exactly one header on a chain satisfies this. Headers before it have
//! `parent_td + difficulty < ttd`; headers after it already have
//! `parent_td >= ttd`. Post-merge headers carry no difficulty and count as zero.

use crate::chain::TotalDifficultyProvider;
use crate::protocol::ProtocolContext;
use merge_types::{BlockHeader, Difficulty};

/// Returns true if a block with `difficulty` on top of a parent with
/// `parent_total_difficulty` is the block that crosses `ttd`.
pub fn crosses_terminal_total_difficulty(
    parent_total_difficulty: &Difficulty,
    difficulty: &Difficulty,
    ttd: &Difficulty,
) -> bool {
    let reaches_ttd = &(parent_total_difficulty + difficulty) >= ttd;
    let parent_below_ttd = parent_total_difficulty < ttd;
    reaches_ttd && parent_below_ttd
}

/// Checks whether `header` is the terminal proof-of-work block.
///
/// If the parent's total difficulty is unknown (e.g. the parent has not been
/// synced yet) this logs a warning and returns `false`. The caller
/// re-evaluates once the parent arrives.
pub fn is_terminal_pow_block<P>(header: &BlockHeader, chain: &P, ttd: &Difficulty) -> bool
where
    P: TotalDifficultyProvider + ?Sized,
{
    let Some(parent_total_difficulty) = chain.total_difficulty_by_hash(&header.parent_hash) else {
        tracing::warn!(
            parent_hash = %header.parent_hash,
            number = header.number,
            "unable to get total difficulty, parent not found"
        );
        return false;
    };

    let difficulty = header.difficulty_or_zero();
    let terminal = crosses_terminal_total_difficulty(&parent_total_difficulty, &difficulty, ttd);

    if terminal {
        tracing::debug!(
            number = header.number,
            parent_total_difficulty = %parent_total_difficulty,
            difficulty = %difficulty,
            ttd = %ttd,
            "header crosses terminal total difficulty"
        );
    }

    terminal
}

/// Checks whether `header` is the terminal proof-of-work block using the
/// chain store and configured TTD from `context`.
pub fn is_terminal_pow_block_in(header: &BlockHeader, context: &ProtocolContext) -> bool {
    is_terminal_pow_block(
        header,
        context.chain(),
        context.merge_state().terminal_total_difficulty(),
    )
}
