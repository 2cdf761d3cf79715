//! Chain store total-difficulty lookup.
//!
//! Defines the interface the terminal block rule reads total difficulty
//! through, and an in-memory store that accumulates it from headers.

use crate::error::{ConsensusError, Result};
use merge_types::{BlockHash, BlockHeader, Difficulty};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Trait for chain stores that know the total difficulty of blocks.
///
/// Lookups are total: an unknown block yields `None`, never an error.
pub trait TotalDifficultyProvider: Send + Sync {
    /// Returns the total difficulty of the block with the given hash.
    fn total_difficulty_by_hash(&self, hash: &BlockHash) -> Option<Difficulty>;
}

impl<T: TotalDifficultyProvider + ?Sized> TotalDifficultyProvider for Arc<T> {
    fn total_difficulty_by_hash(&self, hash: &BlockHash) -> Option<Difficulty> {
        (**self).total_difficulty_by_hash(hash)
    }
}

/// In-memory total difficulty index.
#[derive(Debug, Default)]
pub struct InMemoryChainStore {
    total_difficulties: RwLock<HashMap<BlockHash, Difficulty>>,
}

impl InMemoryChainStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a genesis header. Its total difficulty is its own difficulty.
    pub fn insert_genesis(&self, header: &BlockHeader) -> Difficulty {
        let total = header.difficulty_or_zero();
        self.total_difficulties
            .write()
            .insert(header.hash(), total.clone());
        total
    }

    /// Appends a header whose parent is already stored.
    ///
    /// Returns the header's total difficulty.
    pub fn append(&self, header: &BlockHeader) -> Result<Difficulty> {
        let mut total_difficulties = self.total_difficulties.write();
        let parent_total = total_difficulties
            .get(&header.parent_hash)
            .ok_or(ConsensusError::UnknownParent(header.parent_hash))?;

        let total = parent_total + &header.difficulty_or_zero();
        total_difficulties.insert(header.hash(), total.clone());

        tracing::trace!(
            number = header.number,
            hash = %header.hash(),
            total_difficulty = %total,
            "appended header"
        );

        Ok(total)
    }

    /// Sets the total difficulty of a block directly, e.g. from a checkpoint.
    pub fn set_total_difficulty(&self, hash: BlockHash, total_difficulty: Difficulty) {
        self.total_difficulties.write().insert(hash, total_difficulty);
    }

    /// Returns true if the block is known.
    pub fn contains(&self, hash: &BlockHash) -> bool {
        self.total_difficulties.read().contains_key(hash)
    }

    /// Returns the number of known blocks.
    pub fn len(&self) -> usize {
        self.total_difficulties.read().len()
    }

    /// Returns true if no blocks are known.
    pub fn is_empty(&self) -> bool {
        self.total_difficulties.read().is_empty()
    }
}

impl TotalDifficultyProvider for InMemoryChainStore {
    fn total_difficulty_by_hash(&self, hash: &BlockHash) -> Option<Difficulty> {
        self.total_difficulties.read().get(hash).cloned()
    }
}
