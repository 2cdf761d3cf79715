//! Block header fields read by the transition rule.

use crate::{BlockHash, Difficulty};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A block header.
///
/// Proof-of-work headers carry a difficulty; post-merge headers do not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Block number (0 = genesis).
    pub number: u64,

    /// Parent block hash.
    pub parent_hash: BlockHash,

    /// Proof-of-work difficulty, absent on proof-of-stake headers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,

    /// Timestamp (unix seconds).
    pub timestamp: u64,
}

impl BlockHeader {
    /// Creates a proof-of-work header.
    pub fn proof_of_work(
        number: u64,
        parent_hash: BlockHash,
        difficulty: impl Into<Difficulty>,
        timestamp: u64,
    ) -> Self {
        Self {
            number,
            parent_hash,
            difficulty: Some(difficulty.into()),
            timestamp,
        }
    }

    /// Creates a proof-of-stake header, which carries no difficulty.
    pub fn proof_of_stake(number: u64, parent_hash: BlockHash, timestamp: u64) -> Self {
        Self {
            number,
            parent_hash,
            difficulty: None,
            timestamp,
        }
    }

    /// Returns the header difficulty, treating an absent value as zero.
    pub fn difficulty_or_zero(&self) -> Difficulty {
        self.difficulty.clone().unwrap_or_default()
    }

    /// Computes the block hash from the header.
    pub fn hash(&self) -> BlockHash {
        let bytes = serde_json::to_vec(self).expect("header serialization should not fail");
        let digest = Sha256::digest(&bytes);
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&digest);
        BlockHash::from_bytes(hash)
    }
}
