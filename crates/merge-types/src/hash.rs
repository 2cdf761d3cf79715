//! Block hash type.

use serde::{Deserialize, Serialize};

/// A unique block identifier (SHA-256 hash of the block header).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockHash([u8; 32]);

impl BlockHash {
    /// The all-zero hash, used as the parent of a genesis header.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Creates a block hash from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns true for the all-zero hash.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Returns the hex representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Creates a block hash from a hex string, with or without a `0x` prefix.
    pub fn from_hex(hex_str: &str) -> Result<Self, hex::FromHexError> {
        let digits = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(digits, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl Default for BlockHash {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<[u8; 32]> for BlockHash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl std::fmt::Display for BlockHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}
