//! Merge configuration.
//!
//! The terminal total difficulty is fixed for the lifetime of the process, so
//! it is read once at startup from a JSON or YAML file.

use crate::error::{ConsensusError, Result};
use merge_types::Difficulty;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Merge transition configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Network name.
    pub network: String,

    /// Terminal total difficulty, as a decimal or `0x`-hex string, or a bare
    /// integer. JSON integers above `u64::MAX` must be quoted; YAML integers
    /// of any size are accepted. Zero means the network starts post-merge.
    pub terminal_total_difficulty: Difficulty,

    /// Start in the post-merge phase, for nodes resuming after the network
    /// already transitioned.
    #[serde(default)]
    pub post_merge_at_startup: bool,
}

impl MergeConfig {
    /// Creates a new configuration starting in the pre-merge phase.
    pub fn new(network: impl Into<String>, terminal_total_difficulty: impl Into<Difficulty>) -> Self {
        Self {
            network: network.into(),
            terminal_total_difficulty: terminal_total_difficulty.into(),
            post_merge_at_startup: false,
        }
    }

    /// Sets whether the node starts post-merge.
    pub fn with_post_merge_at_startup(mut self, post_merge: bool) -> Self {
        self.post_merge_at_startup = post_merge;
        self
    }

    /// Loads the configuration from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConsensusError::InvalidConfig(format!("failed to read file: {}", e)))?;

        let config: MergeConfig = serde_json::from_str(&content)
            .map_err(|e| ConsensusError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the configuration from a YAML file.
    pub fn load_yaml(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConsensusError::InvalidConfig(format!("failed to read file: {}", e)))?;

        let config: MergeConfig = serde_yaml::from_str(&content)
            .map_err(|e| ConsensusError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.network.trim().is_empty() {
            return Err(ConsensusError::InvalidConfig("network is empty".into()));
        }

        if self.terminal_total_difficulty.is_zero() && !self.post_merge_at_startup {
            tracing::debug!(
                network = %self.network,
                "terminal total difficulty is zero, node starts post-merge"
            );
        }

        Ok(())
    }

    /// Saves the configuration to a JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Saves the configuration to a YAML file.
    pub fn save_yaml(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| ConsensusError::InvalidConfig(e.to_string()))?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merge.json");

        let config = MergeConfig::new("mainnet", 58_750_000_000_000_000_000_000u128);
        config.save_json(&path).unwrap();

        let loaded = MergeConfig::load_json(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_yaml_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merge.yaml");

        let config = MergeConfig::new("devnet", 100u64).with_post_merge_at_startup(true);
        config.save_yaml(&path).unwrap();

        let loaded = MergeConfig::load_yaml(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_hex_ttd_and_default_flag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merge.json");
        std::fs::write(
            &path,
            r#"{ "network": "devnet", "terminal_total_difficulty": "0x64" }"#,
        )
        .unwrap();

        let config = MergeConfig::load_json(&path).unwrap();
        assert_eq!(config.terminal_total_difficulty, Difficulty::from(100u64));
        assert!(!config.post_merge_at_startup);
    }

    #[test]
    fn test_yaml_numeric_ttd() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merge.yaml");
        std::fs::write(&path, "network: devnet\nterminal_total_difficulty: 100\n").unwrap();

        let config = MergeConfig::load_yaml(&path).unwrap();
        assert_eq!(config.terminal_total_difficulty, Difficulty::from(100u64));
    }

    #[test]
    fn test_yaml_mainnet_ttd_as_integer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merge.yaml");
        std::fs::write(
            &path,
            "network: mainnet\nterminal_total_difficulty: 58750000000000000000000\n",
        )
        .unwrap();

        let config = MergeConfig::load_yaml(&path).unwrap();
        assert_eq!(
            config.terminal_total_difficulty,
            Difficulty::from(58_750_000_000_000_000_000_000u128)
        );
    }

    #[test]
    fn test_zero_ttd_is_valid() {
        let config = MergeConfig::new("devnet", 0u64);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_network_rejected() {
        let config = MergeConfig::new("  ", 100u64);
        assert!(matches!(
            config.validate(),
            Err(ConsensusError::InvalidConfig(msg)) if msg.contains("network")
        ));
    }

    #[test]
    fn test_invalid_ttd_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merge.json");
        std::fs::write(
            &path,
            r#"{ "network": "devnet", "terminal_total_difficulty": "-1" }"#,
        )
        .unwrap();

        assert!(matches!(
            MergeConfig::load_json(&path),
            Err(ConsensusError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            MergeConfig::load_json(dir.path().join("absent.json")),
            Err(ConsensusError::InvalidConfig(msg)) if msg.contains("failed to read file")
        ));
    }
}
