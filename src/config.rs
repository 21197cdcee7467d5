use crate::{
    error::{Result, SyncError},
    store::path::is_valid_segment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

/// Settings shared by key resolution and the sync engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Top-level store segment holding every board
    pub root: String,
    /// Prefix of generated board keys
    pub key_prefix: String,
    /// Number of random decimal digits after the prefix
    pub key_digits: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            root: "clipboards".to_string(),
            key_prefix: "naw".to_string(),
            key_digits: 5,
        }
    }
}

impl SyncConfig {
    /// Parses and validates a JSON configuration document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SyncConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the configuration from a JSON file, falling back to defaults when it does not exist
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).await?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if !is_valid_segment(&self.root) {
            return Err(SyncError::ConfigError(format!(
                "root {:?} is not a valid store path segment",
                self.root
            )));
        }

        // An empty prefix is allowed; generated keys are then purely numeric.
        if !self.key_prefix.is_empty() && !is_valid_segment(&self.key_prefix) {
            return Err(SyncError::ConfigError(format!(
                "key_prefix {:?} contains characters not allowed in a board key",
                self.key_prefix
            )));
        }

        if !(1..=9).contains(&self.key_digits) {
            return Err(SyncError::ConfigError(format!(
                "key_digits must be between 1 and 9, got {}",
                self.key_digits
            )));
        }

        Ok(())
    }
}
