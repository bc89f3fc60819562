//! Extension subsystem configuration
//!
//! Loaded from TOML by the host engine. Every field has a default, so an
//! empty file is a valid configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default key of the sub-tree that holds all extension data in a host record
pub const DEFAULT_DATA_KEY: &str = "extensions";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionConfig {
    /// Reserved key of the extension sub-tree inside a host record
    pub data_key: String,
    /// Gzip record payloads written by the persistence module
    pub compress_records: bool,
    /// Log every retained (unmatched) key at warn level on load
    pub log_retained: bool,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            data_key: DEFAULT_DATA_KEY.to_string(),
            compress_records: true,
            log_retained: true,
        }
    }
}

impl ExtensionConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.data_key.is_empty() {
            return Err(anyhow::anyhow!("ExtensionConfig: data_key cannot be empty"));
        }

        if self.data_key.chars().any(char::is_whitespace) {
            return Err(anyhow::anyhow!(
                "ExtensionConfig: data_key '{}' must not contain whitespace",
                self.data_key
            ));
        }

        log::info!(
            "[ExtensionConfig] Configuration validated: data_key='{}', compress_records={}",
            self.data_key,
            self.compress_records
        );
        Ok(())
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).context("ExtensionConfig: invalid TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("ExtensionConfig: cannot read {}", path.display()))?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("ExtensionConfig: cannot encode TOML")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = ExtensionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.data_key, DEFAULT_DATA_KEY);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ExtensionConfig::from_toml_str("compress_records = false\n")
            .expect("partial config should parse");
        assert!(!config.compress_records);
        assert_eq!(config.data_key, DEFAULT_DATA_KEY);
        assert!(config.log_retained);
    }

    #[test]
    fn test_invalid_data_key() {
        assert!(ExtensionConfig::from_toml_str("data_key = \"\"\n").is_err());
        assert!(ExtensionConfig::from_toml_str("data_key = \"my data\"\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        writeln!(file, "data_key = \"attachments\"").expect("Failed to write config");

        let config = ExtensionConfig::load(file.path()).expect("config should load");
        assert_eq!(config.data_key, "attachments");

        let text = config.to_toml_string().expect("config should encode");
        assert_eq!(
            ExtensionConfig::from_toml_str(&text).expect("config should reparse"),
            config
        );
    }
}
