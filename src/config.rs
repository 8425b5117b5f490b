//! Global CLI configuration management
//!
//! Stores the shared secret, separator and validity window in
//! ~/.strcode/config.json

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_SEPARATOR: &str = ":";
pub const DEFAULT_EXPIRES_IN_SECS: u64 = 3600;

fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

fn default_expires_in_secs() -> u64 {
    DEFAULT_EXPIRES_IN_SECS
}

/// Global CLI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrcodeConfig {
    /// Shared secret used for the checksum
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,

    /// Field separator
    #[serde(default = "default_separator")]
    pub separator: String,

    /// Token validity window in seconds
    #[serde(default = "default_expires_in_secs")]
    pub expires_in_secs: u64,
}

impl Default for StrcodeConfig {
    fn default() -> Self {
        Self {
            secret: None,
            separator: default_separator(),
            expires_in_secs: DEFAULT_EXPIRES_IN_SECS,
        }
    }
}

impl StrcodeConfig {
    pub fn expires_in(&self) -> Duration {
        Duration::from_secs(self.expires_in_secs)
    }

    /// Secret with everything but the first two characters masked
    pub fn masked_secret(&self) -> Option<String> {
        self.secret.as_ref().map(|secret| {
            let visible: String = secret.chars().take(2).collect();
            format!("{}{}", visible, "*".repeat(secret.chars().count().saturating_sub(2)))
        })
    }
}

/// Configuration manager
pub struct ConfigManager;

impl ConfigManager {
    /// Get the config file path
    pub fn get_config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Failed to get home directory")?;
        Ok(home.join(".strcode").join("config.json"))
    }

    /// Load the configuration from the default location
    pub fn load() -> Result<StrcodeConfig> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Save the configuration to the default location
    pub fn save(config: &StrcodeConfig) -> Result<()> {
        Self::save_to(&Self::get_config_path()?, config)
    }

    /// Load the configuration from `path`
    pub fn load_from(path: &Path) -> Result<StrcodeConfig> {
        // Return default config if file doesn't exist
        if !path.exists() {
            return Ok(StrcodeConfig::default());
        }

        let json =
            fs::read_to_string(path).context(format!("Failed to read config file: {:?}", path))?;

        let config: StrcodeConfig = serde_json::from_str(&json)
            .context(format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Save the configuration to `path`
    pub fn save_to(path: &Path, config: &StrcodeConfig) -> Result<()> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .context(format!("Failed to create config directory: {:?}", parent))?;
        }

        let json = serde_json::to_string_pretty(config).context("Failed to serialize config")?;

        fs::write(path, json).context(format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    /// Remove the configuration file at `path` (no-op if missing)
    pub fn clear_at(path: &Path) -> Result<()> {
        if path.exists() {
            fs::remove_file(path).context(format!("Failed to remove config file: {:?}", path))?;
        }
        Ok(())
    }

    /// Remove the configuration file
    pub fn clear() -> Result<()> {
        Self::clear_at(&Self::get_config_path()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StrcodeConfig::default();
        assert!(config.secret.is_none());
        assert_eq!(config.separator, ":");
        assert_eq!(config.expires_in(), Duration::from_secs(3600));
    }

    #[test]
    fn test_config_serialization() {
        let config = StrcodeConfig {
            secret: Some("test-secret".to_string()),
            separator: "|".to_string(),
            expires_in_secs: 60,
        };

        let json = serde_json::to_string(&config).unwrap();
        let parsed: StrcodeConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: StrcodeConfig = serde_json::from_str(r#"{"secret":"abc"}"#).unwrap();

        assert_eq!(parsed.secret, Some("abc".to_string()));
        assert_eq!(parsed.separator, DEFAULT_SEPARATOR);
        assert_eq!(parsed.expires_in_secs, DEFAULT_EXPIRES_IN_SECS);
    }

    #[test]
    fn test_secret_not_serialized_when_none() {
        let json = serde_json::to_string(&StrcodeConfig::default()).unwrap();
        assert!(!json.contains("secret"));
    }

    #[test]
    fn test_masked_secret() {
        let config = StrcodeConfig {
            secret: Some("secretKey123".to_string()),
            ..Default::default()
        };
        assert_eq!(config.masked_secret(), Some("se**********".to_string()));

        let short = StrcodeConfig {
            secret: Some("k".to_string()),
            ..Default::default()
        };
        assert_eq!(short.masked_secret(), Some("k".to_string()));
        assert_eq!(StrcodeConfig::default().masked_secret(), None);
    }

    #[test]
    fn test_save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        // Missing file loads defaults
        assert_eq!(
            ConfigManager::load_from(&path).unwrap(),
            StrcodeConfig::default()
        );

        let config = StrcodeConfig {
            secret: Some("s3cret".to_string()),
            separator: "~".to_string(),
            expires_in_secs: 120,
        };
        ConfigManager::save_to(&path, &config).unwrap();
        assert_eq!(ConfigManager::load_from(&path).unwrap(), config);

        ConfigManager::clear_at(&path).unwrap();
        assert!(!path.exists());
        ConfigManager::clear_at(&path).unwrap();
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();

        let err = ConfigManager::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
