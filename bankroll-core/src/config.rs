//! Configuration management
//!
//! Settings live in an optional `settings.json`:
//! ```json
//! {
//!   "security": { "argon2": { "timeCost": 3, "memoryCost": 65536, ... } },
//!   "logging": { "filter": "info" }
//! }
//! ```
//! Keys this crate does not manage are preserved when saving.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::adapters::Argon2Params;

/// Settings file name inside the config directory
pub const SETTINGS_FILE: &str = "settings.json";

/// Env var: use minimal hashing cost (for CI/testing)
pub const FAST_HASHING_ENV: &str = "BANKROLL_FAST_HASHING";
/// Env var: tracing filter directive, e.g. `bankroll_core=debug`
pub const LOG_ENV: &str = "BANKROLL_LOG";

/// Default tracing filter
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    security: SecuritySettings,
    #[serde(default)]
    logging: LoggingSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SecuritySettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    argon2: Option<Argon2Params>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoggingSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    filter: Option<String>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Bankroll configuration (simplified view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    /// Cost parameters for newly hashed passwords
    pub argon2: Argon2Params,
    pub log_filter: String,
    // Keep the raw settings for preservation when saving
    _raw_settings: SettingsFile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            argon2: Argon2Params::default(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            _raw_settings: SettingsFile::default(),
        }
    }
}

impl Config {
    /// Load config from a directory, applying environment overrides
    ///
    /// Hashing cost can be lowered via `BANKROLL_FAST_HASHING` and the log
    /// filter replaced via `BANKROLL_LOG`.
    pub fn load(config_dir: &Path) -> Result<Self> {
        Self::load_with_env(config_dir, |key| std::env::var(key).ok())
    }

    /// Load config using `env` to look up overrides
    pub fn load_with_env(config_dir: &Path, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let settings_path = config_dir.join(SETTINGS_FILE);

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)
                .with_context(|| format!("Failed to read {}", settings_path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid settings in {}", settings_path.display()))?
        } else {
            SettingsFile::default()
        };

        let fast_hashing = matches!(
            env(FAST_HASHING_ENV).as_deref(),
            Some("true" | "1" | "yes" | "TRUE" | "YES")
        );
        let argon2 = if fast_hashing {
            Argon2Params::minimal()
        } else {
            raw.security.argon2.unwrap_or_default()
        };

        let log_filter = env(LOG_ENV)
            .filter(|f| !f.trim().is_empty())
            .or_else(|| raw.logging.filter.clone())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(Self {
            argon2,
            log_filter,
            _raw_settings: raw,
        })
    }

    /// Save config to a directory
    /// Preserves other settings this crate doesn't manage; a malformed
    /// existing file is an error and is left untouched
    pub fn save(&self, config_dir: &Path) -> Result<()> {
        let settings_path = config_dir.join(SETTINGS_FILE);

        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)
                .with_context(|| format!("Failed to read {}", settings_path.display()))?;
            serde_json::from_str::<SettingsFile>(&content)
                .with_context(|| format!("Invalid settings in {}", settings_path.display()))?
        } else {
            self._raw_settings.clone()
        };

        settings.security.argon2 = Some(self.argon2);
        settings.logging.filter = Some(self.log_filter.clone());

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)
            .with_context(|| format!("Failed to write {}", settings_path.display()))?;
        Ok(())
    }
}
