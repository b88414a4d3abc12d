//! Configuration loading from TOML.
//!
//! Reads `config.toml` (or the file named by `WETTERONLINE_CONFIG`) and
//! deserializes into strongly-typed structs. Every section except
//! `[[locations]]` has defaults.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::time::Duration;

use crate::fetch::http::BROWSER_USER_AGENT;
use crate::fetch::{DEFAULT_TIMEOUT, ORIGIN};

/// Environment variable overriding the config path.
pub const CONFIG_PATH_ENV: &str = "WETTERONLINE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
/// Set (to anything) to log JSON lines.
pub const LOG_JSON_ENV: &str = "WETTERONLINE_LOG_JSON";

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub poller: PollerConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    pub locations: Vec<LocationConfig>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SourceConfig {
    pub origin: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            origin: ORIGIN.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            user_agent: BROWSER_USER_AGENT.to_string(),
        }
    }
}

impl SourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PollerConfig {
    pub interval_secs: u64,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self { interval_secs: 900 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 8080,
        }
    }
}

/// One WetterOnline page, e.g. `wetter/berlin`.
#[derive(Debug, Deserialize, Clone)]
pub struct LocationConfig {
    pub name: String,
    pub path: String,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_toml(&contents).with_context(|| format!("Invalid config file: {path}"))
    }

    /// Load from `WETTERONLINE_CONFIG`, falling back to `config.toml`.
    pub fn load_default() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load(&path)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents).context("Failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.locations.is_empty() {
            bail!("at least one [[locations]] entry is required");
        }
        if self.source.timeout_secs == 0 {
            bail!("source.timeout_secs must be positive");
        }
        if self.poller.interval_secs == 0 {
            bail!("poller.interval_secs must be positive");
        }
        let mut seen = HashSet::new();
        for loc in &self.locations {
            if loc.name.trim().is_empty() {
                bail!("location name must not be empty");
            }
            if loc.path.trim_start_matches('/').trim().is_empty() {
                bail!("location {:?} has an empty path", loc.name);
            }
            if !seen.insert(loc.name.as_str()) {
                bail!("duplicate location name {:?}", loc.name);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let cfg = AppConfig::from_toml(
            r#"
            [[locations]]
            name = "Berlin"
            path = "wetter/berlin"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.source.origin, "https://www.wetteronline.de");
        assert_eq!(cfg.source.timeout(), Duration::from_secs(10));
        assert!(cfg.source.user_agent.starts_with("Mozilla/5.0"));
        assert_eq!(cfg.poller.interval_secs, 900);
        assert!(cfg.dashboard.enabled);
        assert_eq!(cfg.dashboard.port, 8080);
        assert_eq!(cfg.locations[0].path, "wetter/berlin");
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let cfg = AppConfig::from_toml(
            r#"
            [source]
            timeout_secs = 3

            [dashboard]
            enabled = false

            [[locations]]
            name = "Köln"
            path = "/wetter/koeln"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.source.timeout_secs, 3);
        assert_eq!(cfg.source.origin, ORIGIN);
        assert!(!cfg.dashboard.enabled);
        assert_eq!(cfg.dashboard.port, 8080);
    }

    #[test]
    fn test_validation_failures() {
        assert!(AppConfig::from_toml("locations = []").is_err());
        assert!(AppConfig::from_toml(
            r#"
            [[locations]]
            name = "Berlin"
            path = "/"
            "#
        )
        .is_err());
        assert!(AppConfig::from_toml(
            r#"
            [[locations]]
            name = "Berlin"
            path = "wetter/berlin"
            [[locations]]
            name = "Berlin"
            path = "wetter/berlin-mitte"
            "#
        )
        .is_err());
        assert!(AppConfig::from_toml(
            r#"
            [poller]
            interval_secs = 0
            [[locations]]
            name = "Berlin"
            path = "wetter/berlin"
            "#
        )
        .is_err());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("wetteronline-{}.toml", uuid::Uuid::new_v4()));
        fs::write(
            &path,
            "[[locations]]\nname = \"Hamburg\"\npath = \"wetter/hamburg\"\n",
        )
        .unwrap();
        let cfg = AppConfig::load(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.locations[0].name, "Hamburg");
        let _ = fs::remove_file(&path);

        let err = AppConfig::load("/nonexistent/wetteronline.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_shipped_config_is_valid() {
        let cfg = AppConfig::load(concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml")).unwrap();
        assert!(!cfg.locations.is_empty());
    }
}
