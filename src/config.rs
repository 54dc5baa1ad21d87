//! Application configuration.
//!
//! Loaded from a JSON file at startup and passed down by reference; there is
//! no global config instance. Every field has a default so a missing or
//! partial file still yields a usable configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths;

/// Remote reference-list API settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_enabled")]
    pub enabled: bool,
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_api_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_enabled() -> bool {
    true
}

fn default_api_base_url() -> String {
    "https://valorant-api.com/v1".to_string()
}

fn default_api_timeout_secs() -> u64 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: default_api_enabled(),
            base_url: default_api_base_url(),
            timeout_secs: default_api_timeout_secs(),
        }
    }
}

/// Disk cache settings for reference lists.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
    #[serde(default = "default_cache_max_age_days")]
    pub max_age_days: u64,
    /// Cache directory; defaults to `~/.practistics/cache`.
    #[serde(default = "paths::get_cache_dir")]
    pub dir: PathBuf,
}

fn default_cache_enabled() -> bool {
    true
}

fn default_cache_max_age_days() -> u64 {
    7
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            max_age_days: default_cache_max_age_days(),
            dir: paths::get_cache_dir(),
        }
    }
}

/// Complete application configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where match CSV/JSON exports are written.
    #[serde(default = "paths::get_matches_dir")]
    pub output_dir: PathBuf,
    /// Where failure diagnostics are written.
    #[serde(default = "paths::get_error_logs_dir")]
    pub log_dir: PathBuf,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    /// Minimum similarity ratio for accepting a fuzzy name match.
    #[serde(default = "default_fuzzy_cutoff")]
    pub fuzzy_cutoff: f64,
    /// Minimum template-match confidence for a plant-site detection.
    #[serde(default = "default_site_confidence")]
    pub site_confidence: f64,
    /// OCR token index below which an "Operator" hit counts as the team's.
    /// The loadout panel lists team rows first; where the opponent block
    /// starts in the token stream varies with how many rows OCR picks up.
    #[serde(default = "default_awp_team_boundary")]
    pub awp_team_boundary: usize,
    /// Path to the spike reference sprite used for plant-site detection.
    #[serde(default = "default_spike_template")]
    pub spike_template: PathBuf,
}

fn default_fuzzy_cutoff() -> f64 {
    0.6
}

fn default_site_confidence() -> f64 {
    0.70
}

fn default_awp_team_boundary() -> usize {
    11
}

fn default_spike_template() -> PathBuf {
    PathBuf::from("spike.png")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: paths::get_matches_dir(),
            log_dir: paths::get_error_logs_dir(),
            api: ApiConfig::default(),
            cache: CacheConfig::default(),
            fuzzy_cutoff: default_fuzzy_cutoff(),
            site_confidence: default_site_confidence(),
            awp_team_boundary: default_awp_team_boundary(),
            spike_template: default_spike_template(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a JSON file, or returns defaults when the
    /// file is absent. A present-but-unparsable file is an error rather
    /// than a silent fallback.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            log::warn!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_when_no_path() {
        let config = AppConfig::load(None).unwrap();
        assert_eq!(config.fuzzy_cutoff, 0.6);
        assert_eq!(config.awp_team_boundary, 11);
        assert!(config.cache.enabled);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, r#"{{"awp_team_boundary": 10, "api": {{"enabled": false}}}}"#).unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.awp_team_boundary, 10);
        assert!(!config.api.enabled);
        // Untouched fields keep defaults
        assert_eq!(config.site_confidence, 0.70);
        assert_eq!(config.cache.max_age_days, 7);
    }

    #[test]
    fn test_invalid_json_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(AppConfig::load(Some(&path)).is_err());
    }
}
