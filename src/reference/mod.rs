//! Valid agent and map name lists.
//!
//! Names come from the remote game API when available, pass through a JSON
//! disk cache with a max age, and fall back to hardcoded lists so the
//! pipeline works fully offline. Extraction code only ever consumes the
//! returned lists.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use crate::config::AppConfig;

/// Offline fallback agent roster.
pub const FALLBACK_AGENTS: &[&str] = &[
    "Astra", "Breach", "Brimstone", "Chamber", "Clove", "Cypher", "Deadlock", "Fade", "Gekko",
    "Harbor", "Iso", "Jett", "KAY/O", "Killjoy", "Neon", "Omen", "Phoenix", "Raze", "Reyna",
    "Sage", "Skye", "Sova", "Viper", "Yoru",
];

/// Offline fallback map pool.
pub const FALLBACK_MAPS: &[&str] = &[
    "Ascent", "Bind", "Breeze", "Fracture", "Haven", "Icebox", "Lotus", "Pearl", "Split", "Sunset",
];

#[derive(Deserialize)]
struct ApiResponse {
    data: Vec<ApiEntry>,
}

#[derive(Deserialize)]
struct ApiEntry {
    #[serde(rename = "displayName")]
    display_name: String,
}

/// Resolved reference lists for one processing run.
pub struct ReferenceData {
    pub agents: Vec<String>,
    pub maps: Vec<String>,
}

impl ReferenceData {
    /// Loads both lists. `offline` skips cache and network entirely.
    pub fn load(config: &AppConfig, offline: bool) -> Self {
        if offline {
            log::info!("Offline mode, using hardcoded reference lists");
            return Self::fallback();
        }
        Self {
            agents: fetch_list(config, "agents", "agents?isPlayableCharacter=true", |_| true),
            maps: fetch_list(config, "maps", "maps", |name| {
                name != "The Range" && !name.to_uppercase().contains("RANGE")
            }),
        }
    }

    pub fn fallback() -> Self {
        Self {
            agents: FALLBACK_AGENTS.iter().map(|s| s.to_string()).collect(),
            maps: FALLBACK_MAPS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Cache, then API, then hardcoded list.
fn fetch_list(
    config: &AppConfig,
    cache_name: &str,
    endpoint: &str,
    keep: impl Fn(&str) -> bool,
) -> Vec<String> {
    if let Some(cached) = read_cache(config, cache_name) {
        return cached;
    }

    match fetch_from_api(config, endpoint) {
        Ok(items) => {
            let items: Vec<String> = items.into_iter().filter(|name| keep(name)).collect();
            log::info!("Fetched {} {} from API", items.len(), cache_name);
            if let Err(err) = write_cache(config, cache_name, &items) {
                log::warn!("Failed to write {} cache: {:#}", cache_name, err);
            }
            items
        }
        Err(err) => {
            log::warn!("API fetch for {} failed ({:#}), using hardcoded list", cache_name, err);
            match cache_name {
                "maps" => FALLBACK_MAPS.iter().map(|s| s.to_string()).collect(),
                _ => FALLBACK_AGENTS.iter().map(|s| s.to_string()).collect(),
            }
        }
    }
}

fn fetch_from_api(config: &AppConfig, endpoint: &str) -> Result<Vec<String>> {
    if !config.api.enabled {
        anyhow::bail!("API disabled in config");
    }
    let url = format!("{}/{}", config.api.base_url, endpoint);
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(config.api.timeout_secs))
        .build()
        .context("Failed to build HTTP client")?;
    let response = client.get(&url).send().with_context(|| format!("GET {url} failed"))?;
    if !response.status().is_success() {
        anyhow::bail!("GET {url} returned {}", response.status());
    }
    let body: ApiResponse = response.json().context("Failed to parse API response")?;
    Ok(body.data.into_iter().map(|entry| entry.display_name).collect())
}

fn cache_file(config: &AppConfig, cache_name: &str) -> PathBuf {
    config.cache.dir.join(format!("{cache_name}_cache.json"))
}

/// Returns cached data when present and younger than the configured max age.
fn read_cache(config: &AppConfig, cache_name: &str) -> Option<Vec<String>> {
    if !config.cache.enabled {
        return None;
    }
    let path = cache_file(config, cache_name);
    let metadata = std::fs::metadata(&path).ok()?;
    let age = SystemTime::now().duration_since(metadata.modified().ok()?).ok()?;
    let max_age = Duration::from_secs(config.cache.max_age_days * 24 * 60 * 60);
    if age > max_age {
        log::debug!("{} cache is stale ({}d old)", cache_name, age.as_secs() / 86400);
        return None;
    }
    let contents = std::fs::read_to_string(&path).ok()?;
    let data: Vec<String> = serde_json::from_str(&contents).ok()?;
    log::debug!("Using cached {} list ({} items)", cache_name, data.len());
    Some(data)
}

fn write_cache(config: &AppConfig, cache_name: &str, data: &[String]) -> Result<()> {
    if !config.cache.enabled {
        return Ok(());
    }
    std::fs::create_dir_all(&config.cache.dir).context("Failed to create cache directory")?;
    let path = cache_file(config, cache_name);
    let json = serde_json::to_string(data).context("Failed to serialize cache")?;
    std::fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Removes one named cache, or every cache when `cache_name` is `None`,
/// forcing a refresh on the next fetch.
pub fn clear_cache(config: &AppConfig, cache_name: Option<&str>) -> Result<()> {
    match cache_name {
        Some(name) => {
            let path = cache_file(config, name);
            if path.exists() {
                std::fs::remove_file(&path)
                    .with_context(|| format!("Failed to remove {}", path.display()))?;
                log::info!("Cleared {} cache", name);
            }
        }
        None => {
            if let Ok(entries) = std::fs::read_dir(&config.cache.dir) {
                for entry in entries.filter_map(|e| e.ok()) {
                    let name = entry.file_name().to_string_lossy().to_string();
                    if name.ends_with("_cache.json") {
                        std::fs::remove_file(entry.path())
                            .with_context(|| format!("Failed to remove {}", name))?;
                        log::info!("Cleared cache: {}", name);
                    }
                }
            }
        }
    }
    Ok(())
}
