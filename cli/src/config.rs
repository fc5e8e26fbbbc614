use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

use kcal_core::insights::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS, InsightConfig};

pub const LOG_FILE_ENV: &str = "KCAL_LOG_FILE";
pub const INSIGHTS_API_KEY_ENV: &str = "KCAL_INSIGHTS_API_KEY";
pub const INSIGHTS_BASE_URL_ENV: &str = "KCAL_INSIGHTS_BASE_URL";
pub const INSIGHTS_MODEL_ENV: &str = "KCAL_INSIGHTS_MODEL";

pub struct Config {
    pub log_path: PathBuf,
    pub insights: InsightConfig,
}

impl Config {
    pub fn load() -> Result<Self> {
        let log_path = match std::env::var_os(LOG_FILE_ENV) {
            Some(path) if !path.is_empty() => PathBuf::from(path),
            _ => {
                let proj_dirs = ProjectDirs::from("", "", "kcal")
                    .context("Could not determine home directory")?;
                let data_dir = proj_dirs.data_dir().to_path_buf();
                std::fs::create_dir_all(&data_dir).with_context(|| {
                    format!("Failed to create data directory: {}", data_dir.display())
                })?;
                data_dir.join("log.json")
            }
        };

        Ok(Config {
            log_path,
            insights: insight_config_from(|key| std::env::var(key).ok()),
        })
    }
}

/// Build the insight settings from a variable lookup. Blank values count as
/// unset.
pub fn insight_config_from(lookup: impl Fn(&str) -> Option<String>) -> InsightConfig {
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
    InsightConfig {
        api_key: get(INSIGHTS_API_KEY_ENV),
        base_url: get(INSIGHTS_BASE_URL_ENV)
            .map_or_else(|| DEFAULT_BASE_URL.to_string(), |u| u.trim_end_matches('/').to_string()),
        model: get(INSIGHTS_MODEL_ENV).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        timeout_secs: DEFAULT_TIMEOUT_SECS,
    }
}
