use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed numeric values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root holding `catalogs/` and `pathways/`.
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub reports_dir: PathBuf,
    /// Major table JSON.
    pub curation_config: PathBuf,
    pub recommendations_per_slot: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let recommendations_per_slot = env_or("RECOMMENDATIONS_PER_SLOT", "5")
            .parse::<usize>()
            .context("RECOMMENDATIONS_PER_SLOT must be a non-negative integer")?;
        if recommendations_per_slot == 0 {
            anyhow::bail!("RECOMMENDATIONS_PER_SLOT must be at least 1");
        }

        Ok(Config {
            data_dir: env_or("DATA_DIR", "data").into(),
            output_dir: env_or("OUTPUT_DIR", "data/curated_roadmaps").into(),
            reports_dir: env_or("REPORTS_DIR", "data/comparison_reports").into(),
            curation_config: env_or("CURATION_CONFIG", "curation_engine/config.json").into(),
            recommendations_per_slot,
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
