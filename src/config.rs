//! Application configuration.
//!
//! The only tunable is the backend base URL, taken from the
//! `AVYMAP_BACKEND_URL` environment variable (a `.env` file is honored)
//! and otherwise defaulting to the production backend. The cache
//! directory also hosts the log file.

use std::path::PathBuf;

use anyhow::Result;

/// Application name used for cache directory paths
const APP_NAME: &str = "avymap";

/// Backend serving the credential and accident endpoints
const DEFAULT_BACKEND_URL: &str = "https://avalanchebackend.onrender.com";

/// Environment variable overriding the backend base URL
const BACKEND_URL_VAR: &str = "AVYMAP_BACKEND_URL";

#[derive(Debug, Clone)]
pub struct Config {
    pub backend_url: String,
}

impl Config {
    pub fn load() -> Self {
        let backend_url = std::env::var(BACKEND_URL_VAR)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
        Self { backend_url }
    }

    /// The directory holding the accident cache and the log file,
    /// created on first use.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?
            .join(APP_NAME);
        std::fs::create_dir_all(&cache_dir)?;
        Ok(cache_dir)
    }
}

// ============================================================================
// Tests
// ============================================================================
