use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::AccidentRecord;

/// Cache file name, one payload per installation
const CACHE_FILE: &str = "accidentsData.json";

/// Accident records plus the moment they stop being served from disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedPayload {
    pub data: Vec<AccidentRecord>,
    pub expiry: DateTime<Utc>,
}

impl CachedPayload {
    pub fn new(data: Vec<AccidentRecord>, expiry: DateTime<Utc>) -> Self {
        Self { data, expiry }
    }

    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expiry
    }
}

#[derive(Debug, Clone)]
pub struct CacheStore {
    cache_dir: PathBuf,
}

impl CacheStore {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)?;
        Ok(Self { cache_dir })
    }

    fn cache_path(&self) -> PathBuf {
        self.cache_dir.join(CACHE_FILE)
    }

    /// Load the cached payload. A missing file is a miss; an unreadable
    /// or undecodable file is logged and treated as a miss so the next
    /// fetch overwrites it.
    pub fn load(&self) -> Option<CachedPayload> {
        let path = self.cache_path();
        if !path.exists() {
            return None;
        }

        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read accident cache");
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(payload) => Some(payload),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to parse accident cache");
                None
            }
        }
    }

    pub fn save(&self, payload: &CachedPayload) -> Result<()> {
        let path = self.cache_path();
        let contents = serde_json::to_string_pretty(payload)?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write cache file: {}", path.display()))?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::sync::atomic::{AtomicU32, Ordering};

    static DIR_SEQ: AtomicU32 = AtomicU32::new(0);

    fn temp_store() -> (CacheStore, PathBuf) {
        let dir = std::env::temp_dir().join(format!(
            "avymap-store-test-{}-{}",
            std::process::id(),
            DIR_SEQ.fetch_add(1, Ordering::SeqCst)
        ));
        (CacheStore::new(dir.clone()).unwrap(), dir)
    }

    fn sample_records() -> Vec<AccidentRecord> {
        serde_json::from_str(
            r#"[{"location": "Teton Pass", "state": "WY", "latitude": 43.5, "longitude": -110.9}]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_load_without_file_is_none() {
        let (store, dir) = temp_store();
        assert!(store.load().is_none());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let (store, dir) = temp_store();
        let payload = CachedPayload::new(sample_records(), Utc::now() + Duration::days(3));
        store.save(&payload).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.data, payload.data);
        assert_eq!(loaded.expiry, payload.expiry);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_corrupt_file_is_a_miss() {
        let (store, dir) = temp_store();
        std::fs::write(dir.join(CACHE_FILE), "{not json").unwrap();
        assert!(store.load().is_none());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_save_overwrites_previous_payload() {
        let (store, dir) = temp_store();
        let expiry = Utc::now() + Duration::days(1);
        store.save(&CachedPayload::new(sample_records(), expiry)).unwrap();
        store.save(&CachedPayload::new(Vec::new(), expiry)).unwrap();

        let loaded = store.load().unwrap();
        assert!(loaded.data.is_empty());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_is_fresh_tracks_expiry() {
        let now = Utc::now();
        let payload = CachedPayload::new(Vec::new(), now + Duration::hours(1));
        assert!(payload.is_fresh(now));
        assert!(!payload.is_fresh(now + Duration::hours(1)));
        assert!(!payload.is_fresh(now + Duration::hours(2)));
    }
}
