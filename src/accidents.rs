//! Cache-aware loading of accident records.
//!
//! A fresh cache answers without touching the network; otherwise the
//! backend is fetched, element-by-element tolerant parsing is applied,
//! and the result is written back with the next semi-monthly expiry.

use std::future::Future;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::cache::{next_refresh_after, CacheStore, CachedPayload};
use crate::error::AppError;
use crate::models::AccidentRecord;

#[derive(Debug, Clone)]
pub struct AccidentDataSource {
    store: CacheStore,
}

impl AccidentDataSource {
    pub fn new(store: CacheStore) -> Self {
        Self { store }
    }

    /// Load accident records, consulting the cache first.
    pub async fn load(&self, api: &ApiClient) -> Result<Vec<AccidentRecord>, AppError> {
        self.load_with(|| api.fetch_accidents()).await
    }

    /// The expiry of whatever is currently on disk, for display.
    pub fn cached_expiry(&self) -> Option<chrono::DateTime<Utc>> {
        self.store.load().map(|payload| payload.expiry)
    }

    /// Cache-or-fetch with the fetch step injected, so the no-network
    /// path is observable in tests.
    async fn load_with<F, Fut>(&self, fetch: F) -> Result<Vec<AccidentRecord>, AppError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, AppError>>,
    {
        if let Some(payload) = self.store.load() {
            if payload.is_fresh(Utc::now()) {
                debug!(
                    records = payload.data.len(),
                    expiry = %payload.expiry,
                    "Serving accidents from cache"
                );
                return Ok(payload.data);
            }
            debug!(expiry = %payload.expiry, "Accident cache expired");
        }

        let value = fetch().await?;
        let records = parse_accident_list(value)?;
        info!(records = records.len(), "Fetched accident data");

        let payload = CachedPayload::new(records, next_refresh_after(Utc::now()));
        if let Err(e) = self.store.save(&payload) {
            warn!(error = %e, "Failed to write accident cache");
        }
        Ok(payload.data)
    }
}

/// Require a JSON array and keep the elements that decode as records.
fn parse_accident_list(value: Value) -> Result<Vec<AccidentRecord>, AppError> {
    let Value::Array(items) = value else {
        return Err(AppError::Format("accidents response is not a JSON array".into()));
    };

    let records = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<AccidentRecord>(item) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(error = %e, "Skipping malformed accident record");
                None
            }
        })
        .collect();
    Ok(records)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    static DIR_SEQ: AtomicU32 = AtomicU32::new(0);

    fn temp_source() -> (AccidentDataSource, CacheStore, PathBuf) {
        let dir = std::env::temp_dir().join(format!(
            "avymap-source-test-{}-{}",
            std::process::id(),
            DIR_SEQ.fetch_add(1, Ordering::SeqCst)
        ));
        let store = CacheStore::new(dir.clone()).unwrap();
        (AccidentDataSource::new(store.clone()), store, dir)
    }

    fn records(names: &[&str]) -> Vec<AccidentRecord> {
        names
            .iter()
            .map(|name| {
                serde_json::from_value(json!({
                    "location": name,
                    "state": "CO",
                    "latitude": 39.0,
                    "longitude": -106.0
                }))
                .unwrap()
            })
            .collect()
    }

    #[tokio::test]
    async fn test_fresh_cache_skips_the_network() {
        let (source, store, dir) = temp_source();
        let cached = records(&["Loveland Pass"]);
        store
            .save(&CachedPayload::new(cached.clone(), Utc::now() + Duration::days(1)))
            .unwrap();

        let fetched = AtomicBool::new(false);
        let result = source
            .load_with(|| {
                fetched.store(true, Ordering::SeqCst);
                async { Ok(json!([])) }
            })
            .await
            .unwrap();

        assert!(!fetched.load(Ordering::SeqCst));
        assert_eq!(result, cached);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_expired_cache_refetches_and_overwrites() {
        let (source, store, dir) = temp_source();
        store
            .save(&CachedPayload::new(records(&["old"]), Utc::now() - Duration::days(1)))
            .unwrap();

        let result = source
            .load_with(|| async {
                Ok(json!([{"location": "fresh", "latitude": 40.0, "longitude": -105.0}]))
            })
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].location, "fresh");

        let rewritten = store.load().unwrap();
        assert_eq!(rewritten.data[0].location, "fresh");
        assert!(rewritten.expiry > Utc::now());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_absent_cache_fetches() {
        let (source, _store, dir) = temp_source();
        let result = source
            .load_with(|| async { Ok(json!([])) })
            .await
            .unwrap();
        assert!(result.is_empty());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_non_array_payload_is_a_format_error() {
        let (source, _store, dir) = temp_source();
        let result = source
            .load_with(|| async { Ok(json!({"detail": "oops"})) })
            .await;
        assert!(matches!(result, Err(AppError::Format(_))));
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_fetch_error_propagates_unchanged() {
        let (source, _store, dir) = temp_source();
        let result = source
            .load_with(|| async { Err(AppError::FetchAccidents("status 502".into())) })
            .await;
        assert!(matches!(result, Err(AppError::FetchAccidents(_))));
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_malformed_elements_are_skipped() {
        let (source, _store, dir) = temp_source();
        let result = source
            .load_with(|| async {
                Ok(json!([
                    {"location": "kept", "latitude": 39.0, "longitude": -106.0},
                    "just a string",
                    42,
                    {"location": "also kept", "latitude": "junk", "longitude": null}
                ]))
            })
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].location, "kept");
        assert_eq!(result[1].location, "also kept");
        assert_eq!(result[1].coordinates(), None);
        let _ = std::fs::remove_dir_all(dir);
    }
}
