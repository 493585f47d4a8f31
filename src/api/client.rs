//! API client for the avalanche accident backend.
//!
//! Classification differs per stage: everything that goes wrong while
//! fetching credentials is a single user-facing failure (`DataFetch`),
//! while the accidents request distinguishes transport errors, bad
//! statuses, and undecodable bodies.

use anyhow::Result;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::error::AppError;
use crate::models::AwsCredentials;

/// Path serving the map bootstrap credentials
const CREDENTIALS_PATH: &str = "/api/aws-credentials/";

/// Path serving the accident list
const ACCIDENTS_PATH: &str = "/api/accidents/";

/// API client for the backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client for the given backend base URL.
    ///
    /// No request timeout is set; the pipeline has no deadline and a
    /// failure simply surfaces in the banner.
    pub fn new(base_url: String) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self { client, base_url })
    }

    /// Fetch the AWS map bootstrap credentials.
    ///
    /// All failure modes collapse into `DataFetch`: transport errors,
    /// non-success statuses, and bodies that do not decode.
    pub async fn fetch_credentials(&self) -> Result<AwsCredentials, AppError> {
        let url = format!("{}{}", self.base_url, CREDENTIALS_PATH);
        debug!(url = %url, "Fetching AWS credentials");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::DataFetch(format!("request to {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(AppError::DataFetch(format!(
                "Failed to fetch AWS credentials: status {}",
                response.status()
            )));
        }

        response
            .json::<AwsCredentials>()
            .await
            .map_err(|e| AppError::DataFetch(format!("unexpected credentials payload: {}", e)))
    }

    /// Fetch the accident list as raw JSON.
    ///
    /// The array-shape check belongs to the data source, so this returns
    /// the decoded `Value`. Transport failures are `Network`, bad
    /// statuses are `FetchAccidents`, and a body that is not JSON at all
    /// falls into the unexpected bucket.
    pub async fn fetch_accidents(&self) -> Result<Value, AppError> {
        let url = format!("{}{}", self.base_url, ACCIDENTS_PATH);
        debug!(url = %url, "Fetching accident data");

        let response = self.client.get(&url).send().await.map_err(AppError::Network)?;

        if !response.status().is_success() {
            return Err(AppError::FetchAccidents(format!(
                "Failed to fetch accidents data: status {}",
                response.status()
            )));
        }

        let body = response.text().await.map_err(AppError::Network)?;
        serde_json::from_str(&body).map_err(AppError::unexpected)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_paths_keep_trailing_slash() {
        // The backend 404s without them
        assert!(CREDENTIALS_PATH.ends_with('/'));
        assert!(ACCIDENTS_PATH.ends_with('/'));
    }

    #[test]
    fn test_client_builds_for_any_base_url() {
        assert!(ApiClient::new("http://localhost:8000".to_string()).is_ok());
    }
}
