use serde::Deserialize;

/// Map bootstrap credentials returned by `/api/aws-credentials/`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsCredentials {
    pub identity_pool_id: String,
    pub region: String,
    pub map_name: String,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_camel_case_payload() {
        let json = r#"{
            "identityPoolId": "us-east-1:9f2a6c1e-8b4d-4a2f-b6c3-1d5e7a9b0c2d",
            "region": "us-east-1",
            "mapName": "AvalancheMap"
        }"#;
        let creds: AwsCredentials = serde_json::from_str(json).unwrap();
        assert_eq!(creds.region, "us-east-1");
        assert_eq!(creds.map_name, "AvalancheMap");
        assert!(creds.identity_pool_id.starts_with("us-east-1:"));
    }
}
