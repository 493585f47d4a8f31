//! Identity-pool authentication for the map style endpoint.

use anyhow::{bail, Result};

/// Authentication options attached to the map at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapAuthOptions {
    pub identity_pool_id: String,
    pub region: String,
}

/// Validates a Cognito identity pool id and derives the signing region
/// from it. Pool ids look like `us-east-1:<uuid>`.
#[derive(Debug, Clone)]
pub struct AuthHelper {
    identity_pool_id: String,
    region: String,
}

impl AuthHelper {
    pub fn with_identity_pool_id(identity_pool_id: &str) -> Result<Self> {
        let Some((region, guid)) = identity_pool_id.split_once(':') else {
            bail!("identity pool id has no region prefix: {}", identity_pool_id);
        };
        if region.is_empty() || !region.contains('-') {
            bail!("identity pool id has an invalid region: {}", identity_pool_id);
        }
        if !is_valid_guid(guid) {
            bail!("identity pool id has an invalid guid: {}", identity_pool_id);
        }
        Ok(Self {
            identity_pool_id: identity_pool_id.to_string(),
            region: region.to_string(),
        })
    }

    pub fn map_authentication_options(&self) -> MapAuthOptions {
        MapAuthOptions {
            identity_pool_id: self.identity_pool_id.clone(),
            region: self.region.clone(),
        }
    }
}

/// GUIDs are 36 characters with dashes: xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx
fn is_valid_guid(s: &str) -> bool {
    if s.len() != 36 {
        return false;
    }
    s.chars().enumerate().all(|(i, c)| {
        if i == 8 || i == 13 || i == 18 || i == 23 {
            c == '-'
        } else {
            c.is_ascii_hexdigit()
        }
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const POOL_ID: &str = "us-east-1:9f2a6c1e-8b4d-4a2f-b6c3-1d5e7a9b0c2d";

    #[test]
    fn test_valid_pool_id_parses() {
        let helper = AuthHelper::with_identity_pool_id(POOL_ID).unwrap();
        let options = helper.map_authentication_options();
        assert_eq!(options.identity_pool_id, POOL_ID);
        assert_eq!(options.region, "us-east-1");
    }

    #[test]
    fn test_pool_id_without_region_is_rejected() {
        assert!(AuthHelper::with_identity_pool_id("9f2a6c1e-8b4d-4a2f-b6c3-1d5e7a9b0c2d").is_err());
        assert!(AuthHelper::with_identity_pool_id("").is_err());
    }

    #[test]
    fn test_pool_id_with_bad_guid_is_rejected() {
        assert!(AuthHelper::with_identity_pool_id("us-east-1:not-a-guid").is_err());
        assert!(AuthHelper::with_identity_pool_id("us-east-1:").is_err());
    }

    #[test]
    fn test_is_valid_guid() {
        // Valid GUIDs
        assert!(is_valid_guid("0E65066C-AB20-4DA0-B3BF-79DFD0668049"));
        assert!(is_valid_guid("22b210e3-d325-41be-b761-31e18bfe2c73")); // lowercase
        assert!(is_valid_guid("00000000-0000-0000-0000-000000000000"));

        // Invalid GUIDs
        assert!(!is_valid_guid("")); // empty
        assert!(!is_valid_guid("not-a-guid")); // too short
        assert!(!is_valid_guid("0E65066CAB204DA0B3BF79DFD0668049")); // no dashes
        assert!(!is_valid_guid("ZZZZZZZZ-ZZZZ-ZZZZ-ZZZZ-ZZZZZZZZZZZZ")); // invalid chars
    }
}
