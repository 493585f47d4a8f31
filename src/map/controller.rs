//! Map construction from fetched credentials.

use tracing::info;

use crate::error::AppError;
use crate::map::auth::AuthHelper;
use crate::map::view::{ControlPosition, MapConfig, MapControl, MapView};
use crate::models::AwsCredentials;

/// Map center, continental United States (lng, lat)
pub const MAP_CENTER: (f64, f64) = (-98.5795, 39.8283);

/// Default zoom for desktop-sized viewports
pub const DEFAULT_ZOOM: f64 = 4.0;

/// Viewports narrower than this start two zoom steps further out
const NARROW_VIEWPORT_PX: u16 = 768;

/// Zoom reduction applied to narrow viewports
const NARROW_ZOOM_REDUCTION: f64 = 2.0;

/// AWS Location style descriptor for the named map.
pub fn style_descriptor_url(region: &str, map_name: &str) -> String {
    format!(
        "https://maps.geo.{}.amazonaws.com/maps/v0/maps/{}/style-descriptor",
        region, map_name
    )
}

pub fn initial_zoom(viewport_width_px: u16) -> f64 {
    if viewport_width_px < NARROW_VIEWPORT_PX {
        DEFAULT_ZOOM - NARROW_ZOOM_REDUCTION
    } else {
        DEFAULT_ZOOM
    }
}

/// Build the map from the credential payload. Any failure along the way
/// classifies as `MapInitialization` and leaves no partial map behind.
pub fn initialize_map(
    creds: &AwsCredentials,
    viewport_width_px: u16,
) -> Result<MapView, AppError> {
    let auth = AuthHelper::with_identity_pool_id(&creds.identity_pool_id)
        .map_err(|e| AppError::MapInitialization(e.to_string()))?;

    let config = MapConfig {
        style_url: style_descriptor_url(&creds.region, &creds.map_name),
        center: MAP_CENTER,
        zoom: initial_zoom(viewport_width_px),
        auth: auth.map_authentication_options(),
    };

    let mut map = MapView::new(config).map_err(|e| AppError::MapInitialization(e.to_string()))?;
    map.add_control(MapControl::Navigation(ControlPosition::TopLeft));

    info!(
        zoom = map.zoom(),
        center = ?map.center(),
        region = %map.auth().region,
        style = %map.style_url(),
        "Map initialized"
    );
    Ok(map)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> AwsCredentials {
        serde_json::from_str(
            r#"{
                "identityPoolId": "us-east-1:9f2a6c1e-8b4d-4a2f-b6c3-1d5e7a9b0c2d",
                "region": "us-east-1",
                "mapName": "AvalancheMap"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_style_descriptor_url() {
        assert_eq!(
            style_descriptor_url("us-east-1", "AvalancheMap"),
            "https://maps.geo.us-east-1.amazonaws.com/maps/v0/maps/AvalancheMap/style-descriptor"
        );
    }

    #[test]
    fn test_initial_zoom_breakpoint() {
        assert_eq!(initial_zoom(1024), 4.0);
        assert_eq!(initial_zoom(768), 4.0);
        assert_eq!(initial_zoom(767), 2.0);
        assert_eq!(initial_zoom(320), 2.0);
    }

    #[test]
    fn test_initialize_map_wires_config_and_control() {
        let map = initialize_map(&creds(), 1024).unwrap();
        assert_eq!(map.center(), MAP_CENTER);
        assert_eq!(map.zoom(), DEFAULT_ZOOM);
        assert_eq!(map.auth().region, "us-east-1");
        assert_eq!(
            map.controls(),
            &[MapControl::Navigation(ControlPosition::TopLeft)]
        );
        assert!(map.style_url().contains("AvalancheMap"));
    }

    #[test]
    fn test_bad_pool_id_is_a_map_initialization_error() {
        let mut bad = creds();
        bad.identity_pool_id = "garbage".to_string();
        let result = initialize_map(&bad, 1024);
        assert!(matches!(result, Err(AppError::MapInitialization(_))));
    }
}
