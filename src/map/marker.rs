//! Markers and their popups.
//!
//! One marker per accident record. Failure handling is per record: a
//! record without numeric coordinates is skipped quietly, a record the
//! map rejects produces one error, and neither stops the rest of the
//! batch.

use tracing::debug;

use crate::error::AppError;
use crate::map::view::MapView;
use crate::models::AccidentRecord;
use crate::utils::display_date;

/// Popup anchor offset, in the display units the web map uses for pixels
pub const POPUP_OFFSET: u16 = 25;

#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub heading: String,
    pub lines: Vec<String>,
    pub offset: u16,
}

impl Popup {
    pub fn for_accident(record: &AccidentRecord) -> Self {
        let mut lines = vec![
            record.description.clone(),
            format!("Date: {}", display_date(&record.date)),
        ];
        if let Some(ref season) = record.season {
            lines.push(format!("Season: {}", season));
        }
        if let Some(fatalities) = record.fatalities {
            lines.push(format!("Fatalities: {}", fatalities));
        }

        Self {
            heading: format!("{}, {}", record.location, record.state),
            lines,
            offset: POPUP_OFFSET,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    lng: f64,
    lat: f64,
    popup: Option<Popup>,
}

impl Marker {
    /// A marker at the given coordinates. Out-of-range values are the
    /// per-marker failure the map would reject at render time.
    pub fn at(lng: f64, lat: f64) -> Result<Self, AppError> {
        if !(-180.0..=180.0).contains(&lng) {
            return Err(AppError::Marker(format!("longitude out of range: {}", lng)));
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(AppError::Marker(format!("latitude out of range: {}", lat)));
        }
        Ok(Self {
            lng,
            lat,
            popup: None,
        })
    }

    pub fn with_popup(mut self, popup: Popup) -> Self {
        self.popup = Some(popup);
        self
    }

    pub fn coordinates(&self) -> (f64, f64) {
        (self.lng, self.lat)
    }

    pub fn popup(&self) -> Option<&Popup> {
        self.popup.as_ref()
    }
}

/// Plot one marker per record onto the map.
///
/// With no map to draw on there is nothing to iterate: the single
/// returned error covers the whole batch.
pub fn render_accidents(map: Option<&mut MapView>, records: &[AccidentRecord]) -> Vec<AppError> {
    let Some(map) = map else {
        return vec![AppError::Marker("map is not initialized".into())];
    };

    let mut failures = Vec::new();
    for record in records {
        let Some((lng, lat)) = record.coordinates() else {
            debug!(location = %record.location, "Skipping record without coordinates");
            continue;
        };
        match Marker::at(lng, lat) {
            Ok(marker) => map.add_marker(marker.with_popup(Popup::for_accident(record))),
            Err(e) => failures.push(e),
        }
    }
    failures
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::auth::MapAuthOptions;
    use crate::map::view::MapConfig;
    use serde_json::json;

    fn test_map() -> MapView {
        MapView::new(MapConfig {
            style_url: "https://example.com/style-descriptor".to_string(),
            center: (-98.5795, 39.8283),
            zoom: 4.0,
            auth: MapAuthOptions {
                identity_pool_id: "us-east-1:00000000-0000-0000-0000-000000000000".to_string(),
                region: "us-east-1".to_string(),
            },
        })
        .unwrap()
    }

    fn record(value: serde_json::Value) -> AccidentRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_marker_rejects_out_of_range_coordinates() {
        assert!(Marker::at(-105.0, 39.0).is_ok());
        assert!(matches!(Marker::at(-185.0, 39.0), Err(AppError::Marker(_))));
        assert!(matches!(Marker::at(-105.0, 95.0), Err(AppError::Marker(_))));
    }

    #[test]
    fn test_popup_content_for_full_record() {
        let popup = Popup::for_accident(&record(json!({
            "location": "Loveland Pass",
            "state": "CO",
            "description": "Skier triggered slide.",
            "date": "2024-01-12",
            "season": "2023/24",
            "fatalities": 1
        })));
        assert_eq!(popup.heading, "Loveland Pass, CO");
        assert_eq!(popup.lines[0], "Skier triggered slide.");
        assert_eq!(popup.lines[1], "Date: Jan 12, 2024");
        assert_eq!(popup.lines[2], "Season: 2023/24");
        assert_eq!(popup.lines[3], "Fatalities: 1");
        assert_eq!(popup.offset, POPUP_OFFSET);
    }

    #[test]
    fn test_popup_omits_absent_optional_lines() {
        let popup = Popup::for_accident(&record(json!({
            "location": "Teton Pass",
            "state": "WY",
            "description": "",
            "date": "2024-02-02"
        })));
        assert_eq!(popup.lines.len(), 2);
    }

    #[test]
    fn test_render_without_map_is_a_single_marker_error() {
        let records = vec![
            record(json!({"latitude": 39.0, "longitude": -106.0})),
            record(json!({"latitude": 40.0, "longitude": -105.0})),
        ];
        let failures = render_accidents(None, &records);
        assert_eq!(failures.len(), 1);
        assert!(matches!(failures[0], AppError::Marker(_)));
    }

    #[test]
    fn test_records_without_coordinates_are_skipped() {
        let mut map = test_map();
        let records = vec![
            record(json!({"location": "kept", "latitude": 39.0, "longitude": -106.0})),
            record(json!({"location": "no coords", "latitude": "n/a"})),
            record(json!({"location": "also kept", "latitude": 43.5, "longitude": -110.9})),
        ];
        let failures = render_accidents(Some(&mut map), &records);
        assert!(failures.is_empty());
        assert_eq!(map.markers().len(), 2);
    }

    #[test]
    fn test_bad_marker_does_not_stop_the_batch() {
        let mut map = test_map();
        let records = vec![
            record(json!({"location": "bad", "latitude": 95.0, "longitude": -106.0})),
            record(json!({"location": "good", "latitude": 39.0, "longitude": -106.0})),
        ];
        let failures = render_accidents(Some(&mut map), &records);
        assert_eq!(failures.len(), 1);
        assert_eq!(map.markers().len(), 1);
        let popup = map.markers()[0].popup().unwrap();
        assert_eq!(popup.heading, "good, ");
    }
}
