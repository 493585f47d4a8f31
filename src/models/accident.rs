use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One avalanche accident as served by `/api/accidents/`.
///
/// The backend rows are uneven: text fields may be missing and the
/// coordinates are sometimes null or junk strings. Missing text becomes
/// empty, and a coordinate deserializes to `None` unless it is an actual
/// JSON number. Records without coordinates are kept; the marker renderer
/// skips them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccidentRecord {
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_coord")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_coord")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub fatalities: Option<i64>,
}

impl AccidentRecord {
    /// Both coordinates present as numbers.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.longitude, self.latitude) {
            (Some(lng), Some(lat)) => Some((lng, lat)),
            _ => None,
        }
    }
}

/// Accept any JSON value for a coordinate, yielding `Some` only for
/// numbers.
fn lenient_coord<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_f64())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> AccidentRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_full_record_parses() {
        let rec = parse(
            r#"{
                "location": "Loveland Pass",
                "state": "CO",
                "description": "Skier triggered slide on the north face.",
                "date": "2024-01-12",
                "latitude": 39.664,
                "longitude": -105.879,
                "season": "2023/24",
                "fatalities": 1
            }"#,
        );
        assert_eq!(rec.location, "Loveland Pass");
        assert_eq!(rec.coordinates(), Some((-105.879, 39.664)));
        assert_eq!(rec.season.as_deref(), Some("2023/24"));
        assert_eq!(rec.fatalities, Some(1));
    }

    #[test]
    fn test_string_coordinate_becomes_none() {
        let rec = parse(r#"{"latitude": "39.66", "longitude": -105.8}"#);
        assert_eq!(rec.latitude, None);
        assert_eq!(rec.longitude, Some(-105.8));
        assert_eq!(rec.coordinates(), None);
    }

    #[test]
    fn test_null_and_missing_coordinates_become_none() {
        let rec = parse(r#"{"latitude": null}"#);
        assert_eq!(rec.latitude, None);
        assert_eq!(rec.longitude, None);
    }

    #[test]
    fn test_integer_coordinate_is_accepted() {
        let rec = parse(r#"{"latitude": 40, "longitude": -105}"#);
        assert_eq!(rec.coordinates(), Some((-105.0, 40.0)));
    }

    #[test]
    fn test_missing_text_fields_default_to_empty() {
        let rec = parse(r#"{"latitude": 40.0, "longitude": -105.0}"#);
        assert_eq!(rec.location, "");
        assert_eq!(rec.date, "");
        assert_eq!(rec.season, None);
    }

    #[test]
    fn test_round_trips_through_json() {
        let rec = parse(r#"{"location": "Berthoud Pass", "latitude": 39.8, "longitude": null}"#);
        let json = serde_json::to_string(&rec).unwrap();
        let back: AccidentRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rec);
    }
}
