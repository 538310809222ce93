//! Core data model: club locations and the remote feed they come from.

use serde::Deserialize;

use crate::state::projection::GeoPoint;

/// A named geographic point. Created once when the club feed resolves and
/// never mutated afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Location {
    pub name: String,
    pub point: GeoPoint,
}

/// One raw record of the club feed.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ClubRecord {
    #[serde(default)]
    pub fields: ClubFields,
}

/// The feed encodes coordinates as single-element arrays; an empty array
/// means the club has not been geocoded. A latitude of exactly zero is the
/// source's "no data" marker, not the equator.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ClubFields {
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Customized Name", default)]
    pub customized_name: Option<String>,
    #[serde(rename = "Latitude", default)]
    pub latitude: Vec<f64>,
    #[serde(rename = "Longitude", default)]
    pub longitude: Vec<f64>,
}

/// Turn feed records into locations, dropping records without a usable
/// coordinate pair. Clubs that set a customized display name get it.
pub fn locations_from_records(records: Vec<ClubRecord>) -> Vec<Location> {
    records
        .into_iter()
        .filter_map(|r| {
            let f = r.fields;
            let lat = *f.latitude.first()?;
            let lon = *f.longitude.first()?;
            if lat == 0.0 {
                return None;
            }
            let name = match f.customized_name {
                Some(custom) if !custom.is_empty() => custom,
                _ => f.name,
            };
            Some(Location {
                name,
                point: GeoPoint::new(lon, lat),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Vec<ClubRecord> {
        serde_json::from_str(json).expect("feed parses")
    }

    #[test]
    fn keeps_geocoded_clubs() {
        let records = parse(
            r#"[{"fields": {"Name": "Globe Club", "Latitude": [48.85], "Longitude": [2.35]}}]"#,
        );
        let locations = locations_from_records(records);
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].name, "Globe Club");
        assert!((locations[0].point.lat - 48.85).abs() < 1e-12);
        assert!((locations[0].point.lon - 2.35).abs() < 1e-12);
    }

    #[test]
    fn drops_missing_and_zero_latitude() {
        let records = parse(
            r#"[
                {"fields": {"Name": "No geocode"}},
                {"fields": {"Name": "Empty", "Latitude": [], "Longitude": []}},
                {"fields": {"Name": "Zero is no-data", "Latitude": [0], "Longitude": [10.0]}},
                {"fields": {"Name": "Kept", "Latitude": [-33.9], "Longitude": [151.2]}}
            ]"#,
        );
        let locations = locations_from_records(records);
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].name, "Kept");
    }

    #[test]
    fn prefers_customized_name() {
        let records = parse(
            r#"[
                {"fields": {"Name": "Plain", "Customized Name": "Fancy", "Latitude": [1.0], "Longitude": [2.0]}},
                {"fields": {"Name": "Plain2", "Customized Name": "", "Latitude": [1.0], "Longitude": [2.0]}}
            ]"#,
        );
        let locations = locations_from_records(records);
        assert_eq!(locations[0].name, "Fancy");
        assert_eq!(locations[1].name, "Plain2");
    }

    #[test]
    fn tolerates_unknown_fields() {
        let records = parse(
            r#"[{"id": "rec1", "fields": {"Name": "X", "Latitude": [5.0], "Longitude": [6.0], "Dropped": 0}}]"#,
        );
        assert_eq!(locations_from_records(records).len(), 1);
    }
}
