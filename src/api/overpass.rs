use reqwest::blocking::Client;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

use super::ApiError;
use crate::domain::Coordinate;

/// Raw Overpass API response
#[derive(Debug, Deserialize)]
pub struct OverpassResponse {
    pub elements: Vec<Element>,
}

/// A single tagged node from Overpass
///
/// Only nodes are queried, so the element `type` is not kept.
#[derive(Debug, Clone, Deserialize)]
pub struct Element {
    pub id: u64,
    #[serde(default)]
    pub tags: Option<HashMap<String, String>>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

impl Element {
    pub fn position(&self) -> Option<Coordinate> {
        Some(Coordinate::new(self.lat?, self.lon?))
    }
}

/// Overpass QL selecting clinics, hospitals and anything tagged `healthcare`
/// within `radius_m` of `center`
pub fn build_facility_query(center: Coordinate, radius_m: u32, timeout_secs: u64) -> String {
    let around = format!("(around:{},{},{})", radius_m, center.lat, center.lon);
    format!(
        r#"[out:json][timeout:{timeout}];
(
  node["amenity"="clinic"]{around};
  node["amenity"="hospital"]{around};
  node["healthcare"]{around};
);
out body;"#,
        timeout = timeout_secs,
        around = around
    )
}

/// Fetch healthcare nodes around a point
///
/// # Arguments
/// * `client` - HTTP client
/// * `url` - Overpass interpreter endpoint
/// * `center` - Search center
/// * `radius_m` - Radius in meters
/// * `timeout_secs` - Server-side query timeout
///
/// # Returns
/// * `OverpassResponse` with one element per matching node, in server order
pub fn fetch_facilities(
    client: &Client,
    url: &str,
    center: Coordinate,
    radius_m: u32,
    timeout_secs: u64,
) -> Result<OverpassResponse, ApiError> {
    let query = build_facility_query(center, radius_m, timeout_secs);
    debug!(url, %center, radius_m, "querying Overpass");

    let response = client.get(url).query(&[("data", query.as_str())]).send()?;

    if !response.status().is_success() {
        return Err(ApiError::Status {
            service: "Overpass API",
            status: response.status(),
        });
    }

    let body = response.text()?;
    serde_json::from_str(&body).map_err(|e| ApiError::Parse {
        context: "Overpass JSON response",
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_facility_query() {
        let query = build_facility_query(Coordinate::new(12.9, 77.6), 1000, 25);

        assert!(query.starts_with("[out:json][timeout:25];"));
        assert!(query.contains(r#"node["amenity"="clinic"](around:1000,12.9,77.6);"#));
        assert!(query.contains(r#"node["amenity"="hospital"](around:1000,12.9,77.6);"#));
        assert!(query.contains(r#"node["healthcare"](around:1000,12.9,77.6);"#));
        assert!(query.trim_end().ends_with("out body;"));
    }

    #[test]
    fn test_parse_overpass_response() {
        let json = r#"{
            "version": 0.6,
            "elements": [
                {"type": "node", "id": 1, "lat": 12.91, "lon": 77.61,
                 "tags": {"amenity": "clinic", "name": "Test Clinic"}},
                {"type": "node", "id": 2, "lat": 12.92, "lon": 77.62}
            ]
        }"#;

        let response: OverpassResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.elements.len(), 2);
        assert_eq!(
            response.elements[0].tags.as_ref().unwrap()["name"],
            "Test Clinic"
        );
        assert!(response.elements[1].tags.is_none());
        assert_eq!(
            response.elements[1].position(),
            Some(Coordinate::new(12.92, 77.62))
        );
    }

    #[test]
    fn test_position_requires_both_coordinates() {
        let element = Element {
            id: 7,
            tags: None,
            lat: Some(1.0),
            lon: None,
        };
        assert!(element.position().is_none());
    }
}
