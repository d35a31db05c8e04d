use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use super::ApiError;
use crate::domain::Coordinate;

#[derive(Debug, Deserialize)]
struct NominatimResult {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

/// Geocode free text to latitude/longitude coordinates.
///
/// Sends `q`, `format=json` and `limit=1` to a Nominatim-compatible search
/// endpoint and takes the first match.
///
/// # Arguments
/// * `client` - HTTP client carrying the identifying User-Agent
/// * `url` - Search endpoint (e.g., "https://nominatim.openstreetmap.org/search")
/// * `location` - Free text (e.g., "MG Road, Bangalore")
///
/// # Returns
/// * `Ok(Coordinate)` - Coordinates of the best match
/// * `Err(ApiError)` - Error status, no match, transport or parse failure
pub fn geocode(client: &Client, url: &str, location: &str) -> Result<Coordinate, ApiError> {
    debug!(location, url, "geocoding");

    let response = client
        .get(url)
        .query(&[("q", location), ("format", "json"), ("limit", "1")])
        .send()?;

    if !response.status().is_success() {
        return Err(ApiError::Status {
            service: "Nominatim",
            status: response.status(),
        });
    }

    let results: Vec<NominatimResult> = response.json()?;
    let result = results.into_iter().next().ok_or_else(|| ApiError::NoResults {
        query: location.to_string(),
    })?;

    let coordinate = parse_result(&result)?;
    debug!(
        location,
        %coordinate,
        display_name = result.display_name.as_deref().unwrap_or(""),
        "geocoded"
    );
    Ok(coordinate)
}

fn parse_result(result: &NominatimResult) -> Result<Coordinate, ApiError> {
    let lat: f64 = result.lat.trim().parse().map_err(|e| ApiError::Parse {
        context: "latitude from Nominatim response",
        reason: format!("{}: {:?}", e, result.lat),
    })?;
    let lon: f64 = result.lon.trim().parse().map_err(|e| ApiError::Parse {
        context: "longitude from Nominatim response",
        reason: format!("{}: {:?}", e, result.lon),
    })?;

    Ok(Coordinate::new(lat, lon))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nominatim_response() {
        let json = r#"[{"lat":"12.9715987","lon":"77.5945627","display_name":"Bengaluru, Karnataka, India"}]"#;
        let results: Vec<NominatimResult> = serde_json::from_str(json).unwrap();

        assert_eq!(results.len(), 1);
        let coord = parse_result(&results[0]).unwrap();
        assert!((coord.lat - 12.9715987).abs() < 1e-9);
        assert!((coord.lon - 77.5945627).abs() < 1e-9);
    }

    #[test]
    fn test_display_name_is_optional() {
        let json = r#"[{"lat":"1.5","lon":"-2.25"}]"#;
        let results: Vec<NominatimResult> = serde_json::from_str(json).unwrap();
        assert_eq!(parse_result(&results[0]).unwrap(), Coordinate::new(1.5, -2.25));
    }

    #[test]
    fn test_bad_latitude() {
        let result = NominatimResult {
            lat: "north".to_string(),
            lon: "77.6".to_string(),
            display_name: None,
        };
        let err = parse_result(&result).unwrap_err();
        assert!(matches!(err, ApiError::Parse { .. }));
        assert!(err.to_string().contains("latitude"));
    }
}
