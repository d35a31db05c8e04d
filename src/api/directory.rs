//! Best-effort lookups against a third-party doctor directory.
//!
//! The directory is optional. Every failure mode is reported as an
//! [`EnrichmentOutcome`] instead of an error so callers can log it and carry on
//! with the facility data they already have.

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::DirectoryConfig;

/// One doctor/practice entry from the directory
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DirectoryEntry {
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub booking_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DirectoryResponse {
    #[serde(default)]
    doctors: Option<Vec<DirectoryEntry>>,
}

/// Result of a single directory lookup
#[derive(Debug, Clone, PartialEq)]
pub enum EnrichmentOutcome {
    /// First entry of a non-empty result
    Found(DirectoryEntry),
    /// Lookup succeeded but listed nobody
    Empty,
    /// Not configured, disabled, unreachable, or returned an error status
    Unavailable(String),
    /// Responded with a body we could not understand
    Malformed(String),
}

impl EnrichmentOutcome {
    pub fn kind(&self) -> &'static str {
        match self {
            EnrichmentOutcome::Found(_) => "found",
            EnrichmentOutcome::Empty => "empty",
            EnrichmentOutcome::Unavailable(_) => "unavailable",
            EnrichmentOutcome::Malformed(_) => "malformed",
        }
    }
}

/// Look up directory entries near `location`
///
/// `location` is whatever the caller scoped the lookup to: the user's
/// free-text query or a facility's "lat,lon".
pub fn lookup(
    client: &Client,
    config: &DirectoryConfig,
    location: &str,
    radius_m: u32,
) -> EnrichmentOutcome {
    if !config.enabled {
        return EnrichmentOutcome::Unavailable("directory enrichment disabled".to_string());
    }
    let Some(api_key) = config.api_key.as_deref() else {
        return EnrichmentOutcome::Unavailable("no directory API key configured".to_string());
    };

    debug!(url = %config.url, location, radius_m, "directory lookup");

    let radius = radius_m.to_string();
    let response = match client
        .get(&config.url)
        .query(&[
            ("location", location),
            ("radius", radius.as_str()),
            ("api_key", api_key),
        ])
        .send()
    {
        Ok(response) => response,
        Err(e) => return EnrichmentOutcome::Unavailable(e.to_string()),
    };

    if !response.status().is_success() {
        return EnrichmentOutcome::Unavailable(format!(
            "directory returned error status: {}",
            response.status()
        ));
    }

    match response.text() {
        Ok(body) => parse_body(&body),
        Err(e) => EnrichmentOutcome::Unavailable(e.to_string()),
    }
}

fn parse_body(body: &str) -> EnrichmentOutcome {
    let parsed: DirectoryResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(e) => return EnrichmentOutcome::Malformed(e.to_string()),
    };

    match parsed.doctors.and_then(|d| d.into_iter().next()) {
        Some(entry) => EnrichmentOutcome::Found(entry),
        None => EnrichmentOutcome::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_entry_wins() {
        let body = r#"{"doctors": [
            {"phone": "+91 80 1000", "booking_url": "https://book.example/1"},
            {"phone": "+91 80 2000", "booking_url": "https://book.example/2"}
        ]}"#;

        let outcome = parse_body(body);
        assert_eq!(
            outcome,
            EnrichmentOutcome::Found(DirectoryEntry {
                phone: Some("+91 80 1000".to_string()),
                booking_url: Some("https://book.example/1".to_string()),
            })
        );
        assert_eq!(outcome.kind(), "found");
    }

    #[test]
    fn test_empty_results() {
        assert_eq!(parse_body(r#"{"doctors": []}"#), EnrichmentOutcome::Empty);
        assert_eq!(parse_body(r#"{"total": 0}"#), EnrichmentOutcome::Empty);
    }

    #[test]
    fn test_entry_fields_are_optional() {
        let outcome = parse_body(r#"{"doctors": [{"name": "Dr. Rao"}]}"#);
        assert_eq!(outcome, EnrichmentOutcome::Found(DirectoryEntry::default()));
    }

    #[test]
    fn test_malformed_bodies() {
        assert!(matches!(parse_body("<html>"), EnrichmentOutcome::Malformed(_)));
        assert!(matches!(
            parse_body(r#"{"doctors": "none"}"#),
            EnrichmentOutcome::Malformed(_)
        ));
    }

    #[test]
    fn test_unconfigured_lookup_skips_request() {
        let client = Client::new();
        let config = DirectoryConfig {
            url: "http://127.0.0.1:9/unreachable".to_string(),
            api_key: None,
            ..DirectoryConfig::default()
        };

        let outcome = lookup(&client, &config, "Bangalore", 1000);
        assert!(matches!(outcome, EnrichmentOutcome::Unavailable(_)));

        let config = DirectoryConfig {
            enabled: false,
            api_key: Some("key".to_string()),
            ..config
        };
        let outcome = lookup(&client, &config, "Bangalore", 1000);
        assert_eq!(
            outcome,
            EnrichmentOutcome::Unavailable("directory enrichment disabled".to_string())
        );
    }
}
