pub mod directory;
pub mod nominatim;
pub mod overpass;

use reqwest::blocking::Client;
use std::time::Duration;
use thiserror::Error;

use crate::config::ServiceConfig;

pub use directory::{DirectoryEntry, EnrichmentOutcome, lookup};
pub use nominatim::geocode;
pub use overpass::{Element, OverpassResponse, build_facility_query, fetch_facilities};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} returned error status: {status}")]
    Status {
        service: &'static str,
        status: reqwest::StatusCode,
    },

    #[error("no results for \"{query}\"")]
    NoResults { query: String },

    #[error("failed to parse {context}: {reason}")]
    Parse { context: &'static str, reason: String },
}

/// Build the blocking client shared by every service call
pub fn build_client(services: &ServiceConfig) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(services.user_agent.as_str())
        .timeout(Duration::from_secs(services.timeout_secs))
        .build()
}
