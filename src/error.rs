use thiserror::Error;

use crate::api::ApiError;

/// Failures that stop a search before any map is built
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Unable to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Unable to fetch location coordinates ({0}). Check your input or try again later.")]
    Geocode(#[source] ApiError),

    #[error("Unable to fetch nearby locations ({0}). The Overpass API might be down.")]
    FacilityQuery(#[source] ApiError),
}
