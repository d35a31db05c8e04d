//! clinicmap - Find clinics and hospitals near a location and plot them on a map

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod map;
pub mod osm;
pub mod search;

pub use domain::{Coordinate, DEFAULT_RADIUS_M, Facility, Query};
pub use error::SearchError;
pub use map::FacilityMap;
pub use search::{EnrichmentSummary, NearbySearch, Progress, SearchOutcome, find_nearby};
