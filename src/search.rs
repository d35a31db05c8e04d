//! The geocode -> facility query -> enrichment -> map pipeline.

use reqwest::blocking::Client;
use tracing::{debug, info, warn};

use crate::api::{self, EnrichmentOutcome};
use crate::config::{EnrichmentScope, ServiceConfig};
use crate::domain::{Coordinate, Facility, Query};
use crate::error::SearchError;
use crate::map::FacilityMap;
use crate::osm::parse_facilities;

pub const DEFAULT_ZOOM: u8 = 15;

/// How many directory lookups ended in each outcome
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichmentSummary {
    pub found: usize,
    pub empty: usize,
    pub unavailable: usize,
    pub malformed: usize,
}

impl EnrichmentSummary {
    pub fn record(&mut self, outcome: &EnrichmentOutcome) {
        match outcome {
            EnrichmentOutcome::Found(_) => self.found += 1,
            EnrichmentOutcome::Empty => self.empty += 1,
            EnrichmentOutcome::Unavailable(_) => self.unavailable += 1,
            EnrichmentOutcome::Malformed(_) => self.malformed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.found + self.empty + self.unavailable + self.malformed
    }
}

/// Everything a successful search produces
///
/// `map` holds the origin marker followed by one marker per entry of
/// `facilities`, in the same order.
#[derive(Debug)]
pub struct SearchOutcome {
    pub origin: Coordinate,
    pub map: FacilityMap,
    pub facilities: Vec<Facility>,
    pub enrichment: EnrichmentSummary,
}

/// Pipeline milestones reported to [`NearbySearch::run_with_progress`]
#[derive(Debug)]
pub enum Progress<'a> {
    Geocoded(Coordinate),
    FeaturesFetched(usize),
    FacilityReady {
        index: usize,
        total: usize,
        facility: &'a Facility,
    },
}

pub struct NearbySearch {
    client: Client,
    services: ServiceConfig,
    zoom: u8,
}

impl NearbySearch {
    pub fn new(services: ServiceConfig) -> Result<Self, SearchError> {
        let client = api::build_client(&services).map_err(SearchError::Client)?;
        Ok(Self {
            client,
            services,
            zoom: DEFAULT_ZOOM,
        })
    }

    pub fn with_zoom(mut self, zoom: u8) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn geocode(&self, query: &Query) -> Result<Coordinate, SearchError> {
        api::geocode(&self.client, &self.services.nominatim_url, &query.location)
            .map_err(SearchError::Geocode)
    }

    pub fn fetch_features(
        &self,
        center: Coordinate,
        query: &Query,
    ) -> Result<Vec<api::Element>, SearchError> {
        let response = api::fetch_facilities(
            &self.client,
            &self.services.overpass_url,
            center,
            query.radius_m,
            self.services.overpass_timeout_secs,
        )
        .map_err(SearchError::FacilityQuery)?;
        Ok(response.elements)
    }

    /// Look the facility up in the directory and overlay whatever comes back
    ///
    /// Never fails; the returned outcome says what happened.
    pub fn enrich(&self, facility: &mut Facility, query: &Query) -> EnrichmentOutcome {
        let directory = &self.services.directory;
        if !directory.is_active() {
            return EnrichmentOutcome::Unavailable(
                "directory enrichment not configured".to_string(),
            );
        }

        let location = match directory.scope {
            EnrichmentScope::Query => query.location.clone(),
            EnrichmentScope::Facility => format!("{},{}", facility.lat, facility.lon),
        };

        let outcome = api::lookup(&self.client, directory, &location, query.radius_m);
        let kind = outcome.kind();
        match &outcome {
            EnrichmentOutcome::Found(entry) => {
                facility.apply_directory(entry.phone.as_deref(), entry.booking_url.as_deref());
                debug!(facility = %facility.name, outcome = kind, "directory entry applied");
            }
            EnrichmentOutcome::Empty => {
                debug!(facility = %facility.name, outcome = kind, "directory returned no entries");
            }
            EnrichmentOutcome::Unavailable(reason) | EnrichmentOutcome::Malformed(reason) => {
                warn!(facility = %facility.name, outcome = kind, %reason, "directory lookup failed");
            }
        }
        outcome
    }

    pub fn run(&self, query: &Query) -> Result<SearchOutcome, SearchError> {
        self.run_with_progress(query, |_| {})
    }

    /// Run the whole pipeline, calling `progress` at each milestone
    ///
    /// Geocoding and facility-query failures abort; everything after that
    /// degrades to placeholders.
    pub fn run_with_progress<F>(
        &self,
        query: &Query,
        mut progress: F,
    ) -> Result<SearchOutcome, SearchError>
    where
        F: FnMut(Progress<'_>),
    {
        let origin = self.geocode(query)?;
        progress(Progress::Geocoded(origin));

        let elements = self.fetch_features(origin, query)?;
        progress(Progress::FeaturesFetched(elements.len()));

        if !self.services.directory.is_active() {
            info!("directory enrichment not configured, using OSM contact data only");
        }

        let mut map = FacilityMap::new(origin, self.zoom);
        let mut facilities = Vec::with_capacity(elements.len());
        let mut enrichment = EnrichmentSummary::default();

        let parsed = parse_facilities(&elements);
        let total = parsed.len();

        for mut facility in parsed {
            let outcome = self.enrich(&mut facility, query);
            enrichment.record(&outcome);

            map.add_facility(&facility);
            facilities.push(facility);

            if let Some(facility) = facilities.last() {
                progress(Progress::FacilityReady {
                    index: facilities.len() - 1,
                    total,
                    facility,
                });
            }
        }

        debug!(
            facilities = facilities.len(),
            markers = map.markers().len(),
            "search complete"
        );

        Ok(SearchOutcome {
            origin,
            map,
            facilities,
            enrichment,
        })
    }
}

/// Find clinics and hospitals within `radius_m` (default 1000 m) of `location`
pub fn find_nearby(
    location: &str,
    radius_m: Option<u32>,
    services: &ServiceConfig,
) -> Result<SearchOutcome, SearchError> {
    let query = Query::new(location, radius_m);
    NearbySearch::new(services.clone())?.run(&query)
}
