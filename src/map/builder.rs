use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use super::html::{html_escape, render_page};
use crate::domain::{Coordinate, Facility};

pub const ORIGIN_TOOLTIP: &str = "Your Location";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    Origin,
    Facility,
}

impl MarkerKind {
    pub fn color(self) -> &'static str {
        match self {
            MarkerKind::Origin => "#2a81cb",
            MarkerKind::Facility => "#cb2b3e",
        }
    }
}

/// A single map pin
///
/// `tooltip` and `popup` are both handed to Leaflet as HTML, so every
/// facility-derived value in them is escaped on construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub kind: MarkerKind,
    pub lat: f64,
    pub lon: f64,
    pub tooltip: String,
    pub popup: Option<String>,
}

/// Interactive map: one origin marker followed by facility markers in insertion order
#[derive(Debug, Clone)]
pub struct FacilityMap {
    center: Coordinate,
    zoom: u8,
    markers: Vec<Marker>,
}

impl FacilityMap {
    /// Create a map centered on `center` with the origin marker already placed
    pub fn new(center: Coordinate, zoom: u8) -> Self {
        let origin = Marker {
            kind: MarkerKind::Origin,
            lat: center.lat,
            lon: center.lon,
            tooltip: ORIGIN_TOOLTIP.to_string(),
            popup: None,
        };

        Self {
            center,
            zoom,
            markers: vec![origin],
        }
    }

    pub fn add_facility(&mut self, facility: &Facility) {
        self.markers.push(Marker {
            kind: MarkerKind::Facility,
            lat: facility.lat,
            lon: facility.lon,
            tooltip: html_escape(&facility.name),
            popup: Some(facility_popup(facility)),
        });
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn facility_markers(&self) -> impl Iterator<Item = &Marker> {
        self.markers
            .iter()
            .filter(|m| m.kind == MarkerKind::Facility)
    }

    /// Render a standalone Leaflet page
    pub fn to_html(&self, title: &str) -> Result<String> {
        let markers_json =
            serde_json::to_string(&self.markers).context("Failed to serialize map markers")?;
        Ok(render_page(title, self.center, self.zoom, &markers_json))
    }

    pub fn write_html(&self, path: &Path, title: &str) -> Result<()> {
        let html = self.to_html(title)?;
        std::fs::write(path, html)
            .with_context(|| format!("Failed to write map file: {}", path.display()))
    }
}

/// Popup body for a facility marker
pub fn facility_popup(facility: &Facility) -> String {
    format!(
        "Name: {}<br>Address: {}<br>Contact: {}<br><a href='{}' target='_blank'>Book Appointment</a>",
        html_escape(&facility.name),
        html_escape(&facility.address),
        html_escape(&facility.contact),
        html_escape(&facility.appointment_link),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn clinic(name: &str, lat: f64, lon: f64) -> Facility {
        let mut tags = HashMap::new();
        tags.insert("name".to_string(), name.to_string());
        Facility::from_tags(&tags, lat, lon)
    }

    #[test]
    fn test_new_map_has_only_origin() {
        let map = FacilityMap::new(Coordinate::new(12.9, 77.6), 15);
        assert_eq!(map.markers().len(), 1);
        assert_eq!(map.markers()[0].kind, MarkerKind::Origin);
        assert_eq!(map.markers()[0].tooltip, "Your Location");
        assert!(map.markers()[0].popup.is_none());
        assert_eq!(map.facility_markers().count(), 0);
    }

    #[test]
    fn test_facility_markers_keep_order() {
        let mut map = FacilityMap::new(Coordinate::new(12.9, 77.6), 15);
        map.add_facility(&clinic("First", 12.91, 77.61));
        map.add_facility(&clinic("Second", 12.92, 77.62));

        let names: Vec<&str> = map.facility_markers().map(|m| m.tooltip.as_str()).collect();
        assert_eq!(names, vec!["First", "Second"]);
        assert_eq!(map.markers()[2].lat, 12.92);
        assert_ne!(MarkerKind::Origin.color(), MarkerKind::Facility.color());
    }

    #[test]
    fn test_popup_format() {
        let facility = clinic("Test Clinic", 0.0, 0.0);
        assert_eq!(
            facility_popup(&facility),
            "Name: Test Clinic<br>Address: Address not available<br>Contact: Contact not available<br><a href='#' target='_blank'>Book Appointment</a>"
        );
    }

    #[test]
    fn test_popup_escapes_tag_values() {
        let mut facility = clinic("<b>Dr. O'Brien & Sons</b>", 0.0, 0.0);
        facility.apply_directory(None, Some("https://x.test/?a=1&b='2'"));

        let popup = facility_popup(&facility);
        assert!(popup.contains("Name: &lt;b&gt;Dr. O&#39;Brien &amp; Sons&lt;/b&gt;"));
        assert!(popup.contains("href='https://x.test/?a=1&amp;b=&#39;2&#39;'"));
    }

    #[test]
    fn test_tooltip_escapes_markup_in_name() {
        let mut map = FacilityMap::new(Coordinate::new(0.0, 0.0), 15);
        map.add_facility(&clinic("<img src=x onerror=alert(1)>", 0.1, 0.1));

        let marker = &map.markers()[1];
        assert_eq!(marker.tooltip, "&lt;img src=x onerror=alert(1)&gt;");

        let html = map.to_html("t").unwrap();
        assert!(!html.contains("<img src=x"));
        assert!(html.contains("\"tooltip\":\"&lt;img src=x onerror=alert(1)&gt;\""));
    }

    #[test]
    fn test_popup_never_links_to_script() {
        let mut facility = clinic("Test Clinic", 0.0, 0.0);
        facility.apply_directory(None, Some("javascript:alert(document.cookie)"));

        assert!(facility_popup(&facility).contains("<a href='#' target='_blank'>"));
    }

    #[test]
    fn test_write_html() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clinics.html");

        let mut map = FacilityMap::new(Coordinate::new(12.9, 77.6), 15);
        map.add_facility(&clinic("Test Clinic", 12.91, 77.61));
        map.write_html(&path, "Clinics near Bangalore").unwrap();

        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("<title>Clinics near Bangalore</title>"));
        assert!(html.contains("\"tooltip\":\"Test Clinic\""));
        assert!(html.contains("\"kind\":\"origin\""));
    }
}
