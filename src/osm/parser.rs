use crate::api::Element;
use crate::domain::Facility;
use std::collections::HashMap;
use tracing::warn;

/// Turn Overpass elements into facilities, preserving server order
///
/// Elements without both `lat` and `lon` cannot be placed on a map and are
/// skipped. Missing tags fall back to the placeholders in
/// [`crate::domain::facility`].
pub fn parse_facilities(elements: &[Element]) -> Vec<Facility> {
    let no_tags = HashMap::new();

    elements
        .iter()
        .filter_map(|element| {
            let Some(position) = element.position() else {
                warn!(id = element.id, "skipping feature without coordinates");
                return None;
            };
            let tags = element.tags.as_ref().unwrap_or(&no_tags);
            Some(Facility::from_tags(tags, position.lat, position.lon))
        })
        .collect()
}
