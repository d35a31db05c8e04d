use serde::Serialize;
use std::collections::HashMap;

pub const UNKNOWN_NAME: &str = "Unknown";
pub const NO_ADDRESS: &str = "Address not available";
pub const NO_CONTACT: &str = "Contact not available";
pub const NO_APPOINTMENT: &str = "#";

/// OSM tags checked for a contact value, highest priority first
pub const CONTACT_TAGS: [&str; 4] = ["contact:phone", "phone", "contact:mobile", "contact:email"];

/// A clinic, hospital or other healthcare point of interest
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Facility {
    pub name: String,
    pub address: String,
    pub contact: String,
    pub lat: f64,
    pub lon: f64,
    pub appointment_link: String,
}

impl Facility {
    /// Build a facility from the tags of an OSM node
    ///
    /// Missing tags fall back to the placeholder constants in this module.
    /// The appointment link always starts as [`NO_APPOINTMENT`]; only a
    /// directory lookup can replace it.
    pub fn from_tags(tags: &HashMap<String, String>, lat: f64, lon: f64) -> Self {
        let name = non_blank(tags, "name").unwrap_or(UNKNOWN_NAME).to_string();
        let address = address_from_tags(tags).unwrap_or_else(|| NO_ADDRESS.to_string());
        let contact = contact_from_tags(tags).unwrap_or(NO_CONTACT).to_string();

        Self {
            name,
            address,
            contact,
            lat,
            lon,
            appointment_link: NO_APPOINTMENT.to_string(),
        }
    }

    /// Overlay contact data from a directory entry
    ///
    /// Blank or absent values leave the current field untouched. Booking
    /// links are only taken when they are `http://` or `https://` URLs.
    pub fn apply_directory(&mut self, phone: Option<&str>, booking_url: Option<&str>) {
        if let Some(phone) = phone.map(str::trim).filter(|p| !p.is_empty()) {
            self.contact = phone.to_string();
        }
        if let Some(url) = booking_url.map(str::trim).filter(|u| is_web_url(u)) {
            self.appointment_link = url.to_string();
        }
    }

    pub fn has_appointment_link(&self) -> bool {
        self.appointment_link != NO_APPOINTMENT
    }
}

fn is_web_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    ["http://", "https://"]
        .iter()
        .any(|scheme| lower.starts_with(scheme) && lower.len() > scheme.len())
}

fn non_blank<'a>(tags: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    tags.get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

/// First non-blank value among [`CONTACT_TAGS`]
pub fn contact_from_tags(tags: &HashMap<String, String>) -> Option<&str> {
    CONTACT_TAGS.iter().find_map(|key| non_blank(tags, key))
}

/// `addr:full` if present, otherwise "housenumber street, city" from the split tags
fn address_from_tags(tags: &HashMap<String, String>) -> Option<String> {
    if let Some(full) = non_blank(tags, "addr:full") {
        return Some(full.to_string());
    }

    let street = non_blank(tags, "addr:street");
    let city = non_blank(tags, "addr:city");
    if street.is_none() && city.is_none() {
        return None;
    }

    let street_line = match (non_blank(tags, "addr:housenumber"), street) {
        (Some(number), Some(street)) => Some(format!("{} {}", number, street)),
        (None, Some(street)) => Some(street.to_string()),
        _ => None,
    };

    let parts: Vec<String> = street_line
        .into_iter()
        .chain(city.map(str::to_string))
        .collect();
    Some(parts.join(", "))
}
