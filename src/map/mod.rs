pub mod builder;
pub mod html;

pub use builder::{FacilityMap, Marker, MarkerKind, facility_popup};
