pub mod coordinate;
pub mod facility;
pub mod query;

pub use coordinate::Coordinate;
pub use facility::Facility;
pub use query::{DEFAULT_RADIUS_M, Query};
