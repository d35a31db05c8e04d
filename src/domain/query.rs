/// Search radius used when the caller does not supply one, in meters
pub const DEFAULT_RADIUS_M: u32 = 1000;

/// What the user asked for: a free-text location and a search radius
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub location: String,
    pub radius_m: u32,
}

impl Query {
    pub fn new(location: impl Into<String>, radius_m: Option<u32>) -> Self {
        Self {
            location: location.into(),
            radius_m: radius_m.unwrap_or(DEFAULT_RADIUS_M),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_defaults() {
        let query = Query::new("Indiranagar, Bangalore", None);
        assert_eq!(query.radius_m, 1000);

        let query = Query::new("Indiranagar, Bangalore", Some(2500));
        assert_eq!(query.radius_m, 2500);
    }
}
