use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// A WGS84 point in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Result<Self, ValidationError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(ValidationError::MalformedCoordinates(format!(
                "latitude {lat} is outside -90..=90"
            )));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(ValidationError::MalformedCoordinates(format!(
                "longitude {lon} is outside -180..=180"
            )));
        }
        Ok(Self { lat, lon })
    }

    /// Builds coordinates from an optional pair. Exactly one half present is malformed.
    pub fn from_pair(lat: Option<f64>, lon: Option<f64>) -> Result<Option<Self>, ValidationError> {
        match (lat, lon) {
            (Some(lat), Some(lon)) => Self::new(lat, lon).map(Some),
            (None, None) => Ok(None),
            (Some(_), None) => Err(ValidationError::MalformedCoordinates(
                "latitude given without longitude".to_string(),
            )),
            (None, Some(_)) => Err(ValidationError::MalformedCoordinates(
                "longitude given without latitude".to_string(),
            )),
        }
    }
}

/// Where a product is installed or a customer is searching from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub city: Option<String>,
    pub pincode: Option<String>,
    pub coordinates: Option<Coordinates>,
}

#[cfg(test)]
mod tests {
    use super::Coordinates;
    use crate::errors::ValidationError;

    #[test]
    fn accepts_points_on_the_boundary() {
        assert!(Coordinates::new(90.0, 180.0).is_ok());
        assert!(Coordinates::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn rejects_out_of_range_and_non_finite_values() {
        assert!(matches!(
            Coordinates::new(91.0, 0.0),
            Err(ValidationError::MalformedCoordinates(_))
        ));
        assert!(Coordinates::new(0.0, 180.5).is_err());
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn half_a_pair_is_malformed() {
        assert_eq!(Coordinates::from_pair(None, None), Ok(None));
        assert!(Coordinates::from_pair(Some(19.07), None).is_err());
        assert!(Coordinates::from_pair(None, Some(72.87)).is_err());
    }
}
