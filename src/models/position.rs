use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn validate(&self) -> Result<(), AppError> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(AppError::BadRequest(format!(
                "latitude {} out of range [-90, 90]",
                self.lat
            )));
        }

        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(AppError::BadRequest(format!(
                "longitude {} out of range [-180, 180]",
                self.lng
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::GeoPoint;

    #[test]
    fn accepts_coordinates_in_range() {
        let point = GeoPoint {
            lat: 13.0827,
            lng: 80.2707,
        };
        assert!(point.validate().is_ok());
    }

    #[test]
    fn rejects_latitude_out_of_range() {
        let point = GeoPoint {
            lat: 91.0,
            lng: 0.0,
        };
        assert!(point.validate().is_err());
    }

    #[test]
    fn rejects_longitude_out_of_range() {
        let point = GeoPoint {
            lat: 0.0,
            lng: -180.5,
        };
        assert!(point.validate().is_err());
    }
}
