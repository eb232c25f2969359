//! Coordinates and great-circle distance.

use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the Haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns one message per out-of-range coordinate.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !latitude_in_range(self.latitude) {
            errors.push("latitude must be between -90 and 90".to_string());
        }
        if !longitude_in_range(self.longitude) {
            errors.push("longitude must be between -180 and 180".to_string());
        }
        errors
    }

    pub fn distance_km(&self, other: &Location) -> f64 {
        haversine_km(self, other)
    }
}

pub fn latitude_in_range(value: f64) -> bool {
    value.is_finite() && (-90.0..=90.0).contains(&value)
}

pub fn longitude_in_range(value: f64) -> bool {
    value.is_finite() && (-180.0..=180.0).contains(&value)
}

pub fn haversine_km(a: &Location, b: &Location) -> f64 {
    if a == b {
        return 0.0;
    }

    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn copenhagen() -> Location {
        Location::new(55.6761, 12.5683)
    }

    fn aarhus() -> Location {
        Location::new(56.1629, 10.2039)
    }

    #[test]
    fn identical_points_are_zero_apart() {
        assert_eq!(haversine_km(&copenhagen(), &copenhagen()), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let there = haversine_km(&copenhagen(), &aarhus());
        let back = haversine_km(&aarhus(), &copenhagen());
        assert!((there - back).abs() < 1e-9);
    }

    #[test]
    fn matches_known_city_distance() {
        let distance = haversine_km(&copenhagen(), &aarhus());
        assert!(
            (distance - 156.0).abs() < 3.0,
            "Copenhagen to Aarhus should be ~156 km, got {distance:.1}"
        );
    }

    #[test]
    fn antipodal_points_are_half_the_circumference() {
        let north = Location::new(90.0, 0.0);
        let south = Location::new(-90.0, 0.0);
        let distance = haversine_km(&north, &south);
        assert!((distance - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn validate_flags_each_coordinate() {
        assert!(copenhagen().validate().is_empty());
        assert!(Location::new(90.0, -180.0).validate().is_empty());

        let errors = Location::new(91.0, 181.0).validate();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("latitude"));
        assert!(errors[1].contains("longitude"));

        assert_eq!(Location::new(f64::NAN, 0.0).validate().len(), 1);
    }
}
