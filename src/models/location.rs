use serde::{Deserialize, Serialize};

const STATUTE_MILES_PER_NAUTICAL_MILE: f64 = 1.15077945;
const METERS_PER_STATUTE_MILE: f64 = 1609.34;

/// A point on the globe. Negative latitudes are southern, negative
/// longitudes are western.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Great-circle distance to `other` in meters, via the spherical law of
    /// cosines. Each degree on a great circle of Earth is 60 nautical miles.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.lat.to_radians();
        let lon1 = self.lng.to_radians();
        let lat2 = other.lat.to_radians();
        let lon2 = other.lng.to_radians();

        let angle =
            (lat1.sin() * lat2.sin() + lat1.cos() * lat2.cos() * (lon1 - lon2).cos()).acos();

        let nautical_miles = 60.0 * angle.to_degrees();
        nautical_miles * STATUTE_MILES_PER_NAUTICAL_MILE * METERS_PER_STATUTE_MILE
    }
}

/// A venue's position as it appears on event records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Geometry {
    pub location: GeoPoint,
}

/// A named place, used for itinerary start points and flight endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    pub country: String,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lng: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let a = GeoPoint::new(52.0, 13.0);
        let b = GeoPoint::new(53.0, 13.0);
        let d = a.distance_to(&b);
        assert!(
            (111_000.0..111_300.0).contains(&d),
            "expected ~111.2 km, got {d}"
        );
    }

    #[test]
    fn distance_to_self_is_zero() {
        let a = GeoPoint::new(48.8566, 2.3522);
        assert!(a.distance_to(&a) < 1.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = GeoPoint::new(52.52, 13.405);
        let b = GeoPoint::new(52.505, 13.33);
        let d1 = a.distance_to(&b);
        let d2 = b.distance_to(&a);
        assert!((d1 - d2).abs() < 1e-6);
    }
}
