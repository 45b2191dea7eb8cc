//! Point-in-radius check for on-site clock-ins.

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Default permitted distance from the reference point.
pub const DEFAULT_RADIUS_METERS: f64 = 100.0;

/// A WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Great-circle distance between two points, in meters.
pub fn haversine_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().min(1.0).asin()
}

/// Circular area around a reference point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geofence {
    pub center: GeoPoint,
    pub radius_meters: f64,
}

impl Geofence {
    pub fn new(center: GeoPoint, radius_meters: f64) -> Self {
        Self {
            center,
            radius_meters,
        }
    }

    /// Returns true if `point` lies within the radius (boundary included).
    pub fn contains(&self, point: GeoPoint) -> bool {
        haversine_distance(self.center, point) <= self.radius_meters
    }

    /// Checks optional request coordinates against the fence.
    ///
    /// # Errors
    ///
    /// Fails when either coordinate is missing or the point lies outside.
    pub fn check(&self, latitude: Option<f64>, longitude: Option<f64>) -> Result<(), ValidationError> {
        let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
            return Err(ValidationError::field(
                "latitude",
                "latitude and longitude are required to clock in on site",
            ));
        };

        let point = GeoPoint::new(latitude, longitude);
        if self.contains(point) {
            Ok(())
        } else {
            Err(ValidationError::field(
                "latitude",
                format!(
                    "location is {:.0} m from school, outside the permitted {:.0} m",
                    haversine_distance(self.center, point),
                    self.radius_meters
                ),
            ))
        }
    }
}

impl Default for Geofence {
    fn default() -> Self {
        Self::new(GeoPoint::new(0.0, 0.0), DEFAULT_RADIUS_METERS)
    }
}
