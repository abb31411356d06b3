//! # SkyMap - Domain Model
//!
//! Value objects and entities for the simulated air-traffic map. These types
//! are shared by the simulation engine, the projector and whatever view layer
//! consumes the snapshots.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

// =============================================================================
// VALUE OBJECTS
// =============================================================================

/// Geographic position of an airport or a plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    /// Degrees, east positive
    pub longitude: f64,
    /// Degrees, north positive
    pub latitude: f64,
    /// Meters
    pub altitude: f64,
}

impl GeoPosition {
    pub const fn new(longitude: f64, latitude: f64, altitude: f64) -> Self {
        Self {
            longitude,
            latitude,
            altitude,
        }
    }

    /// Build a position, rejecting coordinates outside the valid lat/lon ranges.
    pub fn validated(longitude: f64, latitude: f64, altitude: f64) -> Result<Self, DomainError> {
        let lon_ok = longitude.is_finite() && (-180.0..=180.0).contains(&longitude);
        let lat_ok = latitude.is_finite() && (-90.0..=90.0).contains(&latitude);
        if !lon_ok || !lat_ok || !altitude.is_finite() {
            return Err(DomainError::InvalidCoordinates {
                lat: latitude,
                lon: longitude,
            });
        }
        Ok(Self::new(longitude, latitude, altitude))
    }

    /// Straight-line distance in raw degree space.
    ///
    /// Not a geodesic distance: one degree of longitude counts the same as one
    /// degree of latitude regardless of where on the globe the points are.
    #[must_use]
    pub fn planar_distance_to(&self, other: &GeoPosition) -> f64 {
        (self.longitude - other.longitude).hypot(self.latitude - other.latitude)
    }

    /// Whether both axes are within `threshold_deg` of `other`.
    #[must_use]
    pub fn within_degrees(&self, other: &GeoPosition, threshold_deg: f64) -> bool {
        (self.longitude - other.longitude).abs() < threshold_deg
            && (self.latitude - other.latitude).abs() < threshold_deg
    }
}

/// Drawing surface dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A point on the drawing surface
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Geographic bounding box used for projection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateRange {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl CoordinateRange {
    /// Smallest range containing every airport, or `None` for an empty set.
    pub fn enclosing<'a, I>(airports: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Airport>,
    {
        airports.into_iter().fold(None, |range, airport| {
            let pos = airport.position;
            Some(match range {
                None => Self {
                    min_lat: pos.latitude,
                    max_lat: pos.latitude,
                    min_lon: pos.longitude,
                    max_lon: pos.longitude,
                },
                Some(r) => Self {
                    min_lat: r.min_lat.min(pos.latitude),
                    max_lat: r.max_lat.max(pos.latitude),
                    min_lon: r.min_lon.min(pos.longitude),
                    max_lon: r.max_lon.max(pos.longitude),
                },
            })
        })
    }

    #[must_use]
    pub fn lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    #[must_use]
    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }
}

// =============================================================================
// ENTITY TYPES
// =============================================================================

/// Airport entity - fixed for the lifetime of a simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    /// Short unique identifier (IATA code for the built-in table)
    pub code: String,
    pub name: String,
    pub position: GeoPosition,
}

impl Airport {
    pub fn new(code: impl Into<String>, name: impl Into<String>, position: GeoPosition) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            position,
        }
    }
}

/// Short random flight identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlightId(String);

impl FlightId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FlightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FlightId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Flight entity - a plane flying from `departure` towards `arrival`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    pub id: FlightId,
    pub position: GeoPosition,
    /// Radians, counter-clockwise from east in lon/lat space
    pub heading: f64,
    /// Kilometers per hour
    pub speed: f64,
    pub departure: Arc<Airport>,
    pub arrival: Arc<Airport>,
    /// Computed at generation, never applied to motion
    pub target_altitude: f64,
    /// Computed at generation, never applied to motion
    pub target_speed: f64,
    pub arrived: bool,
}

impl Flight {
    /// Degree-space distance left to the arrival airport
    #[must_use]
    pub fn remaining_distance(&self) -> f64 {
        self.position.planar_distance_to(&self.arrival.position)
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Domain-level errors
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Invalid coordinates: lat={lat}, lon={lon}")]
    InvalidCoordinates { lat: f64, lon: f64 },

    #[error("Duplicate airport code: {0}")]
    DuplicateAirportCode(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::Fake;

    fn airport(code: &str, lon: f64, lat: f64) -> Airport {
        Airport::new(code, code, GeoPosition::new(lon, lat, 0.0))
    }

    #[test]
    fn test_validated_rejects_out_of_range() {
        assert!(GeoPosition::validated(10.0, 50.0, 100.0).is_ok());
        assert!(matches!(
            GeoPosition::validated(200.0, 50.0, 0.0),
            Err(DomainError::InvalidCoordinates { .. })
        ));
        assert!(GeoPosition::validated(10.0, -91.0, 0.0).is_err());
        assert!(GeoPosition::validated(f64::NAN, 0.0, 0.0).is_err());
    }

    #[test]
    fn test_planar_distance_is_symmetric() {
        for _ in 0..50 {
            let a = GeoPosition::new((-20.0..50.0).fake(), (30.0..70.0).fake(), 0.0);
            let b = GeoPosition::new((-20.0..50.0).fake(), (30.0..70.0).fake(), 0.0);
            let ab = a.planar_distance_to(&b);
            assert!((ab - b.planar_distance_to(&a)).abs() < 1e-12);
            assert!(ab >= 0.0);
        }
    }

    #[test]
    fn test_within_degrees() {
        let a = GeoPosition::new(1.0, 0.0, 0.0);
        assert!(GeoPosition::new(0.95, 0.05, 0.0).within_degrees(&a, 0.1));
        assert!(!GeoPosition::new(0.85, 0.0, 0.0).within_degrees(&a, 0.1));
    }

    #[test]
    fn test_enclosing_range() {
        let airports = vec![
            airport("AAA", -5.0, 40.0),
            airport("BBB", 10.0, 55.0),
            airport("CCC", 2.0, 48.0),
        ];
        let range = CoordinateRange::enclosing(&airports).unwrap();
        assert_eq!(range.min_lon, -5.0);
        assert_eq!(range.max_lon, 10.0);
        assert_eq!(range.min_lat, 40.0);
        assert_eq!(range.max_lat, 55.0);
        assert_eq!(range.lon_span(), 15.0);

        assert!(CoordinateRange::enclosing(&Vec::<Airport>::new()).is_none());
    }

    #[test]
    fn test_flight_id_display() {
        let id = FlightId::new("a1b2c3d4e5f6");
        assert_eq!(id.to_string(), "a1b2c3d4e5f6");
        assert_eq!(id.as_str().len(), 12);
    }
}
