//! Flight motion over a flat local tangent plane.

use skymap_domain::{Flight, GeoPosition};

/// Mean Earth radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Milliseconds per hour
pub const MS_PER_HOUR: f64 = 3_600_000.0;

/// Floor for |cos(latitude)| so the longitude step stays finite at the poles
const MIN_COS_LATITUDE: f64 = 1e-9;

/// Heading from `from` to `to`, radians counter-clockwise from east in
/// lon/lat space.
#[must_use]
pub fn heading_towards(from: &GeoPosition, to: &GeoPosition) -> f64 {
    (to.latitude - from.latitude).atan2(to.longitude - from.longitude)
}

/// Move `position` along `heading` at `speed_kmh` for `elapsed_ms`.
///
/// Negative or non-finite elapsed time does not move the position. Altitude
/// is left untouched.
#[must_use]
pub fn displace(position: GeoPosition, heading: f64, speed_kmh: f64, elapsed_ms: f64) -> GeoPosition {
    let elapsed_ms = if elapsed_ms.is_finite() { elapsed_ms.max(0.0) } else { 0.0 };
    let distance_km = speed_kmh * (elapsed_ms / MS_PER_HOUR);

    let cos_lat = position.latitude.to_radians().cos();
    let cos_lat = if cos_lat.abs() < MIN_COS_LATITUDE {
        MIN_COS_LATITUDE.copysign(cos_lat)
    } else {
        cos_lat
    };

    let delta_lat = (distance_km * heading.sin() / EARTH_RADIUS_KM).to_degrees();
    let delta_lon = (distance_km * heading.cos() / (EARTH_RADIUS_KM * cos_lat)).to_degrees();

    GeoPosition {
        longitude: position.longitude + delta_lon,
        latitude: position.latitude + delta_lat,
        altitude: position.altitude,
    }
}

/// One tick of a single flight: re-aim at the arrival airport, move, and
/// check arrival against the per-axis degree threshold.
#[must_use]
pub fn step_flight(flight: &Flight, elapsed_ms: f64, arrival_threshold_deg: f64) -> Flight {
    let target = flight.arrival.position;
    let heading = heading_towards(&flight.position, &target);
    let position = displace(flight.position, heading, flight.speed, elapsed_ms);

    Flight {
        position,
        heading,
        arrived: position.within_degrees(&target, arrival_threshold_deg),
        ..flight.clone()
    }
}
