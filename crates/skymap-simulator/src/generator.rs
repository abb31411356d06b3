//! Random flight generation between airports.

use crate::config::GenerationProfile;
use crate::error::{Result, SimulationError};
use crate::motion::heading_towards;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand_distr::{Distribution, Uniform};
use skymap_domain::{Airport, Flight, FlightId};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// Hex characters kept from a v4 UUID for a flight id
const FLIGHT_ID_LEN: usize = 12;

/// Flight generator.
pub struct FlightGenerator {
    profile: GenerationProfile,
    rng: StdRng,
}

impl FlightGenerator {
    /// Create a generator seeded from OS entropy.
    pub fn new(profile: GenerationProfile) -> Self {
        Self {
            profile,
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a generator with a fixed seed, for reproducible runs.
    pub fn seeded(profile: GenerationProfile, seed: u64) -> Self {
        Self {
            profile,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn profile(&self) -> &GenerationProfile {
        &self.profile
    }

    /// Shared access to the generator's RNG for other per-tick draws.
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Generate a flight between two distinct airports picked at random.
    pub fn generate(&mut self, airports: &[Arc<Airport>]) -> Result<Flight> {
        // Flights pair airports by code, so only distinct codes count.
        let distinct = airports
            .iter()
            .map(|a| a.code.as_str())
            .collect::<HashSet<_>>()
            .len();
        let insufficient = || SimulationError::InsufficientAirports { available: distinct };
        if distinct < 2 {
            return Err(insufficient());
        }

        let departure = airports.choose(&mut self.rng).ok_or_else(insufficient)?;
        let destinations: Vec<&Arc<Airport>> = airports
            .iter()
            .filter(|a| a.code != departure.code)
            .collect();
        let arrival = destinations.choose(&mut self.rng).ok_or_else(insufficient)?;

        Ok(self.launch(Arc::clone(departure), Arc::clone(arrival)))
    }

    /// Build a flight sitting at `departure` and pointed at `arrival`.
    pub fn launch(&mut self, departure: Arc<Airport>, arrival: Arc<Airport>) -> Flight {
        let p = self.profile;
        let distance = departure.position.planar_distance_to(&arrival.position);

        let altitude_jitter = self.jitter(p.altitude_jitter);
        let speed_jitter = self.jitter(p.speed_jitter);
        let target_altitude = bounded(
            distance * p.distance_factor + altitude_jitter,
            p.min_target_altitude,
            p.max_target_altitude,
        );
        let target_speed = bounded(
            distance * p.distance_factor + speed_jitter,
            p.min_target_speed,
            p.max_target_speed,
        );

        Flight {
            id: next_flight_id(),
            position: departure.position,
            heading: heading_towards(&departure.position, &arrival.position),
            speed: p.cruise_speed,
            departure,
            arrival,
            target_altitude,
            target_speed,
            arrived: false,
        }
    }

    fn jitter(&mut self, upper: f64) -> f64 {
        if upper > 0.0 {
            Uniform::new(0.0, upper).sample(&mut self.rng)
        } else {
            0.0
        }
    }
}

/// `min(max(value, floor), ceiling)`.
///
/// Unlike `f64::clamp` this accepts `floor > ceiling`, in which case the
/// ceiling wins.
fn bounded(value: f64, floor: f64, ceiling: f64) -> f64 {
    value.max(floor).min(ceiling)
}

fn next_flight_id() -> FlightId {
    let raw = Uuid::new_v4().simple().to_string();
    FlightId::new(&raw[..FLIGHT_ID_LEN])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::airports;
    use skymap_domain::GeoPosition;

    fn pool() -> Vec<Arc<Airport>> {
        airports::builtin().into_iter().map(Arc::new).collect()
    }

    #[test]
    fn test_generate_distinct_endpoints() {
        let airports = pool();
        let mut generator = FlightGenerator::seeded(GenerationProfile::default(), 7);

        for _ in 0..500 {
            let flight = generator.generate(&airports).unwrap();
            assert_ne!(flight.departure.code, flight.arrival.code);
            assert_eq!(flight.position, flight.departure.position);
            assert!(!flight.arrived);
        }
    }

    #[test]
    fn test_generate_two_airports_always_pairs_them() {
        let airports = vec![
            Arc::new(Airport::new("AAA", "A", GeoPosition::new(0.0, 0.0, 0.0))),
            Arc::new(Airport::new("BBB", "B", GeoPosition::new(1.0, 0.0, 0.0))),
        ];
        let mut generator = FlightGenerator::seeded(GenerationProfile::default(), 1);

        for _ in 0..50 {
            let flight = generator.generate(&airports).unwrap();
            let pair = (flight.departure.code.as_str(), flight.arrival.code.as_str());
            assert!(pair == ("AAA", "BBB") || pair == ("BBB", "AAA"));
        }
    }

    #[test]
    fn test_generate_insufficient_airports() {
        let mut generator = FlightGenerator::new(GenerationProfile::default());

        let err = generator.generate(&[]).unwrap_err();
        assert!(matches!(err, SimulationError::InsufficientAirports { available: 0 }));

        let single = vec![Arc::new(Airport::new("AAA", "A", GeoPosition::new(0.0, 0.0, 0.0)))];
        let err = generator.generate(&single).unwrap_err();
        assert!(matches!(err, SimulationError::InsufficientAirports { available: 1 }));

        let same_code = vec![
            Arc::new(Airport::new("AAA", "A", GeoPosition::new(0.0, 0.0, 0.0))),
            Arc::new(Airport::new("AAA", "A again", GeoPosition::new(1.0, 1.0, 0.0))),
            Arc::new(Airport::new("AAA", "A third", GeoPosition::new(2.0, 2.0, 0.0))),
        ];
        let err = generator.generate(&same_code).unwrap_err();
        assert!(matches!(err, SimulationError::InsufficientAirports { available: 1 }));
    }

    #[test]
    fn test_launch_derived_values() {
        let airports = pool();
        let lhr = airports.iter().find(|a| a.code == "LHR").unwrap();
        let fco = airports.iter().find(|a| a.code == "FCO").unwrap();
        let mut generator = FlightGenerator::seeded(GenerationProfile::default(), 42);

        let flight = generator.launch(Arc::clone(lhr), Arc::clone(fco));

        let expected_heading = (fco.position.latitude - lhr.position.latitude)
            .atan2(fco.position.longitude - lhr.position.longitude);
        assert!((flight.heading - expected_heading).abs() < 1e-12);
        assert_eq!(flight.speed, 500.0);
        // Inverted speed bounds always resolve to the ceiling
        assert_eq!(flight.target_speed, 500.0);
        assert!((1000.0..=30000.0).contains(&flight.target_altitude));
        assert_eq!(flight.id.as_str().len(), FLIGHT_ID_LEN);
    }

    #[test]
    fn test_flight_ids_are_unique() {
        let airports = pool();
        let mut generator = FlightGenerator::new(GenerationProfile::default());
        let ids: HashSet<_> = (0..2000)
            .map(|_| generator.generate(&airports).unwrap().id)
            .collect();
        assert_eq!(ids.len(), 2000);
    }

    #[test]
    fn test_bounded() {
        assert_eq!(bounded(50.0, 1000.0, 30000.0), 1000.0);
        assert_eq!(bounded(50_000.0, 1000.0, 30000.0), 30000.0);
        assert_eq!(bounded(1500.0, 1000.0, 30000.0), 1500.0);
        assert_eq!(bounded(700.0, 900.0, 500.0), 500.0);
    }
}
