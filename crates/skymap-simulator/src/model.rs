//! Traffic model: airports plus active flights, advanced tick by tick.

use crate::config::{GenerationProfile, SimulationRules};
use crate::error::Result;
use crate::generator::FlightGenerator;
use crate::motion::step_flight;
use rand::Rng;
use serde::{Deserialize, Serialize};
use skymap_domain::{Airport, CanvasSize, CoordinateRange, Flight, FlightId};
use std::sync::Arc;
use tracing::{debug, warn};

/// Immutable snapshot of the simulation.
///
/// `flights` keeps insertion order so views can rely on stable ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficModel {
    pub canvas: CanvasSize,
    pub airports: Arc<[Arc<Airport>]>,
    pub flights: Vec<Flight>,
}

impl TrafficModel {
    pub fn new(canvas: CanvasSize, airports: Vec<Airport>, flights: Vec<Flight>) -> Self {
        Self {
            canvas,
            airports: airports.into_iter().map(Arc::new).collect(),
            flights,
        }
    }

    /// The 0x0 snapshot with no airports and no flights.
    pub fn empty() -> Self {
        Self {
            canvas: CanvasSize::default(),
            airports: Arc::from(Vec::new()),
            flights: Vec::new(),
        }
    }

    /// Bounding box of the airport set, the range views project against.
    pub fn coordinate_range(&self) -> Option<CoordinateRange> {
        CoordinateRange::enclosing(self.airports.iter().map(|a| &**a))
    }

    pub fn flight(&self, id: &FlightId) -> Option<&Flight> {
        self.flights.iter().find(|f| &f.id == id)
    }

    pub fn airport(&self, code: &str) -> Option<&Arc<Airport>> {
        self.airports.iter().find(|a| a.code == code)
    }
}

impl Default for TrafficModel {
    fn default() -> Self {
        Self::empty()
    }
}

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub arrived: Vec<FlightId>,
    pub spawned: Option<FlightId>,
}

/// Drives a [`TrafficModel`] forward: owns the rules and the flight
/// generator (and with it the randomness).
pub struct TrafficEngine {
    rules: SimulationRules,
    generator: FlightGenerator,
}

impl TrafficEngine {
    pub fn new(rules: SimulationRules, profile: GenerationProfile) -> Self {
        Self {
            rules,
            generator: FlightGenerator::new(profile),
        }
    }

    /// Engine with a fixed seed, for reproducible runs.
    pub fn seeded(rules: SimulationRules, profile: GenerationProfile, seed: u64) -> Self {
        Self {
            rules,
            generator: FlightGenerator::seeded(profile, seed),
        }
    }

    pub fn rules(&self) -> &SimulationRules {
        &self.rules
    }

    /// Initial model over the built-in airport table.
    pub fn generate_initial_model(&mut self, width: f64, height: f64) -> Result<TrafficModel> {
        self.generate_model(CanvasSize::new(width, height), crate::airports::builtin())
    }

    /// Initial model over an explicit airport table.
    pub fn generate_model(&mut self, canvas: CanvasSize, airports: Vec<Airport>) -> Result<TrafficModel> {
        let airports: Arc<[Arc<Airport>]> = airports.into_iter().map(Arc::new).collect();
        let flights = (0..self.rules.initial_flights)
            .map(|_| self.generator.generate(&airports))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            airports = airports.len(),
            flights = flights.len(),
            "Generated initial traffic model"
        );

        Ok(TrafficModel {
            canvas,
            airports,
            flights,
        })
    }

    /// Advance `model` by `elapsed_ms` of simulated time.
    ///
    /// A missing model yields [`TrafficModel::empty`].
    pub fn advance(&mut self, model: Option<&TrafficModel>, elapsed_ms: f64) -> TrafficModel {
        match model {
            Some(model) => self.step(model, elapsed_ms).0,
            None => TrafficModel::empty(),
        }
    }

    /// Advance a model and report arrivals and spawns.
    ///
    /// The input snapshot is left untouched; the returned one shares its
    /// airports.
    pub fn step(&mut self, model: &TrafficModel, elapsed_ms: f64) -> (TrafficModel, TickReport) {
        let threshold = self.rules.arrival_threshold_deg;
        let mut report = TickReport::default();

        let mut flights = Vec::with_capacity(model.flights.len() + 1);
        for flight in &model.flights {
            let next = step_flight(flight, elapsed_ms, threshold);
            if next.arrived {
                debug!(flight_id = %next.id, arrival = %next.arrival.code, "Flight arrived");
                report.arrived.push(next.id);
            } else {
                flights.push(next);
            }
        }

        if flights.len() < self.rules.max_flights && self.roll_spawn(elapsed_ms) {
            match self.generator.generate(&model.airports) {
                Ok(flight) => {
                    debug!(
                        flight_id = %flight.id,
                        departure = %flight.departure.code,
                        arrival = %flight.arrival.code,
                        "Flight spawned"
                    );
                    report.spawned = Some(flight.id.clone());
                    flights.push(flight);
                }
                Err(e) => warn!("Skipping spawn: {}", e),
            }
        }

        let next = TrafficModel {
            canvas: model.canvas,
            airports: Arc::clone(&model.airports),
            flights,
        };
        (next, report)
    }

    fn roll_spawn(&mut self, elapsed_ms: f64) -> bool {
        let chance = self
            .rules
            .spawn_policy
            .chance(self.rules.spawn_probability, elapsed_ms);
        if chance <= 0.0 {
            return false;
        }
        self.generator.rng().gen_bool(chance.min(1.0))
    }
}
