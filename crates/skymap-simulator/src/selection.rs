//! Read-only selection lookups.
//!
//! Views emit a [`Selection`] when the user picks something on the map; the
//! application resolves it against the current snapshot. Nothing here mutates
//! the model.

use crate::model::TrafficModel;
use serde::{Deserialize, Serialize};
use skymap_domain::{Airport, Flight, FlightId};

/// Something picked on the map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Selection {
    Flight(FlightId),
    Airport(String),
}

/// Information shown for a selected flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightSummary {
    pub id: FlightId,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude_m: f64,
    pub heading_deg: f64,
    pub speed_kmh: f64,
    pub departure_code: String,
    pub departure_name: String,
    pub arrival_code: String,
    pub arrival_name: String,
}

impl From<&Flight> for FlightSummary {
    fn from(flight: &Flight) -> Self {
        Self {
            id: flight.id.clone(),
            latitude: flight.position.latitude,
            longitude: flight.position.longitude,
            altitude_m: flight.position.altitude,
            heading_deg: flight.heading.to_degrees(),
            speed_kmh: flight.speed,
            departure_code: flight.departure.code.clone(),
            departure_name: flight.departure.name.clone(),
            arrival_code: flight.arrival.code.clone(),
            arrival_name: flight.arrival.name.clone(),
        }
    }
}

/// A resolved selection
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionDetail<'a> {
    Flight(FlightSummary),
    Airport(&'a Airport),
}

impl TrafficModel {
    /// Look a selection up in this snapshot.
    ///
    /// `None` when the entity is gone, e.g. a flight that has since arrived.
    pub fn resolve(&self, selection: &Selection) -> Option<SelectionDetail<'_>> {
        match selection {
            Selection::Flight(id) => self.flight(id).map(|f| SelectionDetail::Flight(f.into())),
            Selection::Airport(code) => self.airport(code).map(|a| SelectionDetail::Airport(a.as_ref())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GenerationProfile, SimulationRules};
    use crate::model::TrafficEngine;

    #[test]
    fn test_resolve_airport() {
        let mut engine = TrafficEngine::seeded(SimulationRules::default(), GenerationProfile::default(), 17);
        let model = engine.generate_initial_model(1000.0, 1000.0).unwrap();

        match model.resolve(&Selection::Airport("CDG".to_string())) {
            Some(SelectionDetail::Airport(airport)) => {
                assert_eq!(airport.name, "Charles de Gaulle Airport");
            }
            other => panic!("unexpected selection result: {other:?}"),
        }
        assert!(model.resolve(&Selection::Airport("XXX".to_string())).is_none());
    }

    #[test]
    fn test_resolve_flight_summary() {
        let mut engine = TrafficEngine::seeded(SimulationRules::default(), GenerationProfile::default(), 19);
        let model = engine.generate_initial_model(1000.0, 1000.0).unwrap();
        let flight = &model.flights[3];

        let Some(SelectionDetail::Flight(summary)) = model.resolve(&Selection::Flight(flight.id.clone())) else {
            panic!("flight {} not resolved", flight.id);
        };
        assert_eq!(summary.id, flight.id);
        assert_eq!(summary.departure_code, flight.departure.code);
        assert_eq!(summary.arrival_name, flight.arrival.name);
        assert!((summary.heading_deg - flight.heading.to_degrees()).abs() < 1e-12);
        assert_eq!(summary.speed_kmh, 500.0);
    }

    #[test]
    fn test_resolve_retired_flight() {
        let model = TrafficModel::empty();
        assert!(model.resolve(&Selection::Flight(FlightId::new("gone00000000"))).is_none());
    }

    #[test]
    fn test_selection_wire_format() {
        let json = serde_json::to_string(&Selection::Airport("LHR".to_string())).unwrap();
        assert_eq!(json, r#"{"kind":"airport","id":"LHR"}"#);

        let parsed: Selection = serde_json::from_str(r#"{"kind":"flight","id":"abc123def456"}"#).unwrap();
        assert_eq!(parsed, Selection::Flight(FlightId::new("abc123def456")));
    }
}
