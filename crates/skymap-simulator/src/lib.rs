//! # SkyMap Simulator
//!
//! Simulation engine behind the air-traffic map.
//!
//! ## Features
//!
//! - Random flight generation between airports
//! - Pursuit-steered flight motion over simulated time
//! - Arrival detection, retirement and respawning of flights
//! - Projection of geographic positions onto a drawing surface
//! - Speed-adjustable simulation clock publishing immutable snapshots

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod airports;
pub mod clock;
pub mod config;
pub mod error;
pub mod generator;
pub mod model;
pub mod motion;
pub mod projection;
pub mod selection;

pub use clock::{ClockHandle, SimulationClock, SimulationFrame, SpeedMultiplier};
pub use config::{GenerationProfile, SimulationConfig, SimulationRules, SpawnPolicy};
pub use error::{Result, SimulationError};
pub use generator::FlightGenerator;
pub use model::{TickReport, TrafficEngine, TrafficModel};
pub use projection::{SceneLayout, Viewport, normalize, project_model};
pub use selection::{FlightSummary, Selection, SelectionDetail};
