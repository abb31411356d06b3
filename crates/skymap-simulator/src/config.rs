//! # Simulation Configuration
//!
//! Environment-based configuration for the simulator. Every value has a
//! default matching the built-in European scenario; unparsable values fall
//! back to the default.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// How the spawn probability relates to elapsed simulated time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SpawnPolicy {
    /// Fixed chance per `advance` call, whatever the elapsed time.
    /// Faster clocks tick more often and therefore spawn more.
    #[default]
    PerTick,
    /// Chance scaled so that one simulated second carries the configured
    /// probability, independent of tick length.
    PerSecond,
}

impl SpawnPolicy {
    /// Probability of spawning during a tick covering `elapsed_ms`.
    #[must_use]
    pub fn chance(self, probability: f64, elapsed_ms: f64) -> f64 {
        if !probability.is_finite() {
            return 0.0;
        }
        let p = probability.clamp(0.0, 1.0);
        match self {
            Self::PerTick => p,
            Self::PerSecond => {
                let seconds = (elapsed_ms / 1000.0).max(0.0);
                1.0 - (1.0 - p).powf(seconds)
            }
        }
    }
}

/// Rules applied by the traffic model on every tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationRules {
    /// No spawning once this many flights are active
    pub max_flights: usize,
    /// Flights created by `generate_initial_model`
    pub initial_flights: usize,
    pub spawn_probability: f64,
    pub spawn_policy: SpawnPolicy,
    /// Per-axis proximity to the arrival airport, in degrees
    pub arrival_threshold_deg: f64,
}

impl Default for SimulationRules {
    fn default() -> Self {
        Self {
            max_flights: 10,
            initial_flights: 10,
            spawn_probability: 0.05,
            spawn_policy: SpawnPolicy::PerTick,
            arrival_threshold_deg: 0.1,
        }
    }
}

/// Constants used when generating a flight.
///
/// `min_target_speed` is larger than `max_target_speed` in the default
/// profile, so every generated target speed collapses to the maximum. The
/// values are kept as observed in the scenario this simulator reproduces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationProfile {
    pub min_target_altitude: f64,
    pub max_target_altitude: f64,
    pub altitude_jitter: f64,
    pub min_target_speed: f64,
    pub max_target_speed: f64,
    pub speed_jitter: f64,
    /// Multiplier applied to the degree distance between airports
    pub distance_factor: f64,
    /// Speed every flight actually flies at, km/h
    pub cruise_speed: f64,
}

impl Default for GenerationProfile {
    fn default() -> Self {
        Self {
            min_target_altitude: 1000.0,
            max_target_altitude: 30000.0,
            altitude_jitter: 1000.0,
            min_target_speed: 900.0,
            max_target_speed: 500.0,
            speed_jitter: 100.0,
            distance_factor: 10.0,
            cruise_speed: 500.0,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Simulator configuration
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub canvas_width: f64,
    pub canvas_height: f64,

    /// Initial speed multiplier (1-100)
    pub speed: u32,

    pub rules: SimulationRules,
    pub generation: GenerationProfile,

    /// CSV airport table replacing the built-in one
    pub airports_path: Option<PathBuf>,

    /// Logging level
    pub log_level: String,
    pub log_format: LogFormat,
}

impl SimulationConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let parsed = |key: &str| {
            lookup(key)
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite())
        };
        let defaults = SimulationRules::default();

        Self {
            canvas_width: parsed("SKYMAP_CANVAS_WIDTH")
                .filter(|w| *w >= 0.0)
                .unwrap_or(2000.0),

            canvas_height: parsed("SKYMAP_CANVAS_HEIGHT")
                .filter(|h| *h >= 0.0)
                .unwrap_or(2000.0),

            speed: lookup("SKYMAP_SPEED")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(10),

            rules: SimulationRules {
                max_flights: lookup("SKYMAP_MAX_FLIGHTS")
                    .and_then(|v| v.trim().parse().ok())
                    .unwrap_or(defaults.max_flights),
                initial_flights: lookup("SKYMAP_INITIAL_FLIGHTS")
                    .and_then(|v| v.trim().parse().ok())
                    .unwrap_or(defaults.initial_flights),
                spawn_probability: parsed("SKYMAP_SPAWN_PROBABILITY")
                    .map(|p| p.clamp(0.0, 1.0))
                    .unwrap_or(defaults.spawn_probability),
                spawn_policy: lookup("SKYMAP_SPAWN_POLICY")
                    .and_then(|v| <SpawnPolicy as ValueEnum>::from_str(v.trim(), true).ok())
                    .unwrap_or(defaults.spawn_policy),
                arrival_threshold_deg: parsed("SKYMAP_ARRIVAL_THRESHOLD_DEG")
                    .filter(|t| *t > 0.0)
                    .unwrap_or(defaults.arrival_threshold_deg),
            },

            generation: GenerationProfile::default(),

            airports_path: lookup("SKYMAP_AIRPORTS")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),

            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),

            log_format: lookup("LOG_FORMAT")
                .and_then(|v| <LogFormat as ValueEnum>::from_str(v.trim(), true).ok())
                .unwrap_or_default(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
