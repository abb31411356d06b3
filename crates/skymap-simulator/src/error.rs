//! Simulator error types.

use skymap_domain::DomainError;
use thiserror::Error;

/// Simulator errors.
#[derive(Error, Debug)]
pub enum SimulationError {
    /// Flight generation needs a departure and a distinct arrival
    #[error("Need at least 2 distinct airports to generate a flight, got {available}")]
    InsufficientAirports { available: usize },

    /// Speed multiplier outside the accepted range
    #[error("Invalid speed multiplier: {0} (expected 1-100)")]
    InvalidSpeedMultiplier(u32),

    /// Airport table could not be read
    #[error("Airport table error: {0}")]
    AirportTable(#[from] csv::Error),

    /// Domain validation error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Clock task panicked or was cancelled
    #[error("Clock task failed: {0}")]
    ClockTask(#[from] tokio::task::JoinError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for simulator operations.
pub type Result<T> = std::result::Result<T, SimulationError>;
