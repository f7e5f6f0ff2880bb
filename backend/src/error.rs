//! Error types for the planning pipeline.
//!
//! Only top-level precondition failures abort a run. Every per-entity
//! anomaly below that is absorbed locally with a logged warning and a
//! skip or default, so one bad record never kills the batch.

use thiserror::Error;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Precondition failures that abort a planning run before any stage executes.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PipelineError {
    /// A required static collection was empty (e.g. "zones", "stations").
    #[error("no {0} provided in the network topology")]
    EmptyTopology(&'static str),

    /// A required live data set was missing for this planning cycle.
    #[error("no live {0} available for this planning cycle")]
    MissingTelemetry(&'static str),

    /// The emergency duration was zero, negative, or not a finite number.
    #[error("emergency duration must be a positive number of hours, got {0}")]
    InvalidDuration(f64),

    /// Planner configuration could not be read or parsed.
    #[error("configuration error: {0}")]
    Configuration(String),
}
