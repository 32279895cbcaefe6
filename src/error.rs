use crate::SegmentId;
use thiserror::Error;

/// Errors raised while assembling a simulation from its inputs.
///
/// A running [Simulation](crate::Simulation) never fails; problems found
/// mid-session only ever remove the affected vehicle.
#[derive(Debug, Error)]
pub enum TrafficError {
    #[error("invalid route from {entry}: {reason}")]
    InvalidRoute { entry: SegmentId, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Shorthand result type for fallible constructors.
pub type TrafficResult<T> = Result<T, TrafficError>;
