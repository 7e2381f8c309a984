//! Engine error types.
//!
//! Per-record defects (unparseable dates, missing durations) never surface
//! here — they degrade to a zero signal and show up in the report counts.
//! The only fatal condition is invalid input shape.

/// Alias for Results returning [`ReconcileError`].
pub type Result<T> = std::result::Result<T, ReconcileError>;

#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// Input records violate the shape contract (empty or duplicate ids).
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
