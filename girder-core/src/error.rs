//! Error types for dashboard operations.

use thiserror::Error;

/// Result type for dashboard operations.
pub type GirderResult<T> = Result<T, GirderError>;

/// Errors that can occur outside of the operator-facing glue workflow.
#[derive(Debug, Error)]
pub enum GirderError {
    /// A configuration value is out of its allowed range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration or snapshot serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading a configuration file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons an "apply glue" request is turned down.
///
/// The display text is exactly the line written to the status log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GlueRejection {
    /// Nothing is selected.
    #[error("Error: No segments selected for gluing.")]
    NoSegmentsSelected,

    /// Thickness is zero, negative or not a number.
    #[error("Error: Please enter a valid glue thickness.")]
    InvalidThickness,

    /// A glue run is still in progress.
    #[error("Error: Glue application already in progress.")]
    AlreadyApplying,

    /// The session was torn down.
    #[error("Error: Session has been closed.")]
    SessionClosed,
}
