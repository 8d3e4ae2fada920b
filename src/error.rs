//! Common error types for CapTrack

use thiserror::Error;

/// Common result type for CapTrack operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the CapTrack core
///
/// Form-level validation problems (e.g. a bad threshold configuration typed
/// into the admin form) are NOT errors; they come back as
/// [`crate::settings::ThresholdValidation`] values so the caller can render
/// them inline. `Error` is reserved for structural faults.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or record structure
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
