//! Error types for the SMS Gatekeeper service.
//!
//! Rate-limit rejections and empty phone numbers are not errors; they surface
//! as a `false` admission decision. Errors exist only at the adapter edges.

use thiserror::Error;

/// Main error type for SMS Gatekeeper operations.
#[derive(Error, Debug)]
pub enum GatekeeperError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors (socket bind, config file reads)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for SMS Gatekeeper operations.
pub type Result<T> = std::result::Result<T, GatekeeperError>;
