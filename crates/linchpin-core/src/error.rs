//! # Linchpin Core Errors
//!
//! Defines the crate-level error type.
//!
//! [`Error`] aggregates the typed subsystem errors — the registry's
//! configuration errors and the lifecycle facade's construction and
//! shutdown errors — alongside a plain-message variant for component
//! implementations that have nothing more structured to report.
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::lifecycle::error::LifecycleError;
use crate::registry::error::RegistryError;

#[derive(Debug, ThisError)]
pub enum Error {
    /// Specific, typed registry error
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Specific, typed lifecycle error
    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}
