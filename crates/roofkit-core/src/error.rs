//! Error handling for RoofKit
//!
//! Provides the error taxonomy used across the workspace:
//! - Validation errors (missing address, missing coordinates)
//! - Service errors (geocoder, imagery, remote store failures and timeouts)
//! - Storage errors (local snapshot cache)
//!
//! A missing remote snapshot is reported through `ServiceError::NotFound`,
//! but callers treat it as a normal branch rather than a failure.
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Input validation error type
///
/// Reported immediately to the caller, never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// No address was entered
    #[error("Address is required")]
    MissingAddress,

    /// An operation needed resolved coordinates but none are set
    #[error("Latitude and longitude are required")]
    MissingCoordinates,

    /// Nothing has been measured yet, so there is nothing to save
    #[error("No measurements to save")]
    EmptyMeasurement,
}

/// External collaborator error type
///
/// Represents failures of the geocoder, the aerial imagery provider,
/// the remote measurement store, and the product page fetcher.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The collaborator had no result for the request
    #[error("{what} not found")]
    NotFound {
        /// What was looked up.
        what: String,
    },

    /// The collaborator answered with a failure or a non-OK status
    #[error("{service} failed: {message}")]
    Failed {
        /// The collaborator name.
        service: String,
        /// The failure message.
        message: String,
    },

    /// The collaborator did not answer within its bound
    #[error("{service} timed out after {timeout_ms}ms")]
    Timeout {
        /// The collaborator name.
        service: String,
        /// The timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// The collaborator is not configured or not reachable at all
    #[error("{service} not available")]
    Unavailable {
        /// The collaborator name.
        service: String,
    },
}

impl ServiceError {
    /// Create a failure for a named service
    pub fn failed(service: impl Into<String>, message: impl Into<String>) -> Self {
        ServiceError::Failed {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create a timeout for a named service
    pub fn timeout(service: impl Into<String>, timeout_ms: u64) -> Self {
        ServiceError::Timeout {
            service: service.into(),
            timeout_ms,
        }
    }

    /// Create a not-found result
    pub fn not_found(what: impl Into<String>) -> Self {
        ServiceError::NotFound { what: what.into() }
    }
}

/// Main error type for RoofKit
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Input validation error
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// External collaborator error
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Local snapshot cache error
    #[error("Storage error: {0}")]
    Storage(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a storage error from a string message
    pub fn storage(msg: impl Into<String>) -> Self {
        Error::Storage(msg.into())
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Service(ServiceError::Timeout { .. }))
    }

    /// Check if this is a not-found result
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Service(ServiceError::NotFound { .. }))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Check if this is an external service error
    pub fn is_service_error(&self) -> bool {
        matches!(self, Error::Service(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
