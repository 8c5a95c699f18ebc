//! Typed error handling for listwise
//!
//! This module provides the error type hierarchy for the crate so that
//! callers can handle errors specifically rather than dealing with generic
//! `anyhow::Error` values.
//!
//! # Error Categories
//!
//! - [`FilterError`]: Errors raised while serializing filter values
//! - [`RequestError`]: Errors around list-page requests
//! - [`ResolveError`]: Errors raised by the batching record resolver
//! - [`ConfigError`]: Errors related to filter-catalog configuration
//!
//! # Example
//!
//! ```rust,ignore
//! use listwise::prelude::*;
//!
//! match controller.list_page(2).await {
//!     Ok(()) => {}
//!     Err(ListwiseError::Request(RequestError::FetchInFlight)) => {
//!         // another page request is already running; ignore the click
//!     }
//!     Err(e) => eprintln!("list request failed: {}", e),
//! }
//! ```

use crate::core::filter::FilterKind;
use std::fmt;

/// The main error type for listwise
///
/// Each variant wraps a more specific error type for that category.
#[derive(Debug)]
pub enum ListwiseError {
    /// Filter serialization errors
    Filter(FilterError),

    /// List request errors
    Request(RequestError),

    /// Record resolver errors
    Resolve(ResolveError),

    /// Configuration errors
    Config(ConfigError),

    /// Internal errors (should not happen in normal operation)
    Internal(String),
}

impl fmt::Display for ListwiseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListwiseError::Filter(e) => write!(f, "{}", e),
            ListwiseError::Request(e) => write!(f, "{}", e),
            ListwiseError::Resolve(e) => write!(f, "{}", e),
            ListwiseError::Config(e) => write!(f, "{}", e),
            ListwiseError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ListwiseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ListwiseError::Filter(e) => Some(e),
            ListwiseError::Request(e) => Some(e),
            ListwiseError::Resolve(e) => Some(e),
            ListwiseError::Config(e) => Some(e),
            ListwiseError::Internal(_) => None,
        }
    }
}

// =============================================================================
// Filter Errors
// =============================================================================

/// Errors raised while serializing filter values into query parameters
#[derive(Debug)]
pub enum FilterError {
    /// A number/object-id filter was serialized with an empty value.
    ///
    /// Empty values for these kinds signal a caller bug, not user input,
    /// so they fail the serialization instead of being dropped.
    EmptyValue {
        key: String,
    },

    /// The stored value's shape does not match the declared filter kind.
    ///
    /// These are logged and the single parameter is dropped; the rest of
    /// the query proceeds.
    ValueMismatch {
        key: String,
        kind: FilterKind,
    },
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::EmptyValue { key } => {
                write!(f, "filter '{}' requires a non-empty value", key)
            }
            FilterError::ValueMismatch { key, kind } => {
                write!(
                    f,
                    "filter '{}' holds a value incompatible with its kind {:?}",
                    key, kind
                )
            }
        }
    }
}

impl std::error::Error for FilterError {}

impl From<FilterError> for ListwiseError {
    fn from(err: FilterError) -> Self {
        ListwiseError::Filter(err)
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors around list-page requests
#[derive(Debug)]
pub enum RequestError {
    /// A page request was issued while another one is in flight.
    ///
    /// Page navigation never queues behind a running request; the caller
    /// should retry once the current fetch settles.
    FetchInFlight,

    /// The list endpoint returned a failure
    Endpoint {
        message: String,
    },
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::FetchInFlight => {
                write!(f, "a list request is already in flight")
            }
            RequestError::Endpoint { message } => {
                write!(f, "list request failed: {}", message)
            }
        }
    }
}

impl std::error::Error for RequestError {}

impl From<RequestError> for ListwiseError {
    fn from(err: RequestError) -> Self {
        ListwiseError::Request(err)
    }
}

// =============================================================================
// Resolver Errors
// =============================================================================

/// Errors raised by the batching record resolver
#[derive(Debug)]
pub enum ResolveError {
    /// A by-id batch request failed; records covered by the batch keep
    /// rendering as placeholders until a later resolve succeeds
    BatchFailed {
        message: String,
    },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::BatchFailed { message } => {
                write!(f, "record batch lookup failed: {}", message)
            }
        }
    }
}

impl std::error::Error for ResolveError {}

impl From<ResolveError> for ListwiseError {
    fn from(err: ResolveError) -> Self {
        ListwiseError::Resolve(err)
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to filter-catalog configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to parse a configuration file
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// No filter catalog is configured for the requested table
    UnknownTable {
        table: String,
    },

    /// IO error while reading configuration
    IoError {
        message: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError { file, message } => {
                if let Some(file) = file {
                    write!(f, "Failed to parse config file '{}': {}", file, message)
                } else {
                    write!(f, "Failed to parse config: {}", message)
                }
            }
            ConfigError::UnknownTable { table } => {
                write!(f, "No filter catalog configured for table '{}'", table)
            }
            ConfigError::IoError { message } => {
                write!(f, "IO error: {}", message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for ListwiseError {
    fn from(err: ConfigError) -> Self {
        ListwiseError::Config(err)
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<std::io::Error> for ListwiseError {
    fn from(err: std::io::Error) -> Self {
        ListwiseError::Config(ConfigError::IoError {
            message: err.to_string(),
        })
    }
}

impl From<anyhow::Error> for ListwiseError {
    fn from(err: anyhow::Error) -> Self {
        ListwiseError::Internal(err.to_string())
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for listwise operations
pub type ListwiseResult<T> = Result<T, ListwiseError>;

// =============================================================================
// Tests
// =============================================================================
