//! Error types for the analytics data-access layer.

use std::fmt;

/// Result type for analytics operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the analytics layer.
///
/// The real adapter converts transport and decoding failures into fallback
/// payloads before they reach the service, so most of these variants are only
/// observed inside the adapter or from custom [`AnalyticsAdapter`] implementations.
///
/// `Error` is `Clone` so a single failure can be handed to every caller that
/// joined the same coalesced request.
///
/// [`AnalyticsAdapter`]: crate::adapter::AnalyticsAdapter
#[derive(Debug, Clone)]
pub enum Error {
    /// The HTTP request could not be completed.
    ///
    /// Common causes:
    /// - Backend unreachable or connection refused
    /// - Request timeout
    /// - TLS failure
    HttpError(String),

    /// The backend answered with a non-success status code.
    StatusError {
        /// HTTP status returned by the backend
        status: u16,
        /// Requested URL
        url: String,
    },

    /// The backend answered, but the body was not the expected JSON.
    MalformedResponse(String),

    /// A payload could not be converted to or from JSON.
    SerializationError(String),

    /// An adapter failed outside of its fallback path.
    ///
    /// The service counts these in the `errors` metric and returns them unchanged.
    AdapterError(String),

    /// Invalid configuration value.
    ///
    /// Raised by [`AnalyticsConfig::from_env`](crate::config::AnalyticsConfig::from_env)
    /// and when the HTTP client cannot be built.
    ConfigError(String),

    /// Generic error with custom message.
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::HttpError(msg) => write!(f, "HTTP error: {}", msg),
            Error::StatusError { status, url } => {
                write!(f, "Backend returned status {} for {}", status, url)
            }
            Error::MalformedResponse(msg) => write!(f, "Malformed response: {}", msg),
            Error::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            Error::AdapterError(msg) => write!(f, "Adapter error: {}", msg),
            Error::ConfigError(msg) => write!(f, "Config error: {}", msg),
            Error::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ============================================================================
// Conversions from other error types
// ============================================================================

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        if e.is_syntax() || e.is_eof() {
            Error::MalformedResponse(e.to_string())
        } else {
            Error::SerializationError(e.to_string())
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => Error::StatusError {
                status: status.as_u16(),
                url: e.url().map(|u| u.to_string()).unwrap_or_default(),
            },
            None if e.is_decode() => Error::MalformedResponse(e.to_string()),
            None => Error::HttpError(e.to_string()),
        }
    }
}

impl From<String> for Error {
    fn from(e: String) -> Self {
        Error::Other(e)
    }
}

impl From<&str> for Error {
    fn from(e: &str) -> Self {
        Error::Other(e.to_string())
    }
}
