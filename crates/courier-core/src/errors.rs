//! Error types shared across the Courier crates
//!
//! Each concern gets its own `thiserror` enum; `CourierError` unifies them
//! for callers that do not care which layer failed. Network failures carry
//! either the HTTP status or the transport-level reason. The caller decides
//! whether to retry; nothing in this crate does.

use std::string::String;

// ----------------------------------------------------------------------------
// Network Errors
// ----------------------------------------------------------------------------

/// A backend or companion-service call failed.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("server returned HTTP {code} for {endpoint}")]
    Status { code: u16, endpoint: String },
    #[error("transport failure: {reason}")]
    Transport { reason: String },
    #[error("backend reported failure: {reason}")]
    Rejected { reason: String },
    #[error("malformed response from {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },
}

// ----------------------------------------------------------------------------
// Validation Errors
// ----------------------------------------------------------------------------

/// Malformed user input, caught before any network attempt.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid rider id: {value}")]
    InvalidRiderId { value: String },
    #[error("invalid order id: {value}")]
    InvalidOrderId { value: String },
    #[error("invalid host: {value}")]
    InvalidHost { value: String },
    #[error("invalid port: {value}")]
    InvalidPort { value: String },
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
}

// ----------------------------------------------------------------------------
// Session Store Errors
// ----------------------------------------------------------------------------

/// Failures of the persisted session store. A missing or partial session
/// file is NOT an error; only unreadable storage or unwritable state is.
#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("failed to read session file: {0}")]
    Read(String),
    #[error("failed to write session file: {0}")]
    Write(String),
    #[error("failed to clear session file: {0}")]
    Clear(String),
}

// ----------------------------------------------------------------------------
// Unified Error
// ----------------------------------------------------------------------------

/// Top-level error for the Courier client.
#[derive(Debug, thiserror::Error)]
pub enum CourierError {
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("session store error: {0}")]
    SessionStore(#[from] SessionStoreError),

    #[error("not signed in: {reason}")]
    NotSignedIn { reason: String },

    #[error("invalid lifecycle transition: {reason}")]
    InvalidTransition { reason: String },

    #[error("configuration error: {reason}")]
    Configuration { reason: String },

    /// Channel communication error, internal to the runtime task wiring.
    #[error("channel error: {message}")]
    Channel { message: String },
}

impl CourierError {
    /// Create a transport-level network error with a reason.
    pub fn transport<T: Into<String>>(reason: T) -> Self {
        CourierError::Network(NetworkError::Transport {
            reason: reason.into(),
        })
    }

    /// Create a backend-rejection error (`success=false` replies).
    pub fn rejected<T: Into<String>>(reason: T) -> Self {
        CourierError::Network(NetworkError::Rejected {
            reason: reason.into(),
        })
    }

    /// Create an HTTP status error.
    pub fn status<E: Into<String>>(code: u16, endpoint: E) -> Self {
        CourierError::Network(NetworkError::Status {
            code,
            endpoint: endpoint.into(),
        })
    }

    /// Create a not-signed-in error.
    pub fn not_signed_in<T: Into<String>>(reason: T) -> Self {
        CourierError::NotSignedIn {
            reason: reason.into(),
        }
    }

    /// Create an invalid-transition error.
    pub fn invalid_transition<T: Into<String>>(reason: T) -> Self {
        CourierError::InvalidTransition {
            reason: reason.into(),
        }
    }

    /// Create a configuration error.
    pub fn config_error<T: Into<String>>(reason: T) -> Self {
        CourierError::Configuration {
            reason: reason.into(),
        }
    }

    /// Create a channel error.
    pub fn channel_error<T: Into<String>>(message: T) -> Self {
        CourierError::Channel {
            message: message.into(),
        }
    }
}

// ----------------------------------------------------------------------------
// Type Aliases
// ----------------------------------------------------------------------------

pub type Result<T> = core::result::Result<T, CourierError>;

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_formats_endpoint() {
        let err = CourierError::status(503, "/orders/pending");
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("/orders/pending"));
    }

    #[test]
    fn validation_converts_into_courier_error() {
        let err: CourierError = ValidationError::InvalidPort {
            value: "99999".to_string(),
        }
        .into();
        assert!(matches!(err, CourierError::Validation(_)));
    }
}
