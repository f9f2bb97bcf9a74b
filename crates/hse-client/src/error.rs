//! Client error types.
//!
//! Every failure the client reports is one of six kinds. HTTP responses and
//! transport failures are turned into these at the dispatch boundary by
//! [`classify`] and [`Error::transport`]; resource methods pass them through
//! untouched.

use std::fmt;

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Message used when a failed response carries nothing readable.
const UNKNOWN_ERROR: &str = "Unknown error";

/// Classified failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad credentials, or an expired session that could not be refreshed.
    Authentication,
    /// Malformed input (400).
    Validation,
    /// Resource not found (404).
    NotFound,
    /// Too many requests (429).
    RateLimit,
    /// Server-side failure (5xx).
    Server,
    /// Everything else: transport failures and unexpected statuses.
    Generic,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Authentication => "authentication",
            Self::Validation => "validation",
            Self::NotFound => "not-found",
            Self::RateLimit => "rate-limit",
            Self::Server => "server",
            Self::Generic => "generic",
        };
        f.write_str(name)
    }
}

/// Payload shared by every error kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    /// Human-readable message (the server's `error` field when present).
    pub message: String,
    /// HTTP status, absent for transport and client-side failures.
    pub status: Option<u16>,
    /// The server's `details` field, verbatim.
    pub details: Option<Value>,
}

impl Failure {
    /// A failure with only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            details: None,
        }
    }

    /// A failure tied to an HTTP status.
    pub fn with_status(message: impl Into<String>, status: u16, details: Option<Value>) -> Self {
        Self {
            message: message.into(),
            status: Some(status),
            details,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (HTTP {})", self.message, status),
            None => f.write_str(&self.message),
        }
    }
}

/// Client error type.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Authentication failed or the session could not be refreshed.
    #[error("Authentication failed: {0}")]
    Authentication(Failure),

    /// The server rejected the request as invalid.
    #[error("Validation failed: {0}")]
    Validation(Failure),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(Failure),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded: {0}")]
    RateLimit(Failure),

    /// Server error.
    #[error("Server error: {0}")]
    Server(Failure),

    /// Any other failure.
    #[error("{0}")]
    Generic(Failure),
}

impl Error {
    /// Wrap a transport-level failure (connection refused, timeout, ...).
    pub(crate) fn transport(err: &reqwest::Error) -> Self {
        Error::Generic(Failure::new(format!("Request failed: {}", err)))
    }

    /// Build an error of the given kind.
    pub(crate) fn from_kind(kind: ErrorKind, failure: Failure) -> Self {
        match kind {
            ErrorKind::Authentication => Error::Authentication(failure),
            ErrorKind::Validation => Error::Validation(failure),
            ErrorKind::NotFound => Error::NotFound(failure),
            ErrorKind::RateLimit => Error::RateLimit(failure),
            ErrorKind::Server => Error::Server(failure),
            ErrorKind::Generic => Error::Generic(failure),
        }
    }

    /// Shorthand for an authentication error without a status.
    pub(crate) fn auth(message: impl Into<String>) -> Self {
        Error::Authentication(Failure::new(message))
    }

    /// Shorthand for a generic error without a status.
    pub(crate) fn generic(message: impl Into<String>) -> Self {
        Error::Generic(Failure::new(message))
    }

    /// Re-tag this error as an authentication failure, keeping its payload.
    pub(crate) fn into_authentication(self) -> Self {
        match self {
            Error::Authentication(_) => self,
            other => Error::Authentication(other.into_failure()),
        }
    }

    /// The classified kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Authentication(_) => ErrorKind::Authentication,
            Error::Validation(_) => ErrorKind::Validation,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::RateLimit(_) => ErrorKind::RateLimit,
            Error::Server(_) => ErrorKind::Server,
            Error::Generic(_) => ErrorKind::Generic,
        }
    }

    /// The failure payload.
    pub fn failure(&self) -> &Failure {
        match self {
            Error::Authentication(f)
            | Error::Validation(f)
            | Error::NotFound(f)
            | Error::RateLimit(f)
            | Error::Server(f)
            | Error::Generic(f) => f,
        }
    }

    fn into_failure(self) -> Failure {
        match self {
            Error::Authentication(f)
            | Error::Validation(f)
            | Error::NotFound(f)
            | Error::RateLimit(f)
            | Error::Server(f)
            | Error::Generic(f) => f,
        }
    }

    /// The error message without the kind prefix.
    pub fn message(&self) -> &str {
        &self.failure().message
    }

    /// HTTP status code, if the error came from a response.
    pub fn status_code(&self) -> Option<u16> {
        self.failure().status
    }

    /// Structured details from the server, if any.
    pub fn details(&self) -> Option<&Value> {
        self.failure().details.as_ref()
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        self.kind() == ErrorKind::Authentication
    }

    /// Check if this is a validation error.
    pub fn is_validation_error(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    /// Check if this is a rate limit error.
    pub fn is_rate_limited(&self) -> bool {
        self.kind() == ErrorKind::RateLimit
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        self.kind() == ErrorKind::Server
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Map a status code to its error kind.
///
/// Total over all statuses; callers only pass non-success codes.
pub fn kind_for_status(status: StatusCode) -> ErrorKind {
    match status.as_u16() {
        401 => ErrorKind::Authentication,
        400 => ErrorKind::Validation,
        404 => ErrorKind::NotFound,
        429 => ErrorKind::RateLimit,
        s if s >= 500 => ErrorKind::Server,
        _ => ErrorKind::Generic,
    }
}

/// Classify a failed response into a typed error.
///
/// The message comes from the body's `error` field when the body is a JSON
/// object, otherwise from the raw body text; `details` is copied verbatim.
pub fn classify(status: StatusCode, body: &str) -> Error {
    let (message, details) = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => {
            let message = match map.get("error") {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => UNKNOWN_ERROR.to_string(),
                Some(other) => other.to_string(),
            };
            let details = map.get("details").filter(|d| !d.is_null()).cloned();
            (message, details)
        }
        _ if body.trim().is_empty() => (UNKNOWN_ERROR.to_string(), None),
        _ => (body.to_string(), None),
    };

    Error::from_kind(
        kind_for_status(status),
        Failure::with_status(message, status.as_u16(), details),
    )
}
