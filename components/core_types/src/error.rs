//! Error types shared by the proxy runtime.
//!
//! Every fallible operation in the object model returns [`JsResult`]. Errors
//! raised by handler traps travel through the same type and are propagated
//! untouched, so a caller sees exactly what the trap produced.

use std::fmt;
use thiserror::Error;

/// The kind of error.
///
/// The first variants mirror the error constructors a dynamic object model
/// exposes; the proxy-specific kinds are raised by the trap machinery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Generic error, typically raised by user code inside a trap
    Error,
    /// Type error (e.g. calling a non-function, malformed descriptor)
    TypeError,
    /// Value out of allowed range
    RangeError,
    /// A handler was not an object, or a trap slot held a non-callable
    InvalidHandlerError,
    /// Attempt to change or delete a non-configurable property
    NotConfigurableError,
    /// Internal engine error
    InternalError,
}

impl ErrorKind {
    /// Name of the error kind as it appears in messages
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::Error => "Error",
            ErrorKind::TypeError => "TypeError",
            ErrorKind::RangeError => "RangeError",
            ErrorKind::InvalidHandlerError => "InvalidHandlerError",
            ErrorKind::NotConfigurableError => "NotConfigurableError",
            ErrorKind::InternalError => "InternalError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An error raised by an object-model operation or by a trap.
///
/// # Examples
///
/// ```
/// use core_types::{ErrorKind, JsError};
///
/// let error = JsError::not_configurable("length");
/// assert_eq!(error.kind, ErrorKind::NotConfigurableError);
/// assert_eq!(
///     error.to_string(),
///     "NotConfigurableError: Cannot redefine property: length"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct JsError {
    /// The type of error
    pub kind: ErrorKind,
    /// Human-readable error message
    pub message: String,
}

impl JsError {
    /// Create an error of the given kind
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        JsError {
            kind,
            message: message.into(),
        }
    }

    /// Create a generic error, the kind user code throws
    pub fn error(message: impl Into<String>) -> Self {
        JsError::new(ErrorKind::Error, message)
    }

    /// Create a TypeError
    pub fn type_error(message: impl Into<String>) -> Self {
        JsError::new(ErrorKind::TypeError, message)
    }

    /// Create a RangeError
    pub fn range_error(message: impl Into<String>) -> Self {
        JsError::new(ErrorKind::RangeError, message)
    }

    /// Create an InvalidHandlerError
    pub fn invalid_handler(message: impl Into<String>) -> Self {
        JsError::new(ErrorKind::InvalidHandlerError, message)
    }

    /// Create a NotConfigurableError for the named property
    pub fn not_configurable(name: &str) -> Self {
        JsError::new(
            ErrorKind::NotConfigurableError,
            format!("Cannot redefine property: {}", name),
        )
    }

    /// Create an InternalError
    pub fn internal(message: impl Into<String>) -> Self {
        JsError::new(ErrorKind::InternalError, message)
    }

    /// Check the error kind
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }
}

/// Result type for object-model operations
pub type JsResult<T> = Result<T, JsError>;
