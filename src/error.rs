//! Error types for property adapters.
//!
//! This module provides the error taxonomy shared by every adapter, descriptor and
//! registry operation.
//!
//! ## Error Categories
//!
//! - **Configuration Errors**: raised while building adapters from descriptions
//!   (missing nested descriptions, unknown type tags, unresolvable bindings)
//! - **Format Errors**: raised while encoding or decoding a value (missing sparse `id`,
//!   anonymous element with several children, entry-count mismatch, truncated streams)
//! - **Type Mismatches**: a value of the wrong shape was handed to an adapter
//! - **Unsupported Operations**: an adapter was asked for a format it does not implement
//!
//! Configuration and unsupported-operation errors are programmer errors and are never
//! recovered locally. Format errors are per call and never auto-corrected.
//!
//! ## Examples
//!
//! ```rust
//! use propcodec::Error;
//!
//! let err = Error::format("element item is missing the required \"id\" attribute");
//! assert!(err.is_format());
//! assert!(err.to_string().contains("\"id\""));
//! ```

use std::fmt;
use std::io;
use thiserror::Error;

const END_OF_STREAM: &str = "unexpected end of stream";

/// Represents all possible errors raised while building or running adapters.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// A description could not be turned into an adapter.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Encoded data is malformed, or a value cannot be written faithfully.
    #[error("Format error: {0}")]
    Format(String),

    /// An adapter received a value of the wrong shape.
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// An adapter was invoked for a format it does not implement.
    #[error("Unsupported operation: {adapter} adapter does not implement {operation}")]
    Unsupported { adapter: String, operation: String },

    /// IO error on the underlying stream
    #[error("IO error: {0}")]
    Io(String),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a configuration error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use propcodec::Error;
    ///
    /// let err = Error::configuration("map property 'index' has no key description");
    /// assert!(err.is_configuration());
    /// ```
    pub fn configuration<T: fmt::Display>(msg: T) -> Self {
        Error::Configuration(msg.to_string())
    }

    /// Creates a format error.
    pub fn format<T: fmt::Display>(msg: T) -> Self {
        Error::Format(msg.to_string())
    }

    /// Creates a type mismatch error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use propcodec::Error;
    ///
    /// let err = Error::type_mismatch("int", "string");
    /// assert!(err.to_string().contains("expected int"));
    /// ```
    pub fn type_mismatch(expected: &str, found: &str) -> Self {
        Error::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Creates an unsupported-operation error for the named adapter and operation.
    pub fn unsupported(adapter: &str, operation: &str) -> Self {
        Error::Unsupported {
            adapter: adapter.to_string(),
            operation: operation.to_string(),
        }
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for stream failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }

    #[must_use]
    pub const fn is_format(&self) -> bool {
        matches!(self, Error::Format(_))
    }

    #[must_use]
    pub const fn is_unsupported(&self) -> bool {
        matches!(self, Error::Unsupported { .. })
    }

    /// Returns `true` if a binary read ran past the end of its input.
    #[must_use]
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Error::Format(msg) if msg == END_OF_STREAM)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => Error::Format(END_OF_STREAM.to_string()),
            _ => Error::Io(err.to_string()),
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
