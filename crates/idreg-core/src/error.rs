//! # Error Types
//!
//! Construction errors for the validated newtypes in this crate. Registry
//! transition errors live in `idreg-state`, next to the operations that
//! raise them.

use thiserror::Error;

/// A domain primitive was constructed from an unacceptable value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The value was empty or consisted only of whitespace.
    #[error("{kind} must not be empty")]
    Empty {
        /// Which primitive was being constructed.
        kind: &'static str,
    },

    /// The value exceeded the maximum permitted length in bytes.
    #[error("{kind} exceeds {max} bytes (got {actual})")]
    TooLong {
        /// Which primitive was being constructed.
        kind: &'static str,
        /// Maximum permitted length.
        max: usize,
        /// Length that was supplied.
        actual: usize,
    },

    /// The value contained a character that is never valid in it.
    #[error("{kind} contains invalid character {ch:?}")]
    InvalidCharacter {
        /// Which primitive was being constructed.
        kind: &'static str,
        /// The offending character.
        ch: char,
    },

    /// A timestamp string could not be parsed or was not UTC.
    #[error("invalid timestamp: {0}")]
    Timestamp(String),
}
