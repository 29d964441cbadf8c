//! Error types for registry facade operations.
//!
//! The core facade distinguishes an absent key or value from an access
//! failure and from malformed caller input. Only the boundary layers
//! ([`crate::text`], the C exports and the Python bindings) flatten these
//! into sentinel values or numeric status codes.

use crate::value::ValueType;
use std::io;
use thiserror::Error;

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors that can occur during registry operations.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The root name does not match any known hive.
    #[error("Invalid hive name: {0:?} (expected HKCR, HKCU, HKLM, HKU or HKCC)")]
    InvalidHive(String),

    /// The key path is malformed or targets a hive root where a subkey is required.
    #[error("Invalid key path {path:?}: {reason}")]
    InvalidPath {
        /// Path as given by the caller.
        path: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// Key or value not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The store refused access to the key or value.
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// The value exists but holds a different type than the operation reads.
    #[error("Type mismatch: expected {expected}, found {}", .found.tag())]
    TypeMismatch {
        /// Tags the operation accepts.
        expected: &'static str,
        /// Type actually stored.
        found: ValueType,
    },

    /// Caller-supplied payload could not be decoded (hex, decimal, NUL in strings).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Stored bytes do not decode as the declared value type.
    #[error("Corrupt {} value: {reason}", .vtype.tag())]
    CorruptValue {
        /// Declared type.
        vtype: ValueType,
        /// Decoding failure.
        reason: String,
    },

    /// Any other failure reported by the operating system.
    #[error("OS error: {0}")]
    Os(io::Error),
}

impl From<io::Error> for RegistryError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound(err.to_string()),
            io::ErrorKind::PermissionDenied => Self::AccessDenied(err.to_string()),
            _ => Self::Os(err),
        }
    }
}

/// Status codes returned by write-style boundary functions.
pub mod status {
    /// The operation succeeded.
    pub const OK: u32 = 0;
    /// Key or value not found.
    pub const NOT_FOUND: u32 = 1;
    /// Access denied.
    pub const ACCESS_DENIED: u32 = 2;
    /// Unknown hive name.
    pub const INVALID_HIVE: u32 = 3;
    /// Malformed key path.
    pub const INVALID_PATH: u32 = 4;
    /// Malformed payload or argument.
    pub const INVALID_INPUT: u32 = 5;
    /// Stored value has another type.
    pub const TYPE_MISMATCH: u32 = 6;
    /// Any other failure.
    pub const OS_ERROR: u32 = 7;
}

impl RegistryError {
    /// Creates a not found error with context about what was being searched.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use reg_facade::error::RegistryError;
    /// let err = RegistryError::not_found("value", "DisplayName");
    /// assert_eq!(err.to_string(), "Not found: value 'DisplayName'");
    /// ```
    pub fn not_found(item_type: &str, name: &str) -> Self {
        Self::NotFound(format!("{} '{}'", item_type, name))
    }

    /// Creates an access denied error for the named item.
    pub fn access_denied(item_type: &str, name: &str) -> Self {
        Self::AccessDenied(format!("{} '{}'", item_type, name))
    }

    /// Creates an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Creates an invalid path error.
    pub fn invalid_path(path: &str, reason: &'static str) -> Self {
        Self::InvalidPath {
            path: path.to_string(),
            reason,
        }
    }

    /// Creates a corrupt value error.
    pub fn corrupt(vtype: ValueType, reason: impl Into<String>) -> Self {
        Self::CorruptValue {
            vtype,
            reason: reason.into(),
        }
    }

    /// Returns true for errors that mean "the key or value is not there".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Maps the error to the numeric status code used across the C boundary.
    pub fn status_code(&self) -> u32 {
        match self {
            Self::NotFound(_) => status::NOT_FOUND,
            Self::AccessDenied(_) => status::ACCESS_DENIED,
            Self::InvalidHive(_) => status::INVALID_HIVE,
            Self::InvalidPath { .. } => status::INVALID_PATH,
            Self::InvalidInput(_) => status::INVALID_INPUT,
            Self::TypeMismatch { .. } => status::TYPE_MISMATCH,
            Self::CorruptValue { .. } | Self::Os(_) => status::OS_ERROR,
        }
    }
}
