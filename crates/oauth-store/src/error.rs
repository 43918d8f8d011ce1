//! Storage error types.
//!
//! Every store operation returns its own [`StoreResult`]. Errors fall into
//! three kinds (see [`ErrorKind`]):
//!
//! - `NotFound` - the lookup matched zero records. Expected in normal flows,
//!   for example an authorization code that was already consumed.
//! - `Conflict` - an insert collided with an existing primary or unique key.
//! - `Storage` - the backend failed, a row was malformed, serialization
//!   failed, or a required reference could not be resolved.

use std::fmt;

/// Errors that can occur during token store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested record does not exist.
    #[error("Not found: {resource}")]
    NotFound {
        /// Description of the missing record.
        resource: String,
    },

    /// A record with the same key already exists.
    #[error("Conflict: {message}")]
    Conflict {
        /// Description of the conflicting key.
        message: String,
    },

    /// The backend failed or returned an unusable row.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage failure.
        message: String,
    },

    /// A stored record references another record that cannot be resolved.
    #[error("Integrity error: {message}")]
    Integrity {
        /// Description of the broken reference.
        message: String,
    },

    /// The record cannot be stored in the configured schema profile.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Description of the invalid input.
        message: String,
    },

    /// Serializing or deserializing opaque user data failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Creates a new `Conflict` error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `Integrity` error.
    #[must_use]
    pub fn integrity(message: impl Into<String>) -> Self {
        Self::Integrity {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidInput` error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a `NotFound` error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if this is a `Conflict` error.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Returns `true` if this error belongs to the storage kind.
    #[must_use]
    pub fn is_storage_error(&self) -> bool {
        self.kind() == ErrorKind::Storage
    }

    /// Returns `true` if a required reference could not be resolved.
    #[must_use]
    pub fn is_integrity_error(&self) -> bool {
        matches!(self, Self::Integrity { .. })
    }

    /// Returns the error kind.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Storage { .. }
            | Self::Integrity { .. }
            | Self::InvalidInput { .. }
            | Self::Serialization(_) => ErrorKind::Storage,
        }
    }
}

/// Coarse classification of store errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Zero records matched; recoverable.
    NotFound,
    /// Duplicate key on insert.
    Conflict,
    /// Unrecoverable locally; propagate to the caller unchanged.
    Storage,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::Storage => write!(f, "storage"),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
