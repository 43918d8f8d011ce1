//! Error types for the PostgreSQL storage backend.

use oauth_store::StoreError;
use sqlx_core::error::Error as SqlxError;

/// Errors raised while building the backend: pool creation, schema bootstrap,
/// and configuration.
///
/// Per-operation failures are reported as [`StoreError`] instead.
#[derive(Debug, thiserror::Error)]
pub enum PostgresError {
    /// Database connection error.
    #[error("Database connection error: {0}")]
    Connection(#[from] SqlxError),

    /// Schema bootstrap failed.
    #[error("Schema error: {message}")]
    Schema { message: String },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl PostgresError {
    /// Creates a new schema error.
    #[must_use]
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    /// Creates a new configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

impl From<PostgresError> for StoreError {
    fn from(err: PostgresError) -> Self {
        StoreError::storage(err.to_string())
    }
}

/// Result type alias for backend construction.
pub type Result<T> = std::result::Result<T, PostgresError>;

/// Maps a query error to a storage error.
pub(crate) fn storage_error(err: SqlxError) -> StoreError {
    StoreError::storage(format!("Database error: {err}"))
}

/// Maps an insert error, turning unique violations into conflicts.
pub(crate) fn insert_error(err: SqlxError, conflict: impl FnOnce() -> String) -> StoreError {
    if let SqlxError::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return StoreError::conflict(conflict());
    }
    storage_error(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PostgresError::config("invalid URL");
        assert!(err.to_string().contains("Configuration error"));

        let err = PostgresError::schema("permission denied");
        assert_eq!(err.to_string(), "Schema error: permission denied");
    }

    #[test]
    fn test_conversion_to_store_error() {
        let store_err: StoreError = PostgresError::config("test error").into();
        assert!(store_err.is_storage_error());
        assert!(!store_err.is_conflict());
    }

    #[test]
    fn test_non_database_insert_error_is_storage() {
        let err = insert_error(SqlxError::RowNotFound, || "dup".into());
        assert!(err.is_storage_error());
    }
}
