//! # Database Error Types
//!
//! Error types for store operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)        Business rule (CoreError)           │
//! │       │                                 │                               │
//! │       ▼                                 ▼                               │
//! │  DbError::{NotFound, UniqueViolation, …}   DbError::Core(..)           │
//! │       │                                 │                               │
//! │       └────────────────┬────────────────┘                               │
//! │                        ▼                                                │
//! │  Caller shows a message; a rejected commit keeps its original          │
//! │  InsufficientStock / ProductNotFound variant                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use kasir_core::{CoreError, ValidationError};
use thiserror::Error;

/// Store operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation (duplicate barcode, category name).
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Product referencing a category that doesn't exist
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A business rule rejected the operation.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// The business error behind this failure, if any.
    pub fn as_core(&self) -> Option<&CoreError> {
        match self {
            DbError::Core(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for DbError {
    fn from(err: ValidationError) -> Self {
        DbError::Core(CoreError::Validation(err))
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // "UNIQUE constraint failed: <table>.<column>"
                if let Some(field) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    DbError::UniqueViolation {
                        field: field.to_string(),
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_keep_their_variant() {
        let err: DbError = CoreError::ProductNotFound("p1".to_string()).into();
        assert_eq!(
            err.as_core(),
            Some(&CoreError::ProductNotFound("p1".to_string()))
        );
        assert_eq!(err.to_string(), "Product not found: p1");
    }

    #[test]
    fn test_validation_error_is_wrapped_as_core() {
        let err: DbError = ValidationError::Required {
            field: "name".to_string(),
        }
        .into();
        assert!(matches!(err, DbError::Core(CoreError::Validation(_))));
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
