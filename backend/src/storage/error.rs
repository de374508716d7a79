//! Errors raised by the storage layer.
//!
//! Not-found and refused writes are ordinary outcomes (`Option`/`bool`),
//! so only caller-contract violations and engine failures live here.

use crate::storage::table::ColumnKind;

/// A record that does not fit the table it was written to
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{table}: missing field `{column}`")]
    MissingField {
        table: &'static str,
        column: &'static str,
    },
    #[error("{table}: unknown field `{field}`")]
    UnknownField { table: &'static str, field: String },
    #[error("{table}: field `{column}` cannot be null")]
    NullValue {
        table: &'static str,
        column: &'static str,
    },
    #[error("{table}: field `{column}` expects {expected}, got {found}")]
    TypeMismatch {
        table: &'static str,
        column: &'static str,
        expected: ColumnKind,
        found: &'static str,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("invalid record: {0}")]
    Validation(#[from] ValidationError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StorageError {
    /// True when the engine rejected a write on a UNIQUE or PRIMARY KEY constraint
    pub fn is_unique_violation(&self) -> bool {
        match self {
            StorageError::Database(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
            _ => false,
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
