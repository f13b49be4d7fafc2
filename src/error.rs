//! Structured error types for scanner and store operations.

use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// A scan root is missing, not a directory, or unreadable.
    FilesystemError,
    /// Required field missing, or a NOT NULL/CHECK/UNIQUE/FOREIGN KEY violation.
    ConstraintError,
    /// An existing table lacks columns this version of the store needs.
    SchemaMismatch,
    /// Any other storage-engine or migration failure.
    DatabaseError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::FilesystemError => "filesystem error",
            ErrorCode::ConstraintError => "constraint error",
            ErrorCode::SchemaMismatch => "schema mismatch",
            ErrorCode::DatabaseError => "database error",
        };
        f.write_str(s)
    }
}

/// Structured error returned by the scanner and the store.
///
/// Lookups of missing rows are never errors; they come back as `None` or an
/// affected-row count of zero.
#[derive(Debug, Serialize, thiserror::Error)]
#[error("{code}: {message}")]
pub struct StoreError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl StoreError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
            details: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Convenience constructors

    pub fn missing_field(field: &str) -> Self {
        Self::new(ErrorCode::ConstraintError, format!("{} is required", field)).with_field(field)
    }

    pub fn constraint(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::ConstraintError, err.to_string())
    }

    pub fn filesystem(path: &Path, err: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::FilesystemError,
            format!("cannot read root {}", path.display()),
        )
        .with_details(err.to_string())
    }

    pub fn schema_mismatch(table: &str, missing: &[String]) -> Self {
        Self::new(
            ErrorCode::SchemaMismatch,
            format!(
                "table {} is missing column(s): {}",
                table,
                missing.join(", ")
            ),
        )
        .with_field(table)
    }

    /// A junction table exists but lacks its pair key or cascading references.
    pub fn junction_mismatch(table: &str, problem: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::SchemaMismatch,
            format!("table {} {}", table, problem.into()),
        )
        .with_field(table)
    }

    pub fn database(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::DatabaseError, err.to_string())
    }

    pub fn is_constraint(&self) -> bool {
        self.code == ErrorCode::ConstraintError
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StoreError::constraint(err)
            }
            _ => StoreError::database(err),
        }
    }
}

impl From<refinery::Error> for StoreError {
    fn from(err: refinery::Error) -> Self {
        StoreError::database(err).with_field("migrations")
    }
}

/// Result type for scanner and store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
