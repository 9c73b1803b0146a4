/// Tellus Error Module
///
/// This module defines the error type shared by the data-access layer, the
/// configuration loader and the command line front end.
///
/// Only hard failures are errors. A lookup that finds nothing or an insert
/// that collides with a uniqueness rule is reported through `Ok(None)` or
/// `Ok(false)` by the session operations instead.
use thiserror::Error;

/// Error type for the Tellus crate.
#[derive(Error, Debug)]
pub enum TellusError {
    /// Failures reported by SQLite (I/O, malformed statements, constraints)
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A foreign key restriction refused the write
    #[error("Restricted: {0}")]
    Restricted(String),

    /// The session has already been closed
    #[error("Session error: connection already closed")]
    Closed,

    /// Configuration loading and validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system and I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TellusError {
    /// Returns true if this error is SQLite refusing a write because of a
    /// foreign key constraint.
    ///
    /// Immediate actions (`ON DELETE RESTRICT`) are reported through
    /// `SQLITE_CONSTRAINT_TRIGGER`, deferred checks through
    /// `SQLITE_CONSTRAINT_FOREIGNKEY`; both carry the same message.
    pub fn is_foreign_key_violation(&self) -> bool {
        match self {
            TellusError::Database(rusqlite::Error::SqliteFailure(err, message)) => {
                err.code == rusqlite::ErrorCode::ConstraintViolation
                    && (err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
                        || message
                            .as_deref()
                            .is_some_and(|m| m.contains("FOREIGN KEY constraint failed")))
            }
            _ => false,
        }
    }
}

/// Type alias for Result to use TellusError as the error type.
pub type Result<T> = std::result::Result<T, TellusError>;
