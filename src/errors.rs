use sea_orm::DbErr;
use thiserror::Error;

/// Every failure the crate reports
#[derive(Debug, Error)]
pub enum Error {
    /// Bad or unreadable `forgeweb.toml`, or a CLI misuse
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input rejected before anything was changed
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// No navigation entry has this id
    #[error("Navigation item {id} not found")]
    NavigationNotFound { id: i64 },

    /// Following parent links from `id` loops back
    #[error("Navigation tree contains a parent cycle through item {id}")]
    NavigationCycle { id: i64 },

    /// No connection, or the connection pool is gone
    #[error("Configuration store unavailable: {message}")]
    StoreUnavailable { message: String },

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(DbErr),

    /// File read or write failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON in a document or stored record
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

// Connection-level failures mean the store cannot be reached at all, which
// callers handle differently from a failed query.
impl From<DbErr> for Error {
    fn from(value: DbErr) -> Self {
        match value {
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => Self::StoreUnavailable {
                message: value.to_string(),
            },
            other => Self::Database(other),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
