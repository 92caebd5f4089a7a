use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying database.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// A uniqueness constraint enforced by the backend rejected the write.
    #[error("{0}")]
    Conflict(String),
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }

    /// Conflict raised when a jersey number is already held by another player of the team.
    pub fn jersey_taken(jersey_number: u32) -> Self {
        StorageError::Conflict(format!(
            "jersey number {jersey_number} already taken for this team"
        ))
    }

    /// Conflict raised when an email address is already registered.
    pub fn email_taken(email: &str) -> Self {
        StorageError::Conflict(format!("user `{email}` already exists"))
    }

    /// Conflict raised when a player is already listed in a roster.
    pub fn already_in_roster() -> Self {
        StorageError::Conflict("player already in roster".into())
    }
}
