use memoria_database::DatabaseError;
use memoria_models::ParseTokenTypeError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Access denied")]
    AccessDenied,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Deliberately carries no detail: callers must not be able to tell an
    /// unknown secret from an expired or already-rotated one.
    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DatabaseError> for AuthError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => AuthError::NotFound(msg),
            DatabaseError::Conflict(msg) => AuthError::Conflict(msg),
            other => AuthError::Internal(other.to_string()),
        }
    }
}

impl From<ParseTokenTypeError> for AuthError {
    fn from(err: ParseTokenTypeError) -> Self {
        AuthError::InvalidArgument(err.to_string())
    }
}
