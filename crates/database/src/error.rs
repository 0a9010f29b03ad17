use thiserror::Error;

pub type Result<T> = std::result::Result<T, DatabaseError>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("{0}")]
    Other(String),
}

impl DatabaseError {
    pub fn not_found(entity: &str, key: &str) -> Self {
        Self::NotFound(format!("{} not found: {}", entity, key))
    }

    pub fn conflict(entity: &str, key: &str) -> Self {
        Self::Conflict(format!("{} already exists: {}", entity, key))
    }
}

/// True when the underlying driver reports a unique-constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}
