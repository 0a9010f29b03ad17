use crate::error::{AuthError, Result};
use crate::password::CredentialHasher;
use async_trait::async_trait;
use memoria_models::Ability;
use sqlx::PgPool;
use uuid::Uuid;

/// Collaborator that vouches for an identifier/credential pair. The
/// authentication service never sees credential hashes, only the owning
/// user id and role this contract returns.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with [`AuthError::NotFound`] when the identifier resolves to
    /// no account and [`AuthError::AccessDenied`] on a bad credential.
    async fn verify(&self, identifier: Uuid, credential: &str) -> Result<(Uuid, Ability)>;
}

/// `UserStore` backed by the platform's `users` table.
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn verify(&self, identifier: Uuid, credential: &str) -> Result<(Uuid, Ability)> {
        let row: Option<(Uuid, String, String)> = sqlx::query_as(
            "SELECT id, credential_hash, role FROM users WHERE identifier = $1",
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Internal(e.to_string()))?;

        let (user_id, credential_hash, role) = row
            .ok_or_else(|| AuthError::NotFound(format!("User not found: {}", identifier)))?;

        if !CredentialHasher::verify(credential, &credential_hash)? {
            tracing::warn!(identifier = %identifier, "credential verification failed");
            return Err(AuthError::AccessDenied);
        }

        let role = role
            .parse::<Ability>()
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        Ok((user_id, role))
    }
}
