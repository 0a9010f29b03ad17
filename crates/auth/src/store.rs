use crate::error::{AuthError, Result};
use crate::fingerprint::TokenFingerprinter;
use crate::secret::TokenSecretGenerator;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use memoria_database::AuthenticationRepository;
use memoria_models::{Ability, Authentication, NewAuthentication, TokenType};
use sqlx::PgPool;
use uuid::Uuid;

pub mod memory;

/// Persistence contract for authentication rows. Implementations own the
/// secret-to-fingerprint mapping; raw secrets cross this boundary going in
/// and are returned exactly once, on the issuance paths.
#[async_trait]
pub trait AuthenticationStore: Send + Sync {
    /// Write a new row with both fingerprints and expirations set. Fails
    /// with [`AuthError::Conflict`] when the identifier already exists.
    async fn create(
        &self,
        identifier: Uuid,
        user: Uuid,
        abilities: Vec<Ability>,
        access_secret: String,
        access_ttl: Duration,
        refresh_secret: String,
        refresh_ttl: Duration,
    ) -> Result<Authentication>;

    /// Fetch the aggregate without raw secrets.
    async fn find_by_identifier(&self, identifier: Uuid) -> Result<Authentication>;

    /// Liveness check: true iff a row holds this secret's fingerprint in
    /// the given slot with an expiry in the future. Unknown and expired
    /// secrets both answer `false`; this path never fails on a bad token.
    async fn introspect(&self, raw_secret: &str, token_type: TokenType) -> Result<bool>;

    /// Exchange a refresh secret for a brand-new pair. The swap is a
    /// conditional write keyed on the matched fingerprint, so a refresh
    /// secret is usable exactly once; unknown, expired and already-spent
    /// secrets all fail with [`AuthError::InvalidToken`].
    async fn rotate(
        &self,
        raw_refresh_secret: &str,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Result<Authentication>;

    /// Clear the one slot holding this secret's fingerprint, leaving the
    /// paired slot untouched. Fails with [`AuthError::InvalidToken`] when
    /// no row carries the fingerprint in that slot.
    async fn revoke(&self, raw_secret: &str, token_type: TokenType) -> Result<()>;

    /// Hard-delete the row (logout). Fails with [`AuthError::NotFound`]
    /// when the identifier does not exist.
    async fn delete(&self, identifier: Uuid) -> Result<()>;
}

/// Postgres-backed store: fingerprints at this layer, row mechanics in the
/// repository.
pub struct PgAuthenticationStore {
    repo: AuthenticationRepository,
    fingerprinter: TokenFingerprinter,
    secrets: TokenSecretGenerator,
}

impl PgAuthenticationStore {
    pub fn new(
        pool: PgPool,
        fingerprinter: TokenFingerprinter,
        secrets: TokenSecretGenerator,
    ) -> Self {
        Self {
            repo: AuthenticationRepository::new(pool),
            fingerprinter,
            secrets,
        }
    }
}

#[async_trait]
impl AuthenticationStore for PgAuthenticationStore {
    async fn create(
        &self,
        identifier: Uuid,
        user: Uuid,
        abilities: Vec<Ability>,
        access_secret: String,
        access_ttl: Duration,
        refresh_secret: String,
        refresh_ttl: Duration,
    ) -> Result<Authentication> {
        let now = Utc::now();
        let new = NewAuthentication {
            identifier,
            user_id: user,
            abilities,
            access_token_hash: Some(self.fingerprinter.fingerprint(&access_secret)),
            access_expires_at: Some(now + access_ttl),
            refresh_token_hash: Some(self.fingerprinter.fingerprint(&refresh_secret)),
            refresh_expires_at: Some(now + refresh_ttl),
        };

        let record = self.repo.insert(&new).await?;
        Ok(record.into_issued(access_secret, refresh_secret))
    }

    async fn find_by_identifier(&self, identifier: Uuid) -> Result<Authentication> {
        let record = self.repo.find_by_identifier(identifier).await?;
        Ok(record.into_authentication())
    }

    async fn introspect(&self, raw_secret: &str, token_type: TokenType) -> Result<bool> {
        let fingerprint = self.fingerprinter.fingerprint(raw_secret);
        Ok(self.repo.slot_is_active(token_type, &fingerprint).await?)
    }

    async fn rotate(
        &self,
        raw_refresh_secret: &str,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Result<Authentication> {
        let current = self.fingerprinter.fingerprint(raw_refresh_secret);

        let access_secret = self.secrets.generate();
        let refresh_secret = self.secrets.generate();
        let now = Utc::now();

        let record = self
            .repo
            .rotate(
                &current,
                &self.fingerprinter.fingerprint(&access_secret),
                now + access_ttl,
                &self.fingerprinter.fingerprint(&refresh_secret),
                now + refresh_ttl,
            )
            .await?
            .ok_or_else(|| {
                tracing::warn!("refresh secret matched no active row; rotation refused");
                AuthError::InvalidToken
            })?;

        Ok(record.into_issued(access_secret, refresh_secret))
    }

    async fn revoke(&self, raw_secret: &str, token_type: TokenType) -> Result<()> {
        let fingerprint = self.fingerprinter.fingerprint(raw_secret);

        if !self.repo.clear_slot(token_type, &fingerprint).await? {
            tracing::warn!(token_type = %token_type, "revoke matched no row");
            return Err(AuthError::InvalidToken);
        }

        Ok(())
    }

    async fn delete(&self, identifier: Uuid) -> Result<()> {
        self.repo.delete(identifier).await?;
        Ok(())
    }
}
