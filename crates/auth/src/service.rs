use crate::error::{AuthError, Result};
use crate::secret::{TokenSecretGenerator, DEFAULT_SECRET_LENGTH};
use crate::store::AuthenticationStore;
use crate::user_store::UserStore;
use chrono::Duration;
use memoria_models::{Authentication, TokenType};
use std::sync::Arc;
use uuid::Uuid;

/// Issuance policy: secret length and per-slot lifetimes. Access tokens
/// live minutes, refresh tokens days.
#[derive(Debug, Clone)]
pub struct TokenPolicy {
    pub secret_length: usize,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self {
            secret_length: DEFAULT_SECRET_LENGTH,
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::days(14),
        }
    }
}

impl TokenPolicy {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let seconds = |name: &str, fallback: Duration| {
            std::env::var(name)
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::seconds)
                .unwrap_or(fallback)
        };

        Self {
            secret_length: std::env::var("TOKEN_SECRET_LENGTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.secret_length),
            access_ttl: seconds("ACCESS_TOKEN_TTL_SECS", defaults.access_ttl),
            refresh_ttl: seconds("REFRESH_TOKEN_TTL_SECS", defaults.refresh_ttl),
        }
    }
}

/// Orchestrates the token lifecycle: credential verification via the
/// [`UserStore`] collaborator, issuance, introspection, rotation,
/// revocation and logout against the [`AuthenticationStore`].
pub struct AuthenticationService {
    store: Arc<dyn AuthenticationStore>,
    users: Arc<dyn UserStore>,
    secrets: TokenSecretGenerator,
    policy: TokenPolicy,
}

impl AuthenticationService {
    pub fn new(
        store: Arc<dyn AuthenticationStore>,
        users: Arc<dyn UserStore>,
        policy: TokenPolicy,
    ) -> Self {
        Self {
            secrets: TokenSecretGenerator::new(policy.secret_length),
            store,
            users,
            policy,
        }
    }

    /// Verify the credential and issue a fresh access/refresh pair under
    /// the caller's identifier. The returned aggregate is the only place
    /// the raw secrets ever appear.
    pub async fn login(&self, identifier: Uuid, credential: &str) -> Result<Authentication> {
        let (user, role) = self.users.verify(identifier, credential).await?;

        let access_secret = self.secrets.generate();
        let refresh_secret = self.secrets.generate();

        let authentication = self
            .store
            .create(
                identifier,
                user,
                vec![role],
                access_secret,
                self.policy.access_ttl,
                refresh_secret,
                self.policy.refresh_ttl,
            )
            .await?;

        tracing::info!(identifier = %identifier, user = %user, "session issued");
        Ok(authentication)
    }

    /// Liveness check for a raw secret. Unrecognized type strings fail
    /// with [`AuthError::InvalidArgument`]; bad or expired secrets are a
    /// plain `false`, never an error.
    pub async fn introspect(&self, raw_secret: &str, token_type: &str) -> Result<bool> {
        let token_type: TokenType = token_type.parse()?;
        self.store.introspect(raw_secret, token_type).await
    }

    /// Exchange a refresh secret for a new pair. Access-typed secrets are
    /// refused outright, before any lookup.
    pub async fn refresh(&self, raw_secret: &str, token_type: &str) -> Result<Authentication> {
        let token_type: TokenType = token_type.parse()?;
        if token_type == TokenType::Access {
            return Err(AuthError::InvalidToken);
        }

        let authentication = self
            .store
            .rotate(raw_secret, self.policy.access_ttl, self.policy.refresh_ttl)
            .await?;

        tracing::info!(identifier = %authentication.identifier, "session rotated");
        Ok(authentication)
    }

    /// Clear the slot holding this secret; its counterpart stays live.
    pub async fn revoke(&self, raw_secret: &str, token_type: &str) -> Result<()> {
        let token_type: TokenType = token_type.parse()?;
        self.store.revoke(raw_secret, token_type).await
    }

    /// Destroy the session row entirely.
    pub async fn logout(&self, identifier: Uuid) -> Result<()> {
        self.store.delete(identifier).await?;
        tracing::info!(identifier = %identifier, "session deleted");
        Ok(())
    }

    /// Fetch the aggregate for an identifier; raw secrets are not
    /// recoverable and are absent from the result.
    pub async fn find(&self, identifier: Uuid) -> Result<Authentication> {
        self.store.find_by_identifier(identifier).await
    }
}
