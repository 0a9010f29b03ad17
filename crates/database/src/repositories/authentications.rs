use crate::error::{is_unique_violation, DatabaseError, Result};
use chrono::{DateTime, Utc};
use memoria_models::{AuthenticationRecord, NewAuthentication, TokenType};
use sqlx::PgPool;
use uuid::Uuid;

/// Row-level access to the `authentications` table. Methods take token
/// fingerprints, never raw secrets; fingerprinting happens a layer up.
pub struct AuthenticationRepository {
    pool: PgPool,
}

impl AuthenticationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist a freshly issued authentication row.
    pub async fn insert(&self, new: &NewAuthentication) -> Result<AuthenticationRecord> {
        let record = sqlx::query_as::<_, AuthenticationRecord>(
            r#"
            INSERT INTO authentications (
                identifier, user_id, abilities,
                access_token_hash, access_expires_at,
                refresh_token_hash, refresh_expires_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(new.identifier)
        .bind(new.user_id)
        .bind(sqlx::types::Json(&new.abilities))
        .bind(&new.access_token_hash)
        .bind(new.access_expires_at)
        .bind(&new.refresh_token_hash)
        .bind(new.refresh_expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DatabaseError::conflict("Authentication", &new.identifier.to_string())
            } else {
                DatabaseError::from(e)
            }
        })?;

        Ok(record)
    }

    /// Fetch an authentication row by its identifier.
    pub async fn find_by_identifier(&self, identifier: Uuid) -> Result<AuthenticationRecord> {
        let record = sqlx::query_as::<_, AuthenticationRecord>(
            "SELECT * FROM authentications WHERE identifier = $1",
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Authentication", &identifier.to_string()))?;

        Ok(record)
    }

    /// Whether any row holds this fingerprint in the given slot with an
    /// expiry still in the future.
    pub async fn slot_is_active(&self, token_type: TokenType, fingerprint: &str) -> Result<bool> {
        let query = match token_type {
            TokenType::Access => {
                r#"
                SELECT EXISTS(
                    SELECT 1 FROM authentications
                    WHERE access_token_hash = $1 AND access_expires_at > NOW()
                )
                "#
            }
            TokenType::Refresh => {
                r#"
                SELECT EXISTS(
                    SELECT 1 FROM authentications
                    WHERE refresh_token_hash = $1 AND refresh_expires_at > NOW()
                )
                "#
            }
        };

        let active: bool = sqlx::query_scalar(query)
            .bind(fingerprint)
            .fetch_one(&self.pool)
            .await?;

        Ok(active)
    }

    /// Swap both token slots in a single conditional write. The update
    /// applies only while the refresh fingerprint column still equals the
    /// matched value and its expiry is in the future, so two requests
    /// racing on the same refresh secret produce exactly one winner.
    /// Returns `None` when no row qualifies (already rotated, expired, or
    /// never issued).
    pub async fn rotate(
        &self,
        current_refresh_fingerprint: &str,
        access_token_hash: &str,
        access_expires_at: DateTime<Utc>,
        refresh_token_hash: &str,
        refresh_expires_at: DateTime<Utc>,
    ) -> Result<Option<AuthenticationRecord>> {
        let record = sqlx::query_as::<_, AuthenticationRecord>(
            r#"
            UPDATE authentications
            SET access_token_hash = $2,
                access_expires_at = $3,
                refresh_token_hash = $4,
                refresh_expires_at = $5,
                updated_at = NOW()
            WHERE refresh_token_hash = $1 AND refresh_expires_at > NOW()
            RETURNING *
            "#,
        )
        .bind(current_refresh_fingerprint)
        .bind(access_token_hash)
        .bind(access_expires_at)
        .bind(refresh_token_hash)
        .bind(refresh_expires_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Null out one token slot (fingerprint and paired expiry). Returns
    /// whether a row matched the fingerprint.
    pub async fn clear_slot(&self, token_type: TokenType, fingerprint: &str) -> Result<bool> {
        let query = match token_type {
            TokenType::Access => {
                r#"
                UPDATE authentications
                SET access_token_hash = NULL, access_expires_at = NULL, updated_at = NOW()
                WHERE access_token_hash = $1
                "#
            }
            TokenType::Refresh => {
                r#"
                UPDATE authentications
                SET refresh_token_hash = NULL, refresh_expires_at = NULL, updated_at = NOW()
                WHERE refresh_token_hash = $1
                "#
            }
        };

        let result = sqlx::query(query).bind(fingerprint).execute(&self.pool).await?;

        Ok(result.rows_affected() > 0)
    }

    /// Hard-delete an authentication row (logout).
    pub async fn delete(&self, identifier: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM authentications WHERE identifier = $1")
            .bind(identifier)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Authentication", &identifier.to_string()));
        }

        Ok(())
    }
}
