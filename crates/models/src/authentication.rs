use crate::ability::Ability;
use crate::token::{Token, TokenType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Aggregate root for one issued session. Raw token values are present
/// only when the aggregate comes off an issuance path (login, refresh);
/// reads from storage carry the token slots without values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Authentication {
    pub identifier: Uuid,
    pub user: Uuid,
    pub abilities: Vec<Ability>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<Token>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<Token>,
}

/// Persisted shape of an authentication row. Token secrets are stored as
/// fingerprints only; a NULL fingerprint means that slot is revoked or was
/// never issued, and its paired expiry is NULL with it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuthenticationRecord {
    pub identifier: Uuid,
    pub user_id: Uuid,

    pub access_token_hash: Option<String>,
    pub access_expires_at: Option<DateTime<Utc>>,

    pub refresh_token_hash: Option<String>,
    pub refresh_expires_at: Option<DateTime<Utc>>,

    #[sqlx(json)]
    pub abilities: Vec<Ability>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAuthentication {
    pub identifier: Uuid,
    pub user_id: Uuid,
    pub abilities: Vec<Ability>,

    pub access_token_hash: Option<String>,
    pub access_expires_at: Option<DateTime<Utc>>,

    pub refresh_token_hash: Option<String>,
    pub refresh_expires_at: Option<DateTime<Utc>>,
}

impl AuthenticationRecord {
    /// Aggregate view without raw secrets (not recoverable from storage).
    pub fn into_authentication(self) -> Authentication {
        let access_token = self
            .access_token_hash
            .as_ref()
            .map(|_| Token::stored(TokenType::Access, self.access_expires_at));
        let refresh_token = self
            .refresh_token_hash
            .as_ref()
            .map(|_| Token::stored(TokenType::Refresh, self.refresh_expires_at));

        Authentication {
            identifier: self.identifier,
            user: self.user_id,
            abilities: self.abilities,
            access_token,
            refresh_token,
        }
    }

    /// Aggregate view carrying the one-time raw secrets. Only issuance
    /// paths may call this; the expiries must already be set on the row.
    pub fn into_issued(self, access_value: String, refresh_value: String) -> Authentication {
        let access_token = self
            .access_expires_at
            .map(|expires_at| Token::issued(TokenType::Access, access_value, expires_at));
        let refresh_token = self
            .refresh_expires_at
            .map(|expires_at| Token::issued(TokenType::Refresh, refresh_value, expires_at));

        Authentication {
            identifier: self.identifier,
            user: self.user_id,
            abilities: self.abilities,
            access_token,
            refresh_token,
        }
    }
}
