//! In-process implementation of the store, used by the test suite and for
//! local development without Postgres. Semantics match the Postgres store,
//! including single-use rotation: the whole swap happens under one lock.

use crate::error::{AuthError, Result};
use crate::fingerprint::TokenFingerprinter;
use crate::secret::TokenSecretGenerator;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use memoria_models::{Ability, Authentication, Token, TokenType};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use super::AuthenticationStore;

#[derive(Debug, Clone)]
struct Slot {
    fingerprint: String,
    expires_at: DateTime<Utc>,
}

impl Slot {
    fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

#[derive(Debug, Clone)]
struct Row {
    user_id: Uuid,
    abilities: Vec<Ability>,
    access: Option<Slot>,
    refresh: Option<Slot>,
}

impl Row {
    fn slot(&self, token_type: TokenType) -> &Option<Slot> {
        match token_type {
            TokenType::Access => &self.access,
            TokenType::Refresh => &self.refresh,
        }
    }

    fn slot_mut(&mut self, token_type: TokenType) -> &mut Option<Slot> {
        match token_type {
            TokenType::Access => &mut self.access,
            TokenType::Refresh => &mut self.refresh,
        }
    }

    fn to_authentication(&self, identifier: Uuid) -> Authentication {
        Authentication {
            identifier,
            user: self.user_id,
            abilities: self.abilities.clone(),
            access_token: self
                .access
                .as_ref()
                .map(|slot| Token::stored(TokenType::Access, Some(slot.expires_at))),
            refresh_token: self
                .refresh
                .as_ref()
                .map(|slot| Token::stored(TokenType::Refresh, Some(slot.expires_at))),
        }
    }
}

pub struct MemoryAuthenticationStore {
    rows: Mutex<HashMap<Uuid, Row>>,
    fingerprinter: TokenFingerprinter,
    secrets: TokenSecretGenerator,
}

impl MemoryAuthenticationStore {
    pub fn new(fingerprinter: TokenFingerprinter, secrets: TokenSecretGenerator) -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            fingerprinter,
            secrets,
        }
    }
}

#[async_trait]
impl AuthenticationStore for MemoryAuthenticationStore {
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
        let mut rows = self.rows.lock().expect("authentication store lock poisoned");

        if rows.contains_key(&identifier) {
            return Err(AuthError::Conflict(format!(
                "Authentication already exists: {}",
                identifier
            )));
        }

        rows.insert(
            identifier,
            Row {
                user_id: user,
                abilities: abilities.clone(),
                access: Some(Slot {
                    fingerprint: self.fingerprinter.fingerprint(&access_secret),
                    expires_at: now + access_ttl,
                }),
                refresh: Some(Slot {
                    fingerprint: self.fingerprinter.fingerprint(&refresh_secret),
                    expires_at: now + refresh_ttl,
                }),
            },
        );

        Ok(Authentication {
            identifier,
            user,
            abilities,
            access_token: Some(Token::issued(TokenType::Access, access_secret, now + access_ttl)),
            refresh_token: Some(Token::issued(
                TokenType::Refresh,
                refresh_secret,
                now + refresh_ttl,
            )),
        })
    }

    async fn find_by_identifier(&self, identifier: Uuid) -> Result<Authentication> {
        let rows = self.rows.lock().expect("authentication store lock poisoned");
        rows.get(&identifier)
            .map(|row| row.to_authentication(identifier))
            .ok_or_else(|| AuthError::NotFound(format!("Authentication not found: {}", identifier)))
    }

    async fn introspect(&self, raw_secret: &str, token_type: TokenType) -> Result<bool> {
        let fingerprint = self.fingerprinter.fingerprint(raw_secret);
        let now = Utc::now();

        let rows = self.rows.lock().expect("authentication store lock poisoned");
        Ok(rows.values().any(|row| {
            row.slot(token_type)
                .as_ref()
                .is_some_and(|slot| slot.fingerprint == fingerprint && slot.is_active(now))
        }))
    }

    async fn rotate(
        &self,
        raw_refresh_secret: &str,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Result<Authentication> {
        let current = self.fingerprinter.fingerprint(raw_refresh_secret);
        let now = Utc::now();

        let mut rows = self.rows.lock().expect("authentication store lock poisoned");
        let (identifier, row) = rows
            .iter_mut()
            .find(|(_, row)| {
                row.refresh
                    .as_ref()
                    .is_some_and(|slot| slot.fingerprint == current && slot.is_active(now))
            })
            .ok_or(AuthError::InvalidToken)?;

        let access_secret = self.secrets.generate();
        let refresh_secret = self.secrets.generate();

        row.access = Some(Slot {
            fingerprint: self.fingerprinter.fingerprint(&access_secret),
            expires_at: now + access_ttl,
        });
        row.refresh = Some(Slot {
            fingerprint: self.fingerprinter.fingerprint(&refresh_secret),
            expires_at: now + refresh_ttl,
        });

        Ok(Authentication {
            identifier: *identifier,
            user: row.user_id,
            abilities: row.abilities.clone(),
            access_token: Some(Token::issued(TokenType::Access, access_secret, now + access_ttl)),
            refresh_token: Some(Token::issued(
                TokenType::Refresh,
                refresh_secret,
                now + refresh_ttl,
            )),
        })
    }

    async fn revoke(&self, raw_secret: &str, token_type: TokenType) -> Result<()> {
        let fingerprint = self.fingerprinter.fingerprint(raw_secret);

        let mut rows = self.rows.lock().expect("authentication store lock poisoned");
        let row = rows
            .values_mut()
            .find(|row| {
                row.slot(token_type)
                    .as_ref()
                    .is_some_and(|slot| slot.fingerprint == fingerprint)
            })
            .ok_or(AuthError::InvalidToken)?;

        *row.slot_mut(token_type) = None;
        Ok(())
    }

    async fn delete(&self, identifier: Uuid) -> Result<()> {
        let mut rows = self.rows.lock().expect("authentication store lock poisoned");
        rows.remove(&identifier)
            .map(|_| ())
            .ok_or_else(|| AuthError::NotFound(format!("Authentication not found: {}", identifier)))
    }
}
