use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The two token slots an authentication row carries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "ACCESS",
            TokenType::Refresh => "REFRESH",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized token type: {0}")]
pub struct ParseTokenTypeError(pub String);

impl FromStr for TokenType {
    type Err = ParseTokenTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ACCESS" => Ok(TokenType::Access),
            "REFRESH" => Ok(TokenType::Refresh),
            _ => Err(ParseTokenTypeError(s.to_string())),
        }
    }
}

/// One issued token. `value` carries the raw secret and exists only in
/// memory on issuance paths; aggregates read back from storage have
/// `value: None` because secrets are not recoverable from their
/// fingerprints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Token {
    #[serde(rename = "type")]
    pub token_type: TokenType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Token {
    /// A token as returned from an issuance path (login, refresh).
    pub fn issued(token_type: TokenType, value: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            token_type,
            value: Some(value),
            expires_at: Some(expires_at),
        }
    }

    /// A token slot as read back from storage.
    pub fn stored(token_type: TokenType, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            token_type,
            value: None,
            expires_at,
        }
    }
}
