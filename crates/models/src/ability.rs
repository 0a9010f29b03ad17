use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Roles grantable to an issued session. A closed enum so unknown role
/// names are unrepresentable in an authentication row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Ability {
    Admin,
    Manager,
    Member,
}

impl Ability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Ability::Admin => "ADMIN",
            Ability::Manager => "MANAGER",
            Ability::Member => "MEMBER",
        }
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized role: {0}")]
pub struct ParseAbilityError(pub String);

impl FromStr for Ability {
    type Err = ParseAbilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Ability::Admin),
            "MANAGER" => Ok(Ability::Manager),
            "MEMBER" => Ok(Ability::Member),
            _ => Err(ParseAbilityError(s.to_string())),
        }
    }
}
