//! Secret visibility tiers.

use crate::error::VaultError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Public,
    Private,
    Secret,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Public => "public",
            Scope::Private => "private",
            Scope::Secret => "secret",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Scope::Public),
            "private" => Ok(Scope::Private),
            "secret" => Ok(Scope::Secret),
            other => Err(VaultError::UnknownScope(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scope() {
        assert_eq!("private".parse::<Scope>().unwrap(), Scope::Private);
        assert_eq!(Scope::Public.to_string(), "public");
        assert!(matches!(
            "internal".parse::<Scope>(),
            Err(VaultError::UnknownScope(_))
        ));
    }
}
