//! Access tokens.
//!
//! A token decides which root fields a schema build exposes. Tokens are
//! validated upstream (for example by HTTP middleware); this module only
//! answers "may this token query that category".

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Query scopes understood by the schema assembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Scope {
    #[serde(rename = "query:entries")]
    Entries,
    #[serde(rename = "query:assets")]
    Assets,
    #[serde(rename = "query:categories")]
    Categories,
    #[serde(rename = "query:tags")]
    Tags,
    #[serde(rename = "query:globals")]
    Globals,
    #[serde(rename = "query:sections")]
    Sections,
}

impl Scope {
    pub const ALL: [Scope; 6] = [
        Scope::Entries,
        Scope::Assets,
        Scope::Categories,
        Scope::Tags,
        Scope::Globals,
        Scope::Sections,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Entries => "query:entries",
            Self::Assets => "query:assets",
            Self::Categories => "query:categories",
            Self::Tags => "query:tags",
            Self::Globals => "query:globals",
            Self::Sections => "query:sections",
        }
    }

    /// Parses a scope string such as `query:entries`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|scope| scope.as_str() == value)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The scopes granted to a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scopes {
    All,
    Only(BTreeSet<Scope>),
}

/// An already validated access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub id: String,
    pub scopes: Scopes,
}

impl AccessToken {
    /// Full access token used when no token was supplied.
    #[must_use]
    pub fn public() -> Self {
        Self {
            id: "public".to_string(),
            scopes: Scopes::All,
        }
    }

    /// Creates a token restricted to the given scopes.
    #[must_use]
    pub fn with_scopes(id: impl Into<String>, scopes: impl IntoIterator<Item = Scope>) -> Self {
        Self {
            id: id.into(),
            scopes: Scopes::Only(scopes.into_iter().collect()),
        }
    }

    /// Whether the token grants `scope`.
    #[must_use]
    pub fn can(&self, scope: Scope) -> bool {
        match &self.scopes {
            Scopes::All => true,
            Scopes::Only(granted) => granted.contains(&scope),
        }
    }
}

impl Default for AccessToken {
    fn default() -> Self {
        Self::public()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_token_can_everything() {
        let token = AccessToken::public();
        assert!(Scope::ALL.iter().all(|scope| token.can(*scope)));
    }

    #[test]
    fn test_scoped_token() {
        let token = AccessToken::with_scopes("reader", [Scope::Entries, Scope::Tags]);
        assert!(token.can(Scope::Entries));
        assert!(token.can(Scope::Tags));
        assert!(!token.can(Scope::Assets));
    }

    #[test]
    fn test_scope_parse() {
        assert_eq!(Scope::parse("query:globals"), Some(Scope::Globals));
        assert_eq!(Scope::parse("mutate:entries"), None);
        assert_eq!(Scope::Sections.to_string(), "query:sections");
    }
}
