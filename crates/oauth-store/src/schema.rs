//! Logical schema settings shared by every backend.
//!
//! Table names and the grant profile are resolved once when a backend is
//! built and never change afterwards.

use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::types::Grant;

/// Default name of the client table.
pub const DEFAULT_CLIENTS_TABLE: &str = "oauth_client";
/// Default name of the authorization grant table.
pub const DEFAULT_GRANTS_TABLE: &str = "oauth_authorize";
/// Default name of the access token table.
pub const DEFAULT_TOKENS_TABLE: &str = "oauth_access";

/// Plain, unquoted SQL identifier.
static IDENTIFIER_REGEX: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,62}$").expect("Invalid identifier regex")
});

/// Returns `true` if `name` can be used as a table name without quoting.
#[must_use]
pub fn is_valid_identifier(name: &str) -> bool {
    IDENTIFIER_REGEX.is_match(name)
}

/// Resolved names of the three logical tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    clients: String,
    grants: String,
    tokens: String,
}

impl TableNames {
    /// Builds table names, validating each as a plain SQL identifier.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if any name is not a valid identifier.
    pub fn new(
        clients: impl Into<String>,
        grants: impl Into<String>,
        tokens: impl Into<String>,
    ) -> StoreResult<Self> {
        let names = Self {
            clients: clients.into(),
            grants: grants.into(),
            tokens: tokens.into(),
        };
        for name in [&names.clients, &names.grants, &names.tokens] {
            if !is_valid_identifier(name) {
                return Err(StoreError::invalid_input(format!(
                    "'{name}' is not a valid table name"
                )));
            }
        }
        if names.clients == names.grants
            || names.clients == names.tokens
            || names.grants == names.tokens
        {
            return Err(StoreError::invalid_input(
                "clients, grants and tokens must use distinct tables",
            ));
        }
        Ok(names)
    }

    /// Default names with `prefix` prepended to each.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the prefixed names are not valid identifiers.
    pub fn with_prefix(prefix: &str) -> StoreResult<Self> {
        Self::new(
            format!("{prefix}{DEFAULT_CLIENTS_TABLE}"),
            format!("{prefix}{DEFAULT_GRANTS_TABLE}"),
            format!("{prefix}{DEFAULT_TOKENS_TABLE}"),
        )
    }

    #[must_use]
    pub fn clients(&self) -> &str {
        &self.clients
    }

    #[must_use]
    pub fn grants(&self) -> &str {
        &self.grants
    }

    #[must_use]
    pub fn tokens(&self) -> &str {
        &self.tokens
    }
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            clients: DEFAULT_CLIENTS_TABLE.to_string(),
            grants: DEFAULT_GRANTS_TABLE.to_string(),
            tokens: DEFAULT_TOKENS_TABLE.to_string(),
        }
    }
}

/// Which grant columns a backend persists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrantProfile {
    /// Code, client, scope, redirect URI, state, timestamps and user data.
    Basic,
    /// Basic columns plus `code_challenge` and `code_challenge_method`.
    #[default]
    Pkce,
}

impl GrantProfile {
    /// Returns `true` if PKCE columns are persisted.
    #[must_use]
    pub fn stores_pkce(self) -> bool {
        matches!(self, Self::Pkce)
    }

    /// Checks that `grant` fits this profile.
    ///
    /// A basic profile has nowhere to put PKCE parameters, so a grant that
    /// carries them is rejected rather than silently truncated.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the grant carries PKCE parameters under the
    /// basic profile.
    pub fn check(self, grant: &Grant) -> StoreResult<()> {
        if !self.stores_pkce() && grant.has_pkce() {
            return Err(StoreError::invalid_input(
                "grant carries PKCE parameters but the store uses the basic grant profile",
            ));
        }
        Ok(())
    }
}

impl fmt::Display for GrantProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic => write!(f, "basic"),
            Self::Pkce => write!(f, "pkce"),
        }
    }
}
