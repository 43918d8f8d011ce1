//! OAuth 2.0 client registration record.

use serde::{Deserialize, Serialize};

use super::user_data::UserData;

/// A registered OAuth 2.0 client.
///
/// Grants and tokens store a copy of `id`, never a live reference to this
/// record. Resolving that id always performs a fresh lookup.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// Unique client identifier (primary key).
    pub id: String,

    /// Shared secret for confidential clients. Empty for public clients.
    #[serde(default)]
    pub secret: String,

    /// Registered callback URI.
    #[serde(default)]
    pub redirect_uri: String,

    /// Opaque application-defined data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_data: Option<UserData>,
}

impl Client {
    /// Creates a client without user data.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            secret: secret.into(),
            redirect_uri: redirect_uri.into(),
            user_data: None,
        }
    }

    /// Attaches opaque user data.
    #[must_use]
    pub fn with_user_data(mut self, user_data: UserData) -> Self {
        self.user_data = Some(user_data);
        self
    }

    /// Returns `true` if the client holds a shared secret.
    #[must_use]
    pub fn is_confidential(&self) -> bool {
        !self.secret.is_empty()
    }

    /// Returns the client with empty user data treated as absent.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            user_data: UserData::normalize(self.user_data),
            ..self
        }
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("id", &self.id)
            .field("secret", &if self.secret.is_empty() { "" } else { "***" })
            .field("redirect_uri", &self.redirect_uri)
            .field("user_data", &self.user_data)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secret() {
        let client = Client::new("c1", "s1", "http://x/cb");
        let debug = format!("{client:?}");
        assert!(debug.contains("c1"));
        assert!(!debug.contains("s1"));
    }

    #[test]
    fn test_is_confidential() {
        assert!(Client::new("c1", "s1", "http://x/cb").is_confidential());
        assert!(!Client::new("c2", "", "http://x/cb").is_confidential());
    }

    #[test]
    fn test_serialization_skips_absent_user_data() {
        let client = Client::new("c1", "s1", "http://x/cb");
        let json = serde_json::to_value(&client).unwrap();
        assert_eq!(json["redirectUri"], "http://x/cb");
        assert!(json.get("userData").is_none());

        let back: Client = serde_json::from_value(json).unwrap();
        assert_eq!(back, client);
    }
}
