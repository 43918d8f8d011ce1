//! Engine-facing views of grants and tokens.
//!
//! A protocol engine works with records that carry the resolved [`Client`]
//! and, for tokens, the live originating grant and predecessor token. The
//! leaf stores only ever see the flattened [`Grant`] and [`Token`] shapes,
//! which hold the referenced keys as plain strings.

use time::OffsetDateTime;

use super::client::Client;
use super::grant::Grant;
use super::truncate_to_micros;
use super::token::Token;
use super::user_data::UserData;

/// An authorization grant together with its resolved client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizeData {
    pub client: Client,
    pub code: String,
    pub expires_in: i32,
    pub scope: String,
    pub redirect_uri: String,
    pub state: String,
    pub created_at: OffsetDateTime,
    pub user_data: Option<UserData>,
    pub code_challenge: Option<String>,
    pub code_challenge_method: Option<String>,
}

impl AuthorizeData {
    /// Creates grant data with empty scope, state, and redirect URI.
    ///
    /// `created_at` is kept at microsecond precision, the resolution the
    /// store persists.
    #[must_use]
    pub fn new(
        client: Client,
        code: impl Into<String>,
        expires_in: i32,
        created_at: OffsetDateTime,
    ) -> Self {
        Self {
            client,
            code: code.into(),
            expires_in,
            scope: String::new(),
            redirect_uri: String::new(),
            state: String::new(),
            created_at: truncate_to_micros(created_at),
            user_data: None,
            code_challenge: None,
            code_challenge_method: None,
        }
    }

    /// Flattens into the stored grant record, keeping only the client id.
    ///
    /// The result is [normalized](Grant::normalized), so empty PKCE strings
    /// are treated as absent.
    #[must_use]
    pub fn to_grant(&self) -> Grant {
        Grant {
            code: self.code.clone(),
            client_id: self.client.id.clone(),
            expires_in: self.expires_in,
            scope: self.scope.clone(),
            redirect_uri: self.redirect_uri.clone(),
            state: self.state.clone(),
            created_at: self.created_at,
            user_data: self.user_data.clone(),
            code_challenge: self.code_challenge.clone(),
            code_challenge_method: self.code_challenge_method.clone(),
        }
        .normalized()
    }

    /// Rebuilds the engine view from a stored grant and its resolved client.
    #[must_use]
    pub fn from_grant(grant: Grant, client: Client) -> Self {
        Self {
            client,
            code: grant.code,
            expires_in: grant.expires_in,
            scope: grant.scope,
            redirect_uri: grant.redirect_uri,
            state: grant.state,
            created_at: grant.created_at,
            user_data: grant.user_data,
            code_challenge: grant.code_challenge,
            code_challenge_method: grant.code_challenge_method,
        }
    }
}

/// An access token as the protocol engine sees it.
///
/// `authorize_data` is the grant the token was exchanged from and
/// `access_data` is the token it was refreshed from. Both are flattened to
/// their keys when the token is saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessData {
    pub client: Client,
    pub authorize_data: Option<Box<AuthorizeData>>,
    pub access_data: Option<Box<AccessData>>,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: i32,
    pub scope: String,
    pub redirect_uri: String,
    pub created_at: OffsetDateTime,
    pub user_data: Option<UserData>,
}

impl AccessData {
    /// Creates a first-issuance token without a grant, predecessor or refresh token.
    ///
    /// `created_at` is kept at microsecond precision.
    #[must_use]
    pub fn new(
        client: Client,
        access_token: impl Into<String>,
        expires_in: i32,
        created_at: OffsetDateTime,
    ) -> Self {
        Self {
            client,
            authorize_data: None,
            access_data: None,
            access_token: access_token.into(),
            refresh_token: None,
            expires_in,
            scope: String::new(),
            redirect_uri: String::new(),
            created_at: truncate_to_micros(created_at),
            user_data: None,
        }
    }

    /// Sets the refresh token.
    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// Records the grant this token was exchanged from.
    #[must_use]
    pub fn with_authorize_data(mut self, authorize_data: AuthorizeData) -> Self {
        self.authorize_data = Some(Box::new(authorize_data));
        self
    }

    /// Records the token this one was refreshed from.
    #[must_use]
    pub fn with_previous(mut self, previous: AccessData) -> Self {
        self.access_data = Some(Box::new(previous));
        self
    }

    /// Flattens into the stored token record.
    ///
    /// The originating grant is reduced to its code and the predecessor to its
    /// access token. The result is [normalized](Token::normalized).
    #[must_use]
    pub fn to_token(&self) -> Token {
        Token {
            access_token: self.access_token.clone(),
            client_id: self.client.id.clone(),
            refresh_token: self.refresh_token.clone(),
            expires_in: self.expires_in,
            scope: self.scope.clone(),
            redirect_uri: self.redirect_uri.clone(),
            created_at: self.created_at,
            user_data: self.user_data.clone(),
            authorize_code: self
                .authorize_data
                .as_ref()
                .map(|a| a.code.clone()),
            previous_access_token: self
                .access_data
                .as_ref()
                .map(|a| a.access_token.clone()),
        }
        .normalized()
    }
}

/// A token loaded through the facade with its references resolved.
///
/// The client is always present. The originating grant is best-effort: it is
/// usually consumed right after the exchange, so `authorize_data` is `None`
/// in the common case. The predecessor token is only available by key in
/// `token.previous_access_token`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedToken {
    pub token: Token,
    pub client: Client,
    pub authorize_data: Option<AuthorizeData>,
}

impl ResolvedToken {
    /// Rebuilds the engine view of this token.
    ///
    /// The result can be passed as the predecessor of a refreshed token so the
    /// new token records this one's access token.
    #[must_use]
    pub fn into_access_data(self) -> AccessData {
        let Self {
            token,
            client,
            authorize_data,
        } = self;

        AccessData {
            client,
            authorize_data: authorize_data.map(Box::new),
            access_data: None,
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_in: token.expires_in,
            scope: token.scope,
            redirect_uri: token.redirect_uri,
            created_at: token.created_at,
            user_data: token.user_data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn client() -> Client {
        Client::new("c1", "s1", "http://x/cb")
    }

    #[test]
    fn test_to_grant_keeps_client_id_only() {
        let mut data = AuthorizeData::new(client(), "abc", 600, datetime!(2024-01-01 00:00:00 UTC));
        data.state = "xyz".into();
        data.code_challenge = Some(String::new());

        let grant = data.to_grant();
        assert_eq!(grant.client_id, "c1");
        assert_eq!(grant.state, "xyz");
        assert_eq!(grant.code_challenge, None);

        let back = AuthorizeData::from_grant(grant, client());
        assert_eq!(back, AuthorizeData {
            code_challenge: None,
            ..data
        });
    }

    #[test]
    fn test_to_token_flattens_references() {
        let created = datetime!(2024-01-01 00:00:00 UTC);
        let grant = AuthorizeData::new(client(), "abc", 600, created);
        let first = AccessData::new(client(), "tok1", 3600, created)
            .with_refresh_token("ref1")
            .with_authorize_data(grant);

        let token = first.to_token();
        assert_eq!(token.authorize_code.as_deref(), Some("abc"));
        assert_eq!(token.previous_access_token, None);
        assert_eq!(token.refresh_token.as_deref(), Some("ref1"));

        let second = AccessData::new(client(), "tok2", 3600, created).with_previous(first);
        let token = second.to_token();
        assert_eq!(token.previous_access_token.as_deref(), Some("tok1"));
        assert_eq!(token.authorize_code, None);
    }

    #[test]
    fn test_empty_refresh_token_is_absent() {
        let data = AccessData::new(client(), "tok1", 60, datetime!(2024-01-01 00:00:00 UTC))
            .with_refresh_token("");
        assert_eq!(data.to_token().refresh_token, None);
    }

    #[test]
    fn test_created_at_is_kept_at_microseconds() {
        let created = datetime!(2024-01-01 12:00:00.123456789 UTC);
        let expected = datetime!(2024-01-01 12:00:00.123456 UTC);

        let grant = AuthorizeData::new(client(), "abc", 600, created);
        assert_eq!(grant.created_at, expected);

        let mut access = AccessData::new(client(), "tok1", 3600, created);
        assert_eq!(access.created_at, expected);

        // Direct field assignment is normalized on flattening
        access.created_at = created;
        assert_eq!(access.to_token().created_at, expected);
    }

    #[test]
    fn test_into_access_data_can_seed_rotation() {
        let created = datetime!(2024-01-01 00:00:00 UTC);
        let token = AccessData::new(client(), "tok1", 3600, created)
            .with_refresh_token("ref1")
            .to_token();
        let resolved = ResolvedToken {
            token,
            client: client(),
            authorize_data: None,
        };

        let previous = resolved.into_access_data();
        assert_eq!(previous.access_token, "tok1");

        let next = AccessData::new(client(), "tok2", 3600, created).with_previous(previous);
        assert_eq!(next.to_token().previous_access_token.as_deref(), Some("tok1"));
    }
}
