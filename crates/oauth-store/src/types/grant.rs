//! Authorization grant (authorization code) record.

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use super::user_data::UserData;
use super::{non_empty, truncate_to_micros};

/// A single-use authorization code issued after an approved authorization
/// request.
///
/// The store does not enforce expiry. [`Grant::is_expired_at`] is provided
/// for the protocol engine, which decides what to do with expired codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grant {
    /// Authorization code (primary key).
    pub code: String,

    /// Id of the client the code was issued to.
    pub client_id: String,

    /// Lifetime in seconds, relative to `created_at`.
    pub expires_in: i32,

    /// Requested scope.
    #[serde(default)]
    pub scope: String,

    /// Redirect URI from the authorization request.
    #[serde(default)]
    pub redirect_uri: String,

    /// State parameter echoed from the authorization request.
    #[serde(default)]
    pub state: String,

    /// When the code was issued.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// Opaque application-defined data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_data: Option<UserData>,

    /// PKCE code challenge (RFC 7636).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_challenge: Option<String>,

    /// PKCE code challenge method, `plain` or `S256`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_challenge_method: Option<String>,
}

impl Grant {
    /// Instant after which the code should no longer be redeemed.
    #[must_use]
    pub fn expires_at(&self) -> OffsetDateTime {
        self.created_at + Duration::seconds(i64::from(self.expires_in))
    }

    /// Returns `true` if the code is expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        now > self.expires_at()
    }

    /// Returns `true` if the grant carries any PKCE parameters.
    #[must_use]
    pub fn has_pkce(&self) -> bool {
        self.code_challenge.is_some() || self.code_challenge_method.is_some()
    }

    /// Returns the grant as a backend persists it: `created_at` at microsecond
    /// precision and empty optional values as `None`.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            created_at: truncate_to_micros(self.created_at),
            user_data: UserData::normalize(self.user_data),
            code_challenge: self.code_challenge.and_then(non_empty),
            code_challenge_method: self.code_challenge_method.and_then(non_empty),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn grant(expires_in: i32) -> Grant {
        Grant {
            code: "abc".into(),
            client_id: "c1".into(),
            expires_in,
            scope: String::new(),
            redirect_uri: String::new(),
            state: String::new(),
            created_at: datetime!(2024-01-01 00:00:00 UTC),
            user_data: None,
            code_challenge: None,
            code_challenge_method: None,
        }
    }

    #[test]
    fn test_expires_at() {
        let grant = grant(60);
        assert_eq!(grant.expires_at(), datetime!(2024-01-01 00:01:00 UTC));
    }

    #[test]
    fn test_is_expired_at() {
        let grant = grant(60);
        assert!(!grant.is_expired_at(datetime!(2024-01-01 00:00:30 UTC)));
        assert!(!grant.is_expired_at(datetime!(2024-01-01 00:01:00 UTC)));
        assert!(grant.is_expired_at(datetime!(2024-01-01 00:01:01 UTC)));
    }

    #[test]
    fn test_normalized_matches_persisted_form() {
        let mut raw = grant(60);
        raw.created_at = datetime!(2024-01-01 00:00:00.000001999 UTC);
        raw.user_data = Some(UserData::from_raw(""));
        raw.code_challenge = Some(String::new());

        let grant = raw.normalized();
        assert_eq!(grant.created_at, datetime!(2024-01-01 00:00:00.000001 UTC));
        assert_eq!(grant.user_data, None);
        assert!(!grant.has_pkce());
    }

    #[test]
    fn test_has_pkce() {
        let mut grant = grant(60);
        assert!(!grant.has_pkce());

        grant.code_challenge = Some("E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM".into());
        grant.code_challenge_method = Some("S256".into());
        assert!(grant.has_pkce());
    }
}
