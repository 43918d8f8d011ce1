//! Access token record and its refresh-token chain references.

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use super::user_data::UserData;
use super::{non_empty, truncate_to_micros};

/// An issued access token with an optional refresh token.
///
/// `authorize_code` and `previous_access_token` are plain reference strings.
/// The previous-token chain is a history of refresh rotations and is never
/// traversed to decide whether this token is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    /// Access token (primary key).
    pub access_token: String,

    /// Id of the client the token was issued to.
    pub client_id: String,

    /// Refresh token; unique across the store when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Lifetime in seconds, relative to `created_at`.
    pub expires_in: i32,

    /// Granted scope.
    #[serde(default)]
    pub scope: String,

    /// Redirect URI from the originating request.
    #[serde(default)]
    pub redirect_uri: String,

    /// When the token was issued.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// Opaque application-defined data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_data: Option<UserData>,

    /// Authorization code this token was exchanged from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorize_code: Option<String>,

    /// Access token this one was rotated from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_access_token: Option<String>,
}

impl Token {
    /// Instant after which the token should be rejected.
    #[must_use]
    pub fn expires_at(&self) -> OffsetDateTime {
        self.created_at + Duration::seconds(i64::from(self.expires_in))
    }

    /// Returns `true` if the token is expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        now > self.expires_at()
    }

    /// Returns `true` if the token was issued by a refresh rotation.
    #[must_use]
    pub fn is_rotation(&self) -> bool {
        self.previous_access_token.is_some()
    }

    /// Returns the token as a backend persists it: `created_at` at microsecond
    /// precision and empty optional values as `None`.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            refresh_token: self.refresh_token.and_then(non_empty),
            created_at: truncate_to_micros(self.created_at),
            user_data: UserData::normalize(self.user_data),
            authorize_code: self.authorize_code.and_then(non_empty),
            previous_access_token: self.previous_access_token.and_then(non_empty),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_expiry_is_computed_from_created_at() {
        let token = Token {
            access_token: "tok1".into(),
            client_id: "c1".into(),
            refresh_token: Some("ref1".into()),
            expires_in: 3600,
            scope: "read".into(),
            redirect_uri: String::new(),
            created_at: datetime!(2024-01-01 12:00:00 UTC),
            user_data: None,
            authorize_code: Some("abc".into()),
            previous_access_token: None,
        };

        assert_eq!(token.expires_at(), datetime!(2024-01-01 13:00:00 UTC));
        assert!(!token.is_expired_at(datetime!(2024-01-01 12:59:59 UTC)));
        assert!(token.is_expired_at(datetime!(2024-01-01 13:00:01 UTC)));
        assert!(!token.is_rotation());
    }

    #[test]
    fn test_normalized_clears_empty_references() {
        let token = Token {
            access_token: "tok1".into(),
            client_id: "c1".into(),
            refresh_token: Some(String::new()),
            expires_in: 60,
            scope: String::new(),
            redirect_uri: String::new(),
            created_at: datetime!(2024-01-01 12:00:00.123456789 UTC),
            user_data: Some(UserData::from_raw("")),
            authorize_code: Some(String::new()),
            previous_access_token: Some("tok0".into()),
        }
        .normalized();

        assert_eq!(token.refresh_token, None);
        assert_eq!(token.user_data, None);
        assert_eq!(token.authorize_code, None);
        assert_eq!(token.previous_access_token.as_deref(), Some("tok0"));
        assert_eq!(token.created_at, datetime!(2024-01-01 12:00:00.123456 UTC));
    }

    #[test]
    fn test_serialization_omits_empty_references() {
        let token = Token {
            access_token: "tok1".into(),
            client_id: "c1".into(),
            refresh_token: None,
            expires_in: 60,
            scope: String::new(),
            redirect_uri: String::new(),
            created_at: datetime!(2024-01-01 12:00:00 UTC),
            user_data: None,
            authorize_code: None,
            previous_access_token: None,
        };

        let json = serde_json::to_value(&token).unwrap();
        assert!(json.get("refreshToken").is_none());
        assert!(json.get("previousAccessToken").is_none());
        assert_eq!(json["createdAt"], "2024-01-01T12:00:00Z");
    }
}
