//! Opaque application-defined user data.
//!
//! The store never interprets user data. Callers hand in any serializable
//! value, the store keeps its JSON text, and loads return that text
//! unmodified. Decoding back into a structured type is the caller's job.
//!
//! Absent data is persisted as an empty column and loads back as `None`,
//! never as an empty structured value.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::StoreResult;

/// Encoded, opaque user data as persisted by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserData(String);

impl UserData {
    /// Encodes a serializable value into its stored representation.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the value cannot be encoded as JSON.
    pub fn encode<T: Serialize + ?Sized>(value: &T) -> StoreResult<Self> {
        Ok(Self(serde_json::to_string(value)?))
    }

    /// Encodes an optional value. `None` stays `None`.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the value cannot be encoded as JSON.
    pub fn encode_optional<T: Serialize>(value: Option<&T>) -> StoreResult<Option<Self>> {
        value.map(Self::encode).transpose()
    }

    /// Wraps an already-encoded string without touching it.
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Decodes the stored text into a structured value.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the text is not valid JSON for `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> StoreResult<T> {
        Ok(serde_json::from_str(&self.0)?)
    }

    /// Returns the stored text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the stored text, consuming the wrapper.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Column value for optional user data. Absent data becomes an empty string.
    #[must_use]
    pub fn to_column(data: Option<&Self>) -> &str {
        data.map(Self::as_str).unwrap_or_default()
    }

    /// Reads a column value back. An empty column means absent data.
    #[must_use]
    pub fn from_column(column: impl Into<String>) -> Option<Self> {
        let column = column.into();
        if column.is_empty() {
            None
        } else {
            Some(Self(column))
        }
    }

    /// Treats empty text as absent data, matching what [`Self::from_column`]
    /// loads back.
    #[must_use]
    pub fn normalize(data: Option<Self>) -> Option<Self> {
        data.filter(|d| !d.0.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Login {
        login: String,
    }

    #[test]
    fn test_encode_decode_structured_value() {
        let data = UserData::encode(&Login {
            login: "test".into(),
        })
        .unwrap();
        assert_eq!(data.as_str(), r#"{"login":"test"}"#);

        let decoded: Login = data.decode().unwrap();
        assert_eq!(decoded.login, "test");
    }

    #[test]
    fn test_absent_data_uses_empty_column() {
        assert_eq!(UserData::to_column(None), "");
        assert_eq!(UserData::from_column(""), None);
        assert_eq!(
            UserData::encode_optional::<serde_json::Value>(None).unwrap(),
            None
        );
    }

    #[test]
    fn test_column_roundtrip_keeps_text_unmodified() {
        let data = UserData::encode(&json!({"a": [1, 2, 3]})).unwrap();
        let column = UserData::to_column(Some(&data)).to_string();
        let loaded = UserData::from_column(column).unwrap();
        assert_eq!(loaded, data);
    }

    #[test]
    fn test_empty_string_value_is_not_absent() {
        // An encoded empty string is `""`, which is not an empty column.
        let data = UserData::encode("").unwrap();
        assert_eq!(data.as_str(), "\"\"");
        assert!(UserData::from_column(data.into_inner()).is_some());
    }

    #[test]
    fn test_normalize_drops_empty_text() {
        assert_eq!(UserData::normalize(Some(UserData::from_raw(""))), None);
        assert_eq!(UserData::normalize(None), None);
        let data = UserData::from_raw("{}");
        assert_eq!(UserData::normalize(Some(data.clone())), Some(data));
    }

    #[test]
    fn test_decode_rejects_mismatched_type() {
        let data = UserData::from_raw("not json");
        let result: StoreResult<Login> = data.decode();
        assert!(result.unwrap_err().is_storage_error());
    }
}
