//! Record types persisted by the token store.

mod client;
mod exchange;
mod grant;
mod token;
mod user_data;

pub use client::Client;
pub use exchange::{AccessData, AuthorizeData, ResolvedToken};
pub use grant::Grant;
pub use token::Token;
pub use user_data::UserData;

use time::{Duration, OffsetDateTime};

/// Maps an empty string to `None`.
///
/// Backends persist absent optional strings as empty columns.
#[must_use]
pub fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

/// Drops sub-microsecond precision.
///
/// Timestamps are persisted with microsecond resolution, so records are
/// normalized to it before they are stored.
#[must_use]
pub fn truncate_to_micros(at: OffsetDateTime) -> OffsetDateTime {
    at - Duration::nanoseconds(i64::from(at.nanosecond() % 1_000))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_truncate_to_micros() {
        let at = datetime!(2024-01-01 12:00:00.123456789 UTC);
        assert_eq!(
            truncate_to_micros(at),
            datetime!(2024-01-01 12:00:00.123456 UTC)
        );

        let exact = datetime!(2024-01-01 12:00:00.5 UTC);
        assert_eq!(truncate_to_micros(exact), exact);
    }
}
