//! Access token storage.
//!
//! Absent optional references (`refresh_token`, `authorize_code`,
//! `previous_access_token`) are stored as empty strings. A partial unique
//! index keeps non-empty refresh tokens unique.

use oauth_store::error::{StoreError, StoreResult};
use oauth_store::observability::fingerprint;
use oauth_store::types::non_empty;
use oauth_store::{Token, UserData};
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use time::OffsetDateTime;
use tracing::{debug, instrument};

use crate::PgPool;
use crate::error::{insert_error, storage_error};

/// Token row: access_token, client_id, refresh_token, expires_in, scope,
/// redirect_uri, created_at, user_data, authorize_code, previous_access_token.
type TokenTuple = (
    String,
    String,
    String,
    i32,
    String,
    String,
    OffsetDateTime,
    String,
    String,
    String,
);

const TOKEN_COLUMNS: &str = "access_token, client_id, refresh_token, expires_in, scope, \
     redirect_uri, created_at, user_data, authorize_code, previous_access_token";

fn token_from_tuple(row: TokenTuple) -> Token {
    Token {
        access_token: row.0,
        client_id: row.1,
        refresh_token: non_empty(row.2),
        expires_in: row.3,
        scope: row.4,
        redirect_uri: row.5,
        created_at: row.6,
        user_data: UserData::from_column(row.7),
        authorize_code: non_empty(row.8),
        previous_access_token: non_empty(row.9),
    }
}

/// Token storage operations on one table.
pub struct TokenStorage<'a> {
    pool: &'a PgPool,
    table: &'a str,
}

impl<'a> TokenStorage<'a> {
    /// Create a new token storage over `table`.
    #[must_use]
    pub fn new(pool: &'a PgPool, table: &'a str) -> Self {
        Self { pool, table }
    }

    /// Find a token by its access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    #[instrument(skip(self, access_token), fields(table = %self.table))]
    pub async fn find_by_access_token(&self, access_token: &str) -> StoreResult<Option<Token>> {
        let sql = format!(
            r#"SELECT {TOKEN_COLUMNS} FROM "{}" WHERE access_token = $1"#,
            self.table
        );
        let row: Option<TokenTuple> = query_as(&sql)
            .bind(access_token)
            .fetch_optional(self.pool)
            .await
            .map_err(storage_error)?;

        Ok(row.map(token_from_tuple))
    }

    /// Find a token by its refresh token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    #[instrument(skip(self, refresh_token), fields(table = %self.table))]
    pub async fn find_by_refresh_token(&self, refresh_token: &str) -> StoreResult<Option<Token>> {
        let sql = format!(
            r#"SELECT {TOKEN_COLUMNS} FROM "{}" WHERE refresh_token = $1 AND refresh_token <> ''"#,
            self.table
        );
        let row: Option<TokenTuple> = query_as(&sql)
            .bind(refresh_token)
            .fetch_optional(self.pool)
            .await
            .map_err(storage_error)?;

        Ok(row.map(token_from_tuple))
    }

    /// Insert a new token.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The access token or refresh token is already in use
    /// - The database insert fails
    #[instrument(
        skip(self, token),
        fields(
            table = %self.table,
            access_token = %fingerprint(&token.access_token),
            client_id = %token.client_id
        )
    )]
    pub async fn create(&self, token: &Token) -> StoreResult<()> {
        let token = &token.clone().normalized();
        let sql = format!(
            r#"
            INSERT INTO "{}" ({TOKEN_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
            self.table
        );
        query(&sql)
            .bind(&token.access_token)
            .bind(&token.client_id)
            .bind(token.refresh_token.as_deref().unwrap_or_default())
            .bind(token.expires_in)
            .bind(&token.scope)
            .bind(&token.redirect_uri)
            .bind(token.created_at)
            .bind(UserData::to_column(token.user_data.as_ref()))
            .bind(token.authorize_code.as_deref().unwrap_or_default())
            .bind(token.previous_access_token.as_deref().unwrap_or_default())
            .execute(self.pool)
            .await
            .map_err(|e| {
                insert_error(e, || {
                    format!(
                        "Access token {} or its refresh token already exists",
                        fingerprint(&token.access_token)
                    )
                })
            })?;

        debug!(has_refresh = token.refresh_token.is_some(), "Access token stored");
        Ok(())
    }

    /// Delete a token by its access token.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The token doesn't exist
    /// - The database delete fails
    #[instrument(skip(self, access_token), fields(table = %self.table))]
    pub async fn delete_by_access_token(&self, access_token: &str) -> StoreResult<()> {
        let sql = format!(r#"DELETE FROM "{}" WHERE access_token = $1"#, self.table);
        let result = query(&sql)
            .bind(access_token)
            .execute(self.pool)
            .await
            .map_err(storage_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(format!(
                "Access token {}",
                fingerprint(access_token)
            )));
        }

        debug!("Access token removed");
        Ok(())
    }

    /// Delete the token owning a refresh token. Other tokens are untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No token owns the refresh token
    /// - The database delete fails
    #[instrument(skip(self, refresh_token), fields(table = %self.table))]
    pub async fn delete_by_refresh_token(&self, refresh_token: &str) -> StoreResult<()> {
        let sql = format!(
            r#"DELETE FROM "{}" WHERE refresh_token = $1 AND refresh_token <> ''"#,
            self.table
        );
        let result = query(&sql)
            .bind(refresh_token)
            .execute(self.pool)
            .await
            .map_err(storage_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(format!(
                "Refresh token {}",
                fingerprint(refresh_token)
            )));
        }

        debug!("Refresh token removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_token_from_tuple_restores_optional_references() {
        let token = token_from_tuple((
            "tok2".into(),
            "c1".into(),
            "ref2".into(),
            3600,
            String::new(),
            String::new(),
            datetime!(2024-01-01 00:00:00 UTC),
            String::new(),
            String::new(),
            "tok1".into(),
        ));
        assert_eq!(token.refresh_token.as_deref(), Some("ref2"));
        assert_eq!(token.authorize_code, None);
        assert_eq!(token.previous_access_token.as_deref(), Some("tok1"));
        assert!(token.is_rotation());
    }
}
