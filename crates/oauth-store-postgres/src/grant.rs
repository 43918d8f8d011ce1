//! Authorization grant storage.

use oauth_store::error::{StoreError, StoreResult};
use oauth_store::observability::fingerprint;
use oauth_store::types::non_empty;
use oauth_store::{Grant, GrantProfile, UserData};
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use time::OffsetDateTime;
use tracing::{debug, instrument};

use crate::PgPool;
use crate::error::{insert_error, storage_error};

/// Grant row: code, client_id, expires_in, scope, redirect_uri, state,
/// created_at, user_data, code_challenge, code_challenge_method.
type GrantTuple = (
    String,
    String,
    i32,
    String,
    String,
    String,
    OffsetDateTime,
    String,
    String,
    String,
);

fn grant_from_tuple(row: GrantTuple) -> Grant {
    Grant {
        code: row.0,
        client_id: row.1,
        expires_in: row.2,
        scope: row.3,
        redirect_uri: row.4,
        state: row.5,
        created_at: row.6,
        user_data: UserData::from_column(row.7),
        code_challenge: non_empty(row.8),
        code_challenge_method: non_empty(row.9),
    }
}

/// Authorization grant storage operations on one table.
pub struct GrantStorage<'a> {
    pool: &'a PgPool,
    table: &'a str,
    profile: GrantProfile,
}

impl<'a> GrantStorage<'a> {
    /// Create a new grant storage over `table`.
    #[must_use]
    pub fn new(pool: &'a PgPool, table: &'a str, profile: GrantProfile) -> Self {
        Self {
            pool,
            table,
            profile,
        }
    }

    /// Find a grant by its code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    #[instrument(skip(self, code), fields(table = %self.table, code = %fingerprint(code)))]
    pub async fn find_by_code(&self, code: &str) -> StoreResult<Option<Grant>> {
        // The basic profile has no PKCE columns; select empty strings instead.
        let pkce = if self.profile.stores_pkce() {
            "code_challenge, code_challenge_method"
        } else {
            "'' AS code_challenge, '' AS code_challenge_method"
        };
        let sql = format!(
            r#"
            SELECT code, client_id, expires_in, scope, redirect_uri, state,
                   created_at, user_data, {pkce}
            FROM "{}"
            WHERE code = $1
            "#,
            self.table
        );
        let row: Option<GrantTuple> = query_as(&sql)
            .bind(code)
            .fetch_optional(self.pool)
            .await
            .map_err(storage_error)?;

        Ok(row.map(grant_from_tuple))
    }

    /// Insert a new grant.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The grant carries PKCE parameters under the basic profile
    /// - A grant with the same code already exists
    /// - The database insert fails
    #[instrument(
        skip(self, grant),
        fields(table = %self.table, code = %fingerprint(&grant.code), client_id = %grant.client_id)
    )]
    pub async fn create(&self, grant: &Grant) -> StoreResult<()> {
        let grant = &grant.clone().normalized();
        self.profile.check(grant)?;

        let conflict = || {
            format!(
                "Authorization code {} already exists",
                fingerprint(&grant.code)
            )
        };

        if self.profile.stores_pkce() {
            let sql = format!(
                r#"
                INSERT INTO "{}" (code, client_id, expires_in, scope, redirect_uri, state,
                                  created_at, user_data, code_challenge, code_challenge_method)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                "#,
                self.table
            );
            query(&sql)
                .bind(&grant.code)
                .bind(&grant.client_id)
                .bind(grant.expires_in)
                .bind(&grant.scope)
                .bind(&grant.redirect_uri)
                .bind(&grant.state)
                .bind(grant.created_at)
                .bind(UserData::to_column(grant.user_data.as_ref()))
                .bind(grant.code_challenge.as_deref().unwrap_or_default())
                .bind(grant.code_challenge_method.as_deref().unwrap_or_default())
                .execute(self.pool)
                .await
                .map_err(|e| insert_error(e, conflict))?;
        } else {
            let sql = format!(
                r#"
                INSERT INTO "{}" (code, client_id, expires_in, scope, redirect_uri, state,
                                  created_at, user_data)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
                self.table
            );
            query(&sql)
                .bind(&grant.code)
                .bind(&grant.client_id)
                .bind(grant.expires_in)
                .bind(&grant.scope)
                .bind(&grant.redirect_uri)
                .bind(&grant.state)
                .bind(grant.created_at)
                .bind(UserData::to_column(grant.user_data.as_ref()))
                .execute(self.pool)
                .await
                .map_err(|e| insert_error(e, conflict))?;
        }

        debug!("Authorization code stored");
        Ok(())
    }

    /// Delete a grant by its code.
    ///
    /// A single `DELETE` statement; of two concurrent deletes exactly one
    /// affects a row.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The grant doesn't exist
    /// - The database delete fails
    #[instrument(skip(self, code), fields(table = %self.table, code = %fingerprint(code)))]
    pub async fn delete(&self, code: &str) -> StoreResult<()> {
        let sql = format!(r#"DELETE FROM "{}" WHERE code = $1"#, self.table);
        let result = query(&sql)
            .bind(code)
            .execute(self.pool)
            .await
            .map_err(storage_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(format!(
                "Authorization code {}",
                fingerprint(code)
            )));
        }

        debug!("Authorization code removed");
        Ok(())
    }
}
