//! Schema bootstrap for the three store tables.
//!
//! Creates missing tables, the refresh-token index and, under the PKCE grant
//! profile, the PKCE columns. Existing tables and rows are never altered in
//! any other way. This is a startup convenience, not a migration tool.

use std::sync::Arc;

use oauth_store::{GrantProfile, TableNames};
use tracing::{debug, info, instrument};

use crate::PgPool;
use crate::error::{PostgresError, Result};

/// Creates and inspects the store tables.
#[derive(Debug, Clone)]
pub struct SchemaManager {
    pool: Arc<PgPool>,
    tables: Arc<TableNames>,
    profile: GrantProfile,
}

impl SchemaManager {
    #[must_use]
    pub fn new(pool: Arc<PgPool>, tables: Arc<TableNames>, profile: GrantProfile) -> Self {
        Self {
            pool,
            tables,
            profile,
        }
    }

    /// Ensures all three tables exist.
    ///
    /// Idempotent. Under the PKCE profile, PKCE columns are added to a grant
    /// table that was created without them.
    ///
    /// # Errors
    ///
    /// Returns an error if any DDL statement fails.
    #[instrument(skip(self), fields(profile = %self.profile))]
    pub async fn ensure_schema(&self) -> Result<()> {
        self.ensure_table(self.tables.clients(), &self.clients_ddl())
            .await?;
        self.ensure_table(self.tables.grants(), &self.grants_ddl())
            .await?;
        self.ensure_table(self.tables.tokens(), &self.tokens_ddl())
            .await?;

        if self.profile.stores_pkce() {
            let grants = self.tables.grants();
            self.execute(&format!(
                r#"ALTER TABLE "{grants}"
                    ADD COLUMN IF NOT EXISTS code_challenge TEXT NOT NULL DEFAULT '',
                    ADD COLUMN IF NOT EXISTS code_challenge_method TEXT NOT NULL DEFAULT ''"#
            ))
            .await?;
        }

        let tokens = self.tables.tokens();
        self.execute(&format!(
            r#"CREATE UNIQUE INDEX IF NOT EXISTS "{tokens}_refresh_token_key"
                ON "{tokens}" (refresh_token) WHERE refresh_token <> ''"#
        ))
        .await?;

        info!(
            clients = self.tables.clients(),
            grants = self.tables.grants(),
            tokens = self.tables.tokens(),
            "Schema ready"
        );
        Ok(())
    }

    /// Drops all three tables if they exist.
    ///
    /// # Errors
    ///
    /// Returns an error if a DDL statement fails.
    #[instrument(skip(self))]
    pub async fn drop_schema(&self) -> Result<()> {
        for table in [
            self.tables.tokens(),
            self.tables.grants(),
            self.tables.clients(),
        ] {
            self.execute(&format!(r#"DROP TABLE IF EXISTS "{table}""#))
                .await?;
        }
        info!("Schema dropped");
        Ok(())
    }

    /// Checks whether a table exists in the current schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog query fails.
    pub async fn table_exists(&self, table: &str) -> Result<bool> {
        let row: Option<(bool,)> = sqlx_core::query_as::query_as(
            "SELECT EXISTS (
                SELECT FROM information_schema.tables
                WHERE table_schema = current_schema() AND table_name = $1
            )",
        )
        .bind(table)
        .fetch_optional(&*self.pool)
        .await
        .map_err(PostgresError::from)?;

        Ok(row.map(|(exists,)| exists).unwrap_or(false))
    }

    async fn ensure_table(&self, table: &str, ddl: &str) -> Result<()> {
        if self.table_exists(table).await? {
            debug!("Table {} already exists", table);
            return Ok(());
        }
        self.execute(ddl).await?;
        info!("Created table: {}", table);
        Ok(())
    }

    async fn execute(&self, sql: &str) -> Result<()> {
        sqlx_core::query::query(sql)
            .execute(&*self.pool)
            .await
            .map_err(|e| PostgresError::schema(e.to_string()))?;
        Ok(())
    }

    fn clients_ddl(&self) -> String {
        let table = self.tables.clients();
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS "{table}" (
                id TEXT PRIMARY KEY,
                secret TEXT NOT NULL DEFAULT '',
                redirect_uri TEXT NOT NULL DEFAULT '',
                user_data TEXT NOT NULL DEFAULT ''
            )
            "#
        )
    }

    fn grants_ddl(&self) -> String {
        let table = self.tables.grants();
        let pkce_columns = if self.profile.stores_pkce() {
            ",
                code_challenge TEXT NOT NULL DEFAULT '',
                code_challenge_method TEXT NOT NULL DEFAULT ''"
        } else {
            ""
        };
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS "{table}" (
                code TEXT PRIMARY KEY,
                client_id TEXT NOT NULL,
                expires_in INTEGER NOT NULL,
                scope TEXT NOT NULL DEFAULT '',
                redirect_uri TEXT NOT NULL DEFAULT '',
                state TEXT NOT NULL DEFAULT '',
                created_at TIMESTAMPTZ NOT NULL,
                user_data TEXT NOT NULL DEFAULT ''{pkce_columns}
            )
            "#
        )
    }

    fn tokens_ddl(&self) -> String {
        let table = self.tables.tokens();
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS "{table}" (
                access_token TEXT PRIMARY KEY,
                client_id TEXT NOT NULL,
                refresh_token TEXT NOT NULL DEFAULT '',
                expires_in INTEGER NOT NULL,
                scope TEXT NOT NULL DEFAULT '',
                redirect_uri TEXT NOT NULL DEFAULT '',
                created_at TIMESTAMPTZ NOT NULL,
                user_data TEXT NOT NULL DEFAULT '',
                authorize_code TEXT NOT NULL DEFAULT '',
                previous_access_token TEXT NOT NULL DEFAULT ''
            )
            "#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::PgPoolOptions;

    fn manager(profile: GrantProfile) -> SchemaManager {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://postgres@localhost/oauth")
            .unwrap();
        let tables = TableNames::with_prefix("t_").unwrap();
        SchemaManager::new(Arc::new(pool), Arc::new(tables), profile)
    }

    #[tokio::test]
    async fn test_grant_ddl_follows_profile() {
        let basic = manager(GrantProfile::Basic).grants_ddl();
        assert!(basic.contains(r#""t_oauth_authorize""#));
        assert!(!basic.contains("code_challenge"));

        let pkce = manager(GrantProfile::Pkce).grants_ddl();
        assert!(pkce.contains("code_challenge TEXT"));
        assert!(pkce.contains("code_challenge_method TEXT"));
    }

    #[tokio::test]
    async fn test_token_ddl_stores_references_as_text() {
        let ddl = manager(GrantProfile::Pkce).tokens_ddl();
        assert!(ddl.contains(r#""t_oauth_access""#));
        assert!(ddl.contains("authorize_code TEXT NOT NULL DEFAULT ''"));
        assert!(ddl.contains("previous_access_token TEXT NOT NULL DEFAULT ''"));
        assert!(!ddl.contains("REFERENCES"));
    }
}
