//! PostgreSQL storage backend for oauth-store.
//!
//! Provides persistent storage for:
//!
//! - OAuth clients
//! - Authorization codes
//! - Access and refresh tokens
//!
//! Each record set lives in its own table. Table names come from a
//! [`TableNames`] resolved once at construction; the grant profile decides
//! whether PKCE columns exist.
//!
//! # Example
//!
//! ```ignore
//! use oauth_store::config::loader::load_config;
//! use oauth_store_postgres::PostgresBackend;
//!
//! let config = load_config(None)?;
//! let backend = PostgresBackend::from_config(&config).await?;
//! let store = backend.into_store();
//!
//! let client = store.get_client("my-app").await?;
//! ```

pub mod adapters;
pub mod client;
pub mod error;
pub mod grant;
pub mod pool;
pub mod schema;
pub mod token;

use std::sync::Arc;

use oauth_store::{GrantProfile, OAuthStore, PostgresSettings, StoreConfig, TableNames};
use sqlx_core::pool::Pool;
use sqlx_postgres::Postgres;
use tracing::info;

/// PostgreSQL connection pool type alias.
pub type PgPool = Pool<Postgres>;

pub use adapters::{ArcClientStorage, ArcGrantStorage, ArcTokenStorage};
pub use client::ClientStorage;
pub use error::{PostgresError, Result};
pub use grant::GrantStorage;
pub use pool::create_pool;
pub use schema::SchemaManager;
pub use token::TokenStorage;

// =============================================================================
// PostgreSQL Backend
// =============================================================================

/// PostgreSQL storage backend.
///
/// Holds the connection pool, resolved table names and grant profile, and
/// hands out storage types for the three tables.
#[derive(Debug, Clone)]
pub struct PostgresBackend {
    pool: Arc<PgPool>,
    tables: Arc<TableNames>,
    profile: GrantProfile,
}

impl PostgresBackend {
    /// Create a backend over an existing connection pool.
    #[must_use]
    pub fn new(pool: Arc<PgPool>, tables: TableNames, profile: GrantProfile) -> Self {
        Self {
            pool,
            tables: Arc::new(tables),
            profile,
        }
    }

    /// Create a backend by connecting to the database.
    ///
    /// Creates missing tables when `settings.ensure_schema` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or schema bootstrap fails.
    pub async fn connect(
        settings: &PostgresSettings,
        tables: TableNames,
        profile: GrantProfile,
    ) -> Result<Self> {
        let pool = create_pool(settings).await?;
        let backend = Self::new(Arc::new(pool), tables, profile);
        if settings.ensure_schema {
            backend.schema().ensure_schema().await?;
        }
        info!(profile = %profile, "PostgreSQL token store ready");
        Ok(backend)
    }

    /// Create a backend from the store configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the table names are invalid, or the connection or
    /// schema bootstrap fails.
    pub async fn from_config(config: &StoreConfig) -> Result<Self> {
        let tables = config
            .tables
            .to_table_names()
            .map_err(|e| PostgresError::config(e.to_string()))?;
        Self::connect(&config.postgres, tables, config.grant_profile).await
    }

    /// Get a reference to the connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get a reference to the Arc-wrapped pool.
    #[must_use]
    pub fn pool_arc(&self) -> Arc<PgPool> {
        Arc::clone(&self.pool)
    }

    #[must_use]
    pub fn tables(&self) -> &TableNames {
        &self.tables
    }

    #[must_use]
    pub fn profile(&self) -> GrantProfile {
        self.profile
    }

    /// Get the schema manager for this backend's tables.
    #[must_use]
    pub fn schema(&self) -> SchemaManager {
        SchemaManager::new(self.pool_arc(), Arc::clone(&self.tables), self.profile)
    }

    // -------------------------------------------------------------------------
    // Storage Accessors
    // -------------------------------------------------------------------------

    /// Get client storage operations.
    #[must_use]
    pub fn clients(&self) -> ClientStorage<'_> {
        ClientStorage::new(&self.pool, self.tables.clients())
    }

    /// Get authorization grant storage operations.
    #[must_use]
    pub fn grants(&self) -> GrantStorage<'_> {
        GrantStorage::new(&self.pool, self.tables.grants(), self.profile)
    }

    /// Get token storage operations.
    #[must_use]
    pub fn tokens(&self) -> TokenStorage<'_> {
        TokenStorage::new(&self.pool, self.tables.tokens())
    }

    /// Wraps the backend in the store facade.
    #[must_use]
    pub fn into_store(self) -> OAuthStore {
        OAuthStore::new(
            Arc::new(ArcClientStorage::new(
                self.pool_arc(),
                Arc::clone(&self.tables),
            )),
            Arc::new(ArcGrantStorage::new(
                self.pool_arc(),
                Arc::clone(&self.tables),
                self.profile,
            )),
            Arc::new(ArcTokenStorage::new(self.pool, self.tables)),
        )
    }

    /// Closes the connection pool.
    ///
    /// Stores built from this backend fail with storage errors afterwards.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
