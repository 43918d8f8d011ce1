//! Arc-owning storage adapters.
//!
//! These adapters wrap the lifetime-based storage types and own an
//! `Arc<PgPool>`, allowing them to be used as `Arc<dyn ...Storage>` inside
//! the [`OAuthStore`](oauth_store::OAuthStore) facade.

use std::sync::Arc;

use async_trait::async_trait;

use oauth_store::error::StoreResult;
use oauth_store::storage::{
    ClientStorage as ClientStorageTrait, GrantStorage as GrantStorageTrait,
    TokenStorage as TokenStorageTrait,
};
use oauth_store::{Client, Grant, GrantProfile, TableNames, Token};

use crate::PgPool;
use crate::client::ClientStorage;
use crate::grant::GrantStorage;
use crate::token::TokenStorage;

// =============================================================================
// Arc-Owning Client Storage
// =============================================================================

/// Arc-owning PostgreSQL client storage adapter.
#[derive(Clone)]
pub struct ArcClientStorage {
    pool: Arc<PgPool>,
    tables: Arc<TableNames>,
}

impl ArcClientStorage {
    /// Create a new Arc-owning client storage.
    #[must_use]
    pub fn new(pool: Arc<PgPool>, tables: Arc<TableNames>) -> Self {
        Self { pool, tables }
    }

    fn storage(&self) -> ClientStorage<'_> {
        ClientStorage::new(&self.pool, self.tables.clients())
    }
}

#[async_trait]
impl ClientStorageTrait for ArcClientStorage {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Client>> {
        self.storage().find_by_id(id).await
    }

    async fn create(&self, client: &Client) -> StoreResult<()> {
        self.storage().create(client).await
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        self.storage().delete(id).await
    }
}

// =============================================================================
// Arc-Owning Grant Storage
// =============================================================================

/// Arc-owning PostgreSQL authorization grant storage adapter.
#[derive(Clone)]
pub struct ArcGrantStorage {
    pool: Arc<PgPool>,
    tables: Arc<TableNames>,
    profile: GrantProfile,
}

impl ArcGrantStorage {
    /// Create a new Arc-owning grant storage.
    #[must_use]
    pub fn new(pool: Arc<PgPool>, tables: Arc<TableNames>, profile: GrantProfile) -> Self {
        Self {
            pool,
            tables,
            profile,
        }
    }

    fn storage(&self) -> GrantStorage<'_> {
        GrantStorage::new(&self.pool, self.tables.grants(), self.profile)
    }
}

#[async_trait]
impl GrantStorageTrait for ArcGrantStorage {
    async fn find_by_code(&self, code: &str) -> StoreResult<Option<Grant>> {
        self.storage().find_by_code(code).await
    }

    async fn create(&self, grant: &Grant) -> StoreResult<()> {
        self.storage().create(grant).await
    }

    async fn delete(&self, code: &str) -> StoreResult<()> {
        self.storage().delete(code).await
    }
}

// =============================================================================
// Arc-Owning Token Storage
// =============================================================================

/// Arc-owning PostgreSQL token storage adapter.
#[derive(Clone)]
pub struct ArcTokenStorage {
    pool: Arc<PgPool>,
    tables: Arc<TableNames>,
}

impl ArcTokenStorage {
    /// Create a new Arc-owning token storage.
    #[must_use]
    pub fn new(pool: Arc<PgPool>, tables: Arc<TableNames>) -> Self {
        Self { pool, tables }
    }

    fn storage(&self) -> TokenStorage<'_> {
        TokenStorage::new(&self.pool, self.tables.tokens())
    }
}

#[async_trait]
impl TokenStorageTrait for ArcTokenStorage {
    async fn find_by_access_token(&self, access_token: &str) -> StoreResult<Option<Token>> {
        self.storage().find_by_access_token(access_token).await
    }

    async fn find_by_refresh_token(&self, refresh_token: &str) -> StoreResult<Option<Token>> {
        self.storage().find_by_refresh_token(refresh_token).await
    }

    async fn create(&self, token: &Token) -> StoreResult<()> {
        self.storage().create(token).await
    }

    async fn delete_by_access_token(&self, access_token: &str) -> StoreResult<()> {
        self.storage().delete_by_access_token(access_token).await
    }

    async fn delete_by_refresh_token(&self, refresh_token: &str) -> StoreResult<()> {
        self.storage().delete_by_refresh_token(refresh_token).await
    }
}
