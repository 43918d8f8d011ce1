//! In-process storage backend.
//!
//! Clients and grants live in [`DashMap`]s; every insert and delete is a
//! single atomic map operation, so two concurrent deletes of one code yield
//! one success and one `NotFound`. Tokens sit behind one
//! [`tokio::sync::RwLock`] so the primary map and the refresh-token index
//! always change together.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::observability::fingerprint;
use crate::schema::GrantProfile;
use crate::storage::{ClientStorage, GrantStorage, TokenStorage};
use crate::store::OAuthStore;
use crate::types::{Client, Grant, Token};

/// In-memory client registry.
#[derive(Debug, Default, Clone)]
pub struct MemoryClientStorage {
    clients: Arc<DashMap<String, Client>>,
}

impl MemoryClientStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered clients.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[async_trait]
impl ClientStorage for MemoryClientStorage {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Client>> {
        Ok(self.clients.get(id).map(|entry| entry.value().clone()))
    }

    async fn create(&self, client: &Client) -> StoreResult<()> {
        let client = client.clone().normalized();
        match self.clients.entry(client.id.clone()) {
            Entry::Occupied(_) => Err(StoreError::conflict(format!(
                "Client '{}' already exists",
                client.id
            ))),
            Entry::Vacant(slot) => {
                debug!(client_id = %client.id, "Client stored");
                slot.insert(client);
                Ok(())
            }
        }
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        self.clients
            .remove(id)
            .map(|_| debug!(client_id = %id, "Client removed"))
            .ok_or_else(|| StoreError::not_found(format!("Client {id}")))
    }
}

/// In-memory authorization grant store.
#[derive(Debug, Default, Clone)]
pub struct MemoryGrantStorage {
    grants: Arc<DashMap<String, Grant>>,
    profile: GrantProfile,
}

impl MemoryGrantStorage {
    #[must_use]
    pub fn new(profile: GrantProfile) -> Self {
        Self {
            grants: Arc::new(DashMap::new()),
            profile,
        }
    }

    #[must_use]
    pub fn profile(&self) -> GrantProfile {
        self.profile
    }
}

#[async_trait]
impl GrantStorage for MemoryGrantStorage {
    async fn find_by_code(&self, code: &str) -> StoreResult<Option<Grant>> {
        Ok(self.grants.get(code).map(|entry| entry.value().clone()))
    }

    async fn create(&self, grant: &Grant) -> StoreResult<()> {
        let grant = grant.clone().normalized();
        self.profile.check(&grant)?;
        match self.grants.entry(grant.code.clone()) {
            Entry::Occupied(_) => Err(StoreError::conflict(format!(
                "Authorization code {} already exists",
                fingerprint(&grant.code)
            ))),
            Entry::Vacant(slot) => {
                debug!(
                    code = %fingerprint(&grant.code),
                    client_id = %grant.client_id,
                    "Authorization code stored"
                );
                slot.insert(grant);
                Ok(())
            }
        }
    }

    async fn delete(&self, code: &str) -> StoreResult<()> {
        self.grants
            .remove(code)
            .map(|_| debug!(code = %fingerprint(code), "Authorization code removed"))
            .ok_or_else(|| {
                StoreError::not_found(format!("Authorization code {}", fingerprint(code)))
            })
    }
}

#[derive(Debug, Default)]
struct TokenTable {
    by_access: HashMap<String, Token>,
    /// refresh token -> access token
    by_refresh: HashMap<String, String>,
}

impl TokenTable {
    fn remove_access(&mut self, access_token: &str) -> Option<Token> {
        let token = self.by_access.remove(access_token)?;
        if let Some(refresh) = &token.refresh_token {
            self.by_refresh.remove(refresh);
        }
        Some(token)
    }
}

/// In-memory token store with a refresh-token index.
#[derive(Debug, Default, Clone)]
pub struct MemoryTokenStorage {
    table: Arc<RwLock<TokenTable>>,
}

impl MemoryTokenStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tokens.
    pub async fn len(&self) -> usize {
        self.table.read().await.by_access.len()
    }
}

#[async_trait]
impl TokenStorage for MemoryTokenStorage {
    async fn find_by_access_token(&self, access_token: &str) -> StoreResult<Option<Token>> {
        Ok(self.table.read().await.by_access.get(access_token).cloned())
    }

    async fn find_by_refresh_token(&self, refresh_token: &str) -> StoreResult<Option<Token>> {
        let table = self.table.read().await;
        Ok(table
            .by_refresh
            .get(refresh_token)
            .and_then(|access| table.by_access.get(access))
            .cloned())
    }

    async fn create(&self, token: &Token) -> StoreResult<()> {
        let token = token.clone().normalized();
        let mut table = self.table.write().await;
        if table.by_access.contains_key(&token.access_token) {
            return Err(StoreError::conflict(format!(
                "Access token {} already exists",
                fingerprint(&token.access_token)
            )));
        }
        if let Some(refresh) = &token.refresh_token {
            if table.by_refresh.contains_key(refresh) {
                return Err(StoreError::conflict(format!(
                    "Refresh token {} already exists",
                    fingerprint(refresh)
                )));
            }
            table
                .by_refresh
                .insert(refresh.clone(), token.access_token.clone());
        }
        debug!(
            access_token = %fingerprint(&token.access_token),
            client_id = %token.client_id,
            has_refresh = token.refresh_token.is_some(),
            "Access token stored"
        );
        table.by_access.insert(token.access_token.clone(), token);
        Ok(())
    }

    async fn delete_by_access_token(&self, access_token: &str) -> StoreResult<()> {
        let mut table = self.table.write().await;
        table
            .remove_access(access_token)
            .map(|_| debug!(access_token = %fingerprint(access_token), "Access token removed"))
            .ok_or_else(|| {
                StoreError::not_found(format!("Access token {}", fingerprint(access_token)))
            })
    }

    async fn delete_by_refresh_token(&self, refresh_token: &str) -> StoreResult<()> {
        let mut table = self.table.write().await;
        let access = table
            .by_refresh
            .get(refresh_token)
            .cloned()
            .ok_or_else(|| {
                StoreError::not_found(format!("Refresh token {}", fingerprint(refresh_token)))
            })?;
        table.remove_access(&access);
        debug!(refresh_token = %fingerprint(refresh_token), "Refresh token removed");
        Ok(())
    }
}

/// The three in-memory storages bundled together.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    pub clients: MemoryClientStorage,
    pub grants: MemoryGrantStorage,
    pub tokens: MemoryTokenStorage,
}

impl MemoryBackend {
    /// Creates an empty backend using the given grant profile.
    #[must_use]
    pub fn new(profile: GrantProfile) -> Self {
        Self {
            clients: MemoryClientStorage::new(),
            grants: MemoryGrantStorage::new(profile),
            tokens: MemoryTokenStorage::new(),
        }
    }

    /// Wraps the backend in the store facade.
    #[must_use]
    pub fn into_store(self) -> OAuthStore {
        OAuthStore::new(
            Arc::new(self.clients),
            Arc::new(self.grants),
            Arc::new(self.tokens),
        )
    }
}
