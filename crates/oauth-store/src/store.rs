//! Token store facade.
//!
//! [`OAuthStore`] is the single entry point a protocol engine talks to. It
//! owns one handle to each leaf storage, resolves the client and grant a
//! record references on load, and flattens engine records on save. Every
//! operation is one leaf call plus reference lookups; nothing is locked
//! across calls.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::memory::MemoryBackend;
use crate::observability::fingerprint;
use crate::schema::GrantProfile;
use crate::storage::{ClientStorage, GrantStorage, TokenStorage};
use crate::types::{AccessData, AuthorizeData, Client, ResolvedToken, Token, UserData};

/// Facade over the client, grant, and token storages.
///
/// Cloning is cheap and clones share the same backends.
#[derive(Clone)]
pub struct OAuthStore {
    clients: Arc<dyn ClientStorage>,
    grants: Arc<dyn GrantStorage>,
    tokens: Arc<dyn TokenStorage>,
}

impl OAuthStore {
    /// Creates a facade over the given storages.
    pub fn new(
        clients: Arc<dyn ClientStorage>,
        grants: Arc<dyn GrantStorage>,
        tokens: Arc<dyn TokenStorage>,
    ) -> Self {
        Self {
            clients,
            grants,
            tokens,
        }
    }

    /// Creates a facade over a fresh in-memory backend with the PKCE grant profile.
    #[must_use]
    pub fn in_memory() -> Self {
        MemoryBackend::new(GrantProfile::Pkce).into_store()
    }

    /// Returns a handle sharing the same backends.
    #[must_use]
    pub fn clone_store(&self) -> Self {
        self.clone()
    }

    /// Releases nothing. Pools are closed by dropping the backend.
    pub fn close(&self) {}

    /// Encodes application data for [`Client::user_data`] and friends.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the value cannot be encoded.
    pub fn encode_user_data<T: Serialize + ?Sized>(value: &T) -> StoreResult<UserData> {
        UserData::encode(value)
    }

    // ---------------------------------------------------------------------
    // Clients
    // ---------------------------------------------------------------------

    /// Loads a client by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no client has this id.
    pub async fn get_client(&self, id: &str) -> StoreResult<Client> {
        self.clients
            .find_by_id(id)
            .await?
            .ok_or_else(|| StoreError::not_found(format!("Client {id}")))
    }

    /// Registers a new client.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the id is already registered.
    pub async fn save_client(&self, client: &Client) -> StoreResult<()> {
        self.clients.create(client).await
    }

    /// Registers `client` unless a client with its id already exists.
    ///
    /// Returns `true` if the client was inserted. An existing client is left
    /// unchanged, even if its fields differ.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    pub async fn ensure_client(&self, client: &Client) -> StoreResult<bool> {
        if self.clients.find_by_id(&client.id).await?.is_some() {
            return Ok(false);
        }
        match self.clients.create(client).await {
            Ok(()) => Ok(true),
            // Lost a race with another seeder.
            Err(e) if e.is_conflict() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Removes a client. Grants and tokens referencing it are left in place.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no client has this id.
    pub async fn remove_client(&self, id: &str) -> StoreResult<()> {
        self.clients.delete(id).await
    }

    // ---------------------------------------------------------------------
    // Authorization codes
    // ---------------------------------------------------------------------

    /// Persists an authorization code.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` for a duplicate code and `InvalidInput` if the
    /// backend's grant profile cannot hold the PKCE parameters.
    pub async fn save_authorize(&self, data: &AuthorizeData) -> StoreResult<()> {
        self.grants.create(&data.to_grant()).await
    }

    /// Loads an authorization code with its client.
    ///
    /// Expiry is not checked.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the code does not exist and an integrity error if
    /// its client cannot be resolved.
    pub async fn load_authorize(&self, code: &str) -> StoreResult<AuthorizeData> {
        let grant = self.grants.find_by_code(code).await?.ok_or_else(|| {
            StoreError::not_found(format!("Authorization code {}", fingerprint(code)))
        })?;
        let client = self
            .resolve_client(&grant.client_id, "Authorization code", code)
            .await?;
        Ok(AuthorizeData::from_grant(grant, client))
    }

    /// Consumes an authorization code.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the code does not exist or was already consumed.
    pub async fn remove_authorize(&self, code: &str) -> StoreResult<()> {
        self.grants.delete(code).await
    }

    // ---------------------------------------------------------------------
    // Access and refresh tokens
    // ---------------------------------------------------------------------

    /// Persists an access token, keeping only the keys of its originating
    /// grant and predecessor token.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the access or refresh token is already in use.
    pub async fn save_access(&self, data: &AccessData) -> StoreResult<()> {
        self.tokens.create(&data.to_token()).await
    }

    /// Loads a token by its access token.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the token does not exist and an integrity error
    /// if its client cannot be resolved.
    pub async fn load_access(&self, access_token: &str) -> StoreResult<ResolvedToken> {
        let token = self
            .tokens
            .find_by_access_token(access_token)
            .await?
            .ok_or_else(|| {
                StoreError::not_found(format!("Access token {}", fingerprint(access_token)))
            })?;
        self.resolve_token(token).await
    }

    /// Loads a token by its refresh token.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no token owns this refresh token and an integrity
    /// error if its client cannot be resolved.
    pub async fn load_refresh(&self, refresh_token: &str) -> StoreResult<ResolvedToken> {
        let token = self
            .tokens
            .find_by_refresh_token(refresh_token)
            .await?
            .ok_or_else(|| {
                StoreError::not_found(format!("Refresh token {}", fingerprint(refresh_token)))
            })?;
        self.resolve_token(token).await
    }

    /// Revokes a token by its access token.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the token does not exist.
    pub async fn remove_access(&self, access_token: &str) -> StoreResult<()> {
        self.tokens.delete_by_access_token(access_token).await
    }

    /// Revokes the token owning this refresh token. Other tokens in the
    /// refresh chain are kept.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no token owns this refresh token.
    pub async fn remove_refresh(&self, refresh_token: &str) -> StoreResult<()> {
        self.tokens.delete_by_refresh_token(refresh_token).await
    }

    // ---------------------------------------------------------------------
    // Reference resolution
    // ---------------------------------------------------------------------

    async fn resolve_client(&self, client_id: &str, owner: &str, key: &str) -> StoreResult<Client> {
        match self.clients.find_by_id(client_id).await? {
            Some(client) => Ok(client),
            None => {
                warn!(
                    client_id = %client_id,
                    key = %fingerprint(key),
                    "{owner} references a missing client"
                );
                Err(StoreError::integrity(format!(
                    "{owner} {} references missing client {client_id}",
                    fingerprint(key)
                )))
            }
        }
    }

    async fn resolve_token(&self, token: Token) -> StoreResult<ResolvedToken> {
        let client = self
            .resolve_client(&token.client_id, "Access token", &token.access_token)
            .await?;

        let authorize_data = match token.authorize_code.as_deref() {
            Some(code) => match self.load_authorize(code).await {
                Ok(data) => Some(data),
                Err(e) if e.is_not_found() || e.is_integrity_error() => {
                    debug!(code = %fingerprint(code), "Originating grant not resolvable");
                    None
                }
                Err(e) => return Err(e),
            },
            None => None,
        };

        Ok(ResolvedToken {
            token,
            client,
            authorize_data,
        })
    }
}

impl fmt::Debug for OAuthStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    #[tokio::test]
    async fn test_get_client_not_found() {
        let store = OAuthStore::in_memory();
        let err = store.get_client("missing").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_ensure_client_is_idempotent() {
        let store = OAuthStore::in_memory();
        let client = Client::new("c1", "s1", "http://x/cb");

        assert!(store.ensure_client(&client).await.unwrap());
        let changed = Client::new("c1", "other", "http://other/cb");
        assert!(!store.ensure_client(&changed).await.unwrap());
        assert_eq!(store.get_client("c1").await.unwrap().secret, "s1");
    }

    #[tokio::test]
    async fn test_clone_store_shares_backends() {
        let store = OAuthStore::in_memory();
        let other = store.clone_store();
        store
            .save_client(&Client::new("c1", "s1", "http://x/cb"))
            .await
            .unwrap();
        assert!(other.get_client("c1").await.is_ok());
        other.close();
    }

    #[tokio::test]
    async fn test_token_resolution_ignores_missing_grant_client() {
        let store = OAuthStore::in_memory();
        let c1 = Client::new("c1", "s1", "http://x/cb");
        let c2 = Client::new("c2", "s2", "http://y/cb");
        store.save_client(&c1).await.unwrap();
        store.save_client(&c2).await.unwrap();

        let now = OffsetDateTime::now_utc();
        let grant = AuthorizeData::new(c2.clone(), "abc", 600, now);
        store.save_authorize(&grant).await.unwrap();
        store.remove_client("c2").await.unwrap();

        let access = AccessData::new(c1, "tok1", 3600, now).with_authorize_data(grant);
        store.save_access(&access).await.unwrap();

        let resolved = store.load_access("tok1").await.unwrap();
        assert_eq!(resolved.client.id, "c1");
        assert!(resolved.authorize_data.is_none());
        assert_eq!(resolved.token.authorize_code.as_deref(), Some("abc"));
    }
}
