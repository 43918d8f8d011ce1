//! Client storage trait.
//!
//! Defines the interface for OAuth client persistence operations.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::types::Client;

/// Storage operations for OAuth 2.0 clients.
///
/// # Example
///
/// ```ignore
/// use oauth_store::storage::ClientStorage;
///
/// async fn example(storage: &impl ClientStorage) {
///     if let Some(client) = storage.find_by_id("c1").await? {
///         println!("Found client: {}", client.redirect_uri);
///     }
/// }
/// ```
#[async_trait]
pub trait ClientStorage: Send + Sync {
    /// Find a client by id.
    ///
    /// Returns `None` if the client doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Client>>;

    /// Insert a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A client with the same id already exists (`Conflict`)
    /// - The storage operation fails
    async fn create(&self, client: &Client) -> StoreResult<()>;

    /// Delete a client.
    ///
    /// Grants and tokens referencing the client are left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The client doesn't exist (`NotFound`)
    /// - The storage operation fails
    async fn delete(&self, id: &str) -> StoreResult<()>;
}
