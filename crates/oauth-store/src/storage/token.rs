//! Access token storage trait.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::types::Token;

/// Storage operations for access tokens and their refresh tokens.
///
/// The access token is the primary key. A non-empty refresh token is a unique
/// secondary key that resolves to exactly one record.
#[async_trait]
pub trait TokenStorage: Send + Sync {
    /// Find a token by its access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_access_token(&self, access_token: &str) -> StoreResult<Option<Token>>;

    /// Find a token by its refresh token.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_refresh_token(&self, refresh_token: &str) -> StoreResult<Option<Token>>;

    /// Insert a new token.
    ///
    /// `authorize_code` and `previous_access_token` are stored as given;
    /// they are not checked against other records.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The access token or refresh token is already in use (`Conflict`)
    /// - The storage operation fails
    async fn create(&self, token: &Token) -> StoreResult<()>;

    /// Delete a token by its access token.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No token has this access token (`NotFound`)
    /// - The storage operation fails
    async fn delete_by_access_token(&self, access_token: &str) -> StoreResult<()>;

    /// Delete the token that owns this refresh token.
    ///
    /// Only the owning record is deleted, never other tokens in its chain.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No token has this refresh token (`NotFound`)
    /// - The storage operation fails
    async fn delete_by_refresh_token(&self, refresh_token: &str) -> StoreResult<()>;
}
