//! Authorization grant storage trait.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::types::Grant;

/// Storage operations for authorization codes.
///
/// Codes are single-use. The exchange flow loads a grant, issues a token,
/// then deletes the grant; of two concurrent deletes of the same code exactly
/// one succeeds and the other sees `NotFound`.
#[async_trait]
pub trait GrantStorage: Send + Sync {
    /// Find a grant by its code. Expiry is not checked.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_code(&self, code: &str) -> StoreResult<Option<Grant>>;

    /// Insert a new grant.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A grant with the same code already exists (`Conflict`)
    /// - The grant cannot be stored in the configured profile (`InvalidInput`)
    /// - The storage operation fails
    async fn create(&self, grant: &Grant) -> StoreResult<()>;

    /// Delete a grant by its code.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The grant doesn't exist or was already consumed (`NotFound`)
    /// - The storage operation fails
    async fn delete(&self, code: &str) -> StoreResult<()>;
}
