//! # oauth-store
//!
//! Persistence layer for an OAuth 2.0 authorization server's token lifecycle.
//!
//! This crate provides:
//! - Client, authorization code, and access/refresh token records
//! - Storage traits for the three record sets
//! - The [`OAuthStore`] facade a protocol engine calls
//! - An in-memory backend
//!
//! ## Overview
//!
//! Grants and tokens reference clients, grants, and earlier tokens by key
//! only. The facade resolves those keys on load and flattens them on save.
//! The store never validates scopes, verifies PKCE, or enforces expiry; that
//! is the protocol engine's job.
//!
//! ## Modules
//!
//! - [`config`] - Store configuration and loader
//! - [`error`] - Error types
//! - [`memory`] - In-memory backend
//! - [`observability`] - Tracing setup
//! - [`schema`] - Table naming and grant profile
//! - [`storage`] - Storage traits
//! - [`store`] - The store facade
//! - [`types`] - Record types
//!
//! The PostgreSQL backend lives in the `oauth-store-postgres` crate.

pub mod config;
pub mod error;
pub mod memory;
pub mod observability;
pub mod schema;
pub mod storage;
pub mod store;
pub mod types;

pub use config::{BackendKind, LoggingConfig, PostgresSettings, StoreConfig, TableConfig};
pub use error::{ErrorKind, StoreError, StoreResult};
pub use memory::MemoryBackend;
pub use schema::{GrantProfile, TableNames};
pub use storage::{ClientStorage, GrantStorage, TokenStorage};
pub use store::OAuthStore;
pub use types::{AccessData, AuthorizeData, Client, Grant, ResolvedToken, Token, UserData};

/// Prelude module for convenient imports.
///
/// ```ignore
/// use oauth_store::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::StoreConfig;
    pub use crate::error::{ErrorKind, StoreError, StoreResult};
    pub use crate::schema::{GrantProfile, TableNames};
    pub use crate::storage::{ClientStorage, GrantStorage, TokenStorage};
    pub use crate::store::OAuthStore;
    pub use crate::types::{
        AccessData, AuthorizeData, Client, Grant, ResolvedToken, Token, UserData,
    };
}
