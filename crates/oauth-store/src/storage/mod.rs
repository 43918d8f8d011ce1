//! Storage traits for the three leaf record sets.
//!
//! Each trait covers one logical table and knows nothing about the others.
//! Cross-references are plain key strings; resolving them is the job of the
//! [`OAuthStore`](crate::OAuthStore) facade.
//!
//! # Implementations
//!
//! - [`crate::memory`] - in-process backend
//! - `oauth-store-postgres` - PostgreSQL backend

pub mod client;
pub mod grant;
pub mod token;

pub use client::ClientStorage;
pub use grant::GrantStorage;
pub use token::TokenStorage;
