//! Connection pool management for the PostgreSQL storage backend.

use std::time::Duration;

use oauth_store::PostgresSettings;
use sqlx_core::pool::PoolOptions;
use sqlx_postgres::Postgres;
use tracing::{debug, info, instrument};

use crate::PgPool;
use crate::error::{PostgresError, Result};

/// Type alias for PostgreSQL pool options.
pub type PgPoolOptions = PoolOptions<Postgres>;

/// Creates a new PostgreSQL connection pool from the given settings.
///
/// Operation timeouts are the pool's acquire timeout
/// (`connect_timeout_ms`); the store adds none of its own.
#[instrument(skip(settings), fields(url = %mask_password(&settings.connection_url())))]
pub async fn create_pool(settings: &PostgresSettings) -> Result<PgPool> {
    info!(
        pool_size = settings.pool_size,
        min_connections = settings.min_connections,
        connect_timeout_ms = settings.connect_timeout_ms,
        max_lifetime_secs = ?settings.max_lifetime_secs,
        "Creating PostgreSQL connection pool"
    );

    if settings.pool_size == 0 {
        return Err(PostgresError::config("pool_size must be > 0"));
    }

    let mut options = PgPoolOptions::new()
        .max_connections(settings.pool_size)
        .min_connections(settings.min_connections.min(settings.pool_size))
        .acquire_timeout(Duration::from_millis(settings.connect_timeout_ms))
        .test_before_acquire(false);

    if let Some(idle_timeout) = settings.idle_timeout_ms {
        options = options.idle_timeout(Duration::from_millis(idle_timeout));
    }
    if let Some(max_lifetime) = settings.max_lifetime_secs {
        options = options.max_lifetime(Duration::from_secs(max_lifetime));
    }

    let pool = options.connect(&settings.connection_url()).await?;

    debug!("PostgreSQL connection pool created successfully");

    Ok(pool)
}

/// Masks the password in a database URL for logging.
///
/// The userinfo ends at the last `@` before the host, so passwords that
/// contain `@` or `:` are masked in full.
pub(crate) fn mask_password(url: &str) -> String {
    let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
    let authority_end = url[scheme_end..]
        .find('/')
        .map_or(url.len(), |p| scheme_end + p);

    if let Some(at_pos) = url[scheme_end..authority_end].rfind('@').map(|p| scheme_end + p)
        && let Some(colon_pos) = url[scheme_end..at_pos].find(':').map(|p| scheme_end + p)
    {
        return format!("{}:****{}", &url[..colon_pos], &url[at_pos..]);
    }
    url.to_string()
}
