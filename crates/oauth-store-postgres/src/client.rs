//! OAuth client storage.
//!
//! Low-level operations on the client table. The `ClientStorage` trait from
//! `oauth-store` is implemented by [`crate::adapters::ArcClientStorage`].

use oauth_store::error::{StoreError, StoreResult};
use oauth_store::{Client, UserData};
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use tracing::{debug, instrument};

use crate::PgPool;
use crate::error::{insert_error, storage_error};

/// Client row: id, secret, redirect_uri, user_data.
type ClientTuple = (String, String, String, String);

fn client_from_tuple(row: ClientTuple) -> Client {
    Client {
        id: row.0,
        secret: row.1,
        redirect_uri: row.2,
        user_data: UserData::from_column(row.3),
    }
}

/// Client storage operations on one table.
pub struct ClientStorage<'a> {
    pool: &'a PgPool,
    table: &'a str,
}

impl<'a> ClientStorage<'a> {
    /// Create a new client storage over `table`.
    #[must_use]
    pub fn new(pool: &'a PgPool, table: &'a str) -> Self {
        Self { pool, table }
    }

    /// Find a client by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    #[instrument(skip(self), fields(table = %self.table))]
    pub async fn find_by_id(&self, id: &str) -> StoreResult<Option<Client>> {
        let sql = format!(
            r#"SELECT id, secret, redirect_uri, user_data FROM "{}" WHERE id = $1"#,
            self.table
        );
        let row: Option<ClientTuple> = query_as(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(storage_error)?;

        Ok(row.map(client_from_tuple))
    }

    /// Insert a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A client with the same id already exists
    /// - The database insert fails
    #[instrument(skip(self, client), fields(table = %self.table, client_id = %client.id))]
    pub async fn create(&self, client: &Client) -> StoreResult<()> {
        let sql = format!(
            r#"INSERT INTO "{}" (id, secret, redirect_uri, user_data) VALUES ($1, $2, $3, $4)"#,
            self.table
        );
        query(&sql)
            .bind(&client.id)
            .bind(&client.secret)
            .bind(&client.redirect_uri)
            .bind(UserData::to_column(client.user_data.as_ref()))
            .execute(self.pool)
            .await
            .map_err(|e| insert_error(e, || format!("Client '{}' already exists", client.id)))?;

        debug!("Client stored");
        Ok(())
    }

    /// Delete a client.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The client doesn't exist
    /// - The database delete fails
    #[instrument(skip(self), fields(table = %self.table))]
    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        let sql = format!(r#"DELETE FROM "{}" WHERE id = $1"#, self.table);
        let result = query(&sql)
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(storage_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(format!("Client {id}")));
        }

        debug!("Client removed");
        Ok(())
    }
}
