/// Offsec Program - Database connection pool setup.
///
/// Uses diesel-async with deadpool for async PostgreSQL connection pooling.
/// One pooled connection is taken per request and returned on drop; no
/// cross-request transaction is ever held open.
use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::deadpool::{Object, Pool};
use secrecy::ExposeSecret;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Database connection pool type (async, no background threads).
pub type DbPool = Pool<AsyncPgConnection>;

/// Database connection type (pooled async connection).
pub type DbConnection = Object<AsyncPgConnection>;

/// Create a new database connection pool.
pub fn create_pool(config: &Config) -> AppResult<DbPool> {
    let manager =
        AsyncDieselConnectionManager::<AsyncPgConnection>::new(config.database.url.expose_secret());

    let pool = Pool::builder(manager)
        .max_size(config.database.max_connections as usize)
        .build()
        .map_err(|e| AppError::Config(format!("Failed to create database pool: {}", e)))?;

    tracing::info!(
        "Database pool created with max {} connections",
        config.database.max_connections
    );

    Ok(pool)
}

/// Get a connection from the pool.
///
/// A pool failure here is an infrastructure error, not a domain error.
pub async fn get_connection(pool: &DbPool) -> AppResult<DbConnection> {
    pool.get().await.map_err(|e| {
        AppError::Internal(anyhow::anyhow!("Failed to get database connection: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_pool_type_exists() {
        // Verify the type aliases compile correctly
        fn _check_pool(_pool: &DbPool) {}
        fn _check_conn(_conn: &DbConnection) {}
    }
}
