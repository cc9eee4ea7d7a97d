//! Database connection pool and migration management.
//!
//! This module provides utilities for:
//! - Creating and managing a SQLite connection pool
//! - Running database migrations automatically
//! - Seeding the first administrator account

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};

/// Type alias for the SQLite connection pool.
///
/// Instead of writing `Pool<Sqlite>` everywhere, we can use `DbPool`.
pub type DbPool = Pool<Sqlite>;

/// Open (or create) the SQLite database behind a connection pool.
///
/// A connection pool maintains multiple database connections that can be
/// reused across HTTP requests. The file is created on first start so a
/// fresh deployment works without manual setup.
///
/// # Arguments
///
/// * `database_url` - SQLite connection string, e.g. `sqlite:database.db`
///
/// # Errors
///
/// Returns an error if the connection string is invalid or the database
/// file cannot be opened.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    SqlitePoolOptions::new()
        // Limit concurrent connections
        .max_connections(5)
        .connect_with(options)
        .await
}

/// Open an in-memory database for storage tests.
///
/// A single connection, because every SQLite `:memory:` connection is its
/// own private database.
#[cfg(test)]
pub async fn create_pool_in_memory() -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
}

/// Run database migrations from the `migrations/` directory.
///
/// This function executes all SQL migration files in order. Migrations are
/// tracked in a special `_sqlx_migrations` table, so each migration runs
/// only once.
///
/// # Errors
///
/// Returns an error if migration files cannot be read or a statement fails.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    // The macro reads migrations at compile time from ./migrations directory
    sqlx::migrate!("./migrations").run(pool).await
}

/// Seed the first administrator when the admins table is empty.
///
/// Returns `true` when an account was created. Deployments that already
/// have any admin rows are left untouched, so the configured bootstrap
/// credentials stop mattering after first start.
pub async fn ensure_bootstrap_admin(
    pool: &DbPool,
    username: &str,
    password: &str,
) -> anyhow::Result<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admins")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Ok(false);
    }

    let pwhash = crate::password::hash_password(password)
        .map_err(|e| anyhow::anyhow!("failed to hash bootstrap admin password: {e}"))?;

    // The first admin gets the adminTab privilege; it can create the rest.
    sqlx::query("INSERT INTO admins (username, pwhash, adminTab) VALUES (?, ?, 1)")
        .bind(username)
        .bind(pwhash)
        .execute(pool)
        .await?;

    Ok(true)
}
