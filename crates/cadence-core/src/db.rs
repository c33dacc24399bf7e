use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tracing::debug;

use crate::error::CoreError;

// Re-export the pool for use in other parts of the core crate
pub use sqlx::SqlitePool as DbPool;

/// Establishes a connection pool to the SQLite database and runs migrations.
///
/// # Arguments
///
/// * `db_path` - The path to the SQLite database file.
///
/// # Returns
///
/// A `Result` containing the `SqlitePool` or a `CoreError` if the connection fails
/// or migrations cannot be run.
pub async fn establish_connection(db_path: impl AsRef<Path>) -> Result<SqlitePool, CoreError> {
    let db_path = db_path.as_ref();

    // Create the database directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    // Run migrations
    sqlx::migrate!("./migrations").run(&pool).await?;
    debug!(path = %db_path.display(), "database ready");

    Ok(pool)
}
