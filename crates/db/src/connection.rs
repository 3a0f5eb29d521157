use std::time::Duration;

use sqlx::sqlite::{SqliteConnection, SqlitePoolOptions};

pub type DbPool = sqlx::SqlitePool;

pub async fn connect(database_url: &str) -> Result<DbPool, sqlx::Error> {
    connect_with_settings(database_url, 5, 30).await
}

/// Opens the SQLite pool the meeting store runs on. The participant and
/// response tables hang off `meetings` by foreign key, so referential
/// enforcement is switched on per connection; WAL keeps write stalls
/// short when concurrent acknowledgments hit the same meeting.
pub async fn connect_with_settings(
    database_url: &str,
    max_connections: u32,
    timeout_secs: u64,
) -> Result<DbPool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(Duration::from_secs(timeout_secs.max(1)))
        .after_connect(|conn, _meta| Box::pin(configure_connection(conn)))
        .connect(database_url)
        .await
}

async fn configure_connection(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    let pragmas =
        ["PRAGMA foreign_keys = ON", "PRAGMA journal_mode = WAL", "PRAGMA busy_timeout = 5000"];
    for pragma in pragmas {
        sqlx::query(pragma).execute(&mut *conn).await?;
    }
    Ok(())
}
