use std::str::FromStr;

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    Error,
};
use tracing::info;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        full_name     TEXT NOT NULL,
        email         TEXT UNIQUE NOT NULL,
        password_hash TEXT NOT NULL,
        role          TEXT NOT NULL,
        college       TEXT NOT NULL,
        member_code   TEXT NOT NULL,
        created_at    TEXT NOT NULL
    )
";

/// Connect to SQLite (creating the database file if it does not exist yet)
/// and make sure the users table is present.
pub async fn init(database_url: &str) -> Result<SqlitePool, Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    migrate(&pool).await?;

    info!("Database ready at {database_url}");
    Ok(pool)
}

/// Create-if-absent schema. Split out so tests can run it against an
/// in-memory pool.
pub async fn migrate(pool: &SqlitePool) -> Result<(), Error> {
    sqlx::query(SCHEMA).execute(pool).await?;
    Ok(())
}
