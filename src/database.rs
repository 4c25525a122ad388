//! database (db) union structure.
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub const DEFAULT_POOL_SIZE: u32 = 5;

/// Custom db structure to pass to Axum.
#[derive(Clone)]
pub struct Database {
    pub sqlite: SqlitePool,
}

impl Database {
    /// Init database connections.
    pub async fn new(path: &str, pool: u32) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().max_connections(pool);
        let sqlite = pool.connect_with(options).await?;

        tracing::info!(%path, "sqlite opened");

        Ok(Self { sqlite })
    }
}

#[cfg(test)]
pub(crate) async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("cannot open in-memory sqlite");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("cannot run migrations");

    pool
}
