use sqlx::{Pool, Sqlite, sqlite::SqlitePool};
use std::sync::Arc;

pub type DbPool = Arc<Pool<Sqlite>>;

pub async fn create_pool(database_url: &str) -> anyhow::Result<DbPool> {
    let pool = SqlitePool::connect(database_url).await?;
    run_migrations(&pool).await?;
    Ok(Arc::new(pool))
}

pub async fn run_migrations(pool: &Pool<Sqlite>) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

// In-memory SQLite gives every pooled connection its own database, so
// tests run against a throwaway file instead.
#[cfg(test)]
pub async fn test_pool() -> DbPool {
    let path = std::env::temp_dir().join(format!("sharelock-test-{}.db", uuid::Uuid::new_v4()));
    create_pool(&format!("sqlite://{}?mode=rwc", path.display()))
        .await
        .expect("Failed to create test pool")
}
