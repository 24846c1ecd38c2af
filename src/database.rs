//! database (db) structure.
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, Transaction};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://microblog.db?mode=rwc";
pub const DEFAULT_POOL_SIZE: u32 = 10;

/// Custom db structure to pass to Axum.
#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    /// Init database connections.
    pub async fn new(url: &str, pool: u32) -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(pool)
            .connect(url)
            .await?;

        tracing::info!(%url, "database connected");

        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Execute migrations scripts.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!().run(&self.pool).await
    }

    /// Open the transaction of a mutating request.
    ///
    /// Dropping it without [`Transaction::commit`] rolls it back.
    pub async fn begin(
        &self,
    ) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
        self.pool.begin().await
    }

    /// Take a connection for read-only requests.
    pub async fn acquire(&self) -> Result<PoolConnection<Sqlite>, sqlx::Error> {
        self.pool.acquire().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::post::{NewPost, Post};
    use crate::user::User;

    #[sqlx::test]
    async fn test_dropped_transaction_rolls_back(pool: SqlitePool) {
        let db = Database::from_pool(pool);

        let mut jane = User::builder()
            .username("jane")
            .email("jane@example.com")
            .build();
        jane.insert(&mut *db.acquire().await.unwrap()).await.unwrap();

        {
            let mut tx = db.begin().await.unwrap();
            NewPost::new(jane.id, "lost").insert(&mut tx).await.unwrap();

            let mut duplicate = User::builder()
                .username("jane")
                .email("other@example.com")
                .build();
            assert!(duplicate.insert(&mut tx).await.is_err());
        }

        let mut conn = db.acquire().await.unwrap();
        let page = Post::explore(&mut conn, 1, 25).await.unwrap();
        assert_eq!(page.total, 0);
        assert!(page.items.is_empty());
    }
}
