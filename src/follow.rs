//! Directed follower → followed relation between users.

use serde::Serialize;
use sqlx::SqliteConnection;

use crate::error::Result;
use crate::pagination::{Page, limit_offset};
use crate::user::User;

/// User listed on a followers/followed page.
#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
pub struct Relation {
    pub id: i64,
    pub username: String,
}

impl User {
    /// Follow `target`. Nothing happens if the edge already exists.
    ///
    /// Returns whether an edge was created.
    pub async fn follow(
        &self,
        conn: &mut SqliteConnection,
        target: &User,
    ) -> Result<bool> {
        if self.is_following(conn, target).await? {
            return Ok(false);
        }

        sqlx::query(
            r#"INSERT INTO follows (follower_id, followed_id) VALUES ($1, $2)"#,
        )
        .bind(self.id)
        .bind(target.id)
        .execute(conn)
        .await?;

        Ok(true)
    }

    /// Stop following `target`. Nothing happens if no edge exists.
    ///
    /// Returns whether an edge was removed.
    pub async fn unfollow(
        &self,
        conn: &mut SqliteConnection,
        target: &User,
    ) -> Result<bool> {
        if !self.is_following(conn, target).await? {
            return Ok(false);
        }

        sqlx::query(
            r#"DELETE FROM follows WHERE follower_id = $1 AND followed_id = $2"#,
        )
        .bind(self.id)
        .bind(target.id)
        .execute(conn)
        .await?;

        Ok(true)
    }

    pub async fn is_following(
        &self,
        conn: &mut SqliteConnection,
        target: &User,
    ) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"SELECT EXISTS(
                SELECT 1 FROM follows WHERE follower_id = $1 AND followed_id = $2
            )"#,
        )
        .bind(self.id)
        .bind(target.id)
        .fetch_one(conn)
        .await?;

        Ok(exists)
    }

    /// Number of users `self` follows.
    pub async fn followed_count(&self, conn: &mut SqliteConnection) -> Result<i64> {
        let count = sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM follows WHERE follower_id = $1"#,
        )
        .bind(self.id)
        .fetch_one(conn)
        .await?;

        Ok(count)
    }

    /// Number of users following `self`.
    pub async fn follower_count(&self, conn: &mut SqliteConnection) -> Result<i64> {
        let count = sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM follows WHERE followed_id = $1"#,
        )
        .bind(self.id)
        .fetch_one(conn)
        .await?;

        Ok(count)
    }

    /// Users `self` follows, by username.
    pub async fn followed(
        &self,
        conn: &mut SqliteConnection,
        page: u32,
        per_page: u32,
    ) -> Result<Page<Relation>> {
        let (limit, offset) = limit_offset(page, per_page);
        let users = sqlx::query_as::<_, Relation>(
            r#"SELECT u.id, u.username FROM follows f
                JOIN users u ON u.id = f.followed_id
                WHERE f.follower_id = $1
                ORDER BY u.username
                LIMIT $2 OFFSET $3"#,
        )
        .bind(self.id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *conn)
        .await?;

        let total = self.followed_count(conn).await?;
        Ok(Page::new(users, page, per_page, total))
    }

    /// Users following `self`, by username.
    pub async fn followers(
        &self,
        conn: &mut SqliteConnection,
        page: u32,
        per_page: u32,
    ) -> Result<Page<Relation>> {
        let (limit, offset) = limit_offset(page, per_page);
        let users = sqlx::query_as::<_, Relation>(
            r#"SELECT u.id, u.username FROM follows f
                JOIN users u ON u.id = f.follower_id
                WHERE f.followed_id = $1
                ORDER BY u.username
                LIMIT $2 OFFSET $3"#,
        )
        .bind(self.id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *conn)
        .await?;

        let total = self.follower_count(conn).await?;
        Ok(Page::new(users, page, per_page, total))
    }
}
