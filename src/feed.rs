//! Per-user timeline: own posts plus posts of followed users.

use sqlx::SqliteConnection;

use crate::error::Result;
use crate::pagination::{Page, limit_offset};
use crate::post::{POST_COLUMNS, Post};
use crate::user::User;

/// Posts of followed users, then own posts. A self-follow edge yields rows
/// already in the second branch, `UNION` drops them.
fn union_query() -> String {
    format!(
        r#"SELECT {POST_COLUMNS} FROM posts p
            JOIN follows f ON f.followed_id = p.user_id
            JOIN users u ON u.id = p.user_id
            WHERE f.follower_id = ?1
        UNION
        SELECT {POST_COLUMNS} FROM posts p
            JOIN users u ON u.id = p.user_id
            WHERE p.user_id = ?1"#
    )
}

/// Lazy description of a user's timeline.
///
/// Nothing is read until a method is awaited, and each call runs the query
/// again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FollowedPosts {
    user_id: i64,
}

impl User {
    /// Timeline of `self`, newest first.
    pub fn followed_posts(&self) -> FollowedPosts {
        FollowedPosts { user_id: self.id }
    }
}

impl FollowedPosts {
    /// Every post of the timeline.
    pub async fn all(&self, conn: &mut SqliteConnection) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            "{} ORDER BY timestamp DESC, id DESC",
            union_query()
        ))
        .bind(self.user_id)
        .fetch_all(conn)
        .await?;

        Ok(posts)
    }

    /// Number of posts on the timeline.
    pub async fn count(&self, conn: &mut SqliteConnection) -> Result<i64> {
        let count =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM ({})", union_query()))
                .bind(self.user_id)
                .fetch_one(conn)
                .await?;

        Ok(count)
    }

    /// One page of the timeline.
    pub async fn page(
        &self,
        conn: &mut SqliteConnection,
        page: u32,
        per_page: u32,
    ) -> Result<Page<Post>> {
        let (limit, offset) = limit_offset(page, per_page);
        let posts = sqlx::query_as::<_, Post>(&format!(
            "{} ORDER BY timestamp DESC, id DESC LIMIT ?2 OFFSET ?3",
            union_query()
        ))
        .bind(self.user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *conn)
        .await?;

        let total = self.count(conn).await?;
        Ok(Page::new(posts, page, per_page, total))
    }
}
