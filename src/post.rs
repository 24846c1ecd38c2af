//! Short text entries authored by a user.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqliteConnection;

use crate::error::Result;
use crate::pagination::{Page, limit_offset};

/// Columns selected for every [`Post`] read, `p` being `posts` and `u` its
/// author.
///
/// Every column is aliased so a compound select can be ordered by name.
pub(crate) const POST_COLUMNS: &str = "p.id AS id, p.body AS body, \
    p.timestamp AS timestamp, p.user_id AS user_id, u.username AS author";

/// Post as read from database.
#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub body: String,
    pub timestamp: DateTime<Utc>,
    pub user_id: i64,
    /// Username of `user_id`.
    pub author: String,
}

/// Post not saved yet.
///
/// The timestamp is taken when the value is built, not when it is written.
#[derive(Clone, Debug)]
pub struct NewPost {
    pub body: String,
    pub timestamp: DateTime<Utc>,
    pub user_id: i64,
}

impl NewPost {
    /// Create a new post for `user_id`, timestamped now.
    pub fn new(user_id: i64, body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            timestamp: Utc::now(),
            user_id,
        }
    }

    /// Override creation time.
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Insert post and read it back with its author.
    pub async fn insert(self, conn: &mut SqliteConnection) -> Result<Post> {
        let id = sqlx::query(
            r#"INSERT INTO posts (body, timestamp, user_id) VALUES ($1, $2, $3)"#,
        )
        .bind(&self.body)
        .bind(self.timestamp)
        .bind(self.user_id)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();

        let post = sqlx::query_as::<_, Post>(&format!(
            r#"SELECT {POST_COLUMNS} FROM posts p
                JOIN users u ON u.id = p.user_id
                WHERE p.id = $1"#
        ))
        .bind(id)
        .fetch_one(conn)
        .await?;

        Ok(post)
    }
}

impl Post {
    /// Posts written by `user_id`, newest first.
    pub async fn by_author(
        conn: &mut SqliteConnection,
        user_id: i64,
        page: u32,
        per_page: u32,
    ) -> Result<Page<Post>> {
        let (limit, offset) = limit_offset(page, per_page);

        let posts = sqlx::query_as::<_, Post>(&format!(
            r#"SELECT {POST_COLUMNS} FROM posts p
                JOIN users u ON u.id = p.user_id
                WHERE p.user_id = $1
                ORDER BY p.timestamp DESC, p.id DESC
                LIMIT $2 OFFSET $3"#
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *conn)
        .await?;

        let total: i64 =
            sqlx::query_scalar(r#"SELECT COUNT(*) FROM posts WHERE user_id = $1"#)
                .bind(user_id)
                .fetch_one(conn)
                .await?;

        Ok(Page::new(posts, page, per_page, total))
    }

    /// Every post, newest first.
    pub async fn explore(
        conn: &mut SqliteConnection,
        page: u32,
        per_page: u32,
    ) -> Result<Page<Post>> {
        let (limit, offset) = limit_offset(page, per_page);

        let posts = sqlx::query_as::<_, Post>(&format!(
            r#"SELECT {POST_COLUMNS} FROM posts p
                JOIN users u ON u.id = p.user_id
                ORDER BY p.timestamp DESC, p.id DESC
                LIMIT $1 OFFSET $2"#
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *conn)
        .await?;

        let total: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM posts"#)
            .fetch_one(conn)
            .await?;

        Ok(Page::new(posts, page, per_page, total))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use sqlx::SqlitePool;

    use super::*;
    use crate::user::User;

    async fn user(conn: &mut SqliteConnection, name: &str) -> User {
        let mut user = User::builder()
            .username(name)
            .email(format!("{name}@example.com"))
            .build();
        user.insert(conn).await.unwrap();
        user
    }

    #[sqlx::test]
    async fn test_insert(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let jane = user(&mut conn, "jane").await;

        let draft = NewPost::new(jane.id, "hello world");
        let timestamp = draft.timestamp;
        let post = draft.insert(&mut conn).await.unwrap();

        assert!(post.id > 0);
        assert_eq!(post.body, "hello world");
        assert_eq!(post.author, "jane");
        assert_eq!(post.timestamp, timestamp);
    }

    #[sqlx::test]
    async fn test_by_author_and_explore(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let jane = user(&mut conn, "jane").await;
        let john = user(&mut conn, "john").await;
        let base = Utc::now();

        for (i, author) in [&jane, &john, &jane].into_iter().enumerate() {
            NewPost::new(author.id, format!("post {i}"))
                .at(base + Duration::seconds(i as i64))
                .insert(&mut conn)
                .await
                .unwrap();
        }

        let page = Post::by_author(&mut conn, jane.id, 1, 25).await.unwrap();
        let bodies: Vec<_> = page.items.iter().map(|p| p.body.as_str()).collect();
        assert_eq!(bodies, ["post 2", "post 0"]);
        assert_eq!(page.total, 2);

        let page = Post::explore(&mut conn, 1, 2).await.unwrap();
        let bodies: Vec<_> = page.items.iter().map(|p| p.body.as_str()).collect();
        assert_eq!(bodies, ["post 2", "post 1"]);
        assert_eq!(page.total, 3);
        assert!(page.has_next);

        let page = Post::explore(&mut conn, 2, 2).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].body, "post 0");
        assert!(!page.has_next);
    }

    #[sqlx::test]
    async fn test_posts_deleted_with_author(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let jane = user(&mut conn, "jane").await;
        NewPost::new(jane.id, "bye").insert(&mut conn).await.unwrap();

        jane.delete(&mut conn).await.unwrap();

        let page = Post::explore(&mut conn, 1, 25).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);
    }
}
