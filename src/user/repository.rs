//! Handle database requests.

use chrono::Utc;
use sqlx::SqliteConnection;

use crate::error::Result;
use crate::user::User;

impl User {
    /// Insert [`User`] into database and set its `id`.
    pub async fn insert(&mut self, conn: &mut SqliteConnection) -> Result<()> {
        let result = sqlx::query(
            r#"INSERT INTO users (username, email, password_hash, about_me, last_seen)
                VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(&self.username)
        .bind(&self.email)
        .bind(&self.password_hash)
        .bind(&self.about_me)
        .bind(self.last_seen)
        .execute(conn)
        .await?;

        self.id = result.last_insert_rowid();
        Ok(())
    }

    /// Find a user using `id` field.
    pub async fn find_by_id(
        conn: &mut SqliteConnection,
        id: i64,
    ) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&get_by_field_query(Field::Id))
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(user)
    }

    /// Find a user using `username` field.
    pub async fn find_by_username(
        conn: &mut SqliteConnection,
        username: &str,
    ) -> Result<Option<User>> {
        let user =
            sqlx::query_as::<_, User>(&get_by_field_query(Field::Username))
                .bind(username)
                .fetch_optional(conn)
                .await?;

        Ok(user)
    }

    /// Whether `username` is already taken.
    pub async fn username_exists(
        conn: &mut SqliteConnection,
        username: &str,
    ) -> Result<bool> {
        exists(conn, Field::Username, username).await
    }

    /// Whether `email` is already taken.
    pub async fn email_exists(
        conn: &mut SqliteConnection,
        email: &str,
    ) -> Result<bool> {
        exists(conn, Field::Email, email).await
    }

    /// Save `username` and `about_me`.
    pub async fn update_profile(&self, conn: &mut SqliteConnection) -> Result<()> {
        sqlx::query(r#"UPDATE users SET username = $1, about_me = $2 WHERE id = $3"#)
            .bind(&self.username)
            .bind(&self.about_me)
            .bind(self.id)
            .execute(conn)
            .await?;

        Ok(())
    }

    /// Save the password hash set by [`User::set_password`].
    pub async fn update_password(
        &self,
        conn: &mut SqliteConnection,
    ) -> Result<()> {
        sqlx::query(r#"UPDATE users SET password_hash = $1 WHERE id = $2"#)
            .bind(&self.password_hash)
            .bind(self.id)
            .execute(conn)
            .await?;

        Ok(())
    }

    /// Refresh `last_seen` to now.
    pub async fn touch(&mut self, conn: &mut SqliteConnection) -> Result<()> {
        let now = Utc::now();
        sqlx::query(r#"UPDATE users SET last_seen = $1 WHERE id = $2"#)
            .bind(now)
            .bind(self.id)
            .execute(conn)
            .await?;

        self.last_seen = now;
        Ok(())
    }

    /// Delete user. Posts and follow edges go with it.
    pub async fn delete(self, conn: &mut SqliteConnection) -> Result<()> {
        sqlx::query(r#"DELETE FROM users WHERE id = $1"#)
            .bind(self.id)
            .execute(conn)
            .await?;

        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Id,
    Username,
    Email,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Field::Id => write!(f, "id"),
            Field::Username => write!(f, "username"),
            Field::Email => write!(f, "email"),
        }
    }
}

fn get_by_field_query(field: Field) -> String {
    format!(
        r#"SELECT id, username, email, password_hash, about_me, last_seen
            FROM users
            WHERE {field} = $1"#
    )
}

async fn exists(
    conn: &mut SqliteConnection,
    field: Field,
    value: &str,
) -> Result<bool> {
    let query = format!(r#"SELECT EXISTS(SELECT 1 FROM users WHERE {field} = $1)"#);
    let exists: bool = sqlx::query_scalar(&query)
        .bind(value)
        .fetch_one(conn)
        .await?;

    Ok(exists)
}

#[cfg(test)]
mod tests {
    use sqlx::SqlitePool;

    use super::*;
    use crate::crypto::test_manager;

    #[sqlx::test]
    async fn test_create_and_find(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let pwd = test_manager();

        let user = User::builder()
            .username("jane")
            .email("jane@email.com")
            .create(&mut conn, &pwd, "secret")
            .await
            .unwrap();
        assert!(user.id > 0);

        let found = User::find_by_username(&mut conn, "jane")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.email, "jane@email.com");
        assert!(found.validate_password(&pwd, "secret"));

        let by_id = User::find_by_id(&mut conn, user.id).await.unwrap();
        assert_eq!(by_id.map(|u| u.username), Some("jane".to_owned()));

        assert!(User::find_by_username(&mut conn, "nobody").await.unwrap().is_none());
    }

    #[sqlx::test]
    async fn test_exists(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        User::builder()
            .username("jane")
            .email("jane@email.com")
            .build()
            .insert(&mut conn)
            .await
            .unwrap();

        assert!(User::username_exists(&mut conn, "jane").await.unwrap());
        assert!(User::email_exists(&mut conn, "jane@email.com").await.unwrap());
        assert!(!User::username_exists(&mut conn, "john").await.unwrap());
        // Uniqueness is case-sensitive.
        assert!(!User::username_exists(&mut conn, "Jane").await.unwrap());
    }

    #[sqlx::test]
    async fn test_duplicate_username_is_rejected(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut first = User::builder()
            .username("jane")
            .email("jane@email.com")
            .build();
        first.insert(&mut conn).await.unwrap();

        let mut second = User::builder()
            .username("jane")
            .email("other@email.com")
            .build();
        let err = second.insert(&mut conn).await.unwrap_err();
        match err {
            crate::error::ServerError::Sql(err) => {
                assert!(crate::error::is_unique_violation(&err))
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[sqlx::test]
    async fn test_update_profile_and_password(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let pwd = test_manager();
        let mut user = User::builder()
            .username("jane")
            .email("jane@email.com")
            .create(&mut conn, &pwd, "first")
            .await
            .unwrap();

        user.username = "janet".into();
        user.about_me = Some("hello".into());
        user.update_profile(&mut conn).await.unwrap();

        user.set_password(&pwd, "second").unwrap();
        user.update_password(&mut conn).await.unwrap();

        let found = User::find_by_id(&mut conn, user.id).await.unwrap().unwrap();
        assert_eq!(found.username, "janet");
        assert_eq!(found.about_me.as_deref(), Some("hello"));
        assert!(found.validate_password(&pwd, "second"));
        assert!(!found.validate_password(&pwd, "first"));
    }

    #[sqlx::test]
    async fn test_touch(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut user = User::builder()
            .username("jane")
            .email("jane@email.com")
            .build();
        user.last_seen = Utc::now() - chrono::Duration::days(1);
        user.insert(&mut conn).await.unwrap();
        let before = user.last_seen;

        user.touch(&mut conn).await.unwrap();
        assert!(user.last_seen > before);

        let found = User::find_by_id(&mut conn, user.id).await.unwrap().unwrap();
        assert_eq!(found.last_seen, user.last_seen);
    }
}
