//! Typed builder for User.

use chrono::Utc;
use sqlx::SqliteConnection;

use crate::crypto::PasswordManager;
use crate::error::Result;
use crate::user::User;

/// [`User`] builder.
#[derive(Debug, Clone)]
pub struct UserBuilder<Username, Email> {
    username: Username,
    email: Email,
    about_me: Option<String>,
}

/// Value is missing on [`UserBuilder`].
#[derive(Debug, Clone)]
pub struct Missing;

/// Value is present on [`UserBuilder`].
#[derive(Debug, Clone)]
pub struct Present<T>(pub T);

impl User {
    /// Start building a new [`User`].
    pub fn builder() -> UserBuilder<Missing, Missing> {
        UserBuilder::new()
    }
}

impl Default for UserBuilder<Missing, Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl UserBuilder<Missing, Missing> {
    /// Create a new [`UserBuilder`].
    pub fn new() -> Self {
        Self {
            username: Missing,
            email: Missing,
            about_me: None,
        }
    }
}

impl<Email> UserBuilder<Missing, Email> {
    /// Update `username` field on [`UserBuilder`].
    pub fn username(
        self,
        username: impl Into<String>,
    ) -> UserBuilder<Present<String>, Email> {
        UserBuilder {
            username: Present(username.into()),
            email: self.email,
            about_me: self.about_me,
        }
    }
}

impl<Username> UserBuilder<Username, Missing> {
    /// Update `email` field on [`UserBuilder`].
    pub fn email(
        self,
        email: impl Into<String>,
    ) -> UserBuilder<Username, Present<String>> {
        UserBuilder {
            username: self.username,
            email: Present(email.into()),
            about_me: self.about_me,
        }
    }
}

impl<Username, Email> UserBuilder<Username, Email> {
    /// Update `about_me` field on [`UserBuilder`].
    pub fn about_me(mut self, about_me: Option<String>) -> Self {
        self.about_me = about_me;
        self
    }
}

impl UserBuilder<Present<String>, Present<String>> {
    /// Build an unsaved [`User`] without password.
    pub fn build(self) -> User {
        User {
            id: 0,
            username: self.username.0,
            email: self.email.0,
            password_hash: None,
            about_me: self.about_me,
            last_seen: Utc::now(),
        }
    }

    /// Hash `password` and save the new [`User`].
    pub async fn create(
        self,
        conn: &mut SqliteConnection,
        pwd: &PasswordManager,
        password: &str,
    ) -> Result<User> {
        let mut user = self.build();
        user.set_password(pwd, password)?;
        user.insert(conn).await?;

        Ok(user)
    }
}
