mod builder;
mod repository;

pub use builder::*;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::avatar::AvatarResolver;
use crate::crypto::{CryptoError, PasswordManager};

/// User as saved on database.
#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip)]
    pub email: String,
    #[serde(skip)]
    pub password_hash: Option<String>,
    pub about_me: Option<String>,
    pub last_seen: DateTime<Utc>,
}

impl User {
    /// Hash `password` and keep the PHC string, replacing any previous one.
    ///
    /// Only changes the value in memory, see [`User::update_password`].
    pub fn set_password(
        &mut self,
        pwd: &PasswordManager,
        password: &str,
    ) -> Result<(), CryptoError> {
        self.password_hash = Some(pwd.hash_password(password)?);
        Ok(())
    }

    /// Check `password` against the stored hash.
    pub fn validate_password(&self, pwd: &PasswordManager, password: &str) -> bool {
        self.password_hash
            .as_deref()
            .is_some_and(|hash| pwd.verify_password(password, hash))
    }

    /// Avatar URL of `size` pixels.
    pub fn avatar(&self, resolver: &AvatarResolver, size: u32) -> String {
        resolver.url(&self.email, size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::test_manager;

    fn john() -> User {
        User::builder()
            .username("john")
            .email("john@example.com")
            .build()
    }

    #[test]
    fn test_password_hashing() {
        let pwd = test_manager();
        let mut user = john();
        user.set_password(&pwd, "test").unwrap();

        assert!(!user.validate_password(&pwd, "wrong_password"));
        assert!(user.validate_password(&pwd, "test"));
    }

    #[test]
    fn test_set_password_overwrites() {
        let pwd = test_manager();
        let mut user = john();
        user.set_password(&pwd, "first").unwrap();
        user.set_password(&pwd, "second").unwrap();

        assert!(!user.validate_password(&pwd, "first"));
        assert!(user.validate_password(&pwd, "second"));
    }

    #[test]
    fn test_no_password() {
        let pwd = test_manager();
        assert!(!john().validate_password(&pwd, ""));
    }

    #[test]
    fn test_avatar() {
        let user = User::builder()
            .username("jane")
            .email("jane@email.com")
            .build();

        assert_eq!(
            user.avatar(&AvatarResolver::default(), 128),
            "https://www.gravatar.com/avatar/00ead251b1c1bb5580ed61753d896a15?d=identicon&s=128"
        );
    }

    #[test]
    fn test_secrets_not_serialized() {
        let pwd = test_manager();
        let mut user = john();
        user.set_password(&pwd, "test").unwrap();

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("email").is_none());
        assert_eq!(json["username"], "john");
    }
}
