//! Password hashing.

use argon2::password_hash::{
    PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::{Argon2, Params, Version};
use rand::rngs::OsRng;

use crate::config::Argon2 as ArgonConfig;

const OUTPUT_LENGTH: usize = 32;

type Result<T> = std::result::Result<T, CryptoError>;

#[derive(thiserror::Error, Debug)]
pub enum CryptoError {
    #[error("argon2 error: {0}")]
    Argon2(String),
}

/// Password manager that uses Argon2id and PHC string format for hashing and
/// verification.
///
/// The salt travels inside the PHC string, so a stored hash is enough to
/// verify a candidate password later.
pub struct PasswordManager {
    params: Params,
}

impl PasswordManager {
    /// Create a new [`PasswordManager`].
    pub fn new(config: Option<ArgonConfig>) -> Result<Self> {
        let config = config.unwrap_or_default();

        let params = Params::new(
            config.memory_cost,
            config.iterations,
            config.parallelism,
            Some(OUTPUT_LENGTH),
        )
        .map_err(|err| CryptoError::Argon2(err.to_string()))?;

        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'_> {
        Argon2::new(
            argon2::Algorithm::Argon2id,
            Version::V0x13,
            self.params.clone(),
        )
    }

    /// Hash password using Argon2id with a fresh random salt.
    pub fn hash_password(&self, password: impl AsRef<[u8]>) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_ref(), &salt)
            .map_err(|e| CryptoError::Argon2(e.to_string()))?;

        Ok(hash.to_string())
    }

    /// Verify password against a PHC.
    ///
    /// A malformed PHC string never matches.
    pub fn verify_password(
        &self,
        password: impl AsRef<[u8]>,
        phc_hash: &str,
    ) -> bool {
        let Ok(parsed) = PasswordHash::new(phc_hash) else {
            return false;
        };

        self.argon2()
            .verify_password(password.as_ref(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
pub(crate) fn test_manager() -> PasswordManager {
    PasswordManager::new(Some(ArgonConfig {
        memory_cost: 1024,
        iterations: 1,
        parallelism: 1,
    }))
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let pwd = test_manager();

        let hash = pwd.hash_password("test").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(pwd.verify_password("test", &hash));
        assert!(!pwd.verify_password("wrong_password", &hash));
    }

    #[test]
    fn test_salt_is_random() {
        let pwd = test_manager();

        let first = pwd.hash_password("same").unwrap();
        let second = pwd.hash_password("same").unwrap();
        assert_ne!(first, second);
        assert!(pwd.verify_password("same", &first));
        assert!(pwd.verify_password("same", &second));
    }

    #[test]
    fn test_malformed_hash() {
        let pwd = test_manager();
        assert!(!pwd.verify_password("test", "not a phc string"));
        assert!(!pwd.verify_password("test", ""));
    }

    #[test]
    fn test_invalid_params() {
        let config = ArgonConfig {
            memory_cost: 1,
            iterations: 0,
            parallelism: 0,
        };
        assert!(PasswordManager::new(Some(config)).is_err());
    }
}
