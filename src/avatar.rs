//! Gravatar-style avatar URLs.

use md5::{Digest, Md5};

/// Default avatar service.
pub const DEFAULT_SERVICE: &str = "https://www.gravatar.com";
/// Image served when the service knows no custom avatar for the hash.
const DEFAULT_IMAGE: &str = "identicon";

/// Resolve avatar URLs on a gravatar-compatible service.
#[derive(Debug, Clone)]
pub struct AvatarResolver {
    service: String,
}

impl Default for AvatarResolver {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE)
    }
}

impl AvatarResolver {
    /// Create a new [`AvatarResolver`] for the service at `service`.
    pub fn new(service: impl Into<String>) -> Self {
        let service = service.into();
        Self {
            service: service.trim_end_matches('/').to_owned(),
        }
    }

    /// URL of the `size` pixels avatar linked to `email`.
    pub fn url(&self, email: &str, size: u32) -> String {
        format!(
            "{}/avatar/{}?d={DEFAULT_IMAGE}&s={size}",
            self.service,
            email_digest(email)
        )
    }
}

/// Hex MD5 digest of the trimmed, lower-cased email.
pub fn email_digest(email: &str) -> String {
    let email = email.trim().to_lowercase();
    hex::encode(Md5::digest(email.as_bytes()))
}
