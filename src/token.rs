//! Manage session json web tokens.

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ServerError};

const DEFAULT_AUDIENCE: &str = "microblog";
/// Lifetime of an access token, in seconds.
pub const EXPIRATION_TIME: u64 = 60 * 60;

/// Pieces of information asserted on a JWT.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Claims {
    /// Recipients that the JWT is intended for.
    pub aud: String,
    /// Identifies the expiration time on or after which the JWT must not be
    /// accepted for processing.
    pub exp: u64,
    /// Identifies the time at which the JWT was issued.
    pub iat: u64,
    /// Identifies the instance that issued the JWT.
    pub iss: String,
    /// User ID.
    pub sub: String,
}

impl Claims {
    /// ID of the authenticated user.
    pub fn user_id(&self) -> Result<i64> {
        self.sub.parse().map_err(|_| ServerError::Unauthorized)
    }
}

/// Manage JWT tokens signed with the instance secret key.
#[derive(Clone)]
pub struct TokenManager {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    name: String,
    audience: String,
}

impl TokenManager {
    /// Create a new [`TokenManager`] instance.
    pub fn new(name: &str, secret_key: &str) -> Self {
        Self {
            algorithm: Algorithm::HS256,
            encoding_key: EncodingKey::from_secret(secret_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret_key.as_bytes()),
            name: name.to_owned(),
            audience: DEFAULT_AUDIENCE.to_owned(),
        }
    }

    /// Create a new access token for `user_id`.
    pub fn create(&self, user_id: i64) -> Result<String> {
        let time = chrono::Utc::now().timestamp().max(0) as u64;
        let claims = Claims {
            aud: self.audience.clone(),
            exp: time + EXPIRATION_TIME,
            iat: time,
            iss: self.name.clone(),
            sub: user_id.to_string(),
        };

        Ok(encode(&Header::new(self.algorithm), &claims, &self.encoding_key)?)
    }

    /// Decode and check a token.
    pub fn decode(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(self.algorithm);
        validation.set_audience(&[&self.audience]);
        validation.set_issuer(&[&self.name]);

        Ok(decode::<Claims>(token, &self.decoding_key, &validation)?.claims)
    }
}
