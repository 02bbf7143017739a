use crate::error::AppError;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Tokens are valid for 24 hours from issuance; expiry is enforced by
/// `jsonwebtoken`'s default validation on every verify.
const TOKEN_TTL_HOURS: i64 = 24;

/// Claims carried by an issued bearer token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the user's id.
    pub sub: i32,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
    /// Issuance timestamp (seconds since epoch).
    pub iat: usize,
}

/// Signing and verification keys, built once from the configured secret and
/// injected wherever tokens are issued or checked.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issues a signed token for `user_id`, expiring in 24 hours.
    pub fn issue(&self, user_id: i32) -> Result<String, AppError> {
        let now = chrono::Utc::now();
        let expiration = now
            .checked_add_signed(chrono::Duration::hours(TOKEN_TTL_HOURS))
            .expect("valid timestamp")
            .timestamp() as usize;

        let claims = Claims {
            sub: user_id,
            exp: expiration,
            iat: now.timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Verifies signature and expiry and returns the decoded claims.
    ///
    /// A malformed token, a bad signature, and an expired token all come back
    /// as `AppError::Unauthenticated`.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| AppError::Unauthenticated(format!("Invalid token: {}", e)))
    }
}
