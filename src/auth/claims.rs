/// Access Token Claims
///
/// Payload of a signed access token. Ephemeral: signed, transmitted,
/// verified, discarded; never persisted.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AuthError};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    pub email: String,
    pub username: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, email: String, username: String, expiry_seconds: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            email,
            username,
            exp: now + expiry_seconds,
            iat: now,
        }
    }

    /// Extract the user ID from the subject claim.
    ///
    /// # Errors
    /// Returns `INVALID_ACCESS_TOKEN` if the subject is not a valid UUID.
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub).map_err(|_| AppError::Auth(AuthError::InvalidAccessToken))
    }
}
