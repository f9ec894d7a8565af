/// Access Token Generation and Validation
///
/// Short-lived HS256 tokens carrying user identity. Stateless: there is no
/// revocation list, the short TTL bounds exposure after logout or rotation.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::Claims;
use crate::configuration::AuthSettings;
use crate::error::{AppError, AuthError};

/// Generate a new access token for a user
///
/// Expiry is `now + access_token_expiry` seconds from configuration.
///
/// # Errors
/// Returns error if token encoding fails.
pub fn generate_access_token(
    user_id: &Uuid,
    email: &str,
    username: &str,
    config: &AuthSettings,
) -> Result<String, AppError> {
    let claims = Claims::new(
        *user_id,
        email.to_string(),
        username.to_string(),
        config.access_token_expiry,
    );

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.access_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

/// Validate an access token and extract its claims
///
/// # Errors
/// - `ACCESS_TOKEN_EXPIRED` when the signature is valid but the token is
///   past its expiry (no leeway).
/// - `INVALID_ACCESS_TOKEN` for bad signatures, malformed tokens, and
///   missing claim fields.
pub fn validate_access_token(token: &str, config: &AuthSettings) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp"]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.access_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::Auth(AuthError::AccessTokenExpired),
        _ => {
            tracing::warn!("Access token validation error: {}", e);
            AppError::Auth(AuthError::InvalidAccessToken)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_test_config() -> AuthSettings {
        AuthSettings {
            access_secret: "test-secret-key-at-least-32-characters-long".to_string(),
            access_token_expiry: 900,
            refresh_token_expiry_days: 7,
            cookie_name: "refreshToken".to_string(),
            cookie_secure: false,
            cookie_same_site: "lax".to_string(),
        }
    }

    #[test]
    fn test_generate_and_validate_token() {
        let config = get_test_config();
        let user_id = Uuid::new_v4();

        let token = generate_access_token(&user_id, "a@b.com", "a", &config)
            .expect("Failed to generate token");
        let claims = validate_access_token(&token, &config).expect("Failed to validate token");

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "a@b.com");
        assert_eq!(claims.username, "a");
    }

    #[test]
    fn test_expired_token_has_expiry_specific_error() {
        let config = get_test_config();
        let claims = Claims::new(
            Uuid::new_v4(),
            "a@b.com".to_string(),
            "a".to_string(),
            -60, // already expired
        );
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.access_secret.as_bytes()),
        )
        .unwrap();

        match validate_access_token(&token, &config) {
            Err(AppError::Auth(AuthError::AccessTokenExpired)) => {}
            other => panic!("expected AccessTokenExpired, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_token() {
        let config = get_test_config();
        match validate_access_token("invalid.token.here", &config) {
            Err(AppError::Auth(AuthError::InvalidAccessToken)) => {}
            other => panic!("expected InvalidAccessToken, got {:?}", other),
        }
    }

    #[test]
    fn test_tampered_token() {
        let config = get_test_config();
        let token = generate_access_token(&Uuid::new_v4(), "a@b.com", "a", &config)
            .expect("Failed to generate token");

        let tampered = format!("{}X", token);
        match validate_access_token(&tampered, &config) {
            Err(AppError::Auth(AuthError::InvalidAccessToken)) => {}
            other => panic!("expected InvalidAccessToken, got {:?}", other),
        }
    }

    #[test]
    fn test_wrong_secret() {
        let config = get_test_config();
        let token = generate_access_token(&Uuid::new_v4(), "a@b.com", "a", &config)
            .expect("Failed to generate token");

        let mut other_config = get_test_config();
        other_config.access_secret = "a-completely-different-signing-secret!!".to_string();
        assert!(validate_access_token(&token, &other_config).is_err());
    }

    #[test]
    fn test_token_missing_claims_is_invalid() {
        let config = get_test_config();

        // Token signed with the right secret but without the identity claims
        #[derive(serde::Serialize)]
        struct Bare {
            exp: i64,
        }
        let token = encode(
            &Header::default(),
            &Bare {
                exp: chrono::Utc::now().timestamp() + 900,
            },
            &EncodingKey::from_secret(config.access_secret.as_bytes()),
        )
        .unwrap();

        match validate_access_token(&token, &config) {
            Err(AppError::Auth(AuthError::InvalidAccessToken)) => {}
            other => panic!("expected InvalidAccessToken, got {:?}", other),
        }
    }
}
