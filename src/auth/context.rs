/// Verified request identity
///
/// Built by the auth gate from validated access-token claims and attached
/// to the request. Immutable; handlers read it, they never write it, and
/// they never trust client-supplied identity fields instead.

use actix_web::web::ReqData;
use uuid::Uuid;

use crate::auth::claims::Claims;
use crate::error::{AppError, AuthError};

#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub email: String,
    pub username: String,
}

impl AuthContext {
    pub fn from_claims(claims: &Claims) -> Result<Self, AppError> {
        Ok(Self {
            user_id: claims.user_id()?,
            email: claims.email.clone(),
            username: claims.username.clone(),
        })
    }
}

/// Resolve the identity context on a gated route.
///
/// Absence means the gate did not run; that is an invariant violation and
/// surfaces as 401, never as an implicit anonymous identity.
pub fn require_identity(ctx: Option<ReqData<AuthContext>>) -> Result<AuthContext, AppError> {
    ctx.map(ReqData::into_inner)
        .ok_or(AppError::Auth(AuthError::MissingIdentity))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_from_claims() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, "a@b.com".to_string(), "a".to_string(), 900);

        let ctx = AuthContext::from_claims(&claims).unwrap();
        assert_eq!(ctx.user_id, user_id);
        assert_eq!(ctx.email, "a@b.com");
        assert_eq!(ctx.username, "a");
    }

    #[test]
    fn test_missing_context_is_unauthorized() {
        match require_identity(None) {
            Err(AppError::Auth(AuthError::MissingIdentity)) => {}
            other => panic!("expected MissingIdentity, got {:?}", other),
        }
    }
}
