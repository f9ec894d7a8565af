/// Authentication Routes
///
/// Signup, signin, token refresh, and logout. Responses carry the access
/// token in the body; the opaque refresh value travels only in an HTTP-only
/// cookie scoped to this route group.

use actix_web::cookie::{Cookie, SameSite};
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::auth::{
    generate_access_token, hash_password, verify_password, SessionManager,
};
use crate::configuration::AuthSettings;
use crate::error::{AppError, AuthError, DatabaseError};
use crate::users;
use crate::users::User;
use crate::validators::{is_valid_email, is_valid_username};

#[derive(Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct UserBody {
    pub id: String,
    pub email: String,
    pub username: String,
}

impl From<&User> for UserBody {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.clone(),
            username: user.username.clone(),
        }
    }
}

/// Issuance response: access token in the body, refresh value in a cookie.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub ok: bool,
    pub user: UserBody,
    pub access_token: String,
}

fn same_site(config: &AuthSettings) -> SameSite {
    match config.cookie_same_site.as_str() {
        "strict" => SameSite::Strict,
        "none" => SameSite::None,
        _ => SameSite::Lax,
    }
}

fn refresh_cookie(value: &str, config: &AuthSettings) -> Cookie<'static> {
    Cookie::build(config.cookie_name.clone(), value.to_string())
        .path("/api/auth")
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(same_site(config))
        .finish()
}

fn presented_refresh_token(req: &HttpRequest, config: &AuthSettings) -> Option<String> {
    req.cookie(&config.cookie_name)
        .map(|c| c.value().to_string())
}

/// POST /api/auth/signup
///
/// # Errors
/// - 400: invalid email/username/password
/// - 409: email or username already taken
pub async fn signup(
    form: web::Json<SignupRequest>,
    pool: web::Data<PgPool>,
    sessions: web::Data<SessionManager>,
    auth_config: web::Data<AuthSettings>,
) -> Result<HttpResponse, AppError> {
    let email = is_valid_email(&form.email)?;
    let username = is_valid_username(&form.username)?;
    let password_hash = hash_password(&form.password)?;

    if users::find_by_email_or_username(pool.get_ref(), &email, &username)
        .await?
        .is_some()
    {
        return Err(AppError::Database(DatabaseError::UniqueConstraintViolation(
            "Email or username already registered".to_string(),
        )));
    }

    let user = users::insert_user(pool.get_ref(), &email, &username, &password_hash).await?;

    let access_token =
        generate_access_token(&user.id, &user.email, &user.username, auth_config.get_ref())?;
    let session = sessions.create_session(user.id).await?;

    tracing::info!(user_id = %user.id, "User signed up");

    Ok(HttpResponse::Created()
        .cookie(refresh_cookie(&session.refresh_token, auth_config.get_ref()))
        .json(AuthResponse {
            ok: true,
            user: UserBody::from(&user),
            access_token,
        }))
}

/// POST /api/auth/signin
///
/// One generic `INVALID_CREDENTIALS` for both unknown email and wrong
/// password; no session is created on failure.
pub async fn signin(
    form: web::Json<SigninRequest>,
    pool: web::Data<PgPool>,
    sessions: web::Data<SessionManager>,
    auth_config: web::Data<AuthSettings>,
) -> Result<HttpResponse, AppError> {
    let email = is_valid_email(&form.email)?;

    let user = users::find_by_email(pool.get_ref(), &email)
        .await?
        .ok_or(AppError::Auth(AuthError::InvalidCredentials))?;

    if !verify_password(&form.password, &user.password_hash)? {
        return Err(AppError::Auth(AuthError::InvalidCredentials));
    }

    let access_token =
        generate_access_token(&user.id, &user.email, &user.username, auth_config.get_ref())?;
    let session = sessions.create_session(user.id).await?;

    tracing::info!(user_id = %user.id, "User signed in");

    Ok(HttpResponse::Ok()
        .cookie(refresh_cookie(&session.refresh_token, auth_config.get_ref()))
        .json(AuthResponse {
            ok: true,
            user: UserBody::from(&user),
            access_token,
        }))
}

/// POST /api/auth/refresh
///
/// Rotates the presented refresh session: the old cookie value is revoked
/// and must be discarded, the response sets its successor.
///
/// # Errors
/// - 401 `MISSING_REFRESH_TOKEN`: no cookie
/// - 401 `INVALID_REFRESH_TOKEN`: unknown value, or the user row is gone
/// - 401 `REFRESH_TOKEN_REVOKED`: value was already rotated or logged out
/// - 401 `REFRESH_TOKEN_EXPIRED`: session past its TTL
pub async fn refresh(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    sessions: web::Data<SessionManager>,
    auth_config: web::Data<AuthSettings>,
) -> Result<HttpResponse, AppError> {
    let presented = presented_refresh_token(&req, auth_config.get_ref())
        .ok_or(AppError::Auth(AuthError::MissingRefreshToken))?;

    let rotated = sessions.rotate_session(&presented).await?;

    let user = users::find_by_id(pool.get_ref(), rotated.user_id)
        .await?
        .ok_or(AppError::Auth(AuthError::InvalidRefreshToken))?;

    let access_token =
        generate_access_token(&user.id, &user.email, &user.username, auth_config.get_ref())?;

    tracing::info!(user_id = %user.id, "Refresh token rotated");

    Ok(HttpResponse::Ok()
        .cookie(refresh_cookie(&rotated.refresh_token, auth_config.get_ref()))
        .json(AuthResponse {
            ok: true,
            user: UserBody::from(&user),
            access_token,
        }))
}

/// POST /api/auth/logout
///
/// Idempotent: always 200, whether or not a live session was presented.
/// Revokes the session if one exists and clears the cookie.
pub async fn logout(
    req: HttpRequest,
    sessions: web::Data<SessionManager>,
    auth_config: web::Data<AuthSettings>,
) -> Result<HttpResponse, AppError> {
    if let Some(presented) = presented_refresh_token(&req, auth_config.get_ref()) {
        sessions.revoke_session(&presented).await?;
    }

    let mut removal = refresh_cookie("", auth_config.get_ref());
    removal.make_removal();

    Ok(HttpResponse::Ok()
        .cookie(removal)
        .json(serde_json::json!({ "ok": true })))
}
