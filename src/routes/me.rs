/// Current-user Route
///
/// Identity comes exclusively from the auth gate's context, never from the
/// request payload.

use actix_web::{web, HttpResponse};
use serde::Serialize;
use sqlx::PgPool;

use crate::auth::{require_identity, AuthContext};
use crate::error::{AppError, AuthError};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub ok: bool,
    pub user: MeBody,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeBody {
    pub id: String,
    pub email: String,
    pub username: String,
    pub created_at: String,
    pub updated_at: String,
}

/// GET /api/me
pub async fn get_me(
    ctx: Option<web::ReqData<AuthContext>>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let ctx = require_identity(ctx)?;

    let user = crate::users::find_by_id(pool.get_ref(), ctx.user_id)
        .await?
        .ok_or(AppError::Auth(AuthError::InvalidAccessToken))?;

    Ok(HttpResponse::Ok().json(MeResponse {
        ok: true,
        user: MeBody {
            id: user.id.to_string(),
            email: user.email,
            username: user.username,
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
        },
    }))
}
