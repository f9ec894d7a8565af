/// Task Routes
///
/// CRUD over the authenticated user's tasks. Every query is scoped by the
/// gate-provided user id; a task belonging to someone else is
/// indistinguishable from a missing one (404).

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{require_identity, AuthContext};
use crate::error::{AppError, ValidationError};

const MAX_TITLE_LENGTH: usize = 200;
const MAX_DESCRIPTION_LENGTH: usize = 5000;

#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Deserialize)]
pub struct ListTasksQuery {
    pub completed: Option<bool>,
}

fn validate_title(title: &str) -> Result<String, AppError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(ValidationError::EmptyField(
            "title".to_string(),
        )));
    }
    if trimmed.len() > MAX_TITLE_LENGTH {
        return Err(AppError::Validation(ValidationError::TooLong(
            "title".to_string(),
            MAX_TITLE_LENGTH,
        )));
    }
    Ok(trimmed.to_string())
}

fn validate_description(description: &str) -> Result<(), AppError> {
    if description.len() > MAX_DESCRIPTION_LENGTH {
        return Err(AppError::Validation(ValidationError::TooLong(
            "description".to_string(),
            MAX_DESCRIPTION_LENGTH,
        )));
    }
    Ok(())
}

/// POST /api/tasks
pub async fn create_task(
    ctx: Option<web::ReqData<AuthContext>>,
    form: web::Json<CreateTaskRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let ctx = require_identity(ctx)?;
    let title = validate_title(&form.title)?;
    if let Some(description) = &form.description {
        validate_description(description)?;
    }

    let now = Utc::now();
    let task = sqlx::query_as::<_, Task>(
        r#"
        INSERT INTO tasks (id, user_id, title, description, completed, created_at, updated_at)
        VALUES ($1, $2, $3, $4, false, $5, $6)
        RETURNING id, user_id, title, description, completed, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(ctx.user_id)
    .bind(&title)
    .bind(&form.description)
    .bind(now)
    .bind(now)
    .fetch_one(pool.get_ref())
    .await?;

    Ok(HttpResponse::Created().json(serde_json::json!({ "ok": true, "task": task })))
}

/// GET /api/tasks?completed=true|false
pub async fn list_tasks(
    ctx: Option<web::ReqData<AuthContext>>,
    query: web::Query<ListTasksQuery>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let ctx = require_identity(ctx)?;

    let tasks = sqlx::query_as::<_, Task>(
        r#"
        SELECT id, user_id, title, description, completed, created_at, updated_at
        FROM tasks
        WHERE user_id = $1 AND ($2::bool IS NULL OR completed = $2)
        ORDER BY created_at DESC
        "#,
    )
    .bind(ctx.user_id)
    .bind(query.completed)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "ok": true, "tasks": tasks })))
}

/// GET /api/tasks/{id}
pub async fn get_task(
    ctx: Option<web::ReqData<AuthContext>>,
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let ctx = require_identity(ctx)?;
    let task_id = path.into_inner();

    let task = sqlx::query_as::<_, Task>(
        r#"
        SELECT id, user_id, title, description, completed, created_at, updated_at
        FROM tasks
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(task_id)
    .bind(ctx.user_id)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| AppError::NotFound("task".to_string()))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "ok": true, "task": task })))
}

/// PATCH /api/tasks/{id}
///
/// Partial update; omitted fields keep their current value.
pub async fn update_task(
    ctx: Option<web::ReqData<AuthContext>>,
    path: web::Path<Uuid>,
    form: web::Json<UpdateTaskRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let ctx = require_identity(ctx)?;
    let task_id = path.into_inner();

    let title = match &form.title {
        Some(title) => Some(validate_title(title)?),
        None => None,
    };
    if let Some(description) = &form.description {
        validate_description(description)?;
    }

    let task = sqlx::query_as::<_, Task>(
        r#"
        UPDATE tasks
        SET title = COALESCE($1, title),
            description = COALESCE($2, description),
            completed = COALESCE($3, completed),
            updated_at = $4
        WHERE id = $5 AND user_id = $6
        RETURNING id, user_id, title, description, completed, created_at, updated_at
        "#,
    )
    .bind(title)
    .bind(&form.description)
    .bind(form.completed)
    .bind(Utc::now())
    .bind(task_id)
    .bind(ctx.user_id)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| AppError::NotFound("task".to_string()))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "ok": true, "task": task })))
}

/// DELETE /api/tasks/{id}
pub async fn delete_task(
    ctx: Option<web::ReqData<AuthContext>>,
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let ctx = require_identity(ctx)?;
    let task_id = path.into_inner();

    let result = sqlx::query(
        r#"
        DELETE FROM tasks
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(task_id)
    .bind(ctx.user_id)
    .execute(pool.get_ref())
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("task".to_string()));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({ "ok": true })))
}
