// src/handlers/tasks.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedActor,
    models::{
        activity::Comment,
        task::{Task, TaskPriority},
    },
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskPayload {
    #[validate(length(min = 1, message = "title is required"))]
    #[schema(example = "Call back enrolled students")]
    pub title: String,

    pub description: Option<String>,

    /// Zero or more employee ids.
    #[serde(default)]
    pub assigned_to: Vec<Uuid>,

    #[serde(default = "default_priority")]
    pub priority: TaskPriority,

    #[schema(value_type = Option<String>, format = Date)]
    pub due_date: Option<NaiveDate>,

    #[serde(rename = "type")]
    pub task_type: Option<String>,
}

fn default_priority() -> TaskPriority {
    TaskPriority::Medium
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(as = TaskStatusPayload)]
pub struct StatusPayload {
    #[schema(example = "in-progress")]
    pub status: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(as = TaskCommentPayload)]
pub struct CommentPayload {
    #[validate(length(min = 1, message = "message is required"))]
    pub message: String,
}

// GET /api/tasks
#[utoipa::path(
    get,
    path = "/api/tasks",
    tag = "Tasks",
    responses((status = 200, description = "Tasks visible to the caller", body = Vec<Task>)),
    security(("api_jwt" = []))
)]
pub async fn list_tasks(
    State(app_state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
) -> Result<impl IntoResponse, AppError> {
    let tasks = app_state.task_service.list(&actor).await?;
    Ok(Json(tasks))
}

// POST /api/tasks
#[utoipa::path(
    post,
    path = "/api/tasks",
    tag = "Tasks",
    request_body = CreateTaskPayload,
    responses(
        (status = 201, description = "Task created", body = Task),
        (status = 404, description = "An assignee is missing or not an employee")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_task(
    State(app_state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Json(payload): Json<CreateTaskPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let task = app_state
        .task_service
        .create(
            &actor,
            payload.title,
            payload.description,
            payload.assigned_to,
            payload.priority,
            payload.due_date,
            payload.task_type,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(task)))
}

// PUT /api/tasks/{id}/status
#[utoipa::path(
    put,
    path = "/api/tasks/{id}/status",
    tag = "Tasks",
    request_body = StatusPayload,
    responses(
        (status = 200, description = "Status overwritten", body = Task),
        (status = 400, description = "Unknown status value")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_task_status(
    State(app_state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let task = app_state
        .task_service
        .transition_status(&actor, id, &payload.status)
        .await?;
    Ok(Json(task))
}

// POST /api/tasks/{id}/comments
#[utoipa::path(
    post,
    path = "/api/tasks/{id}/comments",
    tag = "Tasks",
    request_body = CommentPayload,
    responses((status = 201, description = "Comment appended", body = Comment)),
    security(("api_jwt" = []))
)]
pub async fn add_task_comment(
    State(app_state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(id): Path<Uuid>,
    Json(payload): Json<CommentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let comment = app_state
        .task_service
        .add_comment(&actor, id, &payload.message)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

// DELETE /api/tasks/{id}
#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    tag = "Tasks",
    responses(
        (status = 204, description = "Task deleted"),
        (status = 403, description = "Caller is not an admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_task(
    State(app_state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.task_service.delete(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
