// src/handlers/followups.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedActor,
    models::{
        followup::{FollowUp, FollowUpCounts, FollowUpStats, FollowUpType},
        task::TaskPriority,
    },
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFollowUpPayload {
    pub lead_id: Uuid,
    pub assigned_to: Uuid,
    #[schema(value_type = String, format = Date, example = "2026-09-15")]
    pub scheduled_date: NaiveDate,
    #[schema(value_type = Option<String>, example = "14:30:00")]
    pub scheduled_time: Option<NaiveTime>,
    #[serde(rename = "type")]
    pub followup_type: FollowUpType,
    #[serde(default = "default_priority")]
    pub priority: TaskPriority,
    pub notes: Option<String>,
}

fn default_priority() -> TaskPriority {
    TaskPriority::Medium
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFollowUpPayload {
    #[schema(value_type = Option<String>, format = Date)]
    pub scheduled_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>)]
    pub scheduled_time: Option<NaiveTime>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(as = FollowUpStatusPayload)]
pub struct StatusPayload {
    #[schema(example = "completed")]
    pub status: String,
}

// GET /api/followups
#[utoipa::path(
    get,
    path = "/api/followups",
    tag = "FollowUps",
    responses((status = 200, description = "Follow-ups visible to the caller", body = Vec<FollowUp>)),
    security(("api_jwt" = []))
)]
pub async fn list_followups(
    State(app_state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
) -> Result<impl IntoResponse, AppError> {
    let followups = app_state.followup_service.list(&actor).await?;
    Ok(Json(followups))
}

// POST /api/followups
#[utoipa::path(
    post,
    path = "/api/followups",
    tag = "FollowUps",
    request_body = CreateFollowUpPayload,
    responses(
        (status = 201, description = "Follow-up scheduled", body = FollowUp),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Lead or assignee missing")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_followup(
    State(app_state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Json(payload): Json<CreateFollowUpPayload>,
) -> Result<impl IntoResponse, AppError> {
    let followup = app_state
        .followup_service
        .create(
            &actor,
            payload.lead_id,
            payload.assigned_to,
            payload.scheduled_date,
            payload.scheduled_time,
            payload.followup_type,
            payload.priority,
            payload.notes,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(followup)))
}

// PUT /api/followups/{id}/status
#[utoipa::path(
    put,
    path = "/api/followups/{id}/status",
    tag = "FollowUps",
    request_body = StatusPayload,
    responses(
        (status = 200, description = "Status overwritten", body = FollowUp),
        (status = 400, description = "Unknown status value")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_followup_status(
    State(app_state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let followup = app_state
        .followup_service
        .transition_status(&actor, id, &payload.status)
        .await?;
    Ok(Json(followup))
}

// PUT /api/followups/{id}
#[utoipa::path(
    put,
    path = "/api/followups/{id}",
    tag = "FollowUps",
    request_body = UpdateFollowUpPayload,
    responses((status = 200, description = "Follow-up updated", body = FollowUp)),
    security(("api_jwt" = []))
)]
pub async fn update_followup(
    State(app_state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateFollowUpPayload>,
) -> Result<impl IntoResponse, AppError> {
    let followup = app_state
        .followup_service
        .update(
            &actor,
            id,
            payload.scheduled_date,
            payload.scheduled_time,
            payload.notes,
        )
        .await?;
    Ok(Json(followup))
}

// DELETE /api/followups/{id}
#[utoipa::path(
    delete,
    path = "/api/followups/{id}",
    tag = "FollowUps",
    responses((status = 204, description = "Follow-up deleted")),
    security(("api_jwt" = []))
)]
pub async fn delete_followup(
    State(app_state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.followup_service.delete(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/followups/stats
#[utoipa::path(
    get,
    path = "/api/followups/stats",
    tag = "FollowUps",
    responses((status = 200, description = "Per-status totals", body = FollowUpStats)),
    security(("api_jwt" = []))
)]
pub async fn followup_stats(
    State(app_state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
) -> Result<impl IntoResponse, AppError> {
    let stats = app_state.followup_service.stats(&actor).await?;
    Ok(Json(stats))
}

// GET /api/followups/counts
#[utoipa::path(
    get,
    path = "/api/followups/counts",
    tag = "FollowUps",
    responses((status = 200, description = "Schedule-relative totals", body = FollowUpCounts)),
    security(("api_jwt" = []))
)]
pub async fn followup_counts(
    State(app_state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
) -> Result<impl IntoResponse, AppError> {
    let counts = app_state.followup_service.counts(&actor).await?;
    Ok(Json(counts))
}
