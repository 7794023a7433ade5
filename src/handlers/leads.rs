// src/handlers/leads.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    db::lead_repo::LeadUpdate,
    middleware::auth::AuthenticatedActor,
    models::{
        activity::{Comment, Communication, CommunicationType, LogPage},
        lead::{ImportReport, ImportRow, Lead},
    },
};

// =============================================================================
//  CRUD
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadPayload {
    #[validate(length(min = 1, message = "name is required"))]
    #[schema(example = "Ravi Kumar")]
    pub name: String,

    #[validate(email(message = "invalid email"))]
    pub email: Option<String>,

    #[validate(length(min = 1, message = "phone is required"))]
    #[schema(example = "9876543210")]
    pub phone: String,

    #[schema(example = "new")]
    pub status: Option<String>,
    pub source: Option<String>,
    pub course: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeadPayload {
    pub name: Option<String>,
    #[validate(email(message = "invalid email"))]
    pub email: Option<String>,
    pub source: Option<String>,
    pub course: Option<String>,
    pub notes: Option<String>,
}

// GET /api/leads
#[utoipa::path(
    get,
    path = "/api/leads",
    tag = "Leads",
    responses((status = 200, description = "Leads visible to the caller", body = Vec<Lead>)),
    security(("api_jwt" = []))
)]
pub async fn list_leads(
    State(app_state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
) -> Result<impl IntoResponse, AppError> {
    let leads = app_state.lead_service.list(&actor).await?;
    Ok(Json(leads))
}

// POST /api/leads
#[utoipa::path(
    post,
    path = "/api/leads",
    tag = "Leads",
    request_body = CreateLeadPayload,
    responses(
        (status = 201, description = "Lead created", body = Lead),
        (status = 409, description = "Duplicate email or phone")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_lead(
    State(app_state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Json(payload): Json<CreateLeadPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let lead = app_state
        .lead_service
        .create(
            &actor,
            payload.name,
            payload.email,
            payload.phone,
            payload.status,
            payload.source,
            payload.course,
            payload.notes,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(lead)))
}

// PUT /api/leads/{id}
#[utoipa::path(
    put,
    path = "/api/leads/{id}",
    tag = "Leads",
    request_body = UpdateLeadPayload,
    responses(
        (status = 200, description = "Lead updated", body = Lead),
        (status = 403, description = "Caller is not the assignee")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_lead(
    State(app_state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLeadPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let update = LeadUpdate {
        name: payload.name,
        email: payload.email,
        source: payload.source,
        course: payload.course,
        notes: payload.notes,
    };
    let lead = app_state.lead_service.update(&actor, id, update).await?;
    Ok(Json(lead))
}

// DELETE /api/leads/{id}
#[utoipa::path(
    delete,
    path = "/api/leads/{id}",
    tag = "Leads",
    responses(
        (status = 204, description = "Lead deleted"),
        (status = 403, description = "Caller is not an admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_lead(
    State(app_state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.lead_service.delete(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  Lifecycle: status and assignment
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusPayload {
    /// Must be a member of the lead status enum; anything else is a 400.
    #[schema(example = "contacted")]
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignPayload {
    pub user_id: Uuid,
}

// PUT /api/leads/{id}/status
#[utoipa::path(
    put,
    path = "/api/leads/{id}/status",
    tag = "Leads",
    request_body = StatusPayload,
    responses(
        (status = 200, description = "Status overwritten", body = Lead),
        (status = 400, description = "Unknown status value")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_lead_status(
    State(app_state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let lead = app_state
        .lead_service
        .transition_status(&actor, id, &payload.status)
        .await?;
    Ok(Json(lead))
}

// PUT /api/leads/{id}/assign
#[utoipa::path(
    put,
    path = "/api/leads/{id}/assign",
    tag = "Leads",
    request_body = AssignPayload,
    responses(
        (status = 200, description = "Lead assigned", body = Lead),
        (status = 404, description = "Target is missing or not an employee")
    ),
    security(("api_jwt" = []))
)]
pub async fn assign_lead(
    State(app_state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignPayload>,
) -> Result<impl IntoResponse, AppError> {
    let lead = app_state
        .lead_service
        .assign(&actor, id, payload.user_id)
        .await?;
    Ok(Json(lead))
}

// PUT /api/leads/{id}/reassign
#[utoipa::path(
    put,
    path = "/api/leads/{id}/reassign",
    tag = "Leads",
    request_body = AssignPayload,
    responses(
        (status = 200, description = "Lead reassigned", body = Lead),
        (status = 404, description = "Target is missing or not an employee")
    ),
    security(("api_jwt" = []))
)]
pub async fn reassign_lead(
    State(app_state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignPayload>,
) -> Result<impl IntoResponse, AppError> {
    let lead = app_state
        .lead_service
        .reassign(&actor, id, payload.user_id)
        .await?;
    Ok(Json(lead))
}

// =============================================================================
//  Bulk operations
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkImportPayload {
    pub leads: Vec<ImportRow>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeletePayload {
    pub lead_ids: Vec<Uuid>,
}

// POST /api/leads/bulk-import
#[utoipa::path(
    post,
    path = "/api/leads/bulk-import",
    tag = "Leads",
    request_body = BulkImportPayload,
    responses(
        // Partial failure by design: the breakdown is the contract.
        (status = 200, description = "Per-row import breakdown", body = ImportReport)
    ),
    security(("api_jwt" = []))
)]
pub async fn bulk_import(
    State(app_state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Json(payload): Json<BulkImportPayload>,
) -> Result<impl IntoResponse, AppError> {
    let report = app_state
        .lead_service
        .bulk_import(&actor, payload.leads)
        .await?;
    Ok(Json(report))
}

// POST /api/leads/bulk-delete
#[utoipa::path(
    post,
    path = "/api/leads/bulk-delete",
    tag = "Leads",
    request_body = BulkDeletePayload,
    responses((status = 200, description = "Number of leads deleted")),
    security(("api_jwt" = []))
)]
pub async fn bulk_delete(
    State(app_state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Json(payload): Json<BulkDeletePayload>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = app_state
        .lead_service
        .bulk_delete(&actor, &payload.lead_ids)
        .await?;
    Ok(Json(serde_json::json!({ "deleted": deleted })))
}

// =============================================================================
//  Activity log
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommunicationPayload {
    #[serde(rename = "type")]
    #[schema(example = "call")]
    pub comm_type: CommunicationType,

    #[validate(length(min = 1, message = "message is required"))]
    pub message: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentPayload {
    #[validate(length(min = 1, message = "message is required"))]
    pub message: String,
}

// POST /api/leads/{id}/communications
#[utoipa::path(
    post,
    path = "/api/leads/{id}/communications",
    tag = "Leads",
    request_body = CommunicationPayload,
    responses((status = 201, description = "Communication logged", body = Communication)),
    security(("api_jwt" = []))
)]
pub async fn add_communication(
    State(app_state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(id): Path<Uuid>,
    Json(payload): Json<CommunicationPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let comm = app_state
        .lead_service
        .add_communication(&actor, id, payload.comm_type, &payload.message)
        .await?;
    Ok((StatusCode::CREATED, Json(comm)))
}

// POST /api/leads/{id}/comments
#[utoipa::path(
    post,
    path = "/api/leads/{id}/comments",
    tag = "Leads",
    request_body = CommentPayload,
    responses((status = 201, description = "Comment appended", body = Comment)),
    security(("api_jwt" = []))
)]
pub async fn add_comment(
    State(app_state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(id): Path<Uuid>,
    Json(payload): Json<CommentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let comment = app_state
        .lead_service
        .add_comment(&actor, id, &payload.message)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

// GET /api/leads/{id}/comments
#[utoipa::path(
    get,
    path = "/api/leads/{id}/comments",
    tag = "Leads",
    params(LogPage),
    responses((status = 200, description = "Comment window, newest first", body = Vec<Comment>)),
    security(("api_jwt" = []))
)]
pub async fn list_comments(
    State(app_state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(id): Path<Uuid>,
    Query(page): Query<LogPage>,
) -> Result<impl IntoResponse, AppError> {
    let comments = app_state.lead_service.comments(&actor, id, page).await?;
    Ok(Json(comments))
}
