use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

// Application error taxonomy. Every fallible layer returns this; the
// IntoResponse impl below maps variants onto HTTP status codes.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("invalid status value '{0}'")]
    InvalidStatus(String),

    #[error("{0}")]
    BadRequest(&'static str),

    #[error("email already in use")]
    EmailAlreadyExists,

    #[error("phone number already in use")]
    PhoneAlreadyExists,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid token")]
    InvalidToken,

    #[error("forbidden")]
    Forbidden,

    #[error("user not found")]
    UserNotFound,

    #[error("assignee not found or not an employee")]
    AssigneeNotFound,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("database error")]
    DatabaseError(#[from] sqlx::Error),

    #[error("internal server error")]
    InternalServerError(#[from] anyhow::Error),

    #[error("bcrypt error: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Return the full per-field breakdown for validator errors.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "One or more fields are invalid.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InvalidStatus(value) => {
                let body = Json(json!({
                    "error": format!("'{}' is not a valid status value.", value),
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::BadRequest(message) => {
                let body = Json(json!({ "error": message }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::EmailAlreadyExists => (StatusCode::CONFLICT, "This email is already in use."),
            AppError::PhoneAlreadyExists => {
                (StatusCode::CONFLICT, "This phone number is already in use.")
            }
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid email or password."),
            AppError::InvalidToken => {
                (StatusCode::UNAUTHORIZED, "Missing or invalid authentication token.")
            }
            AppError::Forbidden => {
                (StatusCode::FORBIDDEN, "You are not allowed to perform this action.")
            }
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "User not found."),
            AppError::AssigneeNotFound => {
                (StatusCode::NOT_FOUND, "Assignee not found or is not an employee.")
            }
            AppError::NotFound(entity) => {
                let body = Json(json!({ "error": format!("{} not found.", entity) }));
                return (StatusCode::NOT_FOUND, body).into_response();
            }

            // Everything else (DatabaseError, InternalServerError, ...) is a 500.
            // The detailed message goes to the log, never to the client.
            ref e => {
                tracing::error!("internal server error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "An unexpected error occurred.")
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
