use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Maps the CREATE TYPE user_role from the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Employee,
}

// A user row from the database.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    // Immutable after creation.
    pub email: String,

    #[serde(skip_serializing)]
    pub password_hash: String,

    pub role: Role,
    pub phone: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The authenticated identity performing an operation. Built once by the
/// auth middleware and passed explicitly into every service call; nothing
/// below the handlers ever reads identity from ambient state.
#[derive(Debug, Clone, Copy)]
pub struct ActorContext {
    pub id: Uuid,
    pub role: Role,
}

impl ActorContext {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserPayload {
    #[validate(length(min = 1, message = "name is required"))]
    #[schema(example = "Priya Sharma")]
    pub name: String,

    #[validate(email(message = "invalid email"))]
    #[schema(example = "priya@example.com")]
    pub email: String,

    #[validate(length(min = 6, message = "password must have at least 6 characters"))]
    pub password: String,

    pub role: Role,

    #[schema(example = "9876543210")]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginUserPayload {
    #[validate(email(message = "invalid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "password must have at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

// Claims carried inside the JWT.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,   // user id
    pub role: Role,  // snapshot of the role at issue time
    pub exp: usize,  // expiration
    pub iat: usize,  // issued at
}
