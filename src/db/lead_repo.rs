use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::lead::{Lead, LeadStatus},
};

/// Field set for inserting a lead, shared by single creation and bulk import.
#[derive(Debug, Clone)]
pub struct NewLead {
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub phone_digits: String,
    pub status: LeadStatus,
    pub source: Option<String>,
    pub course: Option<String>,
    pub notes: Option<String>,
}

/// Mutable contact/detail fields for PUT /leads/:id.
#[derive(Debug, Clone)]
pub struct LeadUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub source: Option<String>,
    pub course: Option<String>,
    pub notes: Option<String>,
}

#[derive(Clone)]
pub struct LeadRepository {
    pool: PgPool,
}

impl LeadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Lead>, AppError> {
        let lead = sqlx::query_as::<_, Lead>("SELECT * FROM leads WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(lead)
    }

    pub async fn list_all(&self) -> Result<Vec<Lead>, AppError> {
        let leads = sqlx::query_as::<_, Lead>("SELECT * FROM leads ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(leads)
    }

    pub async fn list_assigned_to(&self, user_id: Uuid) -> Result<Vec<Lead>, AppError> {
        let leads = sqlx::query_as::<_, Lead>(
            "SELECT * FROM leads WHERE assigned_to = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(leads)
    }

    /// Every normalized phone already in the store, for import deduplication.
    pub async fn all_phone_digits(&self) -> Result<Vec<String>, AppError> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT phone_digits FROM leads")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(d,)| d).collect())
    }

    pub async fn insert(&self, lead: &NewLead) -> Result<Lead, AppError> {
        sqlx::query_as::<_, Lead>(
            r#"
            INSERT INTO leads (name, email, phone, phone_digits, status, source, course, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&lead.name)
        .bind(&lead.email)
        .bind(&lead.phone)
        .bind(&lead.phone_digits)
        .bind(lead.status)
        .bind(&lead.source)
        .bind(&lead.course)
        .bind(&lead.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    // Two unique columns; the constraint name tells them apart.
                    let constraint = db_err.constraint().unwrap_or_default();
                    if constraint.contains("phone") {
                        return AppError::PhoneAlreadyExists;
                    }
                    return AppError::EmailAlreadyExists;
                }
            }
            e.into()
        })
    }

    pub async fn update_details(&self, id: Uuid, update: &LeadUpdate) -> Result<Lead, AppError> {
        sqlx::query_as::<_, Lead>(
            r#"
            UPDATE leads SET
                name   = COALESCE($2, name),
                email  = COALESCE($3, email),
                source = COALESCE($4, source),
                course = COALESCE($5, course),
                notes  = COALESCE($6, notes),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.email)
        .bind(&update.source)
        .bind(&update.course)
        .bind(&update.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::EmailAlreadyExists;
                }
            }
            e.into()
        })
    }

    /// Overwrites the status and refreshes last_contact. Last write wins:
    /// there is no version check, concurrent updates race at the store.
    pub async fn set_status(&self, id: Uuid, status: LeadStatus) -> Result<Lead, AppError> {
        let lead = sqlx::query_as::<_, Lead>(
            r#"
            UPDATE leads
            SET status = $2, last_contact = $3, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(lead)
    }

    pub async fn set_assignee(&self, id: Uuid, assignee: Uuid) -> Result<Lead, AppError> {
        let lead = sqlx::query_as::<_, Lead>(
            r#"
            UPDATE leads
            SET assigned_to = $2, last_contact = $3, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(assignee)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(lead)
    }

    pub async fn touch_last_contact(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE leads SET last_contact = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM leads WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM leads WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
