use chrono::{NaiveDate, NaiveTime};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        followup::{FollowUp, FollowUpCounts, FollowUpStats, FollowUpStatus, FollowUpType},
        task::TaskPriority,
    },
};

#[derive(Debug, Clone)]
pub struct NewFollowUp {
    pub lead_id: Option<Uuid>,
    pub lead_name: String,
    pub lead_phone: String,
    pub lead_email: Option<String>,
    pub assigned_to: Uuid,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: Option<NaiveTime>,
    pub followup_type: FollowUpType,
    pub priority: TaskPriority,
    pub notes: Option<String>,
    pub course: Option<String>,
    pub created_by: Uuid,
}

#[derive(Clone)]
pub struct FollowUpRepository {
    pool: PgPool,
}

impl FollowUpRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<FollowUp>, AppError> {
        let followup = sqlx::query_as::<_, FollowUp>("SELECT * FROM followups WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(followup)
    }

    pub async fn list_all(&self) -> Result<Vec<FollowUp>, AppError> {
        let followups = sqlx::query_as::<_, FollowUp>(
            "SELECT * FROM followups ORDER BY scheduled_date ASC, scheduled_time ASC NULLS LAST",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(followups)
    }

    pub async fn list_assigned_to(&self, user_id: Uuid) -> Result<Vec<FollowUp>, AppError> {
        let followups = sqlx::query_as::<_, FollowUp>(
            r#"
            SELECT * FROM followups WHERE assigned_to = $1
            ORDER BY scheduled_date ASC, scheduled_time ASC NULLS LAST
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(followups)
    }

    pub async fn insert(&self, fu: &NewFollowUp) -> Result<FollowUp, AppError> {
        let followup = sqlx::query_as::<_, FollowUp>(
            r#"
            INSERT INTO followups (
                lead_id, lead_name, lead_phone, lead_email, assigned_to,
                scheduled_date, scheduled_time, followup_type, priority,
                notes, course, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(fu.lead_id)
        .bind(&fu.lead_name)
        .bind(&fu.lead_phone)
        .bind(&fu.lead_email)
        .bind(fu.assigned_to)
        .bind(fu.scheduled_date)
        .bind(fu.scheduled_time)
        .bind(fu.followup_type)
        .bind(fu.priority)
        .bind(&fu.notes)
        .bind(&fu.course)
        .bind(fu.created_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(followup)
    }

    pub async fn set_status(&self, id: Uuid, status: FollowUpStatus) -> Result<FollowUp, AppError> {
        let followup = sqlx::query_as::<_, FollowUp>(
            "UPDATE followups SET status = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;
        Ok(followup)
    }

    pub async fn reschedule(
        &self,
        id: Uuid,
        scheduled_date: Option<NaiveDate>,
        scheduled_time: Option<NaiveTime>,
        notes: Option<&str>,
        status: Option<FollowUpStatus>,
    ) -> Result<FollowUp, AppError> {
        let followup = sqlx::query_as::<_, FollowUp>(
            r#"
            UPDATE followups SET
                scheduled_date = COALESCE($2, scheduled_date),
                scheduled_time = COALESCE($3, scheduled_time),
                notes          = COALESCE($4, notes),
                status         = COALESCE($5, status),
                updated_at     = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(scheduled_date)
        .bind(scheduled_time)
        .bind(notes)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;
        Ok(followup)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM followups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Per-status totals, scoped to one assignee unless the caller is admin.
    pub async fn stats(&self, scope: Option<Uuid>) -> Result<FollowUpStats, AppError> {
        let row: (i64, i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE status = 'scheduled'),
                COUNT(*) FILTER (WHERE status = 'completed'),
                COUNT(*) FILTER (WHERE status = 'missed'),
                COUNT(*) FILTER (WHERE status = 'rescheduled'),
                COUNT(*) FILTER (WHERE scheduled_date = CURRENT_DATE)
            FROM followups
            WHERE $1::uuid IS NULL OR assigned_to = $1
            "#,
        )
        .bind(scope)
        .fetch_one(&self.pool)
        .await?;

        Ok(FollowUpStats {
            scheduled: row.0,
            completed: row.1,
            missed: row.2,
            rescheduled: row.3,
            today: row.4,
        })
    }

    pub async fn counts(&self, scope: Option<Uuid>) -> Result<FollowUpCounts, AppError> {
        let row: (i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE scheduled_date = CURRENT_DATE),
                COUNT(*) FILTER (WHERE scheduled_date < CURRENT_DATE AND status = 'scheduled'),
                COUNT(*) FILTER (WHERE scheduled_date > CURRENT_DATE AND status = 'scheduled')
            FROM followups
            WHERE $1::uuid IS NULL OR assigned_to = $1
            "#,
        )
        .bind(scope)
        .fetch_one(&self.pool)
        .await?;

        Ok(FollowUpCounts {
            total: row.0,
            today: row.1,
            overdue: row.2,
            upcoming: row.3,
        })
    }
}
