use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::activity::{Comment, Communication, CommunicationType},
};

// Append-only logs for communications and comments. Writes are inserts only;
// reads always carry an explicit window so a busy lead never turns into an
// unbounded payload.
#[derive(Clone)]
pub struct ActivityRepository {
    pool: PgPool,
}

impl ActivityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn append_communication(
        &self,
        lead_id: Uuid,
        comm_type: CommunicationType,
        message: &str,
        actor_id: Uuid,
    ) -> Result<Communication, AppError> {
        let comm = sqlx::query_as::<_, Communication>(
            r#"
            INSERT INTO lead_communications (lead_id, comm_type, message, actor_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(lead_id)
        .bind(comm_type)
        .bind(message)
        .bind(actor_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(comm)
    }

    pub async fn append_lead_comment(
        &self,
        lead_id: Uuid,
        message: &str,
        actor_id: Uuid,
    ) -> Result<Comment, AppError> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO lead_comments (lead_id, message, actor_id)
            VALUES ($1, $2, $3)
            RETURNING id, message, actor_id, created_at
            "#,
        )
        .bind(lead_id)
        .bind(message)
        .bind(actor_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(comment)
    }

    pub async fn lead_comments(
        &self,
        lead_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Comment>, AppError> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, message, actor_id, created_at
            FROM lead_comments
            WHERE lead_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(lead_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }

    pub async fn append_task_comment(
        &self,
        task_id: Uuid,
        message: &str,
        actor_id: Uuid,
    ) -> Result<Comment, AppError> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO task_comments (task_id, message, actor_id)
            VALUES ($1, $2, $3)
            RETURNING id, message, actor_id, created_at
            "#,
        )
        .bind(task_id)
        .bind(message)
        .bind(actor_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(comment)
    }
}
