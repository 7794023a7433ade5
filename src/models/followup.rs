use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::task::TaskPriority;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "followup_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FollowUpStatus {
    Scheduled,
    Completed,
    Missed,
    Rescheduled,
}

impl FromStr for FollowUpStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(FollowUpStatus::Scheduled),
            "completed" => Ok(FollowUpStatus::Completed),
            "missed" => Ok(FollowUpStatus::Missed),
            "rescheduled" => Ok(FollowUpStatus::Rescheduled),
            other => Err(AppError::InvalidStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "followup_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FollowUpType {
    Call,
    Email,
    Whatsapp,
    Meeting,
}

// Lead contact fields are denormalized at creation time and never re-synced;
// lead_id may point at a lead that has since been deleted.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FollowUp {
    pub id: Uuid,
    pub lead_id: Option<Uuid>,
    pub lead_name: String,
    pub lead_phone: String,
    pub lead_email: Option<String>,
    pub assigned_to: Uuid,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: Option<NaiveTime>,
    pub followup_type: FollowUpType,
    pub priority: TaskPriority,
    pub status: FollowUpStatus,
    pub notes: Option<String>,
    pub course: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-status totals for GET /api/followups/stats.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpStats {
    pub scheduled: i64,
    pub completed: i64,
    pub missed: i64,
    pub rescheduled: i64,
    pub today: i64,
}

/// Schedule-relative totals for GET /api/followups/counts.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpCounts {
    pub total: i64,
    pub today: i64,
    pub overdue: i64,
    pub upcoming: i64,
}
