use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// Append-only activity records. Communications and comments live in their own
// tables keyed by parent id and are read back with explicit limit/offset,
// never embedded in the parent document.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "communication_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CommunicationType {
    Call,
    Email,
    Whatsapp,
    Meeting,
    Other,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Communication {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub comm_type: CommunicationType,
    pub message: String,
    pub actor_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub message: String,
    pub actor_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Paging window for activity-log reads.
#[derive(Debug, Clone, Copy, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct LogPage {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl LogPage {
    const DEFAULT_LIMIT: i64 = 50;
    const MAX_LIMIT: i64 = 200;

    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_page_clamps_limit() {
        let page = LogPage { limit: Some(10_000), offset: Some(-3) };
        assert_eq!(page.limit(), 200);
        assert_eq!(page.offset(), 0);

        let page = LogPage { limit: None, offset: None };
        assert_eq!(page.limit(), 50);
        assert_eq!(page.offset(), 0);
    }
}
