use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;

// Maps the CREATE TYPE lead_status from the database. The lifecycle has no
// transition graph: any status may be overwritten with any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "lead_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum LeadStatus {
    New,
    FollowUp,
    Contacted,
    Enrolled,
    NotInterested,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::FollowUp => "follow-up",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Enrolled => "enrolled",
            LeadStatus::NotInterested => "not-interested",
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Status arrives from clients as a free string; parsing is the validation.
impl FromStr for LeadStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(LeadStatus::New),
            "follow-up" => Ok(LeadStatus::FollowUp),
            "contacted" => Ok(LeadStatus::Contacted),
            "enrolled" => Ok(LeadStatus::Enrolled),
            "not-interested" => Ok(LeadStatus::NotInterested),
            other => Err(AppError::InvalidStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub status: LeadStatus,
    pub source: Option<String>,
    pub course: Option<String>,
    pub notes: Option<String>,
    pub assigned_to: Option<Uuid>,
    pub last_contact: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One candidate row of a bulk import, as uploaded.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportRow {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    pub email: Option<String>,
    pub status: Option<String>,
    pub source: Option<String>,
    pub course: Option<String>,
    pub notes: Option<String>,
}

/// A skipped or degraded row in an import report.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportIssue {
    /// 1-based position in the uploaded batch.
    pub row: usize,
    pub phone: Option<String>,
    pub reason: String,
}

/// Outcome of a bulk import. The batch never fails atomically; callers get
/// this breakdown with HTTP 200 regardless of how many rows survived.
///
/// Invariant: success_count + errors.len() + duplicates.len() == input rows.
/// Warnings describe rows that were persisted with a coerced status and are
/// already counted in success_count.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub success_count: usize,
    pub errors: Vec<ImportIssue>,
    pub duplicates: Vec<ImportIssue>,
    pub warnings: Vec<ImportIssue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_wire_value_round_trips() {
        for value in ["new", "follow-up", "contacted", "enrolled", "not-interested"] {
            let status: LeadStatus = value.parse().unwrap();
            assert_eq!(status.as_str(), value);
        }
    }

    #[test]
    fn unknown_value_is_invalid_status() {
        let err = "closed-won".parse::<LeadStatus>().unwrap_err();
        assert!(matches!(err, AppError::InvalidStatus(v) if v == "closed-won"));
    }

    #[test]
    fn parsing_is_case_sensitive() {
        assert!("Enrolled".parse::<LeadStatus>().is_err());
    }

    #[test]
    fn serialized_lead_exposes_the_display_phone_only() {
        let lead = Lead {
            id: Uuid::nil(),
            name: "Ravi Kumar".into(),
            email: None,
            phone: "+91 98765-43210".into(),
            status: LeadStatus::New,
            source: None,
            course: None,
            notes: None,
            assigned_to: None,
            last_contact: None,
            created_at: DateTime::UNIX_EPOCH,
            updated_at: DateTime::UNIX_EPOCH,
        };

        let json = serde_json::to_value(&lead).unwrap();
        assert_eq!(json["phone"], "+91 98765-43210");
        // The normalized digits live only in the database column that
        // backs dedup; they are not part of the API shape.
        assert!(json.get("phoneDigits").is_none());
    }
}
