// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Leads ---
        handlers::leads::list_leads,
        handlers::leads::create_lead,
        handlers::leads::update_lead,
        handlers::leads::delete_lead,
        handlers::leads::update_lead_status,
        handlers::leads::assign_lead,
        handlers::leads::reassign_lead,
        handlers::leads::bulk_import,
        handlers::leads::bulk_delete,
        handlers::leads::add_communication,
        handlers::leads::add_comment,
        handlers::leads::list_comments,

        // --- FollowUps ---
        handlers::followups::list_followups,
        handlers::followups::create_followup,
        handlers::followups::update_followup,
        handlers::followups::update_followup_status,
        handlers::followups::delete_followup,
        handlers::followups::followup_stats,
        handlers::followups::followup_counts,

        // --- Tasks ---
        handlers::tasks::list_tasks,
        handlers::tasks::create_task,
        handlers::tasks::update_task_status,
        handlers::tasks::add_task_comment,
        handlers::tasks::delete_task,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Leads ---
            models::lead::LeadStatus,
            models::lead::Lead,
            models::lead::ImportRow,
            models::lead::ImportIssue,
            models::lead::ImportReport,
            handlers::leads::CreateLeadPayload,
            handlers::leads::UpdateLeadPayload,
            handlers::leads::StatusPayload,
            handlers::leads::AssignPayload,
            handlers::leads::BulkImportPayload,
            handlers::leads::BulkDeletePayload,
            handlers::leads::CommunicationPayload,
            handlers::leads::CommentPayload,

            // --- Activity ---
            models::activity::CommunicationType,
            models::activity::Communication,
            models::activity::Comment,

            // --- FollowUps ---
            models::followup::FollowUpStatus,
            models::followup::FollowUpType,
            models::followup::FollowUp,
            models::followup::FollowUpStats,
            models::followup::FollowUpCounts,
            handlers::followups::CreateFollowUpPayload,
            handlers::followups::UpdateFollowUpPayload,
            handlers::followups::StatusPayload,

            // --- Tasks ---
            models::task::TaskStatus,
            models::task::TaskPriority,
            models::task::Task,
            handlers::tasks::CreateTaskPayload,
            handlers::tasks::StatusPayload,
            handlers::tasks::CommentPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Authentication and accounts"),
        (name = "Leads", description = "Lead lifecycle: status, assignment, import, activity"),
        (name = "FollowUps", description = "Scheduled contact actions"),
        (name = "Tasks", description = "Assignable units of work")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_status_and_comment_payload_gets_its_own_schema() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components are generated");

        for name in [
            "StatusPayload",
            "FollowUpStatusPayload",
            "TaskStatusPayload",
            "CommentPayload",
            "TaskCommentPayload",
        ] {
            assert!(components.schemas.contains_key(name), "missing schema {name}");
        }
    }
}
