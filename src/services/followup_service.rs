use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{FollowUpRepository, LeadRepository, UserRepository, followup_repo::NewFollowUp},
    models::{
        auth::ActorContext,
        followup::{FollowUp, FollowUpCounts, FollowUpStats, FollowUpStatus, FollowUpType},
        task::TaskPriority,
    },
    services::{guard, notifier::Notifier},
};

const TPL_FOLLOWUP_SCHEDULED: &str = "followup_scheduled";

#[derive(Clone)]
pub struct FollowUpService {
    followups: FollowUpRepository,
    leads: LeadRepository,
    users: UserRepository,
    notifier: Notifier,
}

impl FollowUpService {
    pub fn new(
        followups: FollowUpRepository,
        leads: LeadRepository,
        users: UserRepository,
        notifier: Notifier,
    ) -> Self {
        Self { followups, leads, users, notifier }
    }

    pub async fn list(&self, actor: &ActorContext) -> Result<Vec<FollowUp>, AppError> {
        if actor.is_admin() {
            self.followups.list_all().await
        } else {
            self.followups.list_assigned_to(actor.id).await
        }
    }

    /// Creation is admin-only and requires an employee assignee. Lead
    /// contact fields are copied into the follow-up as of now and never
    /// re-synced.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        actor: &ActorContext,
        lead_id: Uuid,
        assigned_to: Uuid,
        scheduled_date: NaiveDate,
        scheduled_time: Option<NaiveTime>,
        followup_type: FollowUpType,
        priority: TaskPriority,
        notes: Option<String>,
    ) -> Result<FollowUp, AppError> {
        guard::ensure_admin(actor)?;

        let employee = self
            .users
            .find_employee(assigned_to)
            .await?
            .ok_or(AppError::AssigneeNotFound)?;

        let lead = self
            .leads
            .find_by_id(lead_id)
            .await?
            .ok_or(AppError::NotFound("Lead"))?;

        let new_followup = NewFollowUp {
            lead_id: Some(lead.id),
            lead_name: lead.name.clone(),
            lead_phone: lead.phone.clone(),
            lead_email: lead.email.clone(),
            assigned_to: employee.id,
            scheduled_date,
            scheduled_time,
            followup_type,
            priority,
            notes,
            course: lead.course.clone(),
            created_by: actor.id,
        };
        let followup = self.followups.insert(&new_followup).await?;

        // Queued after the insert committed; failure stays in the log.
        if let Some(employee_phone) = employee.phone.as_deref() {
            self.notifier.enqueue(
                employee_phone,
                TPL_FOLLOWUP_SCHEDULED,
                vec![
                    employee.name.clone(),
                    followup.lead_name.clone(),
                    followup.scheduled_date.to_string(),
                ],
            );
        }

        Ok(followup)
    }

    /// Status overwrite, admin or assignee. Same machine shape as leads:
    /// enum membership is the only validation.
    pub async fn transition_status(
        &self,
        actor: &ActorContext,
        id: Uuid,
        new_status: &str,
    ) -> Result<FollowUp, AppError> {
        let status = new_status.parse::<FollowUpStatus>()?;
        let followup = self.load(id).await?;
        guard::ensure_assignee_access(actor, Some(followup.assigned_to))?;
        self.followups.set_status(id, status).await
    }

    /// Moving the schedule flips the status to rescheduled; a notes-only
    /// update leaves it alone.
    pub async fn update(
        &self,
        actor: &ActorContext,
        id: Uuid,
        scheduled_date: Option<NaiveDate>,
        scheduled_time: Option<NaiveTime>,
        notes: Option<String>,
    ) -> Result<FollowUp, AppError> {
        let followup = self.load(id).await?;
        guard::ensure_assignee_access(actor, Some(followup.assigned_to))?;

        let schedule_moved = scheduled_date.is_some_and(|d| d != followup.scheduled_date)
            || scheduled_time.is_some_and(|t| followup.scheduled_time != Some(t));
        let status = schedule_moved.then_some(FollowUpStatus::Rescheduled);

        self.followups
            .reschedule(id, scheduled_date, scheduled_time, notes.as_deref(), status)
            .await
    }

    pub async fn delete(&self, actor: &ActorContext, id: Uuid) -> Result<(), AppError> {
        let followup = self.load(id).await?;
        guard::ensure_assignee_access(actor, Some(followup.assigned_to))?;
        self.followups.delete(id).await?;
        Ok(())
    }

    pub async fn stats(&self, actor: &ActorContext) -> Result<FollowUpStats, AppError> {
        self.followups.stats(self.scope(actor)).await
    }

    pub async fn counts(&self, actor: &ActorContext) -> Result<FollowUpCounts, AppError> {
        self.followups.counts(self.scope(actor)).await
    }

    // Admin sees the whole book, an employee only their own slice.
    fn scope(&self, actor: &ActorContext) -> Option<Uuid> {
        if actor.is_admin() { None } else { Some(actor.id) }
    }

    async fn load(&self, id: Uuid) -> Result<FollowUp, AppError> {
        self.followups
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Follow-up"))
    }
}
