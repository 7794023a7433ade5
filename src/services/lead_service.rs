use std::collections::HashSet;

use uuid::Uuid;

use crate::{
    common::{error::AppError, phone},
    db::{
        ActivityRepository, LeadRepository, UserRepository,
        lead_repo::{LeadUpdate, NewLead},
    },
    models::{
        activity::{Comment, Communication, CommunicationType, LogPage},
        auth::ActorContext,
        lead::{ImportIssue, ImportReport, ImportRow, Lead, LeadStatus},
    },
    services::{guard, notifier::Notifier},
};

// Notification templates fired on assignment events.
const TPL_LEAD_ASSIGNED: &str = "lead_assigned";
const TPL_LEAD_REASSIGNED: &str = "lead_reassigned";

/// Lead lifecycle engine: status transitions, assignment, bulk import and
/// the activity log. Every operation takes the acting identity explicitly.
#[derive(Clone)]
pub struct LeadService {
    leads: LeadRepository,
    users: UserRepository,
    activity: ActivityRepository,
    notifier: Notifier,
}

impl LeadService {
    pub fn new(
        leads: LeadRepository,
        users: UserRepository,
        activity: ActivityRepository,
        notifier: Notifier,
    ) -> Self {
        Self { leads, users, activity, notifier }
    }

    // -------------------------------------------------------------------------
    //  CRUD
    // -------------------------------------------------------------------------

    pub async fn list(&self, actor: &ActorContext) -> Result<Vec<Lead>, AppError> {
        if actor.is_admin() {
            self.leads.list_all().await
        } else {
            self.leads.list_assigned_to(actor.id).await
        }
    }

    /// Any authenticated actor may create a lead. Phone uniqueness is
    /// enforced here through the normalized phone_digits column, the same
    /// anchor bulk import deduplicates on.
    pub async fn create(
        &self,
        _actor: &ActorContext,
        name: String,
        email: Option<String>,
        phone_raw: String,
        status: Option<String>,
        source: Option<String>,
        course: Option<String>,
        notes: Option<String>,
    ) -> Result<Lead, AppError> {
        let status = match status {
            Some(s) => s.parse::<LeadStatus>()?,
            None => LeadStatus::New,
        };
        let phone_digits = phone::digits(&phone_raw);
        if phone_digits.is_empty() {
            return Err(AppError::BadRequest("phone must contain digits"));
        }

        let new_lead = NewLead {
            name,
            email: email.filter(|e| !e.is_empty()),
            phone: phone_raw,
            phone_digits,
            status,
            source,
            course,
            notes,
        };
        self.leads.insert(&new_lead).await
    }

    pub async fn update(
        &self,
        actor: &ActorContext,
        id: Uuid,
        update: LeadUpdate,
    ) -> Result<Lead, AppError> {
        let lead = self.load(id).await?;
        guard::ensure_assignee_access(actor, lead.assigned_to)?;
        self.leads.update_details(id, &update).await
    }

    /// Lead deletion is admin-only. The rest of the mutation surface is
    /// assignee-gated; delete is destructive and unassigned leads would
    /// otherwise be deletable by nobody but their (absent) assignee.
    pub async fn delete(&self, actor: &ActorContext, id: Uuid) -> Result<(), AppError> {
        guard::ensure_admin(actor)?;
        if !self.leads.delete(id).await? {
            return Err(AppError::NotFound("Lead"));
        }
        Ok(())
    }

    pub async fn bulk_delete(&self, actor: &ActorContext, ids: &[Uuid]) -> Result<u64, AppError> {
        guard::ensure_admin(actor)?;
        self.leads.delete_many(ids).await
    }

    // -------------------------------------------------------------------------
    //  Status state machine
    // -------------------------------------------------------------------------

    /// Overwrites the lead status. Any status may replace any other; the
    /// only input validation is enum membership. Refreshes last_contact as
    /// a side effect. No history is kept and concurrent transitions are not
    /// serialized: the last write wins.
    pub async fn transition_status(
        &self,
        actor: &ActorContext,
        id: Uuid,
        new_status: &str,
    ) -> Result<Lead, AppError> {
        let status = new_status.parse::<LeadStatus>()?;
        let lead = self.load(id).await?;
        guard::ensure_assignee_access(actor, lead.assigned_to)?;
        self.leads.set_status(id, status).await
    }

    // -------------------------------------------------------------------------
    //  Assignment resolver
    // -------------------------------------------------------------------------

    pub async fn assign(
        &self,
        actor: &ActorContext,
        id: Uuid,
        target_user_id: Uuid,
    ) -> Result<Lead, AppError> {
        self.assign_inner(actor, id, target_user_id, TPL_LEAD_ASSIGNED)
            .await
    }

    /// Strict id-based reassignment. (An earlier generation of this system
    /// resolved targets by display name, first match wins; that path is
    /// gone on purpose.)
    pub async fn reassign(
        &self,
        actor: &ActorContext,
        id: Uuid,
        target_user_id: Uuid,
    ) -> Result<Lead, AppError> {
        self.assign_inner(actor, id, target_user_id, TPL_LEAD_REASSIGNED)
            .await
    }

    async fn assign_inner(
        &self,
        actor: &ActorContext,
        id: Uuid,
        target_user_id: Uuid,
        template: &str,
    ) -> Result<Lead, AppError> {
        guard::ensure_admin(actor)?;

        // Target must exist and be an employee; anything else is a 404
        // that leaves assigned_to untouched.
        let employee = self
            .users
            .find_employee(target_user_id)
            .await?
            .ok_or(AppError::AssigneeNotFound)?;

        let lead = self.load(id).await?;
        let updated = self.leads.set_assignee(lead.id, employee.id).await?;

        // The row update above has already committed; dispatch is queued
        // outside the write path and its failure never reaches the caller.
        if let Some(employee_phone) = employee.phone.as_deref() {
            self.notifier.enqueue(
                employee_phone,
                template,
                vec![employee.name.clone(), updated.name.clone()],
            );
        } else {
            tracing::warn!(assignee = %employee.id, "assignee has no phone, skipping notification");
        }

        Ok(updated)
    }

    // -------------------------------------------------------------------------
    //  Bulk import
    // -------------------------------------------------------------------------

    /// Validates and imports a batch of candidate leads. Rows are processed
    /// sequentially and independently: a bad row is reported, never fatal.
    /// The report upholds
    /// success_count + errors.len() + duplicates.len() == rows.len().
    pub async fn bulk_import(
        &self,
        _actor: &ActorContext,
        rows: Vec<ImportRow>,
    ) -> Result<ImportReport, AppError> {
        // Dedup baseline: everything persisted so far. Rows accepted in
        // this batch join the set as they land. Two overlapping import
        // requests can both pass this check; the unique index on
        // phone_digits then turns the loser into a per-row error.
        let seen: HashSet<String> = self.leads.all_phone_digits().await?.into_iter().collect();
        let mut ledger = ImportLedger::new(seen);

        for (idx, row) in rows.iter().enumerate() {
            let row_no = idx + 1;
            match evaluate_row(row, ledger.seen()) {
                RowOutcome::Invalid(reason) => ledger.record_invalid(row_no, &row.phone, reason),
                RowOutcome::Duplicate(reason) => {
                    ledger.record_duplicate(row_no, &row.phone, reason)
                }
                RowOutcome::Insert(new_lead, warning) => {
                    let result = self.leads.insert(&new_lead).await.map(|_| ());
                    ledger.record_insert_attempt(row_no, &new_lead, warning, result);
                }
            }
        }

        let report = ledger.finish();
        tracing::info!(
            imported = report.success_count,
            duplicates = report.duplicates.len(),
            errors = report.errors.len(),
            "bulk import finished"
        );
        Ok(report)
    }

    // -------------------------------------------------------------------------
    //  Activity log
    // -------------------------------------------------------------------------

    pub async fn add_communication(
        &self,
        actor: &ActorContext,
        id: Uuid,
        comm_type: CommunicationType,
        message: &str,
    ) -> Result<Communication, AppError> {
        let lead = self.load(id).await?;
        guard::ensure_assignee_access(actor, lead.assigned_to)?;

        let comm = self
            .activity
            .append_communication(id, comm_type, message, actor.id)
            .await?;
        // Logging a communication is a contact-producing action.
        self.leads.touch_last_contact(id).await?;
        Ok(comm)
    }

    pub async fn add_comment(
        &self,
        actor: &ActorContext,
        id: Uuid,
        message: &str,
    ) -> Result<Comment, AppError> {
        let lead = self.load(id).await?;
        guard::ensure_assignee_access(actor, lead.assigned_to)?;
        self.activity.append_lead_comment(id, message, actor.id).await
    }

    pub async fn comments(
        &self,
        actor: &ActorContext,
        id: Uuid,
        page: LogPage,
    ) -> Result<Vec<Comment>, AppError> {
        let lead = self.load(id).await?;
        guard::ensure_assignee_access(actor, lead.assigned_to)?;
        self.activity
            .lead_comments(id, page.limit(), page.offset())
            .await
    }

    async fn load(&self, id: Uuid) -> Result<Lead, AppError> {
        self.leads
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Lead"))
    }
}

// -----------------------------------------------------------------------------
//  Import row evaluation and bookkeeping (pure)
// -----------------------------------------------------------------------------

/// Accumulates the per-row outcomes of one batch. Every row lands in exactly
/// one bucket (success, error, duplicate), so
/// success_count + errors.len() + duplicates.len() == rows seen.
/// Warnings ride alongside already-counted successes.
struct ImportLedger {
    seen: HashSet<String>,
    report: ImportReport,
}

impl ImportLedger {
    fn new(seen: HashSet<String>) -> Self {
        Self {
            seen,
            report: ImportReport {
                success_count: 0,
                errors: Vec::new(),
                duplicates: Vec::new(),
                warnings: Vec::new(),
            },
        }
    }

    fn seen(&self) -> &HashSet<String> {
        &self.seen
    }

    fn record_invalid(&mut self, row_no: usize, phone: &str, reason: String) {
        self.report.errors.push(ImportIssue {
            row: row_no,
            phone: none_if_empty(phone),
            reason,
        });
    }

    fn record_duplicate(&mut self, row_no: usize, phone: &str, reason: String) {
        self.report.duplicates.push(ImportIssue {
            row: row_no,
            phone: none_if_empty(phone),
            reason,
        });
    }

    /// Books the outcome of one insert. A success joins the dedup set; a
    /// failure becomes a row-level error and the batch moves on.
    fn record_insert_attempt(
        &mut self,
        row_no: usize,
        new_lead: &NewLead,
        warning: Option<String>,
        result: Result<(), AppError>,
    ) {
        match result {
            Ok(()) => {
                self.report.success_count += 1;
                self.seen.insert(new_lead.phone_digits.clone());
                if let Some(reason) = warning {
                    self.report.warnings.push(ImportIssue {
                        row: row_no,
                        phone: Some(new_lead.phone.clone()),
                        reason,
                    });
                }
            }
            Err(e) => {
                tracing::warn!(row = row_no, "import row failed: {e}");
                self.report.errors.push(ImportIssue {
                    row: row_no,
                    phone: Some(new_lead.phone.clone()),
                    reason: e.to_string(),
                });
            }
        }
    }

    fn finish(self) -> ImportReport {
        self.report
    }
}

enum RowOutcome {
    /// Row is importable; the warning carries a status-coercion note.
    Insert(NewLead, Option<String>),
    Duplicate(String),
    Invalid(String),
}

fn evaluate_row(row: &ImportRow, seen: &HashSet<String>) -> RowOutcome {
    let name = row.name.trim();
    if name.is_empty() {
        return RowOutcome::Invalid("name is required".into());
    }

    let digits = phone::digits(&row.phone);
    if digits.is_empty() {
        return RowOutcome::Invalid("phone is required".into());
    }

    if seen.contains(&digits) {
        return RowOutcome::Duplicate(format!("phone {} already exists", row.phone.trim()));
    }

    // An unknown status degrades to 'new' instead of rejecting the row.
    let (status, warning) = match row.status.as_deref() {
        None | Some("") => (LeadStatus::New, None),
        Some(s) => match s.parse::<LeadStatus>() {
            Ok(status) => (status, None),
            Err(_) => (
                LeadStatus::New,
                Some(format!("invalid status '{s}' coerced to 'new'")),
            ),
        },
    };

    RowOutcome::Insert(
        NewLead {
            name: name.to_string(),
            email: row.email.clone().filter(|e| !e.trim().is_empty()),
            phone: row.phone.trim().to_string(),
            phone_digits: digits,
            status,
            source: row.source.clone(),
            course: row.course.clone(),
            notes: row.notes.clone(),
        },
        warning,
    )
}

fn none_if_empty(s: &str) -> Option<String> {
    let t = s.trim();
    if t.is_empty() { None } else { Some(t.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, phone: &str) -> ImportRow {
        ImportRow {
            name: name.into(),
            phone: phone.into(),
            email: None,
            status: None,
            source: None,
            course: None,
            notes: None,
        }
    }

    #[test]
    fn row_without_name_or_phone_is_invalid() {
        let seen = HashSet::new();
        assert!(matches!(
            evaluate_row(&row("", "1234567890"), &seen),
            RowOutcome::Invalid(_)
        ));
        assert!(matches!(
            evaluate_row(&row("A", ""), &seen),
            RowOutcome::Invalid(_)
        ));
        // A phone with no digits at all is as bad as a missing one.
        assert!(matches!(
            evaluate_row(&row("A", "n/a"), &seen),
            RowOutcome::Invalid(_)
        ));
    }

    #[test]
    fn duplicate_detection_ignores_formatting() {
        let mut seen = HashSet::new();
        seen.insert("1234567890".to_string());
        assert!(matches!(
            evaluate_row(&row("B", "+1 (234) 567-890"), &seen),
            RowOutcome::Duplicate(_)
        ));
    }

    #[test]
    fn same_phone_twice_in_one_batch_yields_one_insert_one_duplicate() {
        let mut seen = HashSet::new();

        let first = evaluate_row(&row("A", "1234567890"), &seen);
        let RowOutcome::Insert(lead, warning) = first else {
            panic!("first row should import");
        };
        assert!(warning.is_none());
        assert_eq!(lead.status, LeadStatus::New);
        seen.insert(lead.phone_digits);

        assert!(matches!(
            evaluate_row(&row("B", "1234567890"), &seen),
            RowOutcome::Duplicate(_)
        ));
    }

    #[test]
    fn unknown_status_is_coerced_to_new_with_a_warning() {
        let seen = HashSet::new();
        let mut r = row("A", "9876543210");
        r.status = Some("hot".into());

        let RowOutcome::Insert(lead, warning) = evaluate_row(&r, &seen) else {
            panic!("row should still import");
        };
        assert_eq!(lead.status, LeadStatus::New);
        assert!(warning.unwrap().contains("hot"));
    }

    #[test]
    fn valid_status_is_kept_verbatim() {
        let seen = HashSet::new();
        let mut r = row("A", "9876543210");
        r.status = Some("not-interested".into());

        let RowOutcome::Insert(lead, warning) = evaluate_row(&r, &seen) else {
            panic!("row should import");
        };
        assert_eq!(lead.status, LeadStatus::NotInterested);
        assert!(warning.is_none());
    }

    // Runs a batch through the same evaluate-then-record loop bulk_import
    // uses, with `insert` swapped for a per-row stub.
    fn run_batch(
        rows: &[ImportRow],
        existing: HashSet<String>,
        mut insert: impl FnMut(usize, &NewLead) -> Result<(), AppError>,
    ) -> ImportReport {
        let mut ledger = ImportLedger::new(existing);
        for (idx, row) in rows.iter().enumerate() {
            let row_no = idx + 1;
            match evaluate_row(row, ledger.seen()) {
                RowOutcome::Invalid(reason) => ledger.record_invalid(row_no, &row.phone, reason),
                RowOutcome::Duplicate(reason) => {
                    ledger.record_duplicate(row_no, &row.phone, reason)
                }
                RowOutcome::Insert(new_lead, warning) => {
                    let result = insert(row_no, &new_lead);
                    ledger.record_insert_attempt(row_no, &new_lead, warning, result);
                }
            }
        }
        ledger.finish()
    }

    #[test]
    fn mixed_batch_report_buckets_add_up_to_the_input_size() {
        let mut with_status = row("D", "2222222222");
        with_status.status = Some("hot".into());

        let rows = vec![
            row("A", "1111111111"),     // imports cleanly
            row("B", "1111111111"),     // duplicate within the batch
            row("C", ""),               // invalid: no phone
            with_status,                // imports, status coerced to 'new'
            row("E", "5550000000"),     // duplicate of a persisted lead
            row("F", "3333333333"),     // insert blows up at the store
        ];
        let existing: HashSet<String> = ["5550000000".to_string()].into();

        let report = run_batch(&rows, existing, |_, new_lead| {
            if new_lead.phone_digits == "3333333333" {
                Err(AppError::PhoneAlreadyExists)
            } else {
                Ok(())
            }
        });

        assert_eq!(report.success_count, 2);
        assert_eq!(report.duplicates.len(), 2);
        assert_eq!(report.errors.len(), 2);
        assert_eq!(
            report.success_count + report.errors.len() + report.duplicates.len(),
            rows.len()
        );

        // Warnings annotate persisted rows; they never add a bucket entry.
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].row, 4);

        // Each issue is pinned to the row that produced it.
        assert_eq!(report.errors[0].row, 3);
        assert_eq!(report.errors[1].row, 6);
        assert_eq!(report.duplicates[0].row, 2);
        assert_eq!(report.duplicates[1].row, 5);
    }

    #[test]
    fn failed_insert_leaves_the_phone_free_for_a_later_row() {
        // A store-level failure must not poison the dedup set: the same
        // number appearing again later in the batch gets its own attempt.
        let rows = vec![row("A", "4444444444"), row("B", "4444444444")];
        let mut calls = 0;

        let report = run_batch(&rows, HashSet::new(), |_, _| {
            calls += 1;
            if calls == 1 { Err(AppError::PhoneAlreadyExists) } else { Ok(()) }
        });

        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].row, 1);
        assert_eq!(report.success_count, 1);
        assert!(report.duplicates.is_empty());
    }

    #[test]
    fn blank_email_becomes_none() {
        let seen = HashSet::new();
        let mut r = row("A", "9876543210");
        r.email = Some("   ".into());

        let RowOutcome::Insert(lead, _) = evaluate_row(&r, &seen) else {
            panic!("row should import");
        };
        assert_eq!(lead.email, None);
    }
}
