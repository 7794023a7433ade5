use uuid::Uuid;

use crate::{common::error::AppError, models::auth::ActorContext};

// Per-operation authorization rules, uniform across leads, follow-ups and
// tasks: an admin may do anything; everyone else only touches records they
// are currently assigned to. The rules are pure functions so the policy can
// be read (and tested) in one place.

pub fn ensure_admin(actor: &ActorContext) -> Result<(), AppError> {
    if actor.is_admin() { Ok(()) } else { Err(AppError::Forbidden) }
}

/// Leads and follow-ups carry at most one assignee.
pub fn ensure_assignee_access(
    actor: &ActorContext,
    assigned_to: Option<Uuid>,
) -> Result<(), AppError> {
    if actor.is_admin() || assigned_to == Some(actor.id) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// Tasks carry a list of assignees; membership grants access.
pub fn ensure_task_access(actor: &ActorContext, assignees: &[Uuid]) -> Result<(), AppError> {
    if actor.is_admin() || assignees.contains(&actor.id) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::Role;

    fn admin() -> ActorContext {
        ActorContext { id: Uuid::new_v4(), role: Role::Admin }
    }

    fn employee() -> ActorContext {
        ActorContext { id: Uuid::new_v4(), role: Role::Employee }
    }

    #[test]
    fn admin_passes_every_rule() {
        let actor = admin();
        assert!(ensure_admin(&actor).is_ok());
        assert!(ensure_assignee_access(&actor, None).is_ok());
        assert!(ensure_assignee_access(&actor, Some(Uuid::new_v4())).is_ok());
        assert!(ensure_task_access(&actor, &[]).is_ok());
    }

    #[test]
    fn employee_needs_to_be_the_assignee() {
        let actor = employee();
        assert!(ensure_assignee_access(&actor, Some(actor.id)).is_ok());

        let err = ensure_assignee_access(&actor, Some(Uuid::new_v4())).unwrap_err();
        assert!(matches!(err, AppError::Forbidden));

        // Unassigned records are admin-only territory.
        assert!(matches!(
            ensure_assignee_access(&actor, None),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn employee_needs_task_membership() {
        let actor = employee();
        let others = [Uuid::new_v4(), Uuid::new_v4()];
        assert!(matches!(
            ensure_task_access(&actor, &others),
            Err(AppError::Forbidden)
        ));

        let mine = [others[0], actor.id];
        assert!(ensure_task_access(&actor, &mine).is_ok());
    }

    #[test]
    fn employee_is_never_admin() {
        assert!(matches!(ensure_admin(&employee()), Err(AppError::Forbidden)));
    }
}
