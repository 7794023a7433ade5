use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ActivityRepository, TaskRepository, UserRepository, task_repo::NewTask},
    models::{
        activity::Comment,
        auth::ActorContext,
        task::{Task, TaskPriority, TaskStatus},
    },
    services::{guard, notifier::Notifier},
};

const TPL_TASK_ASSIGNED: &str = "task_assigned";

#[derive(Clone)]
pub struct TaskService {
    tasks: TaskRepository,
    users: UserRepository,
    activity: ActivityRepository,
    notifier: Notifier,
}

impl TaskService {
    pub fn new(
        tasks: TaskRepository,
        users: UserRepository,
        activity: ActivityRepository,
        notifier: Notifier,
    ) -> Self {
        Self { tasks, users, activity, notifier }
    }

    pub async fn list(&self, actor: &ActorContext) -> Result<Vec<Task>, AppError> {
        if actor.is_admin() {
            self.tasks.list_all().await
        } else {
            self.tasks.list_assigned_to(actor.id).await
        }
    }

    /// Admin creates a task for zero or more employees. Every resolved
    /// assignee gets one notification; each is queued independently after
    /// the insert has committed.
    pub async fn create(
        &self,
        actor: &ActorContext,
        title: String,
        description: Option<String>,
        assigned_to: Vec<Uuid>,
        priority: TaskPriority,
        due_date: Option<NaiveDate>,
        task_type: Option<String>,
    ) -> Result<Task, AppError> {
        guard::ensure_admin(actor)?;

        // Resolve all targets before writing anything.
        let mut assignees = Vec::with_capacity(assigned_to.len());
        for user_id in &assigned_to {
            let employee = self
                .users
                .find_employee(*user_id)
                .await?
                .ok_or(AppError::AssigneeNotFound)?;
            assignees.push(employee);
        }

        let new_task = NewTask {
            title,
            description,
            assigned_to,
            priority,
            due_date,
            task_type,
            created_by: actor.id,
        };
        let task = self.tasks.insert(&new_task).await?;

        for employee in &assignees {
            if let Some(employee_phone) = employee.phone.as_deref() {
                self.notifier.enqueue(
                    employee_phone,
                    TPL_TASK_ASSIGNED,
                    vec![employee.name.clone(), task.title.clone()],
                );
            }
        }

        Ok(task)
    }

    pub async fn transition_status(
        &self,
        actor: &ActorContext,
        id: Uuid,
        new_status: &str,
    ) -> Result<Task, AppError> {
        let status = new_status.parse::<TaskStatus>()?;
        let task = self.load(id).await?;
        guard::ensure_task_access(actor, &task.assigned_to)?;
        self.tasks.set_status(id, status).await
    }

    pub async fn add_comment(
        &self,
        actor: &ActorContext,
        id: Uuid,
        message: &str,
    ) -> Result<Comment, AppError> {
        let task = self.load(id).await?;
        guard::ensure_task_access(actor, &task.assigned_to)?;
        self.activity.append_task_comment(id, message, actor.id).await
    }

    pub async fn delete(&self, actor: &ActorContext, id: Uuid) -> Result<(), AppError> {
        guard::ensure_admin(actor)?;
        if !self.tasks.delete(id).await? {
            return Err(AppError::NotFound("Task"));
        }
        Ok(())
    }

    async fn load(&self, id: Uuid) -> Result<Task, AppError> {
        self.tasks
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Task"))
    }
}
