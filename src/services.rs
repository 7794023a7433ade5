pub mod auth;
pub mod followup_service;
pub mod guard;
pub mod lead_service;
pub mod notifier;
pub mod task_service;

pub use auth::AuthService;
pub use followup_service::FollowUpService;
pub use lead_service::LeadService;
pub use notifier::Notifier;
pub use task_service::TaskService;
