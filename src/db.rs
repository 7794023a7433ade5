pub mod user_repo;
pub use user_repo::UserRepository;
pub mod lead_repo;
pub use lead_repo::LeadRepository;
pub mod followup_repo;
pub use followup_repo::FollowUpRepository;
pub mod task_repo;
pub use task_repo::TaskRepository;
pub mod activity_repo;
pub use activity_repo::ActivityRepository;
