pub mod activity;
pub mod auth;
pub mod followup;
pub mod lead;
pub mod task;
