pub mod auth;
pub mod followups;
pub mod leads;
pub mod tasks;
