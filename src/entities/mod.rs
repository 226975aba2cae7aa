//! Persistence models for the record-keeping tables the reports read from.

pub mod checkup_log;
pub mod dog;
pub mod employee;
pub mod feeding_log;
pub mod project;
pub mod project_assignment;
pub mod training_activity;
pub mod user;
pub mod user_permission;
pub mod veterinary_visit;
