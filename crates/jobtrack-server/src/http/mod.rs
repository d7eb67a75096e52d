pub mod auth;
pub mod health;
pub mod jobs;
pub mod reminders;
pub mod stats;
pub mod ui;
pub mod users;
