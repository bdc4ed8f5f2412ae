pub mod admin;
pub mod event;
pub mod event_manager;
pub mod event_participant;
pub mod student;
pub mod user;
