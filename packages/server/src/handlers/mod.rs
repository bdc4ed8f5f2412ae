pub mod auth;
pub mod event;
pub mod public;
pub mod user;
