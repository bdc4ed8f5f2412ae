pub mod auth;
pub mod event;
pub mod profile;
pub mod role;
pub mod shared;
pub mod user;
