pub mod schedule;
pub mod service;

use sea_orm::DbErr;
use thiserror::Error;

use crate::error::AppError;

pub use service::EventRegistry;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Event not found")]
    EventNotFound,
    #[error("User not found")]
    UserNotFound,
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("Event is full")]
    EventFull,
    #[error("User is already registered for this event")]
    AlreadyRegistered,
    #[error("User is not registered for this event")]
    NotRegistered,
    #[error("{0}")]
    RegistrationClosed(&'static str),
    #[error("{0}")]
    InvalidState(&'static str),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Db(#[from] DbErr),
}

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::EventNotFound | RegistryError::UserNotFound => {
                AppError::NotFound(err.to_string())
            }
            RegistryError::Forbidden(msg) => AppError::PermissionDenied(msg.into()),
            RegistryError::EventFull => AppError::EventFull,
            RegistryError::AlreadyRegistered => AppError::AlreadyRegistered,
            RegistryError::NotRegistered => AppError::NotRegistered,
            RegistryError::RegistrationClosed(msg) => AppError::RegistrationClosed(msg.into()),
            RegistryError::InvalidState(msg) => AppError::InvalidState(msg.into()),
            RegistryError::Validation(msg) => AppError::Validation(msg),
            RegistryError::Db(e) => AppError::from(e),
        }
    }
}
