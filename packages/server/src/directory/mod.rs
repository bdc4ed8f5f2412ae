pub mod service;

use sea_orm::DbErr;
use thiserror::Error;

use crate::error::AppError;

pub use service::UserDirectory;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("User not found")]
    UserNotFound,
    #[error("{0}")]
    ProfileNotFound(&'static str),
    #[error("Email already exists")]
    EmailTaken,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Account is deactivated")]
    AccountDisabled,
    #[error("Invalid role for this user")]
    RoleMismatch,
    #[error("{0}")]
    WrongRole(&'static str),
    #[error("Current password is incorrect")]
    IncorrectPassword,
    #[error("User still owns {0} event(s); delete or reassign them first")]
    OwnsEvents(u64),
    #[error("stored role '{0}' is not recognised")]
    CorruptRole(String),
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error(transparent)]
    Db(#[from] DbErr),
}

impl From<DirectoryError> for AppError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::UserNotFound | DirectoryError::ProfileNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            DirectoryError::EmailTaken => AppError::EmailTaken,
            DirectoryError::InvalidCredentials => AppError::InvalidCredentials,
            DirectoryError::AccountDisabled => AppError::AccountDisabled,
            DirectoryError::RoleMismatch | DirectoryError::IncorrectPassword => {
                AppError::Validation(err.to_string())
            }
            DirectoryError::WrongRole(msg) => AppError::PermissionDenied(msg.into()),
            DirectoryError::OwnsEvents(_) => AppError::Conflict(err.to_string()),
            DirectoryError::CorruptRole(_) | DirectoryError::Hash(_) => {
                AppError::Internal(err.to_string())
            }
            DirectoryError::Db(e) => AppError::from(e),
        }
    }
}
