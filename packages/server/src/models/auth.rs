use serde::{Deserialize, Serialize};

use super::role::Role;
use super::shared::{validate_email, validate_password, validate_required};
use super::user::UserDto;
use crate::error::AppError;

/// Request body for account registration.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[schema(example = "ada@campus.edu")]
    pub email: String,
    /// Password (6-128 characters).
    #[schema(example = "s3cret!")]
    pub password: String,
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    pub role: Role,
    /// Stored on the student profile when registering a `STUDENT`.
    #[schema(example = "Computer Science")]
    pub department: Option<String>,
    /// Stored on the staff profile when registering an `EVENT_MANAGER`.
    pub designation: Option<String>,
    pub phone_number: Option<String>,
}

pub fn validate_register_request(payload: &RegisterRequest) -> Result<(), AppError> {
    validate_email(&payload.email)?;
    validate_password(&payload.password)?;
    validate_required(&payload.name, "Name", 100)?;
    Ok(())
}

/// Request body for login.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "student@example.com")]
    pub email: String,
    #[schema(example = "password")]
    pub password: String,
    /// When present, the account must hold this role.
    pub role: Option<Role>,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    if payload.email.trim().is_empty() {
        return Err(AppError::Validation("Email must not be empty".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }
    Ok(())
}

/// Issued token plus the account it was issued for.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    pub user: UserDto,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

pub fn validate_change_password_request(payload: &ChangePasswordRequest) -> Result<(), AppError> {
    if payload.current_password.is_empty() {
        return Err(AppError::Validation(
            "Current password must not be empty".into(),
        ));
    }
    validate_password(&payload.new_password)
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Password changed successfully")]
    pub message: String,
}
