use serde::{Deserialize, Serialize};

use super::role::Role;
use super::shared::{validate_email, validate_required};
use crate::entity::user;
use crate::error::AppError;

/// External representation of an account.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct UserDto {
    #[schema(example = 7)]
    pub id: i32,
    #[schema(example = "student@example.com")]
    pub email: String,
    #[schema(example = "Default Student")]
    pub name: String,
    pub role: Role,
    /// Taken from the student profile, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    pub active: bool,
}

impl UserDto {
    pub fn build(model: user::Model, role: Role, department: Option<String>) -> Self {
        Self {
            id: model.id,
            email: model.email,
            name: model.name,
            role,
            department,
            active: model.active,
        }
    }
}

/// Partial update applied by an admin. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub active: Option<bool>,
}

/// Partial update of the caller's own account.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    /// Only applied to students.
    pub department: Option<String>,
}

pub fn validate_identity_fields(name: Option<&str>, email: Option<&str>) -> Result<(), AppError> {
    if let Some(name) = name {
        validate_required(name, "Name", 100)?;
    }
    if let Some(email) = email {
        validate_email(email)?;
    }
    Ok(())
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RoleQuery {
    /// Restrict the listing to one role.
    pub role: Option<Role>,
}
