use axum::{extract::FromRequestParts, http::request::Parts};

use crate::directory::UserDirectory;
use crate::directory::service::parse_role;
use crate::error::AppError;
use crate::models::role::Role;
use crate::registry::service::Actor;
use crate::state::AppState;
use crate::utils::jwt;

/// Authenticated user extracted from the `Authorization: Bearer <token>` header.
///
/// The token only identifies the account; role and active flag are read from
/// the current user record, so deactivation and role changes apply immediately.
/// Role checks happen via `require_role()` in the handler body.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl AuthUser {
    /// Returns `Ok(())` if the user holds `role`, `Err(PermissionDenied)` otherwise.
    pub fn require_role(&self, role: Role) -> Result<(), AppError> {
        if self.role == role {
            Ok(())
        } else {
            Err(AppError::PermissionDenied(format!(
                "This action requires the {} role",
                role
            )))
        }
    }

    pub fn actor(&self) -> Actor {
        Actor {
            user_id: self.user_id,
            role: self.role,
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::TokenMissing)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::TokenInvalid)?;

        let claims = jwt::verify(token, &state.config.auth.jwt_secret)
            .map_err(|_| AppError::TokenInvalid)?;

        let user = UserDirectory::new(&state.db)
            .find_by_email(&claims.sub)
            .await?
            .filter(|u| u.id == claims.uid)
            .ok_or(AppError::TokenInvalid)?;

        if !user.active {
            return Err(AppError::AccountDisabled);
        }

        let role = parse_role(&user.role)?;

        Ok(AuthUser {
            user_id: user.id,
            email: user.email,
            name: user.name,
            role,
        })
    }
}
