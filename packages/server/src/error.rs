use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `TOKEN_MISSING`,
    /// `TOKEN_INVALID`, `INVALID_CREDENTIALS`, `ACCOUNT_DISABLED`,
    /// `PERMISSION_DENIED`, `NOT_FOUND`, `EMAIL_TAKEN`, `EVENT_FULL`,
    /// `ALREADY_REGISTERED`, `NOT_REGISTERED`, `REGISTRATION_CLOSED`,
    /// `INVALID_STATE`, `CONFLICT`, `INTERNAL_ERROR`.
    #[schema(example = "EVENT_FULL")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Event is full")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    TokenMissing,
    TokenInvalid,
    InvalidCredentials,
    AccountDisabled,
    PermissionDenied(String),
    NotFound(String),
    EmailTaken,
    EventFull,
    AlreadyRegistered,
    NotRegistered,
    RegistrationClosed(String),
    /// The requested transition is not allowed in the resource's current state.
    InvalidState(String),
    Conflict(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::TokenMissing => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_MISSING",
                    message: "Authentication required".into(),
                },
            ),
            AppError::TokenInvalid => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_INVALID",
                    message: "Invalid or expired token".into(),
                },
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "INVALID_CREDENTIALS",
                    message: "Invalid email or password".into(),
                },
            ),
            AppError::AccountDisabled => (
                StatusCode::FORBIDDEN,
                ErrorBody {
                    code: "ACCOUNT_DISABLED",
                    message: "Account is deactivated. Please contact admin.".into(),
                },
            ),
            AppError::PermissionDenied(msg) => (
                StatusCode::FORBIDDEN,
                ErrorBody {
                    code: "PERMISSION_DENIED",
                    message: msg,
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::EmailTaken => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "EMAIL_TAKEN",
                    message: "Email already exists".into(),
                },
            ),
            AppError::EventFull => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "EVENT_FULL",
                    message: "Event is full".into(),
                },
            ),
            AppError::AlreadyRegistered => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "ALREADY_REGISTERED",
                    message: "User is already registered for this event".into(),
                },
            ),
            AppError::NotRegistered => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "NOT_REGISTERED",
                    message: "User is not registered for this event".into(),
                },
            ),
            AppError::RegistrationClosed(msg) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "REGISTRATION_CLOSED",
                    message: msg,
                },
            ),
            AppError::InvalidState(msg) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "INVALID_STATE",
                    message: msg,
                },
            ),
            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "CONFLICT",
                    message: msg,
                },
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}
