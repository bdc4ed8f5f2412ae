use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::instrument;

use crate::directory::UserDirectory;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::auth::{
    AuthResponse, ChangePasswordRequest, LoginRequest, MessageResponse, RegisterRequest,
    validate_change_password_request, validate_login_request, validate_register_request,
};
use crate::models::profile::{
    StaffDetails, StaffDetailsRequest, StudentDetails, StudentDetailsRequest,
};
use crate::models::user::{UpdateProfileRequest, UserDto, validate_identity_fields};
use crate::state::AppState;
use crate::utils::jwt;

fn issue_token(state: &AppState, user: &UserDto) -> Result<String, AppError> {
    let subject = jwt::TokenSubject {
        user_id: user.id,
        email: &user.email,
        name: &user.name,
        role: user.role,
    };
    jwt::sign(
        &subject,
        &state.config.auth.jwt_secret,
        state.config.auth.token_ttl_secs,
    )
    .map_err(|e| AppError::Internal(format!("JWT sign error: {}", e)))
}

#[utoipa::path(
    post,
    path = "/register",
    tag = "Auth",
    operation_id = "register",
    summary = "Register a new account",
    description = "Creates an account with the requested role and the matching profile (students and event managers), then signs the caller in.",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Email already exists (EMAIL_TAKEN)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(email = %payload.email, role = %payload.role))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_register_request(&payload)?;

    let user = UserDirectory::new(&state.db).register(&payload).await?;
    let token = issue_token(&state, &user)?;

    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    operation_id = "login",
    summary = "Log in",
    description = "Verifies credentials and returns a bearer token. When `role` is supplied the account must hold it.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Validation error or role mismatch (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Invalid credentials (INVALID_CREDENTIALS)", body = ErrorBody),
        (status = 403, description = "Account deactivated (ACCOUNT_DISABLED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    validate_login_request(&payload)?;

    let user = UserDirectory::new(&state.db)
        .authenticate(&payload.email, &payload.password, payload.role)
        .await?;
    let token = issue_token(&state, &user)?;

    Ok(Json(AuthResponse { token, user }))
}

#[utoipa::path(
    get,
    path = "/profile",
    tag = "Auth",
    operation_id = "getProfile",
    summary = "Get the current account",
    responses(
        (status = 200, description = "Current account", body = UserDto),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_profile(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserDto>, AppError> {
    let user = UserDirectory::new(&state.db)
        .get_user(auth_user.user_id)
        .await?;
    Ok(Json(user))
}

#[utoipa::path(
    put,
    path = "/profile",
    tag = "Auth",
    operation_id = "updateProfile",
    summary = "Update the current account",
    description = "Partial update of name and email. `department` is stored on the student profile and ignored for other roles.",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated account", body = UserDto),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 409, description = "Email already exists (EMAIL_TAKEN)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn update_profile(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<UpdateProfileRequest>,
) -> Result<Json<UserDto>, AppError> {
    validate_identity_fields(payload.name.as_deref(), payload.email.as_deref())?;

    let user = UserDirectory::new(&state.db)
        .update_profile(auth_user.user_id, &payload)
        .await?;
    Ok(Json(user))
}

#[utoipa::path(
    post,
    path = "/change-password",
    tag = "Auth",
    operation_id = "changePassword",
    summary = "Change the current account's password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Validation error or wrong current password (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn change_password(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    validate_change_password_request(&payload)?;

    UserDirectory::new(&state.db)
        .change_password(
            auth_user.user_id,
            &payload.current_password,
            &payload.new_password,
        )
        .await?;

    Ok(Json(MessageResponse {
        message: "Password changed successfully".into(),
    }))
}

#[utoipa::path(
    get,
    path = "/student-details",
    tag = "Profiles",
    operation_id = "getStudentDetails",
    summary = "Get the current student's profile",
    responses(
        (status = 200, description = "Student profile", body = StudentDetails),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not a student (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "No profile yet (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_student_details(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<StudentDetails>, AppError> {
    let details = UserDirectory::new(&state.db)
        .student_details(auth_user.user_id)
        .await?;
    Ok(Json(details))
}

#[utoipa::path(
    put,
    path = "/student-details",
    tag = "Profiles",
    operation_id = "updateStudentDetails",
    summary = "Update the current student's profile",
    description = "Partial update; the profile is created if it does not exist yet.",
    request_body = StudentDetailsRequest,
    responses(
        (status = 200, description = "Updated profile", body = StudentDetails),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not a student (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn update_student_details(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<StudentDetailsRequest>,
) -> Result<Json<StudentDetails>, AppError> {
    validate_identity_fields(payload.name.as_deref(), payload.email.as_deref())?;

    let details = UserDirectory::new(&state.db)
        .update_student_details(auth_user.user_id, &payload)
        .await?;
    Ok(Json(details))
}

#[utoipa::path(
    get,
    path = "/event-manager-details",
    tag = "Profiles",
    operation_id = "getEventManagerDetails",
    summary = "Get the current event manager's profile",
    responses(
        (status = 200, description = "Event manager profile", body = StaffDetails),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not an event manager (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "No profile yet (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_event_manager_details(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<StaffDetails>, AppError> {
    let details = UserDirectory::new(&state.db)
        .event_manager_details(auth_user.user_id)
        .await?;
    Ok(Json(details))
}

#[utoipa::path(
    put,
    path = "/event-manager-details",
    tag = "Profiles",
    operation_id = "updateEventManagerDetails",
    summary = "Update the current event manager's profile",
    request_body = StaffDetailsRequest,
    responses(
        (status = 200, description = "Updated profile", body = StaffDetails),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not an event manager (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn update_event_manager_details(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<StaffDetailsRequest>,
) -> Result<Json<StaffDetails>, AppError> {
    let details = UserDirectory::new(&state.db)
        .update_event_manager_details(auth_user.user_id, &payload)
        .await?;
    Ok(Json(details))
}

#[utoipa::path(
    get,
    path = "/admin-details",
    tag = "Profiles",
    operation_id = "getAdminDetails",
    summary = "Get the current admin's profile",
    responses(
        (status = 200, description = "Admin profile", body = StaffDetails),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not an admin (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "No profile yet (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_admin_details(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<StaffDetails>, AppError> {
    let details = UserDirectory::new(&state.db)
        .admin_details(auth_user.user_id)
        .await?;
    Ok(Json(details))
}

#[utoipa::path(
    put,
    path = "/admin-details",
    tag = "Profiles",
    operation_id = "updateAdminDetails",
    summary = "Update the current admin's profile",
    request_body = StaffDetailsRequest,
    responses(
        (status = 200, description = "Updated profile", body = StaffDetails),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not an admin (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn update_admin_details(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<StaffDetailsRequest>,
) -> Result<Json<StaffDetails>, AppError> {
    let details = UserDirectory::new(&state.db)
        .update_admin_details(auth_user.user_id, &payload)
        .await?;
    Ok(Json(details))
}
