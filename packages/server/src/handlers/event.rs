use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::event::{EventRequest, EventResponse, SearchQuery, validate_event_request};
use crate::registry::EventRegistry;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Events",
    operation_id = "listEvents",
    summary = "List all events",
    description = "Returns every event ordered by date, then time. `registrationClosed` reflects whether the event has already started.",
    responses(
        (status = 200, description = "All events", body = Vec<EventResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_events(
    State(state): State<AppState>,
) -> Result<Json<Vec<EventResponse>>, AppError> {
    let events = EventRegistry::new(&state.db).list_events().await?;
    Ok(Json(events))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Events",
    operation_id = "getEvent",
    summary = "Get event details",
    params(("id" = i32, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event details", body = EventResponse),
        (status = 404, description = "Event not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(event_id = id))]
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<EventResponse>, AppError> {
    let event = EventRegistry::new(&state.db).get_event(id).await?;
    Ok(Json(event))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Events",
    operation_id = "createEvent",
    summary = "Create an event",
    description = "Any authenticated user may create an event; the caller becomes its creator.",
    request_body = EventRequest,
    responses(
        (status = 201, description = "Event created", body = EventResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id, title = %payload.title))]
pub async fn create_event(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<EventRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_event_request(&payload)?;

    let event = EventRegistry::new(&state.db)
        .create_event(&payload, &auth_user.actor())
        .await?;

    Ok((StatusCode::CREATED, Json(event)))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Events",
    operation_id = "updateEvent",
    summary = "Update an event",
    description = "Overwrites title, description, date, time, department, location, capacity and image. Creator only. Capacity cannot drop below the current participant count.",
    params(("id" = i32, Path, description = "Event ID")),
    request_body = EventRequest,
    responses(
        (status = 200, description = "Event updated", body = EventResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the creator (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Event not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id, event_id = id))]
pub async fn update_event(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<EventRequest>,
) -> Result<Json<EventResponse>, AppError> {
    validate_event_request(&payload)?;

    let event = EventRegistry::new(&state.db)
        .update_event(id, &payload, &auth_user.actor())
        .await?;
    Ok(Json(event))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Events",
    operation_id = "deleteEvent",
    summary = "Delete an event",
    description = "Permanently deletes an event and its registrations. Creator only.",
    params(("id" = i32, Path, description = "Event ID")),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the creator (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Event not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id, event_id = id))]
pub async fn delete_event(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    EventRegistry::new(&state.db)
        .delete_event(id, &auth_user.actor())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/{id}/register",
    tag = "Registrations",
    operation_id = "registerForEvent",
    summary = "Register the caller for an event",
    description = "Fails when the event is full, closed, already started, or the caller is already registered. Registering for a started event also closes its registration.",
    params(("id" = i32, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Registered", body = EventResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Event not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "EVENT_FULL, ALREADY_REGISTERED or REGISTRATION_CLOSED", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id, event_id = id))]
pub async fn register_for_event(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<EventResponse>, AppError> {
    let event = EventRegistry::new(&state.db)
        .register_participant(id, auth_user.user_id)
        .await?;
    Ok(Json(event))
}

#[utoipa::path(
    post,
    path = "/{id}/unregister",
    tag = "Registrations",
    operation_id = "unregisterFromEvent",
    summary = "Withdraw the caller from an event",
    description = "Allowed even after registration has closed or the event has started.",
    params(("id" = i32, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Unregistered", body = EventResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Event not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Caller is not registered (NOT_REGISTERED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id, event_id = id))]
pub async fn unregister_from_event(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<EventResponse>, AppError> {
    let event = EventRegistry::new(&state.db)
        .unregister_participant(id, auth_user.user_id)
        .await?;
    Ok(Json(event))
}

#[utoipa::path(
    post,
    path = "/{id}/close-registration",
    tag = "Registrations",
    operation_id = "closeRegistration",
    summary = "Close registration for an event",
    description = "Creator or admin only.",
    params(("id" = i32, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Registration closed", body = EventResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the creator or an admin (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Event not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id, event_id = id))]
pub async fn close_registration(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<EventResponse>, AppError> {
    let event = EventRegistry::new(&state.db)
        .set_registration_closed(id, true, &auth_user.actor())
        .await?;
    Ok(Json(event))
}

#[utoipa::path(
    post,
    path = "/{id}/open-registration",
    tag = "Registrations",
    operation_id = "openRegistration",
    summary = "Reopen registration for an event",
    description = "Creator or admin only. A started event cannot be reopened.",
    params(("id" = i32, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Registration opened", body = EventResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the creator or an admin (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Event not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Event already started (INVALID_STATE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id, event_id = id))]
pub async fn open_registration(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<EventResponse>, AppError> {
    let event = EventRegistry::new(&state.db)
        .set_registration_closed(id, false, &auth_user.actor())
        .await?;
    Ok(Json(event))
}

#[utoipa::path(
    get,
    path = "/department/{department}",
    tag = "Events",
    operation_id = "listEventsByDepartment",
    summary = "List events of one department",
    params(("department" = String, Path, description = "Exact department name")),
    responses(
        (status = 200, description = "Matching events", body = Vec<EventResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_by_department(
    State(state): State<AppState>,
    Path(department): Path<String>,
) -> Result<Json<Vec<EventResponse>>, AppError> {
    let events = EventRegistry::new(&state.db)
        .list_by_department(&department)
        .await?;
    Ok(Json(events))
}

#[utoipa::path(
    get,
    path = "/upcoming",
    tag = "Events",
    operation_id = "listUpcomingEvents",
    summary = "List events dated after today",
    responses(
        (status = 200, description = "Upcoming events", body = Vec<EventResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_upcoming(
    State(state): State<AppState>,
) -> Result<Json<Vec<EventResponse>>, AppError> {
    let events = EventRegistry::new(&state.db).list_upcoming().await?;
    Ok(Json(events))
}

#[utoipa::path(
    get,
    path = "/search",
    tag = "Events",
    operation_id = "searchEvents",
    summary = "Search events by title or description",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching events", body = Vec<EventResponse>),
        (status = 400, description = "Empty query (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(q = %query.q))]
pub async fn search_events(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<EventResponse>>, AppError> {
    let events = EventRegistry::new(&state.db).search(&query.q).await?;
    Ok(Json(events))
}

#[utoipa::path(
    get,
    path = "/my-events",
    tag = "Events",
    operation_id = "listMyEvents",
    summary = "List events created by the caller",
    responses(
        (status = 200, description = "Caller's events", body = Vec<EventResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_my_events(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<EventResponse>>, AppError> {
    let events = EventRegistry::new(&state.db)
        .list_by_creator(auth_user.user_id)
        .await?;
    Ok(Json(events))
}

#[utoipa::path(
    get,
    path = "/registered",
    tag = "Events",
    operation_id = "listRegisteredEvents",
    summary = "List events the caller is registered for",
    responses(
        (status = 200, description = "Caller's registrations", body = Vec<EventResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_registered_events(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<EventResponse>>, AppError> {
    let events = EventRegistry::new(&state.db)
        .list_by_participant(auth_user.user_id)
        .await?;
    Ok(Json(events))
}
