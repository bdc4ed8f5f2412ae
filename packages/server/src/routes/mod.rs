use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn api_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/events", event_routes())
        .nest("/users", user_routes())
        .nest("/public", public_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::register))
        .routes(routes!(handlers::auth::login))
        .routes(routes!(
            handlers::auth::get_profile,
            handlers::auth::update_profile
        ))
        .routes(routes!(handlers::auth::change_password))
        .routes(routes!(
            handlers::auth::get_student_details,
            handlers::auth::update_student_details
        ))
        .routes(routes!(
            handlers::auth::get_event_manager_details,
            handlers::auth::update_event_manager_details
        ))
        .routes(routes!(
            handlers::auth::get_admin_details,
            handlers::auth::update_admin_details
        ))
}

fn event_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::event::list_events,
            handlers::event::create_event
        ))
        .routes(routes!(handlers::event::list_upcoming))
        .routes(routes!(handlers::event::search_events))
        .routes(routes!(handlers::event::list_my_events))
        .routes(routes!(handlers::event::list_registered_events))
        .routes(routes!(handlers::event::list_by_department))
        .routes(routes!(
            handlers::event::get_event,
            handlers::event::update_event,
            handlers::event::delete_event
        ))
        .routes(routes!(handlers::event::register_for_event))
        .routes(routes!(handlers::event::unregister_from_event))
        .routes(routes!(handlers::event::close_registration))
        .routes(routes!(handlers::event::open_registration))
}

fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::user::list_users))
        .routes(routes!(handlers::user::current_user))
        .routes(routes!(
            handlers::user::get_user,
            handlers::user::update_user,
            handlers::user::delete_user
        ))
}

fn public_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::public::health))
        .routes(routes!(handlers::public::info))
}
