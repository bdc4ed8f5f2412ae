#[utoipa::path(
    get,
    path = "/health",
    tag = "Public",
    operation_id = "health",
    summary = "Liveness probe",
    responses((status = 200, description = "Service is up", body = String, content_type = "text/plain")),
)]
pub async fn health() -> &'static str {
    "Application is running!"
}

#[utoipa::path(
    get,
    path = "/info",
    tag = "Public",
    operation_id = "info",
    summary = "Service description",
    responses((status = 200, description = "Service description", body = String, content_type = "text/plain")),
)]
pub async fn info() -> &'static str {
    "College Event Manager API - Public Information"
}
