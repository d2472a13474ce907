use crate::models::dto::Message;
use axum::{response::IntoResponse, Json};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(paths(root_handler, health_checker_handler))]
/// Defines the OpenAPI spec for liveness endpoints
pub struct HealthApi;

#[utoipa::path(
    get,
    path = "/",
    tag = "HEALTH",
    responses(
        (status = OK, description = "Success", body = Message)
    )
)]
pub async fn root_handler() -> impl IntoResponse {
    Json(Message::new("Ristorante Bellagio Backend is running"))
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "HEALTH",
    responses(
        (status = OK, description = "Success", body = Message)
    )
)]
pub async fn health_checker_handler() -> impl IntoResponse {
    Json(Message::new("OK, I'm alive!"))
}
