use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::json;
use utoipa::OpenApi;

use crate::{
    models::{
        dto::{DataEnvelope, ListEnvelope, ReservationPayload, ReservationResponse, StatusUpdate},
        Error, ReservationStatus,
    },
    AppState,
};

use super::middlewares::{admin_guard, auth_guard};

#[derive(OpenApi)]
#[openapi(paths(
    create_reservation_handler,
    get_reservations_handler,
    update_reservation_status_handler,
    delete_reservation_handler
))]
/// Defines the OpenAPI spec for reservation endpoints
pub struct ReservationsApi;

/// Used to group reservation endpoints together in the OpenAPI documentation
pub const RESERVATION_API_GROUP: &str = "RESERVATIONS";

/// Builds a router for all the reservation routes. Anyone may submit a
/// reservation; listing and mutating them is admin-only.
pub fn reservation_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let admin = Router::new()
        .route("/", get(get_reservations_handler))
        .route("/:id", put(update_reservation_status_handler))
        .route("/:id", delete(delete_reservation_handler))
        .route_layer(middleware::from_fn(admin_guard))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    Router::new()
        .route("/", post(create_reservation_handler))
        .merge(admin)
}

/// Create reservation handler function (public)
#[utoipa::path(
    post,
    path = "/api/reservations",
    tag = RESERVATION_API_GROUP,
    request_body = ReservationPayload,
    responses(
        (status = 201, description = "Reservation submitted", body = ReservationResponse),
        (status = 400, description = "Validation failure"),
    )
)]
pub async fn create_reservation_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ReservationPayload>,
) -> Result<impl axum::response::IntoResponse, Error> {
    let new_reservation = payload.validate().map_err(Error::validation)?;
    let reservation = state.db.create_reservation(&new_reservation).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataEnvelope::with_message(
            ReservationResponse::from(reservation),
            "Reservation submitted successfully. You will receive a confirmation shortly.",
        )),
    ))
}

/// Get all reservations handler function (admin)
#[utoipa::path(
    get,
    path = "/api/reservations",
    tag = RESERVATION_API_GROUP,
    security(
        ("bearerAuth" = [])
    ),
    responses(
        (status = 200, description = "All reservations, sorted by date then status"),
    )
)]
pub async fn get_reservations_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListEnvelope<ReservationResponse>>, Error> {
    let reservations = state.db.list_reservations().await?;
    Ok(Json(ListEnvelope::new(
        reservations
            .into_iter()
            .map(ReservationResponse::from)
            .collect(),
    )))
}

/// Update reservation status handler function (admin). Only `status` is
/// accepted; any other field in the body is ignored by this allow-list.
#[utoipa::path(
    put,
    path = "/api/reservations/{id}",
    tag = RESERVATION_API_GROUP,
    params(
        ("id" = i32, Path, description = "Reservation ID")
    ),
    request_body = StatusUpdate,
    security(
        ("bearerAuth" = [])
    ),
    responses(
        (status = 200, description = "Status updated", body = ReservationResponse),
        (status = 400, description = "Missing or invalid status"),
        (status = 404, description = "Reservation not found"),
    )
)]
pub async fn update_reservation_status_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(body): Json<StatusUpdate>,
) -> Result<Json<DataEnvelope<ReservationResponse>>, Error> {
    let status = body
        .status
        .ok_or((StatusCode::BAD_REQUEST, "Please provide a new status."))?;
    let status: ReservationStatus = status
        .parse()
        .map_err(|_| Error::new(StatusCode::BAD_REQUEST, "Invalid reservation status."))?;

    let reservation = state
        .db
        .update_reservation_status(id, status)
        .await?
        .ok_or((StatusCode::NOT_FOUND, "Reservation not found."))?;

    Ok(Json(DataEnvelope::with_message(
        ReservationResponse::from(reservation),
        format!("Reservation status updated to: {status}."),
    )))
}

/// Delete reservation handler function (admin)
#[utoipa::path(
    delete,
    path = "/api/reservations/{id}",
    tag = RESERVATION_API_GROUP,
    params(
        ("id" = i32, Path, description = "Reservation ID")
    ),
    security(
        ("bearerAuth" = [])
    ),
    responses(
        (status = 200, description = "Reservation deleted"),
        (status = 404, description = "Reservation not found"),
    )
)]
pub async fn delete_reservation_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<DataEnvelope<serde_json::Value>>, Error> {
    if state.db.delete_reservation(id).await? {
        Ok(Json(DataEnvelope::with_message(
            json!({}),
            "Reservation deleted successfully.",
        )))
    } else {
        Err(Error::new(
            StatusCode::NOT_FOUND,
            "Reservation not found for deletion.",
        ))
    }
}
