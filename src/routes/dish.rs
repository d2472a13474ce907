use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::json;
use utoipa::OpenApi;

use crate::{
    database::is_unique_violation,
    models::{
        dto::{DataEnvelope, DishPayload, DishResponse, ListEnvelope},
        Error,
    },
    AppState,
};

use super::middlewares::{admin_guard, auth_guard};
use super::upload::{self, MAX_IMAGE_BYTES};

#[derive(OpenApi)]
#[openapi(paths(
    get_dishes_handler,
    get_dish_handler,
    create_dish_handler,
    update_dish_handler,
    delete_dish_handler
))]
/// Defines the OpenAPI spec for dish endpoints
pub struct DishesApi;

/// Used to group dish endpoints together in the OpenAPI documentation
pub const DISH_API_GROUP: &str = "DISHES";

/// Builds a router for all the dish routes. Reads are public; mutations
/// require an authenticated admin (auth guard runs before the role guard).
pub fn dish_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let admin = Router::new()
        .route("/", post(create_dish_handler))
        .route("/:id", put(update_dish_handler))
        .route("/:id", delete(delete_dish_handler))
        // multipart bodies may carry a 5MB image plus form fields
        .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES + 1024 * 1024))
        .route_layer(middleware::from_fn(admin_guard))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    Router::new()
        .route("/", get(get_dishes_handler))
        .route("/:id", get(get_dish_handler))
        .merge(admin)
}

/// Get all dishes handler function
#[utoipa::path(
    get,
    path = "/api/dishes",
    tag = DISH_API_GROUP,
    responses(
        (status = 200, description = "All dishes, sorted by category then name"),
    )
)]
pub async fn get_dishes_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListEnvelope<DishResponse>>, Error> {
    let dishes = state.db.list_dishes().await?;
    Ok(Json(ListEnvelope::new(
        dishes.into_iter().map(DishResponse::from).collect(),
    )))
}

/// Get single dish handler function
#[utoipa::path(
    get,
    path = "/api/dishes/{id}",
    tag = DISH_API_GROUP,
    params(
        ("id" = i32, Path, description = "Dish ID")
    ),
    responses(
        (status = 200, description = "Dish found", body = DishResponse),
        (status = 404, description = "Dish not found"),
    )
)]
pub async fn get_dish_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<DataEnvelope<DishResponse>>, Error> {
    let dish = state
        .db
        .get_dish_by_id(id)
        .await?
        .ok_or((StatusCode::NOT_FOUND, "Dish not found."))?;
    Ok(Json(DataEnvelope::new(DishResponse::from(dish))))
}

/// Create dish handler function: derive the image URL from the upload (if
/// any), merge it into the payload, validate, then persist.
#[utoipa::path(
    post,
    path = "/api/dishes",
    tag = DISH_API_GROUP,
    request_body(content = DishPayload, content_type = "multipart/form-data"),
    security(
        ("bearerAuth" = [])
    ),
    responses(
        (status = 201, description = "Dish created", body = DishResponse),
        (status = 400, description = "Validation failure or duplicate name"),
    )
)]
pub async fn create_dish_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl axum::response::IntoResponse, Error> {
    let form = upload::read_dish_form(multipart).await?;
    let mut payload = DishPayload::from_fields(&form.fields);
    if let Some(image) = form.image {
        payload.image_url = Some(upload::store_image(&image, &state.config.upload_dir()).await?);
    }

    let new_dish = payload.validate().map_err(Error::validation)?;
    let dish = match state.db.create_dish(&new_dish).await {
        Ok(dish) => dish,
        Err(e) if is_unique_violation(&e) => {
            return Err(Error::new(
                StatusCode::BAD_REQUEST,
                "Dish name already exists.",
            ))
        }
        Err(e) => return Err(e.into()),
    };

    Ok((
        StatusCode::CREATED,
        Json(DataEnvelope::with_message(
            DishResponse::from(dish),
            "Dish created successfully.",
        )),
    ))
}

/// Update dish handler function: partial multipart update; absent fields
/// keep their stored values and the merged record is re-validated.
#[utoipa::path(
    put,
    path = "/api/dishes/{id}",
    tag = DISH_API_GROUP,
    params(
        ("id" = i32, Path, description = "Dish ID")
    ),
    request_body(content = DishPayload, content_type = "multipart/form-data"),
    security(
        ("bearerAuth" = [])
    ),
    responses(
        (status = 200, description = "Dish updated", body = DishResponse),
        (status = 400, description = "Validation failure or duplicate name"),
        (status = 404, description = "Dish not found"),
    )
)]
pub async fn update_dish_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<DataEnvelope<DishResponse>>, Error> {
    let existing = state
        .db
        .get_dish_by_id(id)
        .await?
        .ok_or((StatusCode::NOT_FOUND, "Dish not found for update."))?;

    let form = upload::read_dish_form(multipart).await?;
    let mut payload = DishPayload::from_fields(&form.fields);
    if let Some(image) = form.image {
        // a new upload overwrites the stored image URL
        payload.image_url = Some(upload::store_image(&image, &state.config.upload_dir()).await?);
    }

    let merged = payload
        .or_existing(&existing)
        .validate()
        .map_err(Error::validation)?;

    let dish = match state.db.update_dish(id, &merged).await {
        Ok(Some(dish)) => dish,
        Ok(None) => return Err(Error::new(StatusCode::NOT_FOUND, "Dish not found for update.")),
        Err(e) if is_unique_violation(&e) => {
            return Err(Error::new(
                StatusCode::BAD_REQUEST,
                "Dish name already exists.",
            ))
        }
        Err(e) => return Err(e.into()),
    };

    Ok(Json(DataEnvelope::with_message(
        DishResponse::from(dish),
        "Dish updated successfully.",
    )))
}

/// Delete dish handler function. Not idempotent: the second delete of the
/// same id answers 404.
#[utoipa::path(
    delete,
    path = "/api/dishes/{id}",
    tag = DISH_API_GROUP,
    params(
        ("id" = i32, Path, description = "Dish ID")
    ),
    security(
        ("bearerAuth" = [])
    ),
    responses(
        (status = 200, description = "Dish deleted"),
        (status = 404, description = "Dish not found"),
    )
)]
pub async fn delete_dish_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<DataEnvelope<serde_json::Value>>, Error> {
    if state.db.delete_dish(id).await? {
        Ok(Json(DataEnvelope::with_message(
            json!({}),
            "Dish deleted successfully.",
        )))
    } else {
        Err(Error::new(
            StatusCode::NOT_FOUND,
            "Dish not found for deletion.",
        ))
    }
}
