mod auth;
mod dish;
mod health;
mod middlewares;
mod rate_limit;
mod reservation;
mod swagger;
mod upload;
pub use rate_limit::RateLimiter;

use crate::database;
use crate::{AppState, Config};
use health::{health_checker_handler, root_handler};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method};
use axum::{middleware, routing::get, Router};
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

pub async fn make_app() -> Result<Router, Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();
    let config = Config::init();
    info!("Connecting to PostgreSQL...");
    let sqlx_db_connection = database::connect_sqlx(&config.db_url).await;
    sqlx::migrate!().run(&sqlx_db_connection).await?;
    info!("Connected to PostgreSQL!");

    let db = database::PostgreDatabase::new(sqlx_db_connection);
    let limiter = RateLimiter::new(
        config.rate_limit_max_requests,
        Duration::from_secs(config.rate_limit_window_seconds),
    );
    let state = Arc::new(AppState {
        db,
        config,
        limiter,
    });
    build_router(state)
}

pub fn build_router(state: Arc<AppState>) -> Result<Router, Box<dyn Error>> {
    let origin = state.config.client_url.parse::<HeaderValue>()?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_credentials(true)
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE]);

    let ret = Router::new()
        .route("/", get(root_handler))
        .route("/api/health", get(health_checker_handler))
        .nest("/api/v1/auth", auth::auth_routes())
        .nest("/api/dishes", dish::dish_routes(state.clone()))
        .nest(
            "/api/reservations",
            reservation::reservation_routes(state.clone()),
        )
        .merge(swagger::build_documentation())
        // uploaded images and other assets live under the public root
        .fallback_service(ServeDir::new(&state.config.public_dir))
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(state, rate_limit::throttle))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("cross-origin-resource-policy"),
            HeaderValue::from_static("cross-origin"),
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(ret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    fn test_config(db_url: &str) -> Config {
        Config {
            db_url: db_url.to_owned(),
            jwt_secret: "router-test-secret".to_owned(),
            jwt_expires_in_days: 7,
            client_url: "http://localhost:5173".to_owned(),
            production: false,
            public_dir: "public".into(),
            rate_limit_max_requests: 100,
            rate_limit_window_seconds: 900,
        }
    }

    fn state_over(pool: sqlx::PgPool, config: Config) -> Arc<AppState> {
        let limiter = RateLimiter::new(
            config.rate_limit_max_requests,
            Duration::from_secs(config.rate_limit_window_seconds),
        );
        Arc::new(AppState {
            db: database::PostgreDatabase::new(pool),
            config,
            limiter,
        })
    }

    /// State over a lazily-connected pool: requests that never reach the
    /// database can be exercised without one.
    fn test_state() -> Arc<AppState> {
        let config = test_config("postgres://localhost:1/unused");
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.db_url)
            .expect("lazy pool");
        state_over(pool, config)
    }

    /// State over a real, migrated database; only the `#[ignore]`-marked
    /// tests use this. Run them with `cargo test -- --ignored` once
    /// DATABASE_URL points at a PostgreSQL instance.
    async fn live_state() -> Arc<AppState> {
        let db_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = database::connect_sqlx(&db_url).await;
        sqlx::migrate!().run(&pool).await.expect("migrations apply");
        state_over(pool, test_config(&db_url))
    }

    fn app() -> Router {
        build_router(test_state()).expect("router builds")
    }

    #[tokio::test]
    async fn health_endpoint_responds() {
        let response = app()
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn root_banner_responds() {
        let response = app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn mutating_dish_route_requires_a_token() {
        let response = app()
            .oneshot(Request::post("/api/dishes").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn garbage_bearer_token_is_rejected() {
        let response = app()
            .oneshot(
                Request::get("/api/reservations")
                    .header("authorization", "Bearer not-a-real-token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        use jsonwebtoken::{encode, EncodingKey, Header};
        let now = chrono::Utc::now();
        let claims = crate::models::TokenClaim {
            sub: 1,
            iat: (now - chrono::Duration::days(8)).timestamp() as usize,
            exp: (now - chrono::Duration::days(1)).timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("router-test-secret".as_bytes()),
        )
        .unwrap();

        let response = app()
            .oneshot(
                Request::delete("/api/dishes/1")
                    .header("cookie", format!("token={token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn invalid_reservation_payload_fails_before_the_store() {
        let response = app()
            .oneshot(
                Request::post("/api/reservations")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"numberOfGuests": 0}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_dish_id_is_a_client_error() {
        let response = app()
            .oneshot(
                Request::get("/api/dishes/not-a-number")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unparseable_reservation_date_fails_before_the_store() {
        let response = app()
            .oneshot(
                Request::post("/api/reservations")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"guestName":"Ana","email":"ana@example.com","numberOfGuests":2,"date":"tomorrow"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    async fn admin_bearer_token(state: &Arc<AppState>) -> String {
        let user = crate::models::User {
            name: "Integration Admin".to_owned(),
            email: format!(
                "admin-{}@example.com",
                chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
            ),
            role: crate::models::Role::Admin,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
            ..Default::default()
        };
        let user = state.db.create_user(&user).await.expect("user created");
        crate::models::token_claim::sign(user.id, &state.config.jwt_secret, 7)
            .expect("token signed")
    }

    fn dish_form(name: &str) -> (String, String) {
        let boundary = "router-test-boundary";
        let body = format!(
            "--{boundary}\r\ncontent-disposition: form-data; name=\"name\"\r\n\r\n{name}\r\n\
             --{boundary}\r\ncontent-disposition: form-data; name=\"price\"\r\n\r\n12.5\r\n\
             --{boundary}\r\ncontent-disposition: form-data; name=\"category\"\r\n\r\nMain Course\r\n\
             --{boundary}--\r\n"
        );
        (format!("multipart/form-data; boundary={boundary}"), body)
    }

    #[tokio::test]
    #[ignore = "needs a migrated PostgreSQL instance via DATABASE_URL"]
    async fn duplicate_dish_name_maps_to_a_tailored_400() {
        let state = live_state().await;
        let token = admin_bearer_token(&state).await;
        let app = build_router(state).expect("router builds");

        let name = format!(
            "Router Special {}",
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        );
        let (content_type, body) = dish_form(&name);
        let request = |body: String| {
            Request::post("/api/dishes")
                .header("authorization", format!("Bearer {token}"))
                .header("content-type", &content_type)
                .body(Body::from(body))
                .unwrap()
        };

        let first = app.clone().oneshot(request(body.clone())).await.unwrap();
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = app.oneshot(request(body)).await.unwrap();
        assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    #[ignore = "needs a migrated PostgreSQL instance via DATABASE_URL"]
    async fn second_delete_of_the_same_dish_is_not_found() {
        let state = live_state().await;
        let token = admin_bearer_token(&state).await;

        let dish = crate::models::NewDish {
            name: format!(
                "Delete Twice {}",
                chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
            ),
            image_url: "/images/default-dish.jpg".to_owned(),
            description: None,
            price: 9.5,
            category: crate::models::DishCategory::MainCourse,
            is_available: true,
        };
        let dish = state.db.create_dish(&dish).await.expect("dish created");
        let app = build_router(state).expect("router builds");

        let request = || {
            Request::delete(format!("/api/dishes/{}", dish.id))
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap()
        };

        let first = app.clone().oneshot(request()).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = app.oneshot(request()).await.unwrap();
        assert_eq!(second.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    #[ignore = "needs a migrated PostgreSQL instance via DATABASE_URL"]
    async fn register_login_and_list_with_the_session_cookie() {
        use axum::http::header::SET_COOKIE;

        let state = live_state().await;
        let app = build_router(state).expect("router builds");
        let email = format!(
            "owner-{}@example.com",
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        );

        let register = app
            .clone()
            .oneshot(
                Request::post("/api/v1/auth/register")
                    .header("content-type", "application/json")
                    .body(Body::from(format!(
                        r#"{{"name":"Owner","email":"{email}","password":"s3cret"}}"#
                    )))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(register.status(), StatusCode::CREATED);

        let login = app
            .clone()
            .oneshot(
                Request::post("/api/v1/auth/login")
                    .header("content-type", "application/json")
                    .body(Body::from(format!(
                        r#"{{"email":"{email}","password":"s3cret"}}"#
                    )))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(login.status(), StatusCode::OK);
        let cookie = login
            .headers()
            .get(SET_COOKIE)
            .expect("session cookie set")
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_owned();

        let list = app
            .oneshot(
                Request::get("/api/reservations")
                    .header("cookie", cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(list.status(), StatusCode::OK);
    }
}
