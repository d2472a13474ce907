use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::{
    database::is_unique_violation,
    models::{
        dto::{Ack, LoginInfo, RegisterInfo},
        token_claim, Error, Role, User,
    },
    AppState,
};

use super::middlewares::TOKEN_COOKIE;

#[derive(OpenApi)]
#[openapi(paths(register_handler, login_handler))]
/// Defines the OpenAPI spec for auth endpoints
pub struct AuthApi;

/// Used to group auth endpoints together in the OpenAPI documentation
pub const AUTH_API_GROUP: &str = "AUTH";

/// Builds a router for the auth routes
pub fn auth_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
}

/// The credential travels only in an HTTP-only session cookie, never in
/// the response body. `Secure` is set in production only so local
/// development over plain HTTP keeps working.
fn token_cookie(token: String, production: bool) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .secure(production)
        .build()
}

// Register handler function: every self-registered account is an admin.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = AUTH_API_GROUP,
    request_body = RegisterInfo,
    responses(
        (status = 201, description = "User created, token cookie set", body = Ack),
        (status = 400, description = "Missing fields or email already exists"),
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<RegisterInfo>,
) -> Result<impl IntoResponse, Error> {
    let (Some(name), Some(email), Some(password)) = (body.name, body.email, body.password) else {
        return Err(Error::new(
            StatusCode::BAD_REQUEST,
            "Please provide name, email and password",
        ));
    };
    if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
        return Err(Error::new(
            StatusCode::BAD_REQUEST,
            "Please provide name, email and password",
        ));
    }

    let email = email.trim().to_ascii_lowercase();
    if state.db.get_user_by_email(&email).await?.is_some() {
        return Err(Error::new(StatusCode::BAD_REQUEST, "Email already exists."));
    }

    let salt = SaltString::generate(&mut OsRng);
    let hashed_password = Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string();

    let data = User {
        name: name.trim().to_owned(),
        email,
        hashed_password,
        role: Role::Admin,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        ..Default::default()
    };

    let user = match state.db.create_user(&data).await {
        Ok(user) => user,
        // lost the race against a concurrent registration
        Err(e) if is_unique_violation(&e) => {
            return Err(Error::new(StatusCode::BAD_REQUEST, "Email already exists."))
        }
        Err(e) => return Err(e.into()),
    };

    let token = token_claim::sign(
        user.id,
        &state.config.jwt_secret,
        state.config.jwt_expires_in_days,
    )?;

    Ok((
        StatusCode::CREATED,
        jar.add(token_cookie(token, state.config.production)),
        Json(Ack::ok()),
    ))
}

// Login handler function
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = AUTH_API_GROUP,
    request_body = LoginInfo,
    responses(
        (status = 200, description = "Logged in, token cookie set", body = Ack),
        (status = 400, description = "Missing email or password"),
        (status = 401, description = "Invalid credentials"),
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<LoginInfo>,
) -> Result<impl IntoResponse, Error> {
    let (Some(email), Some(password)) = (body.email, body.password) else {
        return Err(Error::new(
            StatusCode::BAD_REQUEST,
            "Please provide an email and password",
        ));
    };
    if email.trim().is_empty() || password.is_empty() {
        return Err(Error::new(
            StatusCode::BAD_REQUEST,
            "Please provide an email and password",
        ));
    }

    // The unknown-email and wrong-password branches answer identically so
    // a probe cannot tell which one failed.
    let email = email.trim().to_ascii_lowercase();
    let user = state
        .db
        .get_user_by_email(&email)
        .await?
        .ok_or((StatusCode::UNAUTHORIZED, "Invalid credentials"))?;

    let hash = PasswordHash::new(&user.hashed_password)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &hash)
        .map_err(|_| Error::new(StatusCode::UNAUTHORIZED, "Invalid credentials"))?;

    let token = token_claim::sign(
        user.id,
        &state.config.jwt_secret,
        state.config.jwt_expires_in_days,
    )?;

    Ok((
        StatusCode::OK,
        jar.add(token_cookie(token, state.config.production)),
        Json(Ack::ok()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_is_http_only_and_lax() {
        let cookie = token_cookie("abc".to_owned(), false);
        assert_eq!(cookie.name(), TOKEN_COOKIE);
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_ne!(cookie.secure(), Some(true));
    }

    #[test]
    fn secure_flag_is_reserved_for_production() {
        assert_eq!(token_cookie("abc".to_owned(), true).secure(), Some(true));
    }
}
