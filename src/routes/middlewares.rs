use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    models::{
        token_claim::{self, TokenError},
        Error, Role, User,
    },
    AppState,
};

/// Cookie carrying the credential between requests.
pub const TOKEN_COOKIE: &str = "token";

/// Token source precedence: `Authorization: Bearer <t>` header first, then
/// the `token` cookie.
fn bearer_or_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_owned)
        .or_else(|| {
            CookieJar::from_headers(headers)
                .get(TOKEN_COOKIE)
                .map(|cookie| cookie.value().to_owned())
        })
}

/// Requires a valid credential that still resolves to a user; attaches the
/// user to the request for downstream handlers and guards.
pub async fn auth_guard(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, Error> {
    let token = bearer_or_cookie(req.headers()).ok_or((
        StatusCode::UNAUTHORIZED,
        "Not authorized to access this route. (Token missing)",
    ))?;

    let claims = token_claim::verify(&token, &state.config.jwt_secret).map_err(|e| match e {
        TokenError::Expired => Error::new(
            StatusCode::UNAUTHORIZED,
            "Not authorized to access this route. (Token expired)",
        ),
        TokenError::Invalid => Error::new(
            StatusCode::UNAUTHORIZED,
            "Not authorized to access this route. (Invalid token)",
        ),
    })?;

    let user = state.db.get_user_by_id(claims.sub).await?.ok_or((
        StatusCode::UNAUTHORIZED,
        "Not authorized to access this route. (Invalid token)",
    ))?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Restricts a route to admins. Must run after [`auth_guard`].
pub async fn admin_guard(req: Request, next: Next) -> Result<Response, Error> {
    authorize(&[Role::Admin], req, next).await
}

/// Role check against an explicit allow-list.
async fn authorize(allowed: &[Role], req: Request, next: Next) -> Result<Response, Error> {
    let user = req.extensions().get::<User>().ok_or((
        StatusCode::UNAUTHORIZED,
        "Not authorized to access this route. (Token missing)",
    ))?;

    if !allowed.contains(&user.role) {
        return Err(Error::new(
            StatusCode::FORBIDDEN,
            &format!(
                "User role {} is not authorized to access this route.",
                user.role.as_str()
            ),
        ));
    }

    Ok(next.run(req).await)
}
