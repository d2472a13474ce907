use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;

use super::dto::ErrorEnvelope;

/// Uniform API failure: a status code plus the `{success: false, error}`
/// envelope. Handlers classify their own store errors; the `From`
/// conversions below only cover the generic cases and never surface
/// internal detail to the client.
#[derive(Debug)]
pub struct Error {
    pub code: StatusCode,
    pub body: Json<ErrorEnvelope>,
}

impl Error {
    pub fn new(code: StatusCode, message: &str) -> Self {
        Self {
            code,
            body: Json(ErrorEnvelope::new(message)),
        }
    }

    /// 400 with the collected validation messages joined the way the API
    /// contract expects (comma-separated, human-readable).
    pub fn validation(messages: Vec<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, &messages.join(", "))
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (self.code, self.body).into_response()
    }
}

impl From<(StatusCode, &str)> for Error {
    fn from((code, msg): (StatusCode, &str)) -> Self {
        Self::new(code, msg)
    }
}

impl From<sqlx::error::Error> for Error {
    fn from(error: sqlx::error::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => Self::new(StatusCode::NOT_FOUND, "Resource not found."),
            error => {
                tracing::error!("database error: {error}");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Server Error.")
            }
        }
    }
}

impl From<jsonwebtoken::errors::Error> for Error {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        tracing::error!("token signing error: {error}");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Server Error.")
    }
}

impl From<argon2::password_hash::Error> for Error {
    fn from(error: argon2::password_hash::Error) -> Self {
        tracing::error!("password hashing error: {error}");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Server Error.")
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        tracing::error!("io error: {error}");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Server Error.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_404() {
        let err = Error::from(sqlx::Error::RowNotFound);
        assert_eq!(err.code, StatusCode::NOT_FOUND);
    }

    #[test]
    fn other_store_errors_map_to_a_generic_500() {
        let err = Error::from(sqlx::Error::PoolTimedOut);
        assert_eq!(err.code, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body.0.error, "Server Error.");
    }

    #[test]
    fn validation_messages_are_joined_with_commas() {
        let err = Error::validation(vec!["first".into(), "second".into()]);
        assert_eq!(err.code, StatusCode::BAD_REQUEST);
        assert_eq!(err.body.0.error, "first, second");
    }
}
