use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use planner_http_errors::ErrorResponseData;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Password hasher error: {0}")]
    PasswordHasherError(String),

    #[error("Incorrect password")]
    InvalidPassword,

    #[error("Cookie signing key must be base64 and at least 64 bytes")]
    InvalidCookieKey,

    #[error("Session store error: {0}")]
    SessionStore(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match self {
            Error::InvalidPassword => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let kind = match self {
            Error::InvalidPassword => "unauthorized",
            _ => "internal_server_error",
        };

        (status, Json(ErrorResponseData::new(kind, self.to_string()))).into_response()
    }
}
