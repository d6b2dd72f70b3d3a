use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use planner_http_errors::ErrorResponseData;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Db(#[from] planner_db::Error),

    #[error("Database Pool Error: {0}")]
    DbPool(#[from] deadpool_diesel::PoolError),

    #[error("Database task failed: {0}")]
    DeadpoolInteract(String),

    #[error("Server error: {0}")]
    ServerError(#[from] hyper::Error),

    #[error("Unauthenticated")]
    Unauthenticated,

    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("Administrator access required")]
    Forbidden,

    #[error("This account has been deactivated")]
    AccountDeactivated,

    #[error("Auth error: {0}")]
    AuthError(#[from] planner_auth::Error),

    #[error("{0}")]
    BadRequest(String),

    #[error("Invite not found")]
    InviteNotFound,

    #[error(transparent)]
    Generic(#[from] anyhow::Error),
}

impl Error {
    fn error_kind(&self) -> &'static str {
        match self {
            Error::Db(planner_db::Error::NotFound(_)) => "not_found",
            Error::Db(planner_db::Error::NotApplicable) => "not_applicable",
            Error::Db(planner_db::Error::Conflict(_)) => "conflict",
            Error::Db(_) => "db",
            Error::DbPool(_) => "db_pool",
            Error::DeadpoolInteract(_) => "db",
            Error::ServerError(_) => "internal_server_error",
            Error::Unauthenticated => "unauthorized",
            Error::InvalidCredentials => "unauthorized",
            Error::Forbidden => "forbidden",
            Error::AccountDeactivated => "account_deactivated",
            Error::AuthError(planner_auth::Error::InvalidPassword) => "unauthorized",
            Error::AuthError(_) => "authn",
            Error::BadRequest(_) => "bad_request",
            Error::InviteNotFound => "not_found",
            Error::Generic(_) => "internal_server_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Db(planner_db::Error::NotFound(_)) => StatusCode::NOT_FOUND,
            Error::Db(planner_db::Error::NotApplicable) => StatusCode::NOT_FOUND,
            Error::Db(planner_db::Error::Conflict(_)) => StatusCode::CONFLICT,
            Error::Unauthenticated => StatusCode::UNAUTHORIZED,
            Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::AuthError(planner_auth::Error::InvalidPassword) => StatusCode::UNAUTHORIZED,
            Error::Forbidden => StatusCode::FORBIDDEN,
            Error::AccountDeactivated => StatusCode::FORBIDDEN,
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::InviteNotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn response_tuple(&self) -> (StatusCode, ErrorResponseData) {
        let status = self.status_code();
        (
            status,
            ErrorResponseData::for_status(status, self.error_kind(), self.to_string()),
        )
    }
}

impl From<diesel::result::Error> for Error {
    fn from(e: diesel::result::Error) -> Self {
        Error::Db(planner_db::Error::from(e))
    }
}

impl From<deadpool_diesel::InteractError> for Error {
    fn from(e: deadpool_diesel::InteractError) -> Self {
        Error::DeadpoolInteract(e.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (code, json) = self.response_tuple();
        json.into_response_with(code)
    }
}
