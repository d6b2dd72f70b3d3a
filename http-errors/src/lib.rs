use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tracing::{event, Level};

/// The body of every error response: `{"error": {"kind": ..., "message": ...}}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponseData {
    error: ErrorDetails,
}

#[derive(Debug, Serialize, Deserialize)]
struct ErrorDetails {
    kind: Cow<'static, str>,
    message: Cow<'static, str>,
}

impl ErrorResponseData {
    /// Create the body for a server-side failure. This is logged at ERROR.
    pub fn new(
        kind: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> ErrorResponseData {
        Self::for_status(StatusCode::INTERNAL_SERVER_ERROR, kind, message)
    }

    /// Create the body for a response with the given status. Client errors are logged at
    /// INFO since they are expected during normal use.
    pub fn for_status(
        status: StatusCode,
        kind: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> ErrorResponseData {
        let ret = ErrorResponseData {
            error: ErrorDetails {
                kind: kind.into(),
                message: message.into(),
            },
        };

        if status.is_server_error() {
            event!(Level::ERROR, %status, kind=%ret.error.kind, message=%ret.error.message);
        } else {
            event!(Level::INFO, %status, kind=%ret.error.kind, message=%ret.error.message);
        }

        ret
    }

    pub fn kind(&self) -> &str {
        &self.error.kind
    }

    pub fn message(&self) -> &str {
        &self.error.message
    }

    pub fn into_response_with(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_shape() {
        let data = ErrorResponseData::for_status(StatusCode::NOT_FOUND, "not_found", "Unknown task");
        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "error": { "kind": "not_found", "message": "Unknown task" } })
        );

        let parsed: ErrorResponseData = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.kind(), "not_found");
        assert_eq!(parsed.message(), "Unknown task");
    }
}
