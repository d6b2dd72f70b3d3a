use axum::{
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use planner_http_errors::ErrorResponseData;

const REQUEST_ID: &str = "x-request-id";

/// In production, replace the bodies of server errors so internal details don't leak.
/// Client errors keep their messages since they describe what the caller did wrong.
pub async fn obfuscate_errors<B>(
    State(enabled): State<bool>,
    req: Request<B>,
    next: Next<B>,
) -> Response {
    let res = next.run(req).await;
    if !enabled || res.status() != StatusCode::INTERNAL_SERVER_ERROR {
        return res;
    }

    let request_id = res.headers().get(REQUEST_ID).cloned();
    let body = ErrorResponseData::new("internal_server_error", "Internal error");
    let mut new_res = body.into_response_with(StatusCode::INTERNAL_SERVER_ERROR);

    // Only the request id carries over. Encoding and length headers describe the old body.
    if let Some(request_id) = request_id {
        new_res.headers_mut().insert(REQUEST_ID, request_id);
    }

    new_res
}
