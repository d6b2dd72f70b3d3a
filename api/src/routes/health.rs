use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use diesel::RunQueryDsl;
use planner_db::PoolExt;
use serde::Serialize;

use crate::{shared_state::AppState, Error};

#[derive(Serialize)]
struct HealthResponse {
    /// If the database connection is ok
    database: bool,
    /// If all the other fields indicate healthy status.
    healthy: bool,
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let db_result = state
        .db
        .interact(|conn| {
            diesel::sql_query("SELECT 1")
                .execute(conn)
                .map_err(Error::from)
        })
        .await;

    let status = if db_result.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            healthy: db_result.is_ok(),
            database: db_result.is_ok(),
        }),
    )
}

pub fn configure() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
