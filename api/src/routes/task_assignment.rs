use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use planner_db::object_id::{TaskId, UserId};

use crate::{auth::Authenticated, shared_state::AppState, Error};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssigneeInput {
    pub user_id: UserId,
}

async fn list_assignees(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path(task_id): Path<TaskId>,
) -> Result<impl IntoResponse, Error> {
    let assignees = state.access().task_assignees(&caller, task_id).await?;
    Ok((StatusCode::OK, Json(assignees)))
}

async fn assign(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path(task_id): Path<TaskId>,
    Json(body): Json<AssigneeInput>,
) -> Result<impl IntoResponse, Error> {
    state
        .access()
        .assign_task(&caller, task_id, body.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "success": true }))))
}

async fn unassign(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path((task_id, user_id)): Path<(TaskId, UserId)>,
) -> Result<impl IntoResponse, Error> {
    state
        .access()
        .unassign_task(&caller, task_id, user_id)
        .await?;
    Ok((StatusCode::OK, Json(json!({ "success": true }))))
}

pub fn configure() -> Router<AppState> {
    let routes = Router::new()
        .route("/", get(list_assignees).post(assign))
        .route("/:user_id", delete(unassign));

    Router::new().nest("/tasks/:task_id/assignees", routes)
}
