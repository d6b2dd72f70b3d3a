use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use planner_db::object_id::{CategoryId, UserId};

use crate::{auth::Authenticated, shared_state::AppState, Error};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssigneeInput {
    pub user_id: UserId,
}

async fn list_assignees(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path(category_id): Path<CategoryId>,
) -> Result<impl IntoResponse, Error> {
    let members = state.access().category_members(&caller, category_id).await?;
    Ok((StatusCode::OK, Json(members)))
}

async fn add_assignee(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path(category_id): Path<CategoryId>,
    Json(body): Json<AssigneeInput>,
) -> Result<impl IntoResponse, Error> {
    state
        .access()
        .grant_category(&caller, category_id, body.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "success": true }))))
}

async fn remove_assignee(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path((category_id, user_id)): Path<(CategoryId, UserId)>,
) -> Result<impl IntoResponse, Error> {
    state
        .access()
        .revoke_category(&caller, category_id, user_id)
        .await?;
    Ok((StatusCode::OK, Json(json!({ "success": true }))))
}

pub fn configure() -> Router<AppState> {
    let routes = Router::new()
        .route("/", get(list_assignees).post(add_assignee))
        .route("/:user_id", delete(remove_assignee));

    Router::new().nest("/categories/:category_id/assignees", routes)
}
