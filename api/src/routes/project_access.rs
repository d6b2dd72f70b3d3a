use std::collections::BTreeSet;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;

use planner_db::{
    access_scope::AccessScope,
    object_id::{CategoryId, ProjectId, UserId},
    CategoryAccessMode,
};

use crate::{auth::Authenticated, shared_state::AppState, Error};

#[derive(Debug, Deserialize)]
pub struct ScopeInput {
    pub mode: CategoryAccessMode,
    #[serde(default)]
    pub categories: BTreeSet<CategoryId>,
}

async fn set_access(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path((project_id, user_id)): Path<(ProjectId, UserId)>,
    Json(body): Json<ScopeInput>,
) -> Result<impl IntoResponse, Error> {
    caller.require_admin()?;
    if body.mode == CategoryAccessMode::All && !body.categories.is_empty() {
        return Err(Error::BadRequest(
            "categories must be empty when mode is all".to_string(),
        ));
    }

    let scope = AccessScope::from_mode(body.mode, body.categories);
    let assignment = state
        .access()
        .set_project_scope(&caller, project_id, user_id, scope)
        .await?;
    Ok((StatusCode::OK, Json(assignment)))
}

async fn visible_categories(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path((project_id, user_id)): Path<(ProjectId, UserId)>,
) -> Result<impl IntoResponse, Error> {
    let categories = state
        .access()
        .visible_categories(&caller, project_id, user_id)
        .await?;
    Ok((StatusCode::OK, Json(categories)))
}

pub fn configure() -> Router<AppState> {
    let routes = Router::new()
        .route("/access", put(set_access))
        .route("/categories", get(visible_categories));

    Router::new().nest("/projects/:project_id/users/:user_id", routes)
}
