use axum::{
    extract::State, http::StatusCode, response::IntoResponse, routing::post, Extension, Json,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_cookies::Cookies;
use tracing::{event, Level};

use planner_db::{users, PoolExt};

use crate::{
    auth::Authenticated, routes::invites::MIN_PASSWORD_LENGTH, shared_state::AppState, Error,
};

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginOutput {
    success: bool,
    using_default_password: bool,
}

async fn login(
    State(state): State<AppState>,
    Extension(cookies): Extension<Cookies>,
    Json(body): Json<LoginInput>,
) -> Result<impl IntoResponse, Error> {
    let username = body.username.trim().to_lowercase();
    let user = state
        .db
        .interact(move |conn| users::find_by_username(conn, &username).map_err(Error::from))
        .await?
        .filter(|u| u.is_active)
        .ok_or(Error::InvalidCredentials)?;

    let hash = user.password_hash.as_deref().ok_or(Error::InvalidCredentials)?;
    planner_auth::password::verify_password(&body.password, hash).map_err(|e| match e {
        planner_auth::Error::InvalidPassword => Error::InvalidCredentials,
        e => Error::from(e),
    })?;

    state.sessions.create_session(&cookies, user.id).await?;
    event!(Level::INFO, user_id=%user.id, "Logged in");

    Ok((
        StatusCode::OK,
        Json(LoginOutput {
            success: true,
            using_default_password: user.password_changed.is_none(),
        }),
    ))
}

async fn logout(
    State(state): State<AppState>,
    Extension(cookies): Extension<Cookies>,
) -> Result<impl IntoResponse, Error> {
    state.sessions.logout(&cookies).await?;
    Ok((StatusCode::OK, Json(json!({ "success": true }))))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordInput {
    pub current_password: String,
    pub new_password: String,
}

async fn change_password(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Json(body): Json<ChangePasswordInput>,
) -> Result<impl IntoResponse, Error> {
    caller.require_active()?;
    if body.new_password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(Error::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    let user_id = caller.user_id;
    let user = state
        .db
        .interact(move |conn| users::find(conn, user_id).map_err(Error::from))
        .await?;

    let hash = user.password_hash.as_deref().ok_or(Error::InvalidCredentials)?;
    planner_auth::password::verify_password(&body.current_password, hash).map_err(|e| match e {
        planner_auth::Error::InvalidPassword => Error::InvalidCredentials,
        e => Error::from(e),
    })?;

    let new_hash = planner_auth::password::new_hash(&body.new_password)?;
    state
        .db
        .interact(move |conn| users::set_password(conn, user_id, &new_hash).map_err(Error::from))
        .await?;

    Ok((StatusCode::OK, Json(json!({ "success": true }))))
}

pub fn configure() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/change-password", post(change_password))
}
