use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use diesel::RunQueryDsl;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use planner_db::{
    activity_logs::{ActivityAction, ActivityRecord, EntityKind},
    object_id::UserId,
    users::{self, NewUser, UserListing, UserStatus},
    PoolExt,
};

use crate::{audit, auth::Authenticated, shared_state::AppState, Error};

const PLACEHOLDER_NAME: &str = "Pending User";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UserOutput {
    #[serde(flatten)]
    user: UserListing,
    status: UserStatus,
}

async fn list_users(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
) -> Result<impl IntoResponse, Error> {
    caller.require_admin()?;
    let users = state
        .db
        .interact(|conn| users::list_all(conn).map_err(Error::from))
        .await?
        .into_iter()
        .map(|user| UserOutput {
            status: user.status(),
            user,
        })
        .collect::<Vec<_>>();

    Ok((StatusCode::OK, Json(users)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteInput {
    pub full_name: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InviteOutput {
    id: UserId,
    invite_token: String,
}

/// Create a pending user. The invite token is only ever returned here.
async fn invite_user(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Json(body): Json<InviteInput>,
) -> Result<impl IntoResponse, Error> {
    caller.require_admin()?;

    let id = UserId::new();
    let token = planner_auth::invite::new_invite_token();
    let full_name = body
        .full_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| PLACEHOLDER_NAME.to_string());

    let new_user = NewUser {
        id,
        username: format!("pending_{}", &Uuid::new_v4().simple().to_string()[..8]),
        full_name: full_name.clone(),
        email: body.email,
        password_hash: None,
        invite_token: Some(token.clone()),
        is_admin: body.is_admin,
        is_active: false,
    };

    state
        .db
        .interact(move |conn| {
            diesel::insert_into(planner_db::schema::users::table)
                .values(&new_user)
                .execute(conn)
                .map_err(Error::from)
        })
        .await?;

    audit::emit(
        state.audit.as_ref(),
        ActivityRecord {
            actor_id: caller.user_id,
            action: ActivityAction::Created,
            entity_kind: EntityKind::User,
            entity_id: id.into_inner(),
            entity_name: full_name,
            details: json!({ "isAdmin": body.is_admin }),
        },
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(InviteOutput {
            id,
            invite_token: token,
        }),
    ))
}

pub fn configure() -> Router<AppState> {
    Router::new().route("/users", get(list_users).post(invite_user))
}

pub(crate) fn is_placeholder_name(name: &str) -> bool {
    name == PLACEHOLDER_NAME
}
