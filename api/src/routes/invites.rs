use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;

use planner_db::{
    users::{self, AcceptedInvite},
    PoolExt,
};

use crate::{routes::users::is_placeholder_name, shared_state::AppState, Error};

static USERNAME: Lazy<Regex> = Lazy::new(|| Regex::new("^[a-z0-9_]{3,30}$").unwrap());

pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InviteInfo {
    full_name: String,
    email: Option<String>,
}

async fn get_invite(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, Error> {
    let user = state
        .db
        .interact(move |conn| users::find_by_invite_token(conn, &token).map_err(Error::from))
        .await?
        .filter(|u| !u.is_active)
        .ok_or(Error::InviteNotFound)?;

    let full_name = if is_placeholder_name(&user.full_name) {
        String::new()
    } else {
        user.full_name
    };

    Ok((
        StatusCode::OK,
        Json(InviteInfo {
            full_name,
            email: user.email,
        }),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptInput {
    pub full_name: String,
    pub username: String,
    pub email: Option<String>,
    pub password: String,
}

impl AcceptInput {
    fn validate(&self) -> Result<(), Error> {
        if self.full_name.trim().is_empty() {
            return Err(Error::BadRequest("Full name is required".to_string()));
        }

        if !USERNAME.is_match(&self.username) {
            return Err(Error::BadRequest(
                "Username must be 3-30 characters of lowercase letters, numbers, or underscores"
                    .to_string(),
            ));
        }

        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(Error::BadRequest(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        Ok(())
    }
}

async fn accept_invite(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(body): Json<AcceptInput>,
) -> Result<impl IntoResponse, Error> {
    body.validate()?;
    let password_hash = planner_auth::password::new_hash(&body.password)?;

    let accepted = AcceptedInvite {
        full_name: body.full_name.trim().to_string(),
        username: body.username,
        email: body.email.filter(|e| !e.trim().is_empty()),
        password_hash,
    };

    state
        .db
        .transaction(move |conn| {
            users::accept_invite(conn, &token, accepted).map_err(|e| match e {
                planner_db::Error::NotFound(_) => Error::InviteNotFound,
                e => Error::from(e),
            })
        })
        .await?;

    Ok((StatusCode::OK, Json(json!({ "success": true }))))
}

pub fn configure() -> Router<AppState> {
    Router::new().route("/invites/:token", get(get_invite).post(accept_invite))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn input(username: &str, password: &str) -> AcceptInput {
        AcceptInput {
            full_name: "New Person".to_string(),
            username: username.to_string(),
            email: None,
            password: password.to_string(),
        }
    }

    #[test]
    fn validation() {
        assert!(input("new_person", "long enough").validate().is_ok());
        assert_matches!(input("ab", "long enough").validate(), Err(Error::BadRequest(_)));
        assert_matches!(
            input("Has Caps", "long enough").validate(),
            Err(Error::BadRequest(_))
        );
        assert_matches!(
            input(&"a".repeat(31), "long enough").validate(),
            Err(Error::BadRequest(_))
        );
        assert_matches!(input("new_person", "short").validate(), Err(Error::BadRequest(_)));
    }
}
