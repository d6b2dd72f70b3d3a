use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use ulid::Ulid;
use uuid::Uuid;

use planner_auth::{
    session::{SessionCookieManager, SessionManager},
    AuthenticationLayer,
};
use planner_db::{object_id::UserId, PoolExt};

use planner_auth as auth;
use planner_db as db;

use crate::{config::Config, Error};

/// The identity behind a request, as established by its session.
#[derive(Clone, Debug)]
pub struct Caller {
    pub user_id: UserId,
    pub is_admin: bool,
    pub is_active: bool,
}

impl Caller {
    pub fn require_active(&self) -> Result<(), Error> {
        if self.is_active {
            Ok(())
        } else {
            Err(Error::AccountDeactivated)
        }
    }

    pub fn require_admin(&self) -> Result<(), Error> {
        self.require_active()?;
        if self.is_admin {
            Ok(())
        } else {
            Err(Error::Forbidden)
        }
    }
}

#[derive(Clone)]
pub struct SessionStore {
    pub db: db::Pool,
}

#[derive(Queryable)]
pub struct SessionData {
    user_id: UserId,
    is_admin: bool,
    is_active: bool,
}

impl From<SessionData> for Caller {
    fn from(s: SessionData) -> Self {
        Caller {
            user_id: s.user_id,
            is_admin: s.is_admin,
            is_active: s.is_active,
        }
    }
}

#[async_trait]
impl auth::session::SessionStore for SessionStore {
    type UserId = UserId;
    type SessionFetchData = SessionData;
    type Error = crate::Error;

    async fn create_session(
        &self,
        user_id: UserId,
        expires: DateTime<Utc>,
    ) -> Result<String, Self::Error> {
        let session_id = self
            .db
            .interact(move |conn| {
                let input = db::sessions::Session {
                    id: Ulid::new().into(),
                    user_id,
                    expires,
                };

                diesel::insert_into(db::schema::sessions::table)
                    .values(&input)
                    .execute(conn)?;

                Ok::<Uuid, crate::Error>(input.id)
            })
            .await?;

        Ok(session_id.to_string())
    }

    async fn get_session(&self, id: &str) -> Result<Option<Self::SessionFetchData>, Self::Error> {
        let Ok(session_id) = id.parse::<Uuid>() else {
            return Ok(None);
        };

        self.db
            .interact(move |conn| {
                db::schema::sessions::table
                    .inner_join(db::schema::users::table)
                    .filter(db::schema::sessions::id.eq(session_id))
                    .filter(db::schema::sessions::expires.gt(Utc::now()))
                    .select((
                        db::schema::sessions::user_id,
                        db::schema::users::is_admin,
                        db::schema::users::is_active,
                    ))
                    .first::<SessionData>(conn)
                    .optional()
                    .map_err(Error::from)
            })
            .await
    }

    async fn delete_session(&self, id: &str) -> Result<(), Self::Error> {
        let Ok(session_id) = id.parse::<Uuid>() else {
            return Ok(());
        };

        self.db
            .interact(move |conn| {
                diesel::delete(db::schema::sessions::table.find(session_id))
                    .execute(conn)
                    .map_err(Error::from)
            })
            .await?;

        Ok(())
    }

    fn session_is_valid(&self, data: &SessionData) -> bool {
        data.is_active
    }
}

/// Extracts the [Caller], failing with 401 if the request has no session.
pub struct Authenticated(pub Caller);

#[async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Caller>()
            .cloned()
            .map(Authenticated)
            .ok_or(Error::Unauthenticated)
    }
}

pub fn session_manager(db: db::Pool, config: &Config) -> Result<SessionManager<SessionStore>, Error> {
    let cookies = SessionCookieManager::from_base64_key(
        &config.cookie_key,
        config.session_cookie_name.clone(),
    )?;

    Ok(SessionManager {
        store: SessionStore { db },
        cookies,
        expire_days: config.session_expire_days,
    })
}

pub fn auth_layer(sessions: SessionManager<SessionStore>) -> AuthenticationLayer<SessionStore, Caller> {
    AuthenticationLayer::new(sessions)
}
