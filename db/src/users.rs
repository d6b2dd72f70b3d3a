use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{object_id::UserId, schema::*, Error};

#[derive(Clone, Debug, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub full_name: String,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub invite_token: Option<String>,
    pub is_admin: bool,
    pub is_active: bool,
    pub password_changed: Option<DateTime<Utc>>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub id: UserId,
    pub username: String,
    pub full_name: String,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub invite_token: Option<String>,
    pub is_admin: bool,
    pub is_active: bool,
}

/// The public face of a user, as returned from membership listings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Queryable, Selectable)]
#[diesel(table_name = users)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    #[serde(rename = "userId")]
    pub id: UserId,
    pub full_name: String,
    pub username: String,
}

/// Fail with `NotFound` unless the user exists.
pub fn must_exist(conn: &mut PgConnection, user_id: UserId) -> Result<(), Error> {
    let found = users::table
        .find(user_id)
        .select(users::id)
        .first::<UserId>(conn)
        .optional()?;

    found.map(|_| ()).ok_or(Error::NotFound("user"))
}

/// Every active user. This is the population that implicit project access applies to.
pub fn active_summaries(conn: &mut PgConnection) -> Result<Vec<UserSummary>, Error> {
    users::table
        .filter(users::is_active.eq(true))
        .select(UserSummary::as_select())
        .order_by(users::username)
        .load(conn)
        .map_err(Error::from)
}

pub fn find_by_username(conn: &mut PgConnection, username: &str) -> Result<Option<User>, Error> {
    users::table
        .filter(users::username.eq(username))
        .select(User::as_select())
        .first(conn)
        .optional()
        .map_err(Error::from)
}

pub fn find_by_invite_token(conn: &mut PgConnection, token: &str) -> Result<Option<User>, Error> {
    users::table
        .filter(users::invite_token.eq(token))
        .select(User::as_select())
        .first(conn)
        .optional()
        .map_err(Error::from)
}

/// How an account appears in the admin user list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    /// Invited but the invite hasn't been accepted yet.
    Pending,
    Deactivated,
}

#[derive(Clone, Debug, Serialize, Queryable)]
#[serde(rename_all = "camelCase")]
pub struct UserListing {
    pub id: UserId,
    pub username: String,
    pub full_name: String,
    pub email: Option<String>,
    pub is_admin: bool,
    #[serde(skip)]
    pub is_active: bool,
    #[serde(skip)]
    pub has_invite: bool,
    pub created: DateTime<Utc>,
}

impl UserListing {
    pub fn status(&self) -> UserStatus {
        match (self.is_active, self.has_invite) {
            (true, _) => UserStatus::Active,
            (false, true) => UserStatus::Pending,
            (false, false) => UserStatus::Deactivated,
        }
    }
}

/// Every user, including pending and deactivated ones.
pub fn list_all(conn: &mut PgConnection) -> Result<Vec<UserListing>, Error> {
    users::table
        .select((
            users::id,
            users::username,
            users::full_name,
            users::email,
            users::is_admin,
            users::is_active,
            users::invite_token.is_not_null(),
            users::created,
        ))
        .order_by(users::created)
        .load(conn)
        .map_err(Error::from)
}

/// The fields that an invitee fills in when accepting.
#[derive(Debug)]
pub struct AcceptedInvite {
    pub full_name: String,
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
}

/// Activate an invited user. Fails with `NotFound` if the token doesn't match a pending
/// user, or `Conflict` if the username is taken.
pub fn accept_invite(
    conn: &mut PgConnection,
    token: &str,
    accepted: AcceptedInvite,
) -> Result<UserId, Error> {
    let user = find_by_invite_token(conn, token)?
        .filter(|u| !u.is_active)
        .ok_or(Error::NotFound("invite"))?;

    let taken = users::table
        .filter(users::username.eq(&accepted.username))
        .filter(users::id.ne(user.id))
        .select(users::id)
        .first::<UserId>(conn)
        .optional()?;
    if taken.is_some() {
        return Err(Error::Conflict(format!(
            "username {} is already taken",
            accepted.username
        )));
    }

    diesel::update(users::table.find(user.id))
        .set((
            users::full_name.eq(accepted.full_name),
            users::username.eq(accepted.username),
            users::email.eq(accepted.email.or(user.email)),
            users::password_hash.eq(accepted.password_hash),
            users::invite_token.eq(None::<String>),
            users::is_active.eq(true),
            users::password_changed.eq(Utc::now()),
            users::updated.eq(Utc::now()),
        ))
        .execute(conn)?;

    Ok(user.id)
}

pub fn set_password(
    conn: &mut PgConnection,
    user_id: UserId,
    password_hash: &str,
) -> Result<(), Error> {
    let updated = diesel::update(users::table.find(user_id))
        .set((
            users::password_hash.eq(password_hash),
            users::password_changed.eq(Utc::now()),
            users::updated.eq(Utc::now()),
        ))
        .execute(conn)?;

    if updated == 0 {
        return Err(Error::NotFound("user"));
    }

    Ok(())
}

pub fn find(conn: &mut PgConnection, user_id: UserId) -> Result<User, Error> {
    users::table
        .find(user_id)
        .select(User::as_select())
        .first(conn)
        .optional()?
        .ok_or(Error::NotFound("user"))
}
