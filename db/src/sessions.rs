use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::{object_id::UserId, schema::*};

#[derive(Clone, Debug, Queryable, Identifiable, Insertable)]
pub struct Session {
    pub id: Uuid,
    pub user_id: UserId,
    pub expires: DateTime<Utc>,
}
