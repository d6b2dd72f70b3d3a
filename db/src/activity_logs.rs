use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    object_id::{ActivityLogId, UserId},
    schema::*,
    Error,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    Assigned,
    Unassigned,
    Created,
    Updated,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Assigned => "assigned",
            Self::Unassigned => "unassigned",
            Self::Created => "created",
            Self::Updated => "updated",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Category,
    Task,
    User,
    Project,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Task => "task",
            Self::User => "user",
            Self::Project => "project",
        }
    }
}

/// One entry for the activity feed.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityRecord {
    pub actor_id: UserId,
    pub action: ActivityAction,
    pub entity_kind: EntityKind,
    pub entity_id: Uuid,
    pub entity_name: String,
    pub details: serde_json::Value,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = activity_logs)]
struct NewActivityLog<'a> {
    id: ActivityLogId,
    user_id: UserId,
    action: &'a str,
    entity_type: &'a str,
    entity_id: Uuid,
    entity_name: &'a str,
    details: &'a serde_json::Value,
}

pub fn record(conn: &mut PgConnection, record: &ActivityRecord) -> Result<ActivityLogId, Error> {
    let id = ActivityLogId::new();
    diesel::insert_into(activity_logs::table)
        .values(NewActivityLog {
            id,
            user_id: record.actor_id,
            action: record.action.as_str(),
            entity_type: record.entity_kind.as_str(),
            entity_id: record.entity_id,
            entity_name: &record.entity_name,
            details: &record.details,
        })
        .execute(conn)?;

    Ok(id)
}
