use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Deserialize;

use crate::{
    object_id::{CategoryId, TaskId},
    schema::*,
    Error,
};

#[derive(Clone, Debug, Queryable, Selectable, Identifiable)]
#[diesel(table_name = tasks)]
pub struct Task {
    pub id: TaskId,
    pub category_id: Option<CategoryId>,
    pub title: String,
    pub updated: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTask {
    pub id: TaskId,
    pub category_id: Option<CategoryId>,
    pub title: String,
}

/// Look up a task's title, failing with `NotFound` if it doesn't exist.
pub fn title(conn: &mut PgConnection, task_id: TaskId) -> Result<String, Error> {
    tasks::table
        .find(task_id)
        .select(tasks::title)
        .first::<String>(conn)
        .optional()?
        .ok_or(Error::NotFound("task"))
}
