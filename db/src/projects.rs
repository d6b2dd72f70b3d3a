use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Deserialize;

use crate::{object_id::ProjectId, schema::*, Error};

#[derive(Clone, Debug, Queryable, Selectable, Identifiable)]
#[diesel(table_name = projects)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub updated: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Insertable)]
#[diesel(table_name = projects)]
pub struct NewProject {
    pub id: ProjectId,
    pub name: String,
}

/// Look up a project's display name, failing with `NotFound` if it doesn't exist.
pub fn name(conn: &mut PgConnection, project_id: ProjectId) -> Result<String, Error> {
    projects::table
        .find(project_id)
        .select(projects::name)
        .first::<String>(conn)
        .optional()?
        .ok_or(Error::NotFound("project"))
}
