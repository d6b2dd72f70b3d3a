use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    object_id::{CategoryId, ProjectId},
    schema::*,
    Error,
};

#[derive(Clone, Debug, Queryable, Selectable, Identifiable)]
#[diesel(table_name = categories)]
pub struct Category {
    pub id: CategoryId,
    pub project_id: Option<ProjectId>,
    pub name: String,
    pub color: String,
    pub updated: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Insertable)]
#[diesel(table_name = categories)]
pub struct NewCategory {
    pub id: CategoryId,
    pub project_id: Option<ProjectId>,
    pub name: String,
    pub color: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Queryable, Selectable)]
#[diesel(table_name = categories)]
pub struct CategorySummary {
    pub id: CategoryId,
    pub name: String,
}

/// A category that belongs to a project, which is the only kind access scoping applies to.
#[derive(Clone, Debug)]
pub struct ScopedCategory {
    pub id: CategoryId,
    pub project_id: ProjectId,
    pub name: String,
}

/// Load a category and its project. Global categories fail with `NotApplicable`.
pub fn scoped(conn: &mut PgConnection, category_id: CategoryId) -> Result<ScopedCategory, Error> {
    let (project_id, name) = categories::table
        .find(category_id)
        .select((categories::project_id, categories::name))
        .first::<(Option<ProjectId>, String)>(conn)
        .optional()?
        .ok_or(Error::NotFound("category"))?;

    let project_id = project_id.ok_or(Error::NotApplicable)?;

    Ok(ScopedCategory {
        id: category_id,
        project_id,
        name,
    })
}

pub fn in_project(
    conn: &mut PgConnection,
    project_id: ProjectId,
) -> Result<Vec<CategorySummary>, Error> {
    categories::table
        .filter(categories::project_id.eq(project_id))
        .select(CategorySummary::as_select())
        .order_by(categories::name)
        .load(conn)
        .map_err(Error::from)
}
