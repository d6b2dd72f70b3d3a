use chrono::Utc;
use diesel::{pg::upsert::excluded, prelude::*};
use serde::Serialize;

use crate::{
    access_scope::ScopeStore,
    object_id::{CategoryId, CategoryPermissionId, ProjectAssignmentId, ProjectId, UserId},
    schema::*,
    CategoryAccessMode, Error,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = project_assignments)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAssignment {
    pub id: ProjectAssignmentId,
    pub project_id: ProjectId,
    pub user_id: UserId,
    pub category_access_mode: CategoryAccessMode,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = project_assignments)]
pub struct NewProjectAssignment {
    pub id: ProjectAssignmentId,
    pub project_id: ProjectId,
    pub user_id: UserId,
    pub category_access_mode: CategoryAccessMode,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = category_permissions)]
pub struct NewCategoryPermission {
    pub id: CategoryPermissionId,
    pub project_assignment_id: ProjectAssignmentId,
    pub category_id: CategoryId,
    pub can_access: bool,
}

/// Every assignment in a project.
pub fn in_project(
    conn: &mut PgConnection,
    project_id: ProjectId,
) -> Result<Vec<ProjectAssignment>, Error> {
    project_assignments::table
        .filter(project_assignments::project_id.eq(project_id))
        .select(ProjectAssignment::as_select())
        .load(conn)
        .map_err(Error::from)
}

/// All permission rows of an assignment.
pub fn permission_rows(
    conn: &mut PgConnection,
    assignment_id: ProjectAssignmentId,
) -> Result<Vec<(CategoryId, bool)>, Error> {
    category_permissions::table
        .filter(category_permissions::project_assignment_id.eq(assignment_id))
        .select((
            category_permissions::category_id,
            category_permissions::can_access,
        ))
        .order_by(category_permissions::category_id)
        .load(conn)
        .map_err(Error::from)
}

/// A [ScopeStore] over a Postgres connection. Callers are expected to have opened a
/// transaction already.
pub struct PgScopeStore<'a> {
    conn: &'a mut PgConnection,
}

impl<'a> PgScopeStore<'a> {
    pub fn new(conn: &'a mut PgConnection) -> Self {
        Self { conn }
    }
}

impl<'a> ScopeStore for PgScopeStore<'a> {
    fn assignment(
        &mut self,
        project_id: ProjectId,
        user_id: UserId,
    ) -> Result<Option<ProjectAssignment>, Error> {
        project_assignments::table
            .filter(project_assignments::project_id.eq(project_id))
            .filter(project_assignments::user_id.eq(user_id))
            .select(ProjectAssignment::as_select())
            .for_update()
            .first(self.conn)
            .optional()
            .map_err(Error::from)
    }

    fn create_assignment(
        &mut self,
        project_id: ProjectId,
        user_id: UserId,
        mode: CategoryAccessMode,
    ) -> Result<ProjectAssignment, Error> {
        let new_assignment = NewProjectAssignment {
            id: ProjectAssignmentId::new(),
            project_id,
            user_id,
            category_access_mode: mode,
        };

        // Nested transactions become savepoints, so a unique violation here leaves
        // the outer transaction usable for the re-read that follows.
        self.conn.transaction(|conn| {
            diesel::insert_into(project_assignments::table)
                .values(&new_assignment)
                .returning(ProjectAssignment::as_returning())
                .get_result(conn)
                .map_err(Error::from)
        })
    }

    fn set_mode(
        &mut self,
        assignment_id: ProjectAssignmentId,
        mode: CategoryAccessMode,
    ) -> Result<(), Error> {
        diesel::update(project_assignments::table.find(assignment_id))
            .set((
                project_assignments::category_access_mode.eq(mode),
                project_assignments::updated.eq(Utc::now()),
            ))
            .execute(self.conn)?;
        Ok(())
    }

    fn permission(
        &mut self,
        assignment_id: ProjectAssignmentId,
        category_id: CategoryId,
    ) -> Result<Option<bool>, Error> {
        category_permissions::table
            .filter(category_permissions::project_assignment_id.eq(assignment_id))
            .filter(category_permissions::category_id.eq(category_id))
            .select(category_permissions::can_access)
            .first(self.conn)
            .optional()
            .map_err(Error::from)
    }

    fn upsert_permission(
        &mut self,
        assignment_id: ProjectAssignmentId,
        category_id: CategoryId,
        can_access: bool,
    ) -> Result<(), Error> {
        diesel::insert_into(category_permissions::table)
            .values(NewCategoryPermission {
                id: CategoryPermissionId::new(),
                project_assignment_id: assignment_id,
                category_id,
                can_access,
            })
            .on_conflict((
                category_permissions::project_assignment_id,
                category_permissions::category_id,
            ))
            .do_update()
            .set(category_permissions::can_access.eq(excluded(category_permissions::can_access)))
            .execute(self.conn)?;
        Ok(())
    }

    fn delete_permission(
        &mut self,
        assignment_id: ProjectAssignmentId,
        category_id: CategoryId,
        can_access: bool,
    ) -> Result<bool, Error> {
        let deleted = diesel::delete(
            category_permissions::table
                .filter(category_permissions::project_assignment_id.eq(assignment_id))
                .filter(category_permissions::category_id.eq(category_id))
                .filter(category_permissions::can_access.eq(can_access)),
        )
        .execute(self.conn)?;

        Ok(deleted > 0)
    }

    fn clear_permissions(&mut self, assignment_id: ProjectAssignmentId) -> Result<usize, Error> {
        diesel::delete(
            category_permissions::table
                .filter(category_permissions::project_assignment_id.eq(assignment_id)),
        )
        .execute(self.conn)
        .map_err(Error::from)
    }
}
