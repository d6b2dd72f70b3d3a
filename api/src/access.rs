//! Admin operations on category scopes and task assignments. Each call checks the caller
//! before touching the database, runs its change in one transaction, and then emits an
//! activity record.

use serde_json::json;
use tracing::instrument;

use planner_db::{
    access_scope::{AccessScope, ScopeChange},
    activity_logs::{ActivityAction, ActivityRecord, EntityKind},
    categories::CategorySummary,
    category_access,
    object_id::{CategoryId, ProjectId, TaskId, UserId},
    project_assignments::ProjectAssignment,
    projects, task_assignments,
    users::UserSummary,
    Pool, PoolExt,
};

use crate::{
    audit::{self, AuditSink},
    auth::Caller,
    Error,
};

pub struct Access<'a> {
    pub db: &'a Pool,
    pub audit: &'a dyn AuditSink,
}

impl<'a> Access<'a> {
    /// Users who can see the category.
    #[instrument(skip(self))]
    pub async fn category_members(
        &self,
        caller: &Caller,
        category_id: CategoryId,
    ) -> Result<Vec<UserSummary>, Error> {
        caller.require_admin()?;
        self.db
            .interact(move |conn| category_access::members(conn, category_id).map_err(Error::from))
            .await
    }

    #[instrument(skip(self))]
    pub async fn grant_category(
        &self,
        caller: &Caller,
        category_id: CategoryId,
        user_id: UserId,
    ) -> Result<ScopeChange, Error> {
        caller.require_admin()?;
        let (category, change) = self
            .db
            .transaction(move |conn| {
                category_access::grant(conn, category_id, user_id).map_err(Error::from)
            })
            .await?;

        audit::emit(
            self.audit,
            ActivityRecord {
                actor_id: caller.user_id,
                action: ActivityAction::Assigned,
                entity_kind: EntityKind::Category,
                entity_id: category.id.into_inner(),
                entity_name: category.name,
                details: json!({ "assignedUserId": user_id }),
            },
        )
        .await;

        Ok(change)
    }

    #[instrument(skip(self))]
    pub async fn revoke_category(
        &self,
        caller: &Caller,
        category_id: CategoryId,
        user_id: UserId,
    ) -> Result<ScopeChange, Error> {
        caller.require_admin()?;
        let (category, change) = self
            .db
            .transaction(move |conn| {
                category_access::revoke(conn, category_id, user_id).map_err(Error::from)
            })
            .await?;

        audit::emit(
            self.audit,
            ActivityRecord {
                actor_id: caller.user_id,
                action: ActivityAction::Unassigned,
                entity_kind: EntityKind::Category,
                entity_id: category.id.into_inner(),
                entity_name: category.name,
                details: json!({ "unassignedUserId": user_id }),
            },
        )
        .await;

        Ok(change)
    }

    /// Replace the user's whole scope within the project.
    #[instrument(skip(self))]
    pub async fn set_project_scope(
        &self,
        caller: &Caller,
        project_id: ProjectId,
        user_id: UserId,
        scope: AccessScope,
    ) -> Result<ProjectAssignment, Error> {
        caller.require_admin()?;
        let mode = scope.mode();
        let (project_name, assignment) = self
            .db
            .transaction(move |conn| {
                let name = projects::name(conn, project_id)?;
                let assignment = category_access::replace_scope(conn, project_id, user_id, &scope)?;
                Ok::<_, Error>((name, assignment))
            })
            .await?;

        audit::emit(
            self.audit,
            ActivityRecord {
                actor_id: caller.user_id,
                action: ActivityAction::Updated,
                entity_kind: EntityKind::Project,
                entity_id: project_id.into_inner(),
                entity_name: project_name,
                details: json!({ "userId": user_id, "categoryAccessMode": mode }),
            },
        )
        .await;

        Ok(assignment)
    }

    /// The project's categories that the user can see.
    pub async fn visible_categories(
        &self,
        caller: &Caller,
        project_id: ProjectId,
        user_id: UserId,
    ) -> Result<Vec<CategorySummary>, Error> {
        caller.require_admin()?;
        self.db
            .interact(move |conn| {
                category_access::visible_categories(conn, project_id, user_id).map_err(Error::from)
            })
            .await
    }

    pub async fn task_assignees(
        &self,
        caller: &Caller,
        task_id: TaskId,
    ) -> Result<Vec<UserSummary>, Error> {
        caller.require_admin()?;
        self.db
            .interact(move |conn| {
                planner_db::tasks::title(conn, task_id)?;
                task_assignments::list_assignees(conn, task_id).map_err(Error::from)
            })
            .await
    }

    /// Assign the user to the task. Returns false if they already were.
    #[instrument(skip(self))]
    pub async fn assign_task(
        &self,
        caller: &Caller,
        task_id: TaskId,
        user_id: UserId,
    ) -> Result<bool, Error> {
        caller.require_admin()?;
        let (title, added) = self
            .db
            .transaction(move |conn| {
                let title = task_assignments::validate(conn, task_id, user_id)?;
                let added = task_assignments::assign(conn, task_id, user_id)?;
                Ok::<_, Error>((title, added))
            })
            .await?;

        audit::emit(
            self.audit,
            ActivityRecord {
                actor_id: caller.user_id,
                action: ActivityAction::Assigned,
                entity_kind: EntityKind::Task,
                entity_id: task_id.into_inner(),
                entity_name: title,
                details: json!({ "assignedUserId": user_id }),
            },
        )
        .await;

        Ok(added)
    }

    /// Remove the user from the task. Returns false if they weren't assigned.
    #[instrument(skip(self))]
    pub async fn unassign_task(
        &self,
        caller: &Caller,
        task_id: TaskId,
        user_id: UserId,
    ) -> Result<bool, Error> {
        caller.require_admin()?;
        let (title, removed) = self
            .db
            .transaction(move |conn| {
                let title = task_assignments::validate(conn, task_id, user_id)?;
                let removed = task_assignments::unassign(conn, task_id, user_id)?;
                Ok::<_, Error>((title, removed))
            })
            .await?;

        audit::emit(
            self.audit,
            ActivityRecord {
                actor_id: caller.user_id,
                action: ActivityAction::Unassigned,
                entity_kind: EntityKind::Task,
                entity_id: task_id.into_inner(),
                entity_name: title,
                details: json!({ "unassignedUserId": user_id }),
            },
        )
        .await;

        Ok(removed)
    }
}
