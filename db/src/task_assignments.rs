use chrono::{DateTime, Utc};
use diesel::prelude::*;
use tracing::instrument;

use crate::{
    object_id::{TaskId, UserId},
    schema::{task_assignments, users},
    tasks,
    users::UserSummary,
    Error,
};

#[derive(Clone, Debug, Queryable, Selectable)]
#[diesel(table_name = task_assignments)]
pub struct TaskAssignment {
    pub task_id: TaskId,
    pub user_id: UserId,
    pub added: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = task_assignments)]
pub struct NewTaskAssignment {
    pub task_id: TaskId,
    pub user_id: UserId,
}

/// Assign the user to the task. Returns false if they were already assigned.
#[instrument(skip(conn))]
pub fn assign(conn: &mut PgConnection, task_id: TaskId, user_id: UserId) -> Result<bool, Error> {
    let inserted = diesel::insert_into(task_assignments::table)
        .values(NewTaskAssignment { task_id, user_id })
        .on_conflict((task_assignments::task_id, task_assignments::user_id))
        .do_nothing()
        .execute(conn)?;

    Ok(inserted > 0)
}

/// Remove the user from the task. Returns false if they weren't assigned.
#[instrument(skip(conn))]
pub fn unassign(conn: &mut PgConnection, task_id: TaskId, user_id: UserId) -> Result<bool, Error> {
    let deleted = diesel::delete(
        task_assignments::table
            .filter(task_assignments::task_id.eq(task_id))
            .filter(task_assignments::user_id.eq(user_id)),
    )
    .execute(conn)?;

    Ok(deleted > 0)
}

/// Users assigned to the task, ordered by username.
pub fn list_assignees(conn: &mut PgConnection, task_id: TaskId) -> Result<Vec<UserSummary>, Error> {
    task_assignments::table
        .inner_join(users::table)
        .filter(task_assignments::task_id.eq(task_id))
        .select(UserSummary::as_select())
        .order_by(users::username)
        .load(conn)
        .map_err(Error::from)
}

/// Check the task and user both exist, returning the task's title.
pub fn validate(conn: &mut PgConnection, task_id: TaskId, user_id: UserId) -> Result<String, Error> {
    let title = tasks::title(conn, task_id)?;
    crate::users::must_exist(conn, user_id)?;
    Ok(title)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::{test::run_database_test, PoolExt};

    fn row_count(conn: &mut PgConnection, task_id: TaskId) -> Result<i64, Error> {
        task_assignments::table
            .filter(task_assignments::task_id.eq(task_id))
            .count()
            .get_result(conn)
            .map_err(Error::from)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn assign_and_unassign_are_idempotent() {
        run_database_test(|db, info| async move {
            let task = info.task_id;
            let user = info.regular_user.user_id;
            let other = info.admin_user.user_id;

            db.pool
                .transaction(move |conn| {
                    assert!(assign(conn, task, user)?);
                    assert!(!assign(conn, task, user)?);
                    assert_eq!(row_count(conn, task)?, 1);

                    let assignees = list_assignees(conn, task)?;
                    assert_eq!(assignees.len(), 1);
                    assert_eq!(assignees[0].id, user);
                    assert_eq!(assignees[0].username, "regular");

                    // Never assigned, so nothing happens.
                    assert!(!unassign(conn, task, other)?);
                    assert_eq!(row_count(conn, task)?, 1);

                    assert!(unassign(conn, task, user)?);
                    assert!(!unassign(conn, task, user)?);
                    assert!(list_assignees(conn, task)?.is_empty());

                    Ok::<_, crate::Error>(())
                })
                .await?;
            Ok(())
        })
        .await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn validate_reports_missing_rows() {
        run_database_test(|db, info| async move {
            let task = info.task_id;
            let user = info.regular_user.user_id;

            db.pool
                .interact(move |conn| {
                    assert_eq!(validate(conn, task, user)?, "Draft the launch plan");
                    assert_matches!(
                        validate(conn, TaskId::new(), user),
                        Err(Error::NotFound("task"))
                    );
                    assert_matches!(
                        validate(conn, task, UserId::new()),
                        Err(Error::NotFound("user"))
                    );
                    Ok::<_, crate::Error>(())
                })
                .await?;
            Ok(())
        })
        .await;
    }
}
