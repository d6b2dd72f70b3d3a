//! Category access operations against Postgres. Each function expects to run inside a
//! transaction that the caller opened, usually through [crate::PoolExt::transaction].

use std::collections::{BTreeSet, HashMap};

use diesel::prelude::*;
use tracing::instrument;

use crate::{
    access_scope::{self, AccessScope, ScopeChange},
    categories::{self, CategorySummary, ScopedCategory},
    object_id::{CategoryId, ProjectId, UserId},
    project_assignments::{self, PgScopeStore, ProjectAssignment},
    projects,
    schema::{self, category_permissions},
    users::{self, UserSummary},
    CategoryAccessMode, Error,
};

/// Let the user see the category.
#[instrument(skip(conn))]
pub fn grant(
    conn: &mut PgConnection,
    category_id: CategoryId,
    user_id: UserId,
) -> Result<(ScopedCategory, ScopeChange), Error> {
    let category = categories::scoped(conn, category_id)?;
    users::must_exist(conn, user_id)?;

    let change = access_scope::grant(
        &mut PgScopeStore::new(conn),
        category.project_id,
        user_id,
        category_id,
    )?;
    Ok((category, change))
}

/// Hide the category from the user.
#[instrument(skip(conn))]
pub fn revoke(
    conn: &mut PgConnection,
    category_id: CategoryId,
    user_id: UserId,
) -> Result<(ScopedCategory, ScopeChange), Error> {
    let category = categories::scoped(conn, category_id)?;
    users::must_exist(conn, user_id)?;

    let change = access_scope::revoke(
        &mut PgScopeStore::new(conn),
        category.project_id,
        user_id,
        category_id,
    )?;
    Ok((category, change))
}

pub fn has_access(
    conn: &mut PgConnection,
    category_id: CategoryId,
    user_id: UserId,
) -> Result<bool, Error> {
    let category = categories::scoped(conn, category_id)?;
    let assignment = assignment(conn, category.project_id, user_id)?;

    let Some(assignment) = assignment else {
        return Ok(true);
    };

    let permission = category_permissions::table
        .filter(category_permissions::project_assignment_id.eq(assignment.id))
        .filter(category_permissions::category_id.eq(category_id))
        .select(category_permissions::can_access)
        .first::<bool>(conn)
        .optional()?;

    Ok(assignment.category_access_mode.allows(permission))
}

/// Every active user who can see the category, ordered by username.
#[instrument(skip(conn))]
pub fn members(conn: &mut PgConnection, category_id: CategoryId) -> Result<Vec<UserSummary>, Error> {
    let category = categories::scoped(conn, category_id)?;
    let population = users::active_summaries(conn)?;

    let modes = project_assignments::in_project(conn, category.project_id)?
        .into_iter()
        .map(|a| (a.user_id, a.category_access_mode))
        .collect::<HashMap<_, _>>();

    let permissions = category_permissions::table
        .inner_join(schema::project_assignments::table)
        .filter(schema::project_assignments::project_id.eq(category.project_id))
        .filter(category_permissions::category_id.eq(category_id))
        .select((
            schema::project_assignments::user_id,
            category_permissions::can_access,
        ))
        .load::<(UserId, bool)>(conn)?
        .into_iter()
        .collect::<HashMap<_, _>>();

    let allowed = access_scope::users_with_access(
        population.iter().map(|u| u.id),
        &modes,
        &permissions,
    );

    Ok(population
        .into_iter()
        .filter(|u| allowed.contains(&u.id))
        .collect())
}

/// The user's scope in the project, assembled from the stored rows.
pub fn load_scope(
    conn: &mut PgConnection,
    project_id: ProjectId,
    user_id: UserId,
) -> Result<AccessScope, Error> {
    let Some(assignment) = assignment(conn, project_id, user_id)? else {
        return Ok(AccessScope::All);
    };

    let rows = project_assignments::permission_rows(conn, assignment.id)?;
    Ok(AccessScope::from_rows(
        Some(assignment.category_access_mode),
        rows,
    ))
}

/// The project's categories that the user can see.
pub fn visible_categories(
    conn: &mut PgConnection,
    project_id: ProjectId,
    user_id: UserId,
) -> Result<Vec<CategorySummary>, Error> {
    projects::name(conn, project_id)?;
    users::must_exist(conn, user_id)?;

    let scope = load_scope(conn, project_id, user_id)?;
    let categories = categories::in_project(conn, project_id)?;
    Ok(scope.visible(categories, |c| c.id))
}

/// Set the user's whole scope for the project. Every listed category must belong to it.
#[instrument(skip(conn))]
pub fn replace_scope(
    conn: &mut PgConnection,
    project_id: ProjectId,
    user_id: UserId,
    scope: &AccessScope,
) -> Result<ProjectAssignment, Error> {
    projects::name(conn, project_id)?;
    users::must_exist(conn, user_id)?;

    let wanted = scope.categories().copied().collect::<BTreeSet<_>>();
    if !wanted.is_empty() {
        let known = schema::categories::table
            .filter(schema::categories::id.eq_any(wanted.iter().copied().collect::<Vec<_>>()))
            .select((schema::categories::id, schema::categories::project_id))
            .load::<(CategoryId, Option<ProjectId>)>(conn)?;

        if known.len() != wanted.len() {
            return Err(Error::NotFound("category"));
        }

        if known.iter().any(|(_, p)| *p != Some(project_id)) {
            return Err(Error::NotApplicable);
        }
    }

    access_scope::replace(&mut PgScopeStore::new(conn), project_id, user_id, scope)
}

fn assignment(
    conn: &mut PgConnection,
    project_id: ProjectId,
    user_id: UserId,
) -> Result<Option<ProjectAssignment>, Error> {
    schema::project_assignments::table
        .filter(schema::project_assignments::project_id.eq(project_id))
        .filter(schema::project_assignments::user_id.eq(user_id))
        .select(ProjectAssignment::as_select())
        .first(conn)
        .optional()
        .map_err(Error::from)
}

/// The stored mode for the pair, if there is an assignment.
pub fn mode(
    conn: &mut PgConnection,
    project_id: ProjectId,
    user_id: UserId,
) -> Result<Option<CategoryAccessMode>, Error> {
    Ok(assignment(conn, project_id, user_id)?.map(|a| a.category_access_mode))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use diesel::prelude::*;

    use super::*;
    use crate::{test::run_database_test, PoolExt};

    fn summary_ids(members: &[UserSummary]) -> Vec<UserId> {
        members.iter().map(|u| u.id).collect()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn revoke_then_grant() {
        planner_test::init_tracing();
        run_database_test(|db, info| async move {
            let [c1, c2] = info.category_ids;
            let user = info.regular_user.user_id;
            let project = info.project_id;

            db.pool
                .transaction(move |conn| {
                    assert!(has_access(conn, c1, user)?);
                    assert_eq!(mode(conn, project, user)?, None);

                    let (category, change) = revoke(conn, c1, user)?;
                    assert_eq!(category.project_id, project);
                    assert_eq!(change, ScopeChange::SwitchedToAllExcept);

                    assert!(!has_access(conn, c1, user)?);
                    assert!(has_access(conn, c2, user)?);
                    assert_eq!(mode(conn, project, user)?, Some(CategoryAccessMode::AllExcept));
                    assert_eq!(
                        load_scope(conn, project, user)?,
                        AccessScope::AllExcept([c1].into_iter().collect())
                    );

                    let (_, change) = grant(conn, c1, user)?;
                    assert_eq!(change, ScopeChange::Readmitted);
                    assert!(has_access(conn, c1, user)?);
                    assert_eq!(mode(conn, project, user)?, Some(CategoryAccessMode::AllExcept));
                    assert_eq!(
                        load_scope(conn, project, user)?,
                        AccessScope::AllExcept(BTreeSet::new())
                    );

                    Ok::<_, crate::Error>(())
                })
                .await?;
            Ok(())
        })
        .await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn members_include_users_without_assignments() {
        run_database_test(|db, info| async move {
            let [c1, c2] = info.category_ids;
            let admin = info.admin_user.user_id;
            let regular = info.regular_user.user_id;
            let project = info.project_id;

            db.pool
                .transaction(move |conn| {
                    let extra = crate::test::add_user(conn, "selective", "Selective User", false)?;
                    let pending = crate::test::add_user(conn, "pending_user", "Pending", false)?;
                    diesel::update(schema::users::table.find(pending.user_id))
                        .set(schema::users::is_active.eq(false))
                        .execute(conn)?;

                    let all = members(conn, c1)?;
                    assert_eq!(summary_ids(&all), vec![admin, regular, extra.user_id]);

                    revoke(conn, c1, regular)?;
                    replace_scope(
                        conn,
                        project,
                        extra.user_id,
                        &AccessScope::Selected([c2].into_iter().collect()),
                    )?;

                    assert_eq!(summary_ids(&members(conn, c1)?), vec![admin]);
                    assert_eq!(
                        summary_ids(&members(conn, c2)?),
                        vec![admin, regular, extra.user_id]
                    );

                    let visible = visible_categories(conn, project, extra.user_id)?;
                    assert_eq!(visible.iter().map(|c| c.id).collect::<Vec<_>>(), vec![c2]);

                    Ok::<_, crate::Error>(())
                })
                .await?;
            Ok(())
        })
        .await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn selected_revoke_without_inclusion() {
        run_database_test(|db, info| async move {
            let [c1, c2] = info.category_ids;
            let user = info.regular_user.user_id;
            let project = info.project_id;

            db.pool
                .transaction(move |conn| {
                    replace_scope(
                        conn,
                        project,
                        user,
                        &AccessScope::Selected([c2].into_iter().collect()),
                    )?;

                    let (_, change) = revoke(conn, c1, user)?;
                    assert_eq!(change, ScopeChange::Unchanged);
                    assert!(!has_access(conn, c1, user)?);
                    assert_eq!(
                        load_scope(conn, project, user)?,
                        AccessScope::Selected([c2].into_iter().collect())
                    );

                    Ok::<_, crate::Error>(())
                })
                .await?;
            Ok(())
        })
        .await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn global_category_is_not_applicable() {
        run_database_test(|db, info| async move {
            let global = info.global_category_id;
            let user = info.regular_user.user_id;
            let project = info.project_id;

            db.pool
                .interact(move |conn| {
                    assert_matches!(revoke(conn, global, user), Err(Error::NotApplicable));
                    assert_matches!(grant(conn, global, user), Err(Error::NotApplicable));
                    assert_matches!(members(conn, global), Err(Error::NotApplicable));
                    assert_matches!(
                        replace_scope(
                            conn,
                            project,
                            user,
                            &AccessScope::Selected([global].into_iter().collect())
                        ),
                        Err(Error::NotApplicable)
                    );
                    assert_matches!(
                        revoke(conn, CategoryId::new(), user),
                        Err(Error::NotFound("category"))
                    );
                    assert_matches!(
                        revoke(conn, info.category_ids[0], UserId::new()),
                        Err(Error::NotFound("user"))
                    );

                    Ok::<_, crate::Error>(())
                })
                .await?;
            Ok(())
        })
        .await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_revokes_converge() {
        planner_test::init_tracing();
        run_database_test(|db, info| async move {
            let c1 = info.category_ids[0];
            let user = info.regular_user.user_id;
            let project = info.project_id;

            let run = |pool: crate::Pool| async move {
                pool.transaction(move |conn| revoke(conn, c1, user).map(|_| ()))
                    .await
            };

            let (a, b) = tokio::join!(run(db.pool.clone()), run(db.pool.clone()));
            a?;
            b?;

            db.pool
                .interact(move |conn| {
                    let assignments = project_assignments::in_project(conn, project)?;
                    assert_eq!(assignments.len(), 1);
                    assert_eq!(
                        project_assignments::permission_rows(conn, assignments[0].id)?,
                        vec![(c1, false)]
                    );
                    Ok::<_, crate::Error>(())
                })
                .await?;
            Ok(())
        })
        .await;
    }
}
