//! Category access scopes.
//!
//! A user's visibility into a project's categories is stored as one
//! [ProjectAssignment] carrying a [CategoryAccessMode], plus a sparse list of
//! permission rows whose meaning depends on that mode. A user with no
//! assignment at all has full access to the project.
//!
//! The functions here implement the grant/revoke state machine against any
//! [ScopeStore]. The Postgres store lives in [crate::project_assignments].

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::{
    object_id::{CategoryId, ProjectAssignmentId, ProjectId, UserId},
    project_assignments::ProjectAssignment,
    CategoryAccessMode, Error,
};

/// Storage for assignments and their permission rows.
///
/// Every call made by one grant or revoke must run inside the same
/// transaction, so that a reader never sees a mode without its rows.
pub trait ScopeStore {
    /// Fetch the assignment for this pair. Stores used for mutation should lock the row.
    fn assignment(
        &mut self,
        project_id: ProjectId,
        user_id: UserId,
    ) -> Result<Option<ProjectAssignment>, Error>;

    /// Create an assignment. Fails with [Error::Conflict] if the pair already has one.
    fn create_assignment(
        &mut self,
        project_id: ProjectId,
        user_id: UserId,
        mode: CategoryAccessMode,
    ) -> Result<ProjectAssignment, Error>;

    /// Change the mode only. Rows that don't fit the new mode must be cleared first.
    fn set_mode(
        &mut self,
        assignment_id: ProjectAssignmentId,
        mode: CategoryAccessMode,
    ) -> Result<(), Error>;

    /// The stored `can_access` value for a category, if there is a row.
    fn permission(
        &mut self,
        assignment_id: ProjectAssignmentId,
        category_id: CategoryId,
    ) -> Result<Option<bool>, Error>;

    fn upsert_permission(
        &mut self,
        assignment_id: ProjectAssignmentId,
        category_id: CategoryId,
        can_access: bool,
    ) -> Result<(), Error>;

    /// Delete the row only if it stores `can_access`. Returns true if a row was removed.
    fn delete_permission(
        &mut self,
        assignment_id: ProjectAssignmentId,
        category_id: CategoryId,
        can_access: bool,
    ) -> Result<bool, Error>;

    /// Remove every permission row for the assignment.
    fn clear_permissions(&mut self, assignment_id: ProjectAssignmentId) -> Result<usize, Error>;
}

/// What a grant or revoke did to the stored state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeChange {
    Unchanged,
    /// A `selected` assignment gained an inclusion row.
    Included,
    /// An exclusion row was removed from an `all_except` assignment.
    Readmitted,
    /// An inclusion row was removed from a `selected` assignment.
    InclusionRemoved,
    /// An `all_except` assignment gained an exclusion row.
    Excluded,
    /// The user moved from full access to `all_except`, either by creating an
    /// assignment or by switching an `all` assignment.
    SwitchedToAllExcept,
}

/// Make the category visible to the user.
pub fn grant<S: ScopeStore + ?Sized>(
    store: &mut S,
    project_id: ProjectId,
    user_id: UserId,
    category_id: CategoryId,
) -> Result<ScopeChange, Error> {
    let Some(assignment) = store.assignment(project_id, user_id)? else {
        // No assignment means full access already.
        return Ok(ScopeChange::Unchanged);
    };

    match assignment.category_access_mode {
        CategoryAccessMode::All => Ok(ScopeChange::Unchanged),
        CategoryAccessMode::Selected => {
            let already = store.permission(assignment.id, category_id)? == Some(true);
            store.upsert_permission(assignment.id, category_id, true)?;
            Ok(if already {
                ScopeChange::Unchanged
            } else {
                ScopeChange::Included
            })
        }
        CategoryAccessMode::AllExcept => {
            if store.delete_permission(assignment.id, category_id, false)? {
                Ok(ScopeChange::Readmitted)
            } else {
                Ok(ScopeChange::Unchanged)
            }
        }
    }
}

/// Hide the category from the user.
pub fn revoke<S: ScopeStore + ?Sized>(
    store: &mut S,
    project_id: ProjectId,
    user_id: UserId,
    category_id: CategoryId,
) -> Result<ScopeChange, Error> {
    let assignment = match store.assignment(project_id, user_id)? {
        Some(a) => a,
        None => match store.create_assignment(project_id, user_id, CategoryAccessMode::AllExcept)
        {
            Ok(a) => {
                store.upsert_permission(a.id, category_id, false)?;
                return Ok(ScopeChange::SwitchedToAllExcept);
            }
            // Someone else created it first. Apply the transition to their row instead.
            Err(Error::Conflict(_)) => store
                .assignment(project_id, user_id)?
                .ok_or(Error::NotFound("project assignment"))?,
            Err(e) => return Err(e),
        },
    };

    match assignment.category_access_mode {
        CategoryAccessMode::All => {
            store.clear_permissions(assignment.id)?;
            store.set_mode(assignment.id, CategoryAccessMode::AllExcept)?;
            store.upsert_permission(assignment.id, category_id, false)?;
            Ok(ScopeChange::SwitchedToAllExcept)
        }
        CategoryAccessMode::Selected => {
            if store.delete_permission(assignment.id, category_id, true)? {
                Ok(ScopeChange::InclusionRemoved)
            } else {
                Ok(ScopeChange::Unchanged)
            }
        }
        CategoryAccessMode::AllExcept => {
            let already = store.permission(assignment.id, category_id)? == Some(false);
            store.upsert_permission(assignment.id, category_id, false)?;
            Ok(if already {
                ScopeChange::Unchanged
            } else {
                ScopeChange::Excluded
            })
        }
    }
}

/// Replace the user's whole scope for the project.
pub fn replace<S: ScopeStore + ?Sized>(
    store: &mut S,
    project_id: ProjectId,
    user_id: UserId,
    scope: &AccessScope,
) -> Result<ProjectAssignment, Error> {
    let mode = scope.mode();
    let assignment = match store.assignment(project_id, user_id)? {
        Some(a) => a,
        None => match store.create_assignment(project_id, user_id, mode) {
            Ok(a) => a,
            Err(Error::Conflict(_)) => store
                .assignment(project_id, user_id)?
                .ok_or(Error::NotFound("project assignment"))?,
            Err(e) => return Err(e),
        },
    };

    store.clear_permissions(assignment.id)?;
    store.set_mode(assignment.id, mode)?;
    if let Some(value) = mode.row_value() {
        for category_id in scope.categories() {
            store.upsert_permission(assignment.id, *category_id, value)?;
        }
    }

    Ok(ProjectAssignment {
        category_access_mode: mode,
        ..assignment
    })
}

/// Whether the user can see the category.
pub fn has_access<S: ScopeStore + ?Sized>(
    store: &mut S,
    project_id: ProjectId,
    user_id: UserId,
    category_id: CategoryId,
) -> Result<bool, Error> {
    match store.assignment(project_id, user_id)? {
        None => Ok(true),
        Some(a) => {
            let permission = store.permission(a.id, category_id)?;
            Ok(a.category_access_mode.allows(permission))
        }
    }
}

/// Compute which users in `population` can see a category.
///
/// `modes` holds the assignment mode of every user in the category's project that has
/// one, and `permissions` the stored `can_access` value of each of those users' row for
/// this category. Users absent from `modes` have implicit full access.
pub fn users_with_access(
    population: impl IntoIterator<Item = UserId>,
    modes: &HashMap<UserId, CategoryAccessMode>,
    permissions: &HashMap<UserId, bool>,
) -> BTreeSet<UserId> {
    population
        .into_iter()
        .filter(|user_id| match modes.get(user_id) {
            None => true,
            Some(mode) => mode.allows(permissions.get(user_id).copied()),
        })
        .collect()
}

/// A user's effective scope within one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "categories", rename_all = "snake_case")]
pub enum AccessScope {
    All,
    Selected(BTreeSet<CategoryId>),
    AllExcept(BTreeSet<CategoryId>),
}

impl Default for AccessScope {
    fn default() -> Self {
        Self::All
    }
}

impl AccessScope {
    /// Build a scope from stored state. Rows that don't fit the mode are ignored.
    pub fn from_rows(
        mode: Option<CategoryAccessMode>,
        rows: impl IntoIterator<Item = (CategoryId, bool)>,
    ) -> Self {
        let Some(mode) = mode else {
            return Self::All;
        };

        let matching = |value: bool| {
            rows.into_iter()
                .filter(|(_, can_access)| *can_access == value)
                .map(|(category_id, _)| category_id)
                .collect::<BTreeSet<_>>()
        };

        match mode {
            CategoryAccessMode::All => Self::All,
            CategoryAccessMode::Selected => Self::Selected(matching(true)),
            CategoryAccessMode::AllExcept => Self::AllExcept(matching(false)),
        }
    }

    pub fn from_mode(mode: CategoryAccessMode, categories: BTreeSet<CategoryId>) -> Self {
        match mode {
            CategoryAccessMode::All => Self::All,
            CategoryAccessMode::Selected => Self::Selected(categories),
            CategoryAccessMode::AllExcept => Self::AllExcept(categories),
        }
    }

    pub fn mode(&self) -> CategoryAccessMode {
        match self {
            Self::All => CategoryAccessMode::All,
            Self::Selected(_) => CategoryAccessMode::Selected,
            Self::AllExcept(_) => CategoryAccessMode::AllExcept,
        }
    }

    /// The inclusion or exclusion set, depending on the mode.
    pub fn categories(&self) -> impl Iterator<Item = &CategoryId> {
        let set = match self {
            Self::All => None,
            Self::Selected(set) | Self::AllExcept(set) => Some(set),
        };

        set.into_iter().flatten()
    }

    pub fn can_access(&self, category_id: &CategoryId) -> bool {
        match self {
            Self::All => true,
            Self::Selected(included) => included.contains(category_id),
            Self::AllExcept(excluded) => !excluded.contains(category_id),
        }
    }

    /// Filter a project's categories down to those visible under this scope.
    pub fn visible<T>(
        &self,
        categories: impl IntoIterator<Item = T>,
        id: impl Fn(&T) -> CategoryId,
    ) -> Vec<T> {
        categories
            .into_iter()
            .filter(|c| self.can_access(&id(c)))
            .collect()
    }
}
