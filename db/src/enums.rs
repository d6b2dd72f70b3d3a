use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};

/// How a user's category visibility within one project is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, DbEnum, Serialize, Deserialize)]
#[ExistingTypePath = "crate::schema::sql_types::CategoryAccessMode"]
#[serde(rename_all = "snake_case")]
pub enum CategoryAccessMode {
    /// Every category in the project. Permission rows are ignored.
    All,
    /// Only categories with an inclusion row (`can_access = true`).
    Selected,
    /// Every category except those with an exclusion row (`can_access = false`).
    AllExcept,
}

impl CategoryAccessMode {
    /// The `can_access` value that permission rows carry under this mode, if any.
    pub fn row_value(&self) -> Option<bool> {
        match self {
            Self::All => None,
            Self::Selected => Some(true),
            Self::AllExcept => Some(false),
        }
    }

    /// The membership rule shared by every read path. `permission` is the
    /// stored `can_access` value for the category, if a row exists.
    pub fn allows(&self, permission: Option<bool>) -> bool {
        match self {
            Self::All => true,
            Self::Selected => permission == Some(true),
            Self::AllExcept => permission != Some(false),
        }
    }
}

impl std::fmt::Display for CategoryAccessMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let desc = match self {
            Self::All => "all",
            Self::Selected => "selected",
            Self::AllExcept => "all_except",
        };

        f.write_str(desc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_rule() {
        assert!(CategoryAccessMode::All.allows(None));
        assert!(CategoryAccessMode::All.allows(Some(false)));

        assert!(!CategoryAccessMode::Selected.allows(None));
        assert!(CategoryAccessMode::Selected.allows(Some(true)));
        assert!(!CategoryAccessMode::Selected.allows(Some(false)));

        assert!(CategoryAccessMode::AllExcept.allows(None));
        assert!(CategoryAccessMode::AllExcept.allows(Some(true)));
        assert!(!CategoryAccessMode::AllExcept.allows(Some(false)));
    }

    #[test]
    fn serializes_like_the_database() {
        assert_eq!(
            serde_json::to_string(&CategoryAccessMode::AllExcept).unwrap(),
            r#""all_except""#
        );
        assert_eq!(CategoryAccessMode::AllExcept.to_string(), "all_except");
    }
}
