use diesel::result::DatabaseErrorKind;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Database error: {0}")]
    Db(diesel::result::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] deadpool_diesel::PoolError),

    #[error("Failed to build database pool: {0}")]
    PoolBuild(String),

    #[error("Database connection task failed: {0}")]
    Interact(String),

    #[error("Unknown {0}")]
    NotFound(&'static str),

    #[error("Category has no project, access scoping does not apply")]
    NotApplicable,

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl From<diesel::result::Error> for Error {
    fn from(e: diesel::result::Error) -> Self {
        match e {
            diesel::result::Error::DatabaseError(
                kind @ (DatabaseErrorKind::UniqueViolation
                | DatabaseErrorKind::ForeignKeyViolation),
                info,
            ) => {
                let constraint = info.constraint_name().unwrap_or("unknown constraint");
                let kind = match kind {
                    DatabaseErrorKind::UniqueViolation => "unique",
                    _ => "foreign key",
                };
                Error::Conflict(format!("{kind} constraint {constraint} violated"))
            }
            e => Error::Db(e),
        }
    }
}

impl From<deadpool_diesel::InteractError> for Error {
    fn from(e: deadpool_diesel::InteractError) -> Self {
        Error::Interact(e.to_string())
    }
}
