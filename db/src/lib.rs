#[macro_use]
extern crate diesel;

mod enums;
mod error;
pub mod schema;

pub mod access_scope;
pub mod activity_logs;
pub mod categories;
pub mod category_access;
pub mod object_id;
pub mod project_assignments;
pub mod projects;
pub mod sessions;
pub mod task_assignments;
pub mod tasks;
pub mod users;

pub use enums::*;
pub use error::*;

use async_trait::async_trait;
use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness};

pub type Pool = deadpool_diesel::postgres::Pool;

pub const MIGRATIONS: EmbeddedMigrations = diesel_migrations::embed_migrations!();

pub fn connect(conn_str: &str, max_connections: usize) -> Result<Pool, Error> {
    let manager =
        deadpool_diesel::postgres::Manager::new(conn_str, deadpool_diesel::Runtime::Tokio1);
    deadpool_diesel::Pool::builder(manager)
        .max_size(max_connections)
        .build()
        .map_err(|e| Error::PoolBuild(e.to_string()))
}

/// Bring the schema up to date.
pub async fn run_migrations(pool: &Pool) -> Result<(), Error> {
    let conn = pool.get().await?;
    conn.interact(|conn| {
        conn.run_pending_migrations(MIGRATIONS)
            .map(|applied| applied.len())
            .map_err(|e| Error::Interact(e.to_string()))
    })
    .await?
    .map(|applied| {
        tracing::event!(tracing::Level::INFO, applied, "Ran database migrations");
    })
}

pub fn new_uuid() -> uuid::Uuid {
    ulid::Ulid::new().into()
}

#[async_trait]
pub trait PoolExt<F, RETVAL, ERR>
where
    F: (FnOnce(&mut PgConnection) -> Result<RETVAL, ERR>) + Send + 'static,
    RETVAL: Send + 'static,
    ERR: Send + 'static,
{
    async fn interact(&self, f: F) -> Result<RETVAL, ERR>;
    async fn transaction(&self, f: F) -> Result<RETVAL, ERR>;
}

#[async_trait]
impl<F, RETVAL, ERR> PoolExt<F, RETVAL, ERR> for Pool
where
    F: (FnOnce(&mut PgConnection) -> Result<RETVAL, ERR>) + Send + 'static,
    RETVAL: Send + 'static,
    ERR: From<diesel::result::Error>
        + From<deadpool_diesel::PoolError>
        + From<deadpool_diesel::InteractError>
        + Send
        + 'static,
{
    async fn interact(&self, f: F) -> Result<RETVAL, ERR> {
        let conn = self.get().await?;
        conn.interact(move |conn| f(conn)).await?
    }

    async fn transaction(&self, f: F) -> Result<RETVAL, ERR> {
        let conn = self.get().await?;
        conn.interact(move |conn| conn.transaction(move |conn| f(conn)))
            .await?
    }
}
