use clap::{Args, Subcommand};
use diesel::RunQueryDsl;

use planner_db::{object_id, users::NewUser, PoolExt};

#[derive(Debug, Args)]
pub struct AdminArgs {
    #[clap(subcommand)]
    commands: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create an object ID
    ///
    /// This is useful for preparing seed data or for testing.
    MakeId(MakeId),
    /// Hash a password
    HashPassword(HashPassword),
    /// Create an active administrator. Until one exists nobody can invite anyone else.
    CreateAdmin(CreateAdmin),
}

#[derive(Debug, Args)]
pub struct MakeId {
    #[clap(subcommand)]
    command: IdType,
}

#[derive(Debug, Subcommand)]
enum IdType {
    User,
    Project,
    Category,
    Task,
}

#[derive(Debug, Args)]
pub struct HashPassword {
    /// The password to hash
    password: String,
}

#[derive(Debug, Args)]
pub struct CreateAdmin {
    #[clap(long = "db", env = "DATABASE_URL")]
    database_url: String,
    #[clap(long)]
    username: String,
    #[clap(long)]
    full_name: String,
    #[clap(long)]
    email: Option<String>,
    #[clap(long, env = "ADMIN_PASSWORD")]
    password: String,
}

pub async fn admin_commands(cmd: AdminArgs) -> Result<(), eyre::Report> {
    match cmd.commands {
        Commands::MakeId(MakeId { command }) => make_id(command),
        Commands::HashPassword(HashPassword { password }) => hash_password(password)?,
        Commands::CreateAdmin(args) => create_admin(args).await?,
    }

    Ok(())
}

fn make_id(id: IdType) {
    let id = match id {
        IdType::User => object_id::UserId::new().to_string(),
        IdType::Project => object_id::ProjectId::new().to_string(),
        IdType::Category => object_id::CategoryId::new().to_string(),
        IdType::Task => object_id::TaskId::new().to_string(),
    };

    println!("{id}");
}

fn hash_password(password: String) -> Result<(), eyre::Report> {
    let hash = planner_auth::password::new_hash(password.as_str())?;
    println!("{hash}");
    Ok(())
}

async fn create_admin(args: CreateAdmin) -> Result<(), eyre::Report> {
    let db = planner_db::connect(&args.database_url, 1)?;
    planner_db::run_migrations(&db).await?;

    let id = object_id::UserId::new();
    let user = NewUser {
        id,
        username: args.username,
        full_name: args.full_name,
        email: args.email,
        password_hash: Some(planner_auth::password::new_hash(&args.password)?),
        invite_token: None,
        is_admin: true,
        is_active: true,
    };

    db.interact(move |conn| {
        diesel::insert_into(planner_db::schema::users::table)
            .values(&user)
            .execute(conn)
            .map_err(planner_db::Error::from)
    })
    .await?;

    println!("{id}");
    Ok(())
}
