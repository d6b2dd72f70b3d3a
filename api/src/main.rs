use clap::{Parser, Subcommand};

mod cmd;

#[derive(Debug, Parser)]
#[clap(about = "Shared task and calendar planner")]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the API server
    Server(planner_api::config::Config),
    /// Administrative utilities
    Admin(cmd::admin::AdminArgs),
}

#[tokio::main]
async fn main() -> Result<(), eyre::Report> {
    color_eyre::install()?;
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Server(config) => cmd::server::run(config).await?,
        Commands::Admin(args) => cmd::admin::admin_commands(args).await?,
    }

    Ok(())
}
