pub mod cli;
pub mod clients;
pub mod config;
pub mod db;
pub mod entities;
pub mod models;
pub mod normalize;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
pub use config::Config;

pub async fn run() -> anyhow::Result<()> {
    // Secrets (the API key) come from the environment; .env is optional.
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Fetch { channel_id, json } => cli::cmd_fetch(&config, &channel_id, json).await,
        Commands::Harvest { channel_id } => cli::cmd_harvest(&config, &channel_id).await,
        Commands::Query { name } => cli::cmd_run_query(&config, &name).await,
        Commands::Queries => cli::cmd_list_queries().await,
        Commands::Init => cli::cmd_init().await,
    }
}
