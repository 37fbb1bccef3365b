use crate::errors::AppResult;
use clap::{Parser, Subcommand};

pub mod commands;

/// Email bounce analytics dashboard
#[derive(Parser)]
#[command(name = "bounce-dashboard")]
#[command(about = "Email bounce analytics dashboard")]
#[command(version)]
pub struct Cli {
    /// Backend base URL (overrides config.toml and BOUNCE_BACKEND_URL)
    #[arg(long, global = true)]
    pub backend_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// List clients and their campaigns
    Campaigns(commands::campaigns::CampaignsCommand),
    /// Show the bounce report for one campaign
    Report(commands::report::ReportCommand),
    /// Upload a bounce CSV and wait for the campaign to update
    Upload(commands::upload::UploadCommand),
    /// Check whether the backend has a report for a campaign
    Exists(commands::exists::ExistsCommand),
    /// Follow an ingestion task until it completes
    Progress(commands::progress::ProgressCommand),
}

pub async fn run() -> AppResult<()> {
    // Uses RUST_LOG environment variable (defaults to "error" if not set)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("error")),
        )
        .try_init();

    let cli = Cli::parse();
    let backend_url = cli.backend_url.as_deref();

    match cli.command {
        Commands::Campaigns(command) => command.run(backend_url).await,
        Commands::Report(command) => command.run(backend_url).await,
        Commands::Upload(command) => command.run(backend_url).await,
        Commands::Exists(command) => command.run(backend_url).await,
        Commands::Progress(command) => command.run(backend_url).await,
    }
}
