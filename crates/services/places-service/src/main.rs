//! Places service - command line entry point.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use places_service_lib::{check, config::PlacesServiceConfig, run_migrations, MigrateAction};

/// Places backend maintenance commands
#[derive(Parser, Debug)]
#[command(name = "places-service")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateCommand,
    },

    /// Check database connectivity and schema state
    Check,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum MigrateCommand {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset and re-run all migrations
    Fresh,
}

impl From<MigrateCommand> for MigrateAction {
    fn from(command: MigrateCommand) -> Self {
        match command {
            MigrateCommand::Up => MigrateAction::Up,
            MigrateCommand::Down => MigrateAction::Down,
            MigrateCommand::Status => MigrateAction::Status,
            MigrateCommand::Fresh => MigrateAction::Fresh,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let config = match PlacesServiceConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    tracing::debug!(
        geocoder = %config.geocoder.api_base,
        uploads = %config.storage.root,
        "Configuration loaded"
    );

    let result = match cli.command {
        Commands::Migrate { action } => run_migrations(&config, action.into()).await,
        Commands::Check => check(&config).await,
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing subscriber
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        "debug".to_string()
    } else {
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();
}
