//! Task Service - operations CLI for the task board database.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use task_service_lib::config::TaskServiceConfig;
use task_service_lib::{MigrateAction, PurgeTarget};

#[derive(Parser)]
#[command(name = "task-service")]
#[command(about = "Task board maintenance commands")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Database migration commands
    Migrate {
        #[command(subcommand)]
        action: MigrateCommands,
    },
    /// Tear down and re-seed the guest group
    GuestReset,
    /// Delete a user group with all its users, categories and tasks
    PurgeGroup {
        id: i32,
    },
    /// Delete a category with all its tasks
    PurgeCategory {
        id: i32,
    },
    /// Check database connectivity
    Ping,
}

#[derive(Subcommand)]
enum MigrateCommands {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset database and run all migrations
    Fresh,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = TaskServiceConfig::from_env();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(config.log_filter())
        .with(tracing_subscriber::fmt::layer())
        .init();
    tracing::debug!(service = %config.service.service_name, "Configuration loaded");

    let cli = Cli::parse();

    match cli.command {
        Commands::Migrate { action } => {
            let migrate_action = match action {
                MigrateCommands::Up => MigrateAction::Up,
                MigrateCommands::Down => MigrateAction::Down,
                MigrateCommands::Status => MigrateAction::Status,
                MigrateCommands::Fresh => MigrateAction::Fresh,
            };
            task_service_lib::run_migrations(&config, migrate_action).await?;
        }
        Commands::GuestReset => task_service_lib::run_guest_reset(&config).await?,
        Commands::PurgeGroup { id } => {
            task_service_lib::run_purge(&config, PurgeTarget::UserGroup, id).await?;
        }
        Commands::PurgeCategory { id } => {
            task_service_lib::run_purge(&config, PurgeTarget::Category, id).await?;
        }
        Commands::Ping => task_service_lib::run_ping(&config).await?,
    }

    Ok(())
}
