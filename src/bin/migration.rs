use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use enerlight_api::{
    config::{self, AppConfig},
    db,
    migrator::Migrator,
    services::UserService,
};

#[derive(Parser)]
#[command(name = "migration", about = "Schema migrations and account bootstrap", version)]
struct Cli {
    /// Overrides the configured database URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending migrations
    Up {
        #[arg(long)]
        steps: Option<u32>,
    },
    /// Roll back applied migrations (one by default)
    Down {
        #[arg(long, default_value_t = 1)]
        steps: u32,
    },
    /// Drop every table and reapply all migrations
    Fresh,
    /// Show applied and pending migrations
    Status,
    /// Create an admin account unless the email is already registered
    CreateAdmin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "Administrator")]
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut cfg: AppConfig = config::load_config().context("failed to load configuration")?;
    config::init_tracing(&cfg.log_level, cfg.log_json);
    if let Some(url) = cli.database_url {
        cfg.database_url = url;
    }

    let pool = db::establish_connection_from_app_config(&cfg).await?;

    match cli.command {
        Commands::Up { steps } => {
            Migrator::up(&pool, steps).await?;
            info!("Migrations applied");
        }
        Commands::Down { steps } => {
            Migrator::down(&pool, Some(steps)).await?;
            info!(steps, "Migrations rolled back");
        }
        Commands::Fresh => {
            Migrator::fresh(&pool).await?;
            info!("Schema recreated");
        }
        Commands::Status => {
            Migrator::status(&pool).await?;
        }
        Commands::CreateAdmin {
            email,
            password,
            name,
        } => {
            Migrator::up(&pool, None).await?;
            let users = UserService::new(std::sync::Arc::new(pool));
            if users.ensure_admin(&email, &password, &name).await? {
                println!("Admin {} created", email);
            } else {
                println!("An account for {} already exists", email);
            }
        }
    }

    Ok(())
}
