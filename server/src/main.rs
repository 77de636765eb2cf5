mod config;
mod http;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use migration::{Migrator, MigratorTrait};
use platform_db::{DatabaseSettings, DbPool, connect};
use platform_obs::{ObsConfig, init_tracing};
use products_hr::{
    DbEmployeeRepository, EmployeeController, EmployeeRepository, InMemoryEmployeeRepository,
    preload,
};
use tracing::info;

use crate::{
    config::AppConfig,
    http::{AppState, ServeConfig, Store},
};

#[derive(Parser, Debug)]
#[command(name = "payroll-server", version, about = "Employee payroll REST service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server.
    Serve(ServeCommand),
    /// Run database migrations.
    #[command(subcommand)]
    Migrate(MigrateCommand),
    /// Store the sample employees in the database.
    Seed,
}

#[derive(Subcommand, Debug)]
enum MigrateCommand {
    /// Apply pending migrations.
    Up,
    /// Rollback the most recent migration.
    Down,
}

#[derive(Args, Debug)]
struct ServeCommand {
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: std::net::IpAddr,
    #[arg(long, env = "PORT", default_value_t = 8080)]
    port: u16,
    #[arg(long, help = "Keep employees in process memory instead of the database")]
    in_memory: bool,
    #[arg(long, help = "Allow starting even when migrations are pending")]
    allow_dirty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing(ObsConfig::from_env())?;
    let cli = Cli::parse();
    let app_config = Arc::new(AppConfig::load()?);
    match cli.command {
        Command::Serve(cmd) => run_server(cmd, app_config).await,
        Command::Migrate(action) => match action {
            MigrateCommand::Up => migrate_up().await,
            MigrateCommand::Down => migrate_down().await,
        },
        Command::Seed => run_seed().await,
    }
}

async fn setup_pool() -> Result<DbPool> {
    let settings = DatabaseSettings::from_env();
    connect(&settings).await.map_err(Into::into)
}

async fn run_server(cmd: ServeCommand, config: Arc<AppConfig>) -> Result<()> {
    let serve_config = ServeConfig::new(cmd.host, cmd.port);
    let (repository, store): (Arc<dyn EmployeeRepository>, Store) = if cmd.in_memory {
        info!("using in-memory employee store");
        (Arc::new(InMemoryEmployeeRepository::new()), Store::Memory)
    } else {
        let pool = setup_pool().await?;
        ensure_migrations(&pool, cmd.allow_dirty).await?;
        (
            Arc::new(DbEmployeeRepository::new(pool.clone())),
            Store::Database(pool),
        )
    };

    // Samples are preloaded by default only when nothing persists them.
    if config.preload_sample_data.unwrap_or(cmd.in_memory) {
        preload(repository.as_ref())
            .await
            .context("failed to preload sample employees")?;
    }

    let state = AppState {
        employees: EmployeeController::new(repository),
        store,
        config,
    };
    http::serve(serve_config, state).await
}

async fn ensure_migrations(pool: &DbPool, allow_dirty: bool) -> Result<()> {
    let pending = Migrator::get_pending_migrations(pool).await?;
    if !pending.is_empty() && !allow_dirty {
        anyhow::bail!(
            "pending migrations detected; run `cargo run -p server -- migrate up` or pass --allow-dirty"
        );
    }
    Ok(())
}

async fn run_seed() -> Result<()> {
    let pool = setup_pool().await?;
    ensure_migrations(&pool, false).await?;
    let repository = DbEmployeeRepository::new(pool);
    let saved = preload(&repository).await?;
    info!(count = saved.len(), "sample employees stored");
    Ok(())
}

async fn migrate_up() -> Result<()> {
    let pool = setup_pool().await?;
    Migrator::up(&pool, None).await?;
    info!("database migrations applied");
    Ok(())
}

async fn migrate_down() -> Result<()> {
    let pool = setup_pool().await?;
    Migrator::down(&pool, Some(1)).await?;
    info!("most recent migration rolled back");
    Ok(())
}
