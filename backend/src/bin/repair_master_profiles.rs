//! Fill missing master profile aggregates with their defaults.
//!
//! Applies pending migrations first, then repairs every incomplete row in one
//! transaction and reports the counts.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::io;
use std::sync::Arc;

use clap::Parser;
use masters_backend::domain::MasterProfileService;
use masters_backend::domain::ports::MasterProfilesCommand;
use masters_backend::outbound::persistence::{
    DbPool, DieselMasterProfileRepository, DieselUserRepository, PoolConfig,
    run_pending_migrations,
};
use tokio::runtime::Builder;
use tracing_subscriber::{EnvFilter, fmt};

/// `repair-master-profiles` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "repair-master-profiles",
    about = "Replace missing master profile aggregates with defaults",
    version
)]
struct CliArgs {
    /// Database connection URL. Falls back to `DATABASE_URL` when omitted.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
    /// Skip applying pending migrations.
    #[arg(long = "skip-migrations")]
    skip_migrations: bool,
}

fn main() -> io::Result<()> {
    // Logs go to stderr so stdout carries only the report.
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let database_url = resolve_database_url(args.database_url, env::var("DATABASE_URL").ok())?;

    if !args.skip_migrations {
        run_pending_migrations(&database_url)
            .await
            .map_err(|error| io::Error::other(format!("apply migrations: {error}")))?;
    }
    let pool = DbPool::new(PoolConfig::new(&database_url).with_max_size(1))
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;

    let command = MasterProfileService::new(
        Arc::new(DieselUserRepository::new(pool.clone())),
        Arc::new(DieselMasterProfileRepository::new(pool)),
    );
    let report = command
        .repair()
        .await
        .map_err(|error| io::Error::other(format!("repair failed: {error}")))?;

    println!("repaired={}", report.repaired);
    println!("remaining_incomplete={}", report.remaining_incomplete);
    Ok(())
}

fn resolve_database_url(explicit: Option<String>, from_env: Option<String>) -> io::Result<String> {
    if let Some(value) = explicit {
        if value.trim().is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "--database-url must not be empty when provided",
            ));
        }
        return Ok(value);
    }
    match from_env {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "database URL missing: set --database-url or DATABASE_URL",
        )),
    }
}
