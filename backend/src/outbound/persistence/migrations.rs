//! Embedded Diesel migrations, applied at startup and by the repair CLI.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tokio::task;
use tracing::info;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Failure while applying migrations.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// The database could not be reached.
    #[error("failed to connect for migrations: {0}")]
    Connect(#[from] diesel::ConnectionError),
    /// A migration failed.
    #[error("failed to apply migrations: {0}")]
    Apply(String),
    /// The blocking task panicked or was cancelled.
    #[error("migration task failed: {0}")]
    Join(#[from] task::JoinError),
}

/// Apply pending migrations on a dedicated synchronous connection.
///
/// Returns the number of migrations applied.
pub async fn run_pending_migrations(database_url: &str) -> Result<usize, MigrationError> {
    let url = database_url.to_owned();
    let applied = task::spawn_blocking(move || -> Result<usize, MigrationError> {
        let mut conn = PgConnection::establish(&url)?;
        conn.run_pending_migrations(MIGRATIONS)
            .map(|versions| versions.len())
            .map_err(|err| MigrationError::Apply(err.to_string()))
    })
    .await??;
    info!(applied, "database migrations applied");
    Ok(applied)
}
