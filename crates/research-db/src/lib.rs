//! Persistence layer (§3, §6): sea-orm entities for the four persisted
//! tables — failures, queue items, results, history — their migrations, and
//! a query module per table. The vector store (§4.4) is in-memory and lives
//! in `research-vector`, not here.

pub mod entities;
pub mod migrations;
pub mod queries;

pub use entities::*;
pub use migrations::Migrator;
pub use queries::*;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::time::Duration;

/// Open a connection pool against `database_url` (§10.3: PostgreSQL in
/// production, SQLite for local/dev, matching the `sqlx-postgres` +
/// `sqlx-sqlite` feature pair enabled on sea-orm).
pub async fn init_database(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opts = ConnectOptions::new(database_url.to_owned());
    opts.connect_timeout(Duration::from_secs(10)).sqlx_logging(false);
    Database::connect(opts).await
}

/// Run all pending migrations.
pub async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    use sea_orm_migration::MigratorTrait;
    Migrator::up(db, None).await
}
