//! Test database setup. Our migrations use only portable DDL (no
//! postgres-only ALTER/partial-index features), so unlike some sea-orm
//! codebases, SQLite is sufficient for full migration coverage here.

use sea_orm::{Database, DatabaseConnection, DbErr};

pub struct TestDb {
    pub connection: DatabaseConnection,
}

impl TestDb {
    pub async fn new() -> Result<Self, DbErr> {
        let connection = Database::connect("sqlite::memory:").await?;
        Ok(Self { connection })
    }

    pub async fn run_migrations(&self) -> Result<(), DbErr> {
        use research_db::migrations::Migrator;
        use sea_orm_migration::MigratorTrait;
        Migrator::up(&self.connection, None).await
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }
}

#[macro_export]
macro_rules! setup_test_db {
    () => {{
        let test_db = $crate::common::TestDb::new().await.expect("failed to create test database");
        test_db.run_migrations().await.expect("failed to run migrations");
        test_db
    }};
}
