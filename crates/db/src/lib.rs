use std::time::Duration;

use db_migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database};

pub mod entities;
pub mod models;
pub mod types;

pub use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, TransactionTrait};

#[derive(Clone)]
pub struct DbService {
    pub conn: DatabaseConnection,
}

impl DbService {
    /// Connects and brings the schema up to date.
    pub async fn new(database_url: &str) -> Result<Self, DbErr> {
        let mut options = ConnectOptions::new(database_url);
        options
            .acquire_timeout(Duration::from_secs(5))
            .sqlx_logging(false);
        let conn = Database::connect(options).await?;
        Migrator::up(&conn, None).await?;
        Ok(Self { conn })
    }

    /// In-memory database for tests. Pool is pinned to one connection
    /// because each sqlite `:memory:` connection is its own database.
    pub async fn new_in_memory() -> Result<Self, DbErr> {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).min_connections(1);
        let conn = Database::connect(options).await?;
        Migrator::up(&conn, None).await?;
        Ok(Self { conn })
    }
}
