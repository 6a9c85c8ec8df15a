use sea_orm::{ConnectOptions, ConnectionTrait, DatabaseConnection, DbBackend};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::error::{Error, Result};
use crate::migrations::Migrator;

/// The single connection the binary runs migrations over.
pub struct Database {
    conn: DatabaseConnection,
}

impl Database {
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let url = config.url.as_deref().ok_or(Error::MissingDatabaseUrl)?;
        let backend = backend_from_url(url)?;
        let timeout = Duration::from_secs(config.connect_timeout_seconds);

        let mut options = ConnectOptions::new(url);
        options
            .max_connections(1)
            .connect_timeout(timeout)
            .acquire_timeout(timeout);
        if let Some(schema) = &config.schema {
            options.set_schema_search_path(schema.clone());
        }

        let conn = sea_orm::Database::connect(options).await?;
        if backend == DbBackend::Sqlite {
            conn.execute_unprepared("PRAGMA foreign_keys = ON").await?;
        }

        info!("Connected to {:?} database", backend);
        Ok(Database { conn })
    }

    pub fn backend(&self) -> DbBackend {
        self.conn.get_database_backend()
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    pub async fn run_migrations(&self) -> Result<()> {
        info!("Running database migrations...");
        Migrator::up(&self.conn, None).await?;
        info!("Migrations completed");
        Ok(())
    }

    pub async fn close(self) -> Result<()> {
        self.conn.close().await?;
        Ok(())
    }
}

/// Backend named by the URL scheme; only PostgreSQL and SQLite are supported.
pub fn backend_from_url(url: &str) -> Result<DbBackend> {
    let scheme = url.split(':').next().unwrap_or_default();
    match scheme {
        "postgres" | "postgresql" => Ok(DbBackend::Postgres),
        "sqlite" => Ok(DbBackend::Sqlite),
        other => Err(Error::UnsupportedBackend(other.to_string())),
    }
}
