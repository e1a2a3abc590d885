//! Database connection management.

use std::time::Duration;

use sea_orm::{ConnectOptions, DbConn, DbErr};

/// Connection settings for the Postgres database.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 20,
            min_connections: 5,
        }
    }
}

/// Explicitly constructed database handle.
///
/// Connected once at startup and passed into the repositories that need
/// it; closed explicitly at shutdown. There is no ambient global
/// connection anywhere in the codebase.
pub struct Database {
    conn: DbConn,
}

impl Database {
    /// Open the connection pool.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DbErr> {
        let opts = ConnectOptions::new(&config.url)
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .sqlx_logging(true)
            .to_owned();

        let conn = sea_orm::Database::connect(opts).await?;
        tracing::info!(pool = config.max_connections, "database connected");

        Ok(Self { conn })
    }

    /// User repository backed by this pool.
    pub fn users(&self) -> super::PostgresUserRepository {
        super::PostgresUserRepository::new(self.conn.clone())
    }

    /// Post repository backed by this pool.
    pub fn posts(&self) -> super::PostgresPostRepository {
        super::PostgresPostRepository::new(self.conn.clone())
    }

    /// Close the pool and all its connections.
    pub async fn close(self) -> Result<(), DbErr> {
        tracing::info!("closing database connection");
        self.conn.close().await
    }
}
