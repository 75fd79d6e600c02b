use migrations::Migrator;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::{debug, error, info};

/// The seeder's single database handle
pub type DbPool = DatabaseConnection;

/// Configuration for database connection
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Database connection URL
    pub url: String,
    /// Connection timeout duration
    pub connect_timeout: Duration,
    /// Log every statement through sqlx
    pub sqlx_logging: bool,
}

impl DbConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connect_timeout: Duration::from_secs(30),
            sqlx_logging: false,
        }
    }
}

/// Opens the one connection the whole run shares
pub async fn establish_connection(database_url: &str) -> Result<DbPool, DbErr> {
    establish_connection_with_config(&DbConfig::new(database_url)).await
}

pub async fn establish_connection_with_config(config: &DbConfig) -> Result<DbPool, DbErr> {
    debug!(connect_timeout = ?config.connect_timeout, "Configuring database connection");

    // Exactly one connection: phases never overlap, and an in-memory SQLite
    // database only exists on the connection that created it.
    let mut opt = ConnectOptions::new(config.url.clone());
    opt.max_connections(1)
        .min_connections(1)
        .connect_timeout(config.connect_timeout)
        .sqlx_logging(config.sqlx_logging);

    let db = Database::connect(opt).await.map_err(|e| {
        error!("Database connection failed: {}", e);
        e
    })?;

    info!(backend = ?db.get_database_backend(), "Database connection established");
    Ok(db)
}

/// Creates the pizzeria schema
pub async fn run_migrations(pool: &DbPool) -> Result<(), DbErr> {
    info!("Running database migrations");
    let start = std::time::Instant::now();

    let result = Migrator::up(pool, None).await;

    let elapsed = start.elapsed();
    match &result {
        Ok(_) => info!(
            "Database migrations completed successfully in {:?}",
            elapsed
        ),
        Err(e) => error!("Database migrations failed after {:?}: {}", elapsed, e),
    }

    result
}

/// Checks if the database connection is active
pub async fn check_connection(pool: &DbPool) -> Result<(), DbErr> {
    debug!("Checking database connection");
    pool.ping().await
}

/// Releases the connection
pub async fn close_connection(pool: DbPool) -> Result<(), DbErr> {
    info!("Closing database connection");
    pool.close().await
}
