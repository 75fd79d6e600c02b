use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};
use url::Url;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::seed::SeedPlan;

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_DB_PORT: u16 = 5432;
const CONFIG_DIR: &str = "config";

/// Plain `DB_*` variables read on top of every other source, keyed by the
/// configuration field they populate.
const DB_ENV_VARS: [(&str, &str); 5] = [
    ("db_host", "DB_HOST"),
    ("db_name", "DB_NAME"),
    ("db_user", "DB_USER"),
    ("db_password", "DB_PASSWORD"),
    ("db_port", "DB_PORT"),
];

/// Seeder configuration with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Full connection URL; takes precedence over the `db_*` parts
    #[serde(default)]
    pub database_url: Option<String>,

    #[serde(default)]
    pub db_host: Option<String>,

    #[serde(default)]
    pub db_name: Option<String>,

    #[serde(default)]
    pub db_user: Option<String>,

    #[serde(default)]
    pub db_password: Option<String>,

    #[serde(default = "default_db_port")]
    pub db_port: u16,

    /// Logging level
    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    #[serde(default = "default_store_count")]
    #[validate(range(min = 1))]
    pub store_count: u32,

    #[serde(default = "default_customer_count")]
    #[validate(range(min = 1))]
    pub customer_count: u32,

    #[serde(default = "default_order_count")]
    #[validate(range(min = 1))]
    pub order_count: u32,

    /// Fixed RNG seed; unset means a fresh seed per run
    #[serde(default)]
    pub rng_seed: Option<u64>,

    /// Alternative catalog file (TOML) replacing the built-in one
    #[serde(default)]
    pub catalog_path: Option<String>,

    /// Whether to create the schema before seeding
    #[serde(default)]
    pub auto_migrate: bool,

    /// Re-read the seeded tables and check their invariants after the run
    #[serde(default = "default_true_bool")]
    pub verify_after_seed: bool,
}

impl AppConfig {
    /// Creates a configuration that connects through a full URL, with defaults
    /// for everything else
    pub fn with_database_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: Some(database_url.into()),
            db_host: None,
            db_name: None,
            db_user: None,
            db_password: None,
            db_port: default_db_port(),
            log_level: default_log_level(),
            log_json: false,
            store_count: default_store_count(),
            customer_count: default_customer_count(),
            order_count: default_order_count(),
            rng_seed: None,
            catalog_path: None,
            auto_migrate: false,
            verify_after_seed: default_true_bool(),
        }
    }

    /// Resolves the connection URL, building a Postgres URL from the `db_*`
    /// parts when no explicit `database_url` is configured.
    pub fn connection_url(&self) -> Result<String, AppConfigError> {
        if let Some(url) = self.database_url.as_deref().filter(|u| !u.trim().is_empty()) {
            return Ok(url.to_string());
        }

        let host = required(&self.db_host, "db_host")?;
        let name = required(&self.db_name, "db_name")?;
        let user = required(&self.db_user, "db_user")?;

        let mut url = Url::parse(&format!("postgres://{}:{}/{}", host, self.db_port, name))?;
        url.set_username(user)
            .map_err(|_| AppConfigError::InvalidUrl(format!("cannot set user on {}", host)))?;
        url.set_password(self.db_password.as_deref().filter(|p| !p.is_empty()))
            .map_err(|_| AppConfigError::InvalidUrl(format!("cannot set password on {}", host)))?;

        Ok(url.to_string())
    }

    /// Record counts for the generated tables
    pub fn plan(&self) -> SeedPlan {
        SeedPlan {
            store_count: self.store_count,
            customer_count: self.customer_count,
            order_count: self.order_count,
        }
    }

    /// Gets log level reference
    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    fn validate_additional_constraints(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let has_url = self
            .database_url
            .as_deref()
            .is_some_and(|u| !u.trim().is_empty());
        if !has_url {
            for (field, value) in [
                ("db_host", &self.db_host),
                ("db_name", &self.db_name),
                ("db_user", &self.db_user),
            ] {
                if value.as_deref().map_or(true, |v| v.trim().is_empty()) {
                    let mut err = ValidationError::new("required");
                    err.message = Some(
                        "Set DB_HOST, DB_NAME and DB_USER, or provide APP__DATABASE_URL".into(),
                    );
                    errors.add(field, err);
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn required<'a>(value: &'a Option<String>, field: &'static str) -> Result<&'a str, AppConfigError> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or(AppConfigError::Missing(field))
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Missing database setting: {0}")]
    Missing(&'static str),

    #[error("Invalid database URL: {0}")]
    InvalidUrl(String),
}

impl From<url::ParseError> for AppConfigError {
    fn from(err: url::ParseError) -> Self {
        AppConfigError::InvalidUrl(err.to_string())
    }
}

/// Default value functions
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_db_port() -> u16 {
    DEFAULT_DB_PORT
}

fn default_store_count() -> u32 {
    SeedPlan::default().store_count
}

fn default_customer_count() -> u32 {
    SeedPlan::default().customer_count
}

fn default_order_count() -> u32 {
    SeedPlan::default().order_count
}

fn default_true_bool() -> bool {
    true
}

/// Validates log level values
fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if valid_levels.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("log_level");
        err.message = Some("Must be one of: trace, debug, info, warn, error".into());
        Err(err)
    }
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("pizzeria_seed={},sea_orm=warn,sqlx=warn", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    let filter = EnvFilter::new(filter_directive);
    if json {
        let _ = fmt().with_env_filter(filter).json().try_init();
    } else {
        let _ = fmt().with_env_filter(filter).try_init();
    }
}

/// Loads seeder configuration from the `config/` directory and the environment
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    load_config_from(Path::new(CONFIG_DIR))
}

/// Loads seeder configuration
///
/// Layers configuration sources in this order:
/// 1. Built-in defaults
/// 2. `{dir}/default.toml`
/// 3. Environment-specific config (`{dir}/{env}.toml`)
/// 4. Environment variables (`APP__*`)
/// 5. Database variables (`DB_HOST`, `DB_NAME`, `DB_USER`, `DB_PASSWORD`, `DB_PORT`)
pub fn load_config_from(dir: &Path) -> Result<AppConfig, AppConfigError> {
    // Support both RUN_ENV and APP_ENV for selecting config profile
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !dir.exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            dir.display()
        );
    }

    let mut builder = Config::builder()
        .set_default("db_port", i64::from(DEFAULT_DB_PORT))?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(File::from(dir.join("default")).required(false))
        .add_source(File::from(dir.join(&run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"));

    // Blank variables count as unset, so an empty DB_PORT keeps the default.
    for (key, var) in DB_ENV_VARS {
        if let Some(value) = env::var(var).ok().filter(|v| !v.trim().is_empty()) {
            builder = builder.set_override(key, value)?;
        }
    }

    let app_config: AppConfig = builder.build()?.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    app_config.validate_additional_constraints().map_err(|e| {
        error!("Database settings are incomplete: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!("Configuration loaded successfully");
    Ok(app_config)
}
