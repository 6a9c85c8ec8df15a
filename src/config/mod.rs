use serde::Deserialize;
use std::env;
use validator::{Validate, ValidationError};

use crate::error::Result;

// Top-level configuration: everything the binary needs, loaded once at startup
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Config {
    #[validate(nested)]
    pub app: AppConfig,
    #[validate(nested)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AppConfig {
    pub environment: String,
    #[validate(length(min = 1))]
    pub rust_log: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DatabaseConfig {
    /// Optional so commands that never connect (printing DDL) work without it.
    pub url: Option<String>,
    /// PostgreSQL search path; ignored by SQLite.
    #[validate(custom(function = "validate_identifier"))]
    pub schema: Option<String>,
    #[validate(range(min = 1, max = 300))]
    pub connect_timeout_seconds: u64,
}

impl Config {
    /// Defaults, then `CINEMA__SECTION__KEY` variables, then the conventional
    /// flat variables (`DATABASE_URL`, `RUST_LOG`, ...).
    pub fn from_env() -> Result<Self> {
        let settings = ::config::Config::builder()
            .set_default("app.environment", "development")?
            .set_default("app.rust_log", "cinema_system=info,sea_orm_migration=info")?
            .set_default("app.log_format", "text")?
            .set_default("database.connect_timeout_seconds", 5)?
            .add_source(
                ::config::Environment::with_prefix("CINEMA")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .set_override_option("app.environment", env::var("ENVIRONMENT").ok())?
            .set_override_option("app.rust_log", env::var("RUST_LOG").ok())?
            .set_override_option("app.log_format", env::var("LOG_FORMAT").ok())?
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            .set_override_option("database.schema", env::var("DATABASE_SCHEMA").ok())?
            .set_override_option(
                "database.connect_timeout_seconds",
                env::var("DB_CONNECT_TIMEOUT_SECONDS").ok(),
            )?
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            schema: None,
            connect_timeout_seconds: 5,
        }
    }
}

// The schema name ends up in a SET search_path statement, so it must be a plain identifier
fn validate_identifier(name: &str) -> std::result::Result<(), ValidationError> {
    let mut chars = name.chars();
    let starts_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if starts_ok && rest_ok && name.len() <= 63 {
        Ok(())
    } else {
        Err(ValidationError::new("identifier"))
    }
}
