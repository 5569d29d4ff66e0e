use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use std::time::Duration;
use tracing::info;
use validator::Validate;

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";
const DEFAULT_CREDENTIALS_PATH: &str = "credentials.json";
const DEFAULT_INVENTORY_WORKSHEET: &str = "Inventory";
const DEFAULT_SALES_WORKSHEET: &str = "Sales";
const DEFAULT_CACHE_TTL_SECS: u64 = 60;
const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 5;
const DEFAULT_STATIC_DIR: &str = "static";

/// Application configuration with validation.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct AppConfig {
    /// Id of the spreadsheet acting as the system of record
    #[validate(length(min = 1))]
    pub spreadsheet_id: String,

    /// Path to the service-account credentials JSON
    #[serde(default = "default_credentials_path")]
    pub credentials_path: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    #[validate(range(min = 1024))]
    pub port: u16,

    /// Worksheet holding inventory rows
    #[serde(default = "default_inventory_worksheet")]
    #[validate(length(min = 1))]
    pub inventory_worksheet: String,

    /// Worksheet holding sale rows
    #[serde(default = "default_sales_worksheet")]
    #[validate(length(min = 1))]
    pub sales_worksheet: String,

    /// Freshness window for worksheet snapshots, in seconds
    #[serde(default = "default_cache_ttl_secs")]
    #[validate(range(min = 1))]
    pub cache_ttl_secs: u64,

    /// Inclusive quantity bound below which an in-stock item counts as low stock
    #[serde(default = "default_low_stock_threshold")]
    #[validate(range(min = 1))]
    pub low_stock_threshold: u32,

    /// Directory the browser views are served from
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    /// Application environment
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Comma-separated list of allowed CORS origins
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,
}

fn default_credentials_path() -> String {
    DEFAULT_CREDENTIALS_PATH.to_string()
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_inventory_worksheet() -> String {
    DEFAULT_INVENTORY_WORKSHEET.to_string()
}

fn default_sales_worksheet() -> String {
    DEFAULT_SALES_WORKSHEET.to_string()
}

fn default_cache_ttl_secs() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

fn default_low_stock_threshold() -> u32 {
    DEFAULT_LOW_STOCK_THRESHOLD
}

fn default_static_dir() -> String {
    DEFAULT_STATIC_DIR.to_string()
}

fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl AppConfig {
    /// Programmatic constructor used by tests and embedding callers;
    /// everything not passed falls back to the same defaults as deserialization.
    pub fn new(spreadsheet_id: String, host: String, port: u16, environment: String) -> Self {
        Self {
            spreadsheet_id,
            credentials_path: default_credentials_path(),
            host,
            port,
            inventory_worksheet: default_inventory_worksheet(),
            sales_worksheet: default_sales_worksheet(),
            cache_ttl_secs: default_cache_ttl_secs(),
            low_stock_threshold: default_low_stock_threshold(),
            static_dir: default_static_dir(),
            environment,
            log_level: default_log_level(),
            log_json: false,
            cors_allowed_origins: None,
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

/// Loads configuration from `config/default`, `config/{env}`, and `APP__*`
/// environment variables, in increasing precedence.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    let config = Config::builder()
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;
    app_config
        .validate()
        .map_err(|e| ConfigError::Message(e.to_string()))?;

    Ok(app_config)
}

/// Installs the global tracing subscriber. `RUST_LOG` overrides the
/// level derived from configuration.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let default_directive = format!("sheetpos_api={},tower_http=info", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    let filter = EnvFilter::try_new(filter_directive)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn programmatic_constructor_applies_defaults() {
        let cfg = AppConfig::new(
            "sheet-id".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );

        assert_eq!(cfg.inventory_worksheet, "Inventory");
        assert_eq!(cfg.sales_worksheet, "Sales");
        assert_eq!(cfg.cache_ttl_secs, 60);
        assert_eq!(cfg.low_stock_threshold, 5);
        assert!(!cfg.is_development());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn empty_spreadsheet_id_fails_validation() {
        let cfg = AppConfig::new(
            String::new(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        assert!(cfg.validate().is_err());
    }
}
