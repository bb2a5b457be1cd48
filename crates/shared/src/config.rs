//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::types::Currency;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Session token configuration.
    #[serde(default)]
    pub session: SessionConfig,
    /// External exchange rate configuration.
    #[serde(default)]
    pub rates: RatesConfig,
    /// Ledger configuration.
    #[serde(default)]
    pub ledger: LedgerConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Session token configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Token lifetime in seconds.
    #[serde(default = "default_session_ttl")]
    pub ttl_secs: u64,
    /// Name of the cookie carrying the token.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_session_ttl(),
            cookie_name: default_cookie_name(),
        }
    }
}

fn default_session_ttl() -> u64 {
    604_800 // 7 days
}

fn default_cookie_name() -> String {
    "auth_token".to_string()
}

/// Exchange rate source and pivot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RatesConfig {
    /// Open Exchange Rates application id. Rate lookups fail without it.
    #[serde(default)]
    pub app_id: Option<String>,
    /// Base URL of the rate API.
    #[serde(default = "default_rates_base_url")]
    pub base_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_rates_timeout")]
    pub timeout_secs: u64,
    /// Home currency that has no market quote of its own.
    #[serde(default = "default_pivot")]
    pub pivot: Currency,
    /// Currency the pivot is pegged against.
    #[serde(default = "default_reference")]
    pub reference: Currency,
    /// Units of `reference` per one unit of `pivot`.
    #[serde(default = "default_pivot_factor")]
    pub pivot_factor: Decimal,
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            app_id: None,
            base_url: default_rates_base_url(),
            timeout_secs: default_rates_timeout(),
            pivot: default_pivot(),
            reference: default_reference(),
            pivot_factor: default_pivot_factor(),
        }
    }
}

fn default_rates_base_url() -> String {
    "https://openexchangerates.org/api".to_string()
}

fn default_rates_timeout() -> u64 {
    10
}

fn default_pivot() -> Currency {
    Currency::HOME
}

fn default_reference() -> Currency {
    Currency::Usd
}

fn default_pivot_factor() -> Decimal {
    Decimal::new(92, 3) // 0.092
}

/// Ledger configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Home-currency balance granted to every new account.
    #[serde(default = "default_starting_grant")]
    pub starting_grant: Decimal,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            starting_grant: default_starting_grant(),
        }
    }
}

fn default_starting_grant() -> Decimal {
    Decimal::ONE_HUNDRED
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("SOMON").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
