use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::env;

use crate::application::invoice::InvoicingDefaults;

// Default value functions
fn default_backend_timeout() -> u64 {
  15
}

fn default_tax_rate_percent() -> Decimal {
  dec!(18)
}

fn default_credit_days() -> u32 {
  30
}

fn default_currency() -> String {
  "PEN".to_string()
}

fn default_unit_measure() -> String {
  "NIU".to_string()
}

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub server: ServerConfig,
  pub backend: BackendConfig,
  #[serde(default)]
  pub invoicing: InvoicingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  pub host: String,
  pub port: u16,
}

/// Invoicing backend (the service that stores invoices and talks to SUNAT)
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
  pub base_url: String,
  #[serde(default = "default_backend_timeout")]
  pub timeout_seconds: u64,
}

/// Defaults applied to fields the invoice form leaves empty
#[derive(Debug, Clone, Deserialize)]
pub struct InvoicingConfig {
  #[serde(default = "default_tax_rate_percent")]
  pub default_tax_rate_percent: Decimal,
  #[serde(default = "default_credit_days")]
  pub default_credit_days: u32,
  #[serde(default = "default_currency")]
  pub default_currency: String,
  #[serde(default = "default_unit_measure")]
  pub default_unit_measure: String,
}

impl Default for InvoicingConfig {
  fn default() -> Self {
    Self {
      default_tax_rate_percent: default_tax_rate_percent(),
      default_credit_days: default_credit_days(),
      default_currency: default_currency(),
      default_unit_measure: default_unit_measure(),
    }
  }
}

impl From<&InvoicingConfig> for InvoicingDefaults {
  fn from(config: &InvoicingConfig) -> Self {
    Self {
      tax_rate_percent: config.default_tax_rate_percent,
      credit_days: config.default_credit_days,
      currency: config.default_currency.clone(),
      unit_measure: config.default_unit_measure.clone(),
    }
  }
}

impl Config {
  /// Load configuration from files and environment variables
  ///
  /// Configuration is loaded in the following order (later sources override earlier ones):
  /// 1. config/default.toml
  /// 2. config/local.toml (if exists)
  /// 3. config/{RUN_MODE}.toml (if exists)
  /// 4. Environment variables with FACTURAPE_ prefix
  ///
  /// # Environment Variables
  ///
  /// Environment variables use the FACTURAPE_ prefix and are separated by double underscores:
  /// - `FACTURAPE_SERVER__HOST=0.0.0.0`
  /// - `FACTURAPE_SERVER__PORT=8080`
  /// - `FACTURAPE_BACKEND__BASE_URL=https://api.example.pe/v1`
  /// - `FACTURAPE_BACKEND__TIMEOUT_SECONDS=15`
  /// - `FACTURAPE_INVOICING__DEFAULT_CREDIT_DAYS=30`
  ///
  /// # Errors
  ///
  /// Returns a `ConfigError` if:
  /// - config/default.toml is missing
  /// - Configuration files contain invalid TOML
  /// - Required configuration values are missing or have invalid types
  pub fn load() -> Result<Self, ConfigError> {
    let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

    let config = ConfigBuilder::builder()
      .add_source(File::with_name("config/default").required(true))
      .add_source(File::with_name("config/local").required(false))
      .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
      // Double underscore as separator: FACTURAPE_SERVER__PORT=8080
      .add_source(
        Environment::with_prefix("FACTURAPE")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()?;

    config.try_deserialize()
  }

  pub fn invoicing_defaults(&self) -> InvoicingDefaults {
    InvoicingDefaults::from(&self.invoicing)
  }
}
