//! Configuration management for the purchasing server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with PURCHASING_ prefix

use config::{ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{PriorityThresholds, DEFAULT_WITHHOLDING_RATE};

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Purchasing ledger rules
    pub purchasing: PurchasingSettings,

    /// Payment alert generation
    pub alerts: AlertSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PurchasingSettings {
    /// Statutory withholding rate, in percent
    pub withholding_rate: Decimal,

    /// Also withhold on each payment (legacy double deduction)
    pub withhold_on_payment: bool,

    /// Seed the demo suppliers, orders and invoices at startup
    pub seed_demo_data: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AlertSettings {
    /// Look-ahead window for due_soon alerts
    pub due_soon_days: i64,

    /// due_soon alerts this close to the due date are medium priority
    pub medium_priority_days: i64,

    /// Overdue alerts this late are high priority
    pub high_priority_overdue_days: i64,

    /// Background scan period in seconds; 0 disables the scan
    pub scan_interval_secs: u64,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("PURCHASING_ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let seed_default = environment == "development";

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("purchasing.withholding_rate", "3")?
            .set_default("purchasing.withhold_on_payment", false)?
            .set_default("purchasing.seed_demo_data", seed_default)?
            .set_default("alerts.due_soon_days", 7)?
            .set_default("alerts.medium_priority_days", 3)?
            .set_default("alerts.high_priority_overdue_days", 1)?
            .set_default("alerts.scan_interval_secs", 3600)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (PURCHASING_ prefix)
            .add_source(
                Environment::with_prefix("PURCHASING")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        shared::validate_rate(self.purchasing.withholding_rate)
            .map_err(|e| ConfigError::Message(format!("purchasing.withholding_rate: {}", e)))?;
        if self.alerts.due_soon_days < 0 {
            return Err(ConfigError::Message(
                "alerts.due_soon_days cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for PurchasingSettings {
    fn default() -> Self {
        Self {
            withholding_rate: DEFAULT_WITHHOLDING_RATE,
            withhold_on_payment: false,
            seed_demo_data: false,
        }
    }
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            due_soon_days: 7,
            medium_priority_days: 3,
            high_priority_overdue_days: 1,
            scan_interval_secs: 3600,
        }
    }
}

impl AlertSettings {
    pub fn priority_thresholds(&self) -> PriorityThresholds {
        PriorityThresholds {
            medium_within_days: self.medium_priority_days,
            high_after_overdue_days: self.high_priority_overdue_days,
        }
    }
}
