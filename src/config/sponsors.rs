//! Sponsor seed configuration loading from config.toml
//!
//! Sponsors listed in config.toml are created on startup when no sponsor with the
//! same email exists yet. Seeding goes through the regular ledger entry point so
//! each seeded account gets its initial funding entry.

use crate::errors::{Error, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;

/// Default location of the seed file, overridable with `LEDGER_CONFIG`
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Sponsor accounts to seed
    #[serde(default)]
    pub sponsors: Vec<SponsorSeed>,
}

/// Configuration for a single seeded sponsor
#[derive(Debug, Deserialize, Clone)]
pub struct SponsorSeed {
    /// Display name
    pub full_name: String,
    /// Login email
    pub email: String,
    /// Optional phone number
    #[serde(default)]
    pub phone: Option<String>,
    /// Opening funding, logged as a `top_up`
    pub initial_amount: Decimal,
    /// Spendable balance at creation; defaults to `initial_amount`
    #[serde(default)]
    pub current_amount: Option<Decimal>,
    /// Temporary portal password; the sponsor must change it on first login
    pub password: String,
}

/// Loads sponsor seed configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path_ref = path.as_ref();
    tracing::debug!("Loading sponsor seed configuration from {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Loads the seed file named by `LEDGER_CONFIG`, or ./config.toml.
///
/// A missing file is not an error: it yields an empty configuration.
pub fn load_default_config() -> Result<Config> {
    let path = std::env::var("LEDGER_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    if !Path::new(&path).exists() {
        tracing::info!("No seed configuration at {}, skipping", path);
        return Ok(Config::default());
    }
    load_config(path)
}
