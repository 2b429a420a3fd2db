/// Database configuration and connection management
pub mod database;

/// Sponsor seed configuration from config.toml
pub mod sponsors;
