//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (optional): SQLite connection string, defaults to `sqlite:database.db`
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 8090
/// - `SESSION_TTL_SECS` (optional): sliding expiry window for admin sessions, defaults to 3600
/// - `SWEEP_INTERVAL_SECS` (optional): how often expired sessions are evicted, defaults to 3600
/// - `BOOTSTRAP_ADMIN_USERNAME` / `BOOTSTRAP_ADMIN_PASSWORD` (optional): seed an
///   initial administrator when the admins table is empty
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    /// Seconds an admin session stays valid after its last use.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,

    /// Seconds between background sweeps of the session cache.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    pub bootstrap_admin_username: Option<String>,
    pub bootstrap_admin_password: Option<String>,
}

/// Default database location, a SQLite file next to the binary.
fn default_database_url() -> String {
    "sqlite:database.db".to_string()
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    8090
}

/// Sessions expire after one hour of inactivity unless configured otherwise.
fn default_session_ttl() -> u64 {
    3600
}

/// The sweep interval matches the session lifetime by default.
fn default_sweep_interval() -> u64 {
    3600
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if environment variable values cannot be parsed into
    /// the expected types.
    pub fn from_env() -> Result<Self, envy::Error> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        // Parse environment variables into Config struct
        // Field names are automatically converted: database_url -> DATABASE_URL
        envy::from_env::<Config>()
    }
}
