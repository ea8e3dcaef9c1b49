//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `CART_STORAGE_PATH` - JSON file backing the cart (default: `cart-storage.json`)
//! - `CART_STORAGE_KEY` - Key the cart list is stored under (default: `@GoMarketplace:products`)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;

use thiserror::Error;

/// Key the product list is persisted under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "@GoMarketplace:products";

const DEFAULT_STORAGE_PATH: &str = "cart-storage.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    /// File backing the key-value store
    pub storage_path: PathBuf,
    /// Storage key holding the serialized product list
    pub storage_key: String,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            sentry_dsn: None,
        }
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but empty.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage_path = get_non_empty(&lookup, "CART_STORAGE_PATH")?
            .map_or_else(|| PathBuf::from(DEFAULT_STORAGE_PATH), PathBuf::from);
        let storage_key = get_non_empty(&lookup, "CART_STORAGE_KEY")?
            .unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string());
        let sentry_dsn = lookup("SENTRY_DSN").filter(|v| !v.trim().is_empty());

        Ok(Self {
            storage_path,
            storage_key,
            sentry_dsn,
        })
    }
}

/// Get an optional variable that must not be blank when present.
fn get_non_empty<F>(lookup: &F, name: &str) -> Result<Option<String>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) if value.trim().is_empty() => Err(ConfigError::InvalidEnvVar(
            name.to_string(),
            "value cannot be empty".to_string(),
        )),
        other => Ok(other),
    }
}
