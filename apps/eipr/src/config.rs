//! Application configuration loaded from environment variables.
//!
//! Fail-fast loading: required variables must be present and valid or the
//! process exits before touching the provider.

use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors that can occur during environment loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// The tag key correlating addresses to targets.
    pub label_key: String,

    /// Disable the source/destination check after successful association.
    pub disable_source_dest_check: bool,

    /// Maximum number of pairings processed concurrently.
    pub concurrency: usize,

    /// Upper bound on each individual provider call, in seconds.
    pub call_timeout: Duration,

    /// Compute and report pairings without issuing mutating calls.
    pub dry_run: bool,

    /// JSON inventory fixture backing the in-memory provider. Local
    /// rehearsal only; unset means there is nothing to reconcile against.
    pub inventory_file: Option<PathBuf>,

    /// Tracing filter directive (e.g., "info,eipr=debug").
    pub rust_log: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or any
    /// value fails to parse.
    ///
    /// # Required Variables
    ///
    /// - `EIPR_LABEL_KEY` - the correlation tag key
    ///
    /// # Optional Variables
    ///
    /// - `EIPR_DISABLE_SOURCE_DEST_CHECK` - default: "false"
    /// - `EIPR_CONCURRENCY` - default: 4
    /// - `EIPR_CALL_TIMEOUT_SECS` - default: 30
    /// - `EIPR_DRY_RUN` - default: "false"
    /// - `EIPR_INVENTORY_FILE` - path to a JSON inventory fixture
    /// - `RUST_LOG` - log filter (default: "info")
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (development only)
        let _ = dotenvy::dotenv();

        let label_key = env::var("EIPR_LABEL_KEY")
            .map_err(|_| ConfigError::MissingVar("EIPR_LABEL_KEY".to_string()))?;
        if label_key.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                var: "EIPR_LABEL_KEY".to_string(),
                message: "Must not be empty".to_string(),
            });
        }

        let disable_source_dest_check = parse_bool("EIPR_DISABLE_SOURCE_DEST_CHECK", false)?;
        let dry_run = parse_bool("EIPR_DRY_RUN", false)?;

        let concurrency = match env::var("EIPR_CONCURRENCY") {
            Ok(s) => s.parse::<usize>().ok().filter(|n| *n >= 1).ok_or_else(|| {
                ConfigError::InvalidValue {
                    var: "EIPR_CONCURRENCY".to_string(),
                    message: "Must be a positive integer".to_string(),
                }
            })?,
            Err(_) => 4,
        };

        let call_timeout_secs = match env::var("EIPR_CALL_TIMEOUT_SECS") {
            Ok(s) => s.parse::<u64>().ok().filter(|n| *n >= 1).ok_or_else(|| {
                ConfigError::InvalidValue {
                    var: "EIPR_CALL_TIMEOUT_SECS".to_string(),
                    message: "Must be a positive integer (seconds)".to_string(),
                }
            })?,
            Err(_) => 30,
        };

        let inventory_file = env::var("EIPR_INVENTORY_FILE")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(Config {
            label_key,
            disable_source_dest_check,
            concurrency,
            call_timeout: Duration::from_secs(call_timeout_secs),
            dry_run,
            inventory_file,
            rust_log,
        })
    }
}

/// Parse a boolean env var, accepting the usual spellings.
fn parse_bool(var: &str, default: bool) -> Result<bool, ConfigError> {
    match env::var(var) {
        Err(_) => Ok(default),
        Ok(s) => match s.to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            other => Err(ConfigError::InvalidValue {
                var: var.to_string(),
                message: format!("Expected true/false, got '{other}'"),
            }),
        },
    }
}
