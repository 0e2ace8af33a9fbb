//! # API Configuration
//!
//! Configuration for the store server endpoints and pricing.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     VEGA_API_BASE_URL=https://store.example.com                        │
//! │     VEGA_TAX_RATE_BPS=1000                                             │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/vega-pos/api.toml (Linux)                                │
//! │     ~/Library/Application Support/com.vega.pos/api.toml (macOS)        │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     http://localhost:8000, 10% tax                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # api.toml
//! [api]
//! base_url = "https://store.example.com"
//! request_timeout_secs = 10
//! tax_rate_bps = 1000  # 10% consumption tax, fixed per register
//!
//! [submit]
//! max_elapsed_secs = 30
//! initial_backoff_ms = 500
//! max_backoff_secs = 10
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use url::Url;
use vega_core::TaxRate;

use crate::error::{ApiError, ApiResult};

// =============================================================================
// API Settings
// =============================================================================

/// Endpoint and pricing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL of the store server (no trailing slash required).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds). Applies to lookup and each
    /// individual submit attempt.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Tax rate in basis points. Fixed per register, not per product.
    #[serde(default = "default_tax_rate_bps")]
    pub tax_rate_bps: u32,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_tax_rate_bps() -> u32 {
    1000 // 10%
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            tax_rate_bps: default_tax_rate_bps(),
        }
    }
}

// =============================================================================
// Submit Retry Settings
// =============================================================================

/// Retry policy for purchase submission.
///
/// Retries stop once the total elapsed time crosses
/// `max_elapsed_secs`; the cart and the submission id survive, so a
/// later user-initiated retry still dedups server-side.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SubmitSettings {
    /// Give up after this much total elapsed time (seconds).
    #[serde(default = "default_max_elapsed")]
    pub max_elapsed_secs: u64,

    /// Initial backoff interval (milliseconds).
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff interval (seconds).
    #[serde(default = "default_max_backoff")]
    pub max_backoff_secs: u64,
}

fn default_max_elapsed() -> u64 {
    30
}

fn default_initial_backoff() -> u64 {
    500
}

fn default_max_backoff() -> u64 {
    10
}

impl Default for SubmitSettings {
    fn default() -> Self {
        SubmitSettings {
            max_elapsed_secs: default_max_elapsed(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_secs: default_max_backoff(),
        }
    }
}

// =============================================================================
// Main API Configuration
// =============================================================================

/// Complete API configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Endpoint and pricing settings.
    #[serde(default)]
    pub api: ApiSettings,

    /// Purchase submission retry policy.
    #[serde(default)]
    pub submit: SubmitSettings,
}

impl ApiConfig {
    /// Creates a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (api.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ApiResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading API config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load API config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ApiResult<()> {
        let url = Url::parse(&self.api.base_url)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ApiError::InvalidUrl(format!(
                "Base URL must be http or https, got: {}",
                self.api.base_url
            )));
        }

        if self.api.request_timeout_secs == 0 {
            return Err(ApiError::InvalidConfig(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }

        // Anything over 100% is a typo, not a tax rate
        if self.api.tax_rate_bps > 10_000 {
            return Err(ApiError::InvalidConfig(format!(
                "tax_rate_bps must be at most 10000, got {}",
                self.api.tax_rate_bps
            )));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(base_url) = std::env::var("VEGA_API_BASE_URL") {
            debug!(base_url = %base_url, "Overriding API base URL from environment");
            self.api.base_url = base_url;
        }

        if let Ok(bps) = std::env::var("VEGA_TAX_RATE_BPS") {
            if let Ok(parsed) = bps.parse::<u32>() {
                debug!(tax_rate_bps = parsed, "Overriding tax rate from environment");
                self.api.tax_rate_bps = parsed;
            } else {
                warn!(value = %bps, "Ignoring unparseable VEGA_TAX_RATE_BPS");
            }
        }

        if let Ok(secs) = std::env::var("VEGA_REQUEST_TIMEOUT_SECS") {
            if let Ok(parsed) = secs.parse::<u64>() {
                self.api.request_timeout_secs = parsed;
            }
        }

        if let Ok(secs) = std::env::var("VEGA_SUBMIT_MAX_ELAPSED_SECS") {
            if let Ok(parsed) = secs.parse::<u64>() {
                self.submit.max_elapsed_secs = parsed;
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "vega", "pos")
            .map(|dirs| dirs.config_dir().join("api.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Returns the base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.api.base_url.trim_end_matches('/')
    }

    /// Returns the configured tax rate.
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.api.tax_rate_bps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.tax_rate_bps, 1000);
        assert_eq!(config.tax_rate().bps(), 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ApiConfig::default();

        config.api.base_url = "ftp://wrong".to_string();
        assert!(config.validate().is_err());

        config.api.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        config.api.base_url = "https://store.example.com".to_string();
        assert!(config.validate().is_ok());

        config.api.tax_rate_bps = 10_001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let mut config = ApiConfig::default();
        config.api.base_url = "https://store.example.com/".to_string();
        assert_eq!(config.base_url(), "https://store.example.com");
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ApiConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[api]"));
        assert!(toml_str.contains("[submit]"));

        let parsed: ApiConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.api.base_url, config.api.base_url);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: ApiConfig = toml::from_str("[api]\nbase_url = \"https://s.example\"\n").unwrap();
        assert_eq!(parsed.api.base_url, "https://s.example");
        assert_eq!(parsed.api.tax_rate_bps, 1000);
        assert_eq!(parsed.submit.max_elapsed_secs, 30);
    }
}
