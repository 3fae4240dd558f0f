//! Storefront configuration.

use crate::backend::PaymentRequest;
use crate::checkout::ShippingPolicy;
use crate::logging::LogFormat;
use crate::money::Money;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides `api.base_url`.
pub const API_URL_VAR: &str = "AIMS_API_URL";

/// Storefront configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StorefrontConfig {
    /// Backend connection.
    #[serde(default)]
    pub api: ApiConfig,

    /// Where client state is persisted.
    #[serde(default)]
    pub storage: StorageConfig,

    /// VAT and shipping tariff knobs.
    #[serde(default)]
    pub pricing: PricingConfig,

    /// Payment gateway parameters.
    #[serde(default)]
    pub payment: PaymentSettings,

    #[serde(default)]
    pub cart: CartConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StorefrontConfig {
    /// Load config from a file. `.json` files are read as JSON, anything
    /// else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
        }
    }

    /// Load `path` if given (defaults otherwise), then apply environment
    /// overrides.
    pub fn from_env(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Apply overrides looked up through `var`.
    pub fn apply_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = var(API_URL_VAR).filter(|u| !u.trim().is_empty()) {
            self.api.base_url = url.trim().to_string();
        }
    }
}

/// Backend connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

/// Client state persistence.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    /// Directory for the file store. In-memory when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

/// VAT and shipping tariff knobs, in VND.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricingConfig {
    #[serde(default = "default_vat_percent")]
    pub vat_percent: u32,

    #[serde(default = "default_free_shipping_discount")]
    pub free_shipping_discount: i64,

    #[serde(default = "default_free_shipping_threshold")]
    pub free_shipping_threshold: i64,

    #[serde(default = "default_rush_surcharge")]
    pub rush_surcharge: i64,
}

impl PricingConfig {
    /// The default tariff with this config's discount and surcharge.
    pub fn shipping_policy(&self) -> ShippingPolicy {
        ShippingPolicy {
            free_shipping_discount: Money::vnd(self.free_shipping_discount),
            free_shipping_threshold: Money::vnd(self.free_shipping_threshold),
            rush_surcharge: Money::vnd(self.rush_surcharge),
            ..ShippingPolicy::default()
        }
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            vat_percent: default_vat_percent(),
            free_shipping_discount: default_free_shipping_discount(),
            free_shipping_threshold: default_free_shipping_threshold(),
            rush_surcharge: default_rush_surcharge(),
        }
    }
}

fn default_vat_percent() -> u32 {
    10
}

fn default_free_shipping_discount() -> i64 {
    25_000
}

fn default_free_shipping_threshold() -> i64 {
    100_000
}

fn default_rush_surcharge() -> i64 {
    10_000
}

/// Fixed fields of the payment initiation request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentSettings {
    #[serde(default = "default_bank_code")]
    pub bank_code: String,

    #[serde(default = "default_language")]
    pub language: String,

    /// Gateway protocol version.
    #[serde(default = "default_version")]
    pub version: String,
}

impl PaymentSettings {
    pub fn request(&self, amount: Money) -> PaymentRequest {
        PaymentRequest {
            amount,
            bank_code: self.bank_code.clone(),
            language: self.language.clone(),
            version: self.version.clone(),
        }
    }
}

impl Default for PaymentSettings {
    fn default() -> Self {
        Self {
            bank_code: default_bank_code(),
            language: default_language(),
            version: default_version(),
        }
    }
}

fn default_bank_code() -> String {
    "NCB".to_string()
}

fn default_language() -> String {
    "vn".to_string()
}

fn default_version() -> String {
    "2.1.0".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CartConfig {
    /// Delay applied by the async cart operations.
    #[serde(default)]
    pub simulated_latency_ms: u64,
}

impl CartConfig {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}
