//! Controller configuration: capacity constants, store backend selection,
//! and the legacy-401 compatibility flag (§2.1, §9).
//!
//! Follows the same builder shape as `sdsc_rt::system::SystemConfig`:
//! sensible defaults, a fluent `::builder()`, and a validating `::build()`.
//! Loadable from a TOML file merged with `SDSC_`-prefixed environment
//! overrides via the `config` crate.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Layer 3: Internal module imports
use crate::allocation::Capacity;

pub const DEFAULT_DISK_CAP_MBPS: f64 = 1000.0;
pub const DEFAULT_PROXY_CAP_MBPS: f64 = 4000.0;
pub const DEFAULT_NUM_PROXIES: u32 = 4;
/// Legacy callers expect a parse failure to answer 401, not 400 (§9 Open
/// Questions: kept on by default for backward compatibility).
pub const DEFAULT_LEGACY_401_ON_PARSE_ERROR: bool = true;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration load error: {0}")]
    Load(#[from] ConfigCrateError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Controller-wide configuration (§2.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Per-disk bandwidth cap (MBps) used by the allocation core (§4.6).
    pub disk_cap_mbps: f64,

    /// Per-proxy bandwidth cap (MBps).
    pub proxy_cap_mbps: f64,

    /// Number of proxies sharing `proxy_cap_mbps` in aggregate.
    pub num_proxies: u32,

    /// Answer a DSL parse failure with HTTP 401 instead of 400, matching
    /// the legacy REST surface's historical status code (§7, §9).
    pub legacy_401_on_parse_error: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            disk_cap_mbps: DEFAULT_DISK_CAP_MBPS,
            proxy_cap_mbps: DEFAULT_PROXY_CAP_MBPS,
            num_proxies: DEFAULT_NUM_PROXIES,
            legacy_401_on_parse_error: DEFAULT_LEGACY_401_ON_PARSE_ERROR,
        }
    }
}

impl ControllerConfig {
    pub fn builder() -> ControllerConfigBuilder {
        ControllerConfigBuilder::default()
    }

    /// Load from an optional TOML file, overridden by `SDSC_*` environment
    /// variables (e.g. `SDSC_DISK_CAP_MBPS`).
    pub fn load(toml_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("disk_cap_mbps", DEFAULT_DISK_CAP_MBPS)?
            .set_default("proxy_cap_mbps", DEFAULT_PROXY_CAP_MBPS)?
            .set_default("num_proxies", DEFAULT_NUM_PROXIES)?
            .set_default("legacy_401_on_parse_error", DEFAULT_LEGACY_401_ON_PARSE_ERROR)?;

        if let Some(path) = toml_path {
            builder = builder.add_source(File::with_name(path).required(false));
        }

        let config = builder
            .add_source(Environment::with_prefix("SDSC"))
            .build()?;

        let loaded: ControllerConfig = config.try_deserialize()?;
        loaded.validate().map_err(ConfigError::Invalid)?;
        Ok(loaded)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.disk_cap_mbps <= 0.0 {
            return Err("disk_cap_mbps must be > 0".to_string());
        }
        if self.proxy_cap_mbps <= 0.0 {
            return Err("proxy_cap_mbps must be > 0".to_string());
        }
        if self.num_proxies == 0 {
            return Err("num_proxies must be > 0".to_string());
        }
        Ok(())
    }

    /// Project this configuration's capacity fields into the [`Capacity`]
    /// shape C7 is invoked with.
    pub fn capacity(&self) -> Capacity {
        Capacity {
            disk_cap_mbps: self.disk_cap_mbps,
            proxy_cap_mbps: self.proxy_cap_mbps,
            num_proxies: self.num_proxies,
        }
    }
}

#[derive(Debug, Default)]
pub struct ControllerConfigBuilder {
    config: ControllerConfig,
}

impl ControllerConfigBuilder {
    pub fn with_disk_cap_mbps(mut self, value: f64) -> Self {
        self.config.disk_cap_mbps = value;
        self
    }

    pub fn with_proxy_cap_mbps(mut self, value: f64) -> Self {
        self.config.proxy_cap_mbps = value;
        self
    }

    pub fn with_num_proxies(mut self, value: u32) -> Self {
        self.config.num_proxies = value;
        self
    }

    pub fn with_legacy_401_on_parse_error(mut self, value: bool) -> Self {
        self.config.legacy_401_on_parse_error = value;
        self
    }

    pub fn build(self) -> Result<ControllerConfig, ConfigError> {
        self.config
            .validate()
            .map_err(ConfigError::Invalid)?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(ControllerConfig::default().validate().is_ok());
    }

    #[test]
    fn builder_rejects_zero_disk_cap() {
        let result = ControllerConfig::builder().with_disk_cap_mbps(0.0).build();
        assert!(result.is_err());
    }

    #[test]
    fn builder_produces_requested_capacity() {
        let config = ControllerConfig::builder()
            .with_disk_cap_mbps(500.0)
            .with_num_proxies(8)
            .build()
            .unwrap();
        let capacity = config.capacity();
        assert_eq!(capacity.disk_cap_mbps, 500.0);
        assert_eq!(capacity.num_proxies, 8);
    }

    #[test]
    fn legacy_401_flag_defaults_true() {
        assert!(ControllerConfig::default().legacy_401_on_parse_error);
    }
}
