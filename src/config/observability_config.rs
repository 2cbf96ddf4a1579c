//! Observability configuration parsing from environment variables.
//!
//! This module handles the metrics endpoint address and the log filter.

use super::{Lookup, parse_or};
use anyhow::{Context, Result};
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

/// Observability environment configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ObservabilityEnvConfig {
    pub port: u16,
    pub bind_address: String,
    /// `RUST_LOG` directives
    pub log_filter: String,
}

impl Default for ObservabilityEnvConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            bind_address: "0.0.0.0".to_string(),
            log_filter: "info".to_string(),
        }
    }
}

impl ObservabilityEnvConfig {
    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            port: parse_or(lookup, "METRICS_PORT", defaults.port)?,
            bind_address: lookup("METRICS_BIND_ADDRESS").unwrap_or(defaults.bind_address),
            log_filter: lookup("RUST_LOG").unwrap_or(defaults.log_filter),
        })
    }

    /// Filter for the tracing subscriber; unparsable directives fall back to `info`
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.log_filter).unwrap_or_else(|_| EnvFilter::new("info"))
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.bind_address, self.port)
            .parse()
            .with_context(|| {
                format!(
                    "Invalid metrics address {}:{}",
                    self.bind_address, self.port
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observability_config_defaults() {
        let config = ObservabilityEnvConfig::from_lookup(&|_| None).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.socket_addr().unwrap().port(), 8000);
    }

    #[test]
    fn test_log_filter_honours_global_level() {
        let lookup = |key: &str| (key == "RUST_LOG").then(|| "debug".to_string());
        let config = ObservabilityEnvConfig::from_lookup(&lookup).unwrap();
        assert_eq!(config.env_filter().to_string(), "debug");

        let defaults = ObservabilityEnvConfig::from_lookup(&|_| None).unwrap();
        assert_eq!(defaults.env_filter().to_string(), "info");

        let lookup = |key: &str| (key == "RUST_LOG").then(|| "driftwatch=loudest".to_string());
        let config = ObservabilityEnvConfig::from_lookup(&lookup).unwrap();
        assert_eq!(config.env_filter().to_string(), "info");
    }

    #[test]
    fn test_invalid_port() {
        let lookup = |key: &str| (key == "METRICS_PORT").then(|| "80000".to_string());
        assert!(ObservabilityEnvConfig::from_lookup(&lookup).is_err());
    }
}
