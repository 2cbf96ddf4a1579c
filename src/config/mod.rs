//! Configuration module for driftwatch.
//!
//! This module provides structured configuration loading from environment variables,
//! organized by concern: Dataset, Monitor, and Observability.
//!
//! Parsing goes through a key lookup so every layer can be exercised without
//! touching the process environment.

mod dataset_config;
mod monitor_config;
mod observability_config;

pub use dataset_config::{DatasetEnvConfig, DatasetLocation};
pub use monitor_config::{MonitorEnvConfig, PartitionSettings};
pub use observability_config::ObservabilityEnvConfig;

use anyhow::Result;
use std::env;
use std::fmt::Display;
use std::str::FromStr;

/// Environment variable lookup
pub type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Parse `key` when set, otherwise return `default`
fn parse_or<T>(lookup: Lookup<'_>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Invalid {}='{}': {}", key, raw, e)),
        None => Ok(default),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub dataset: DatasetEnvConfig,
    pub monitor: MonitorEnvConfig,
    pub observability: ObservabilityEnvConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        Ok(Self {
            dataset: DatasetEnvConfig::from_lookup(lookup)?,
            monitor: MonitorEnvConfig::from_lookup(lookup)?,
            observability: ObservabilityEnvConfig::from_lookup(lookup)?,
        })
    }
}
