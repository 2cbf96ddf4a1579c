//! Drift monitor configuration parsing from environment variables.
//!
//! This module handles the cycle interval, drift thresholds, method overrides
//! and the partition strategy.

use super::{Lookup, parse_or};
use crate::domain::drift::{DriftMethod, DriftOptions};
use crate::domain::partition::{CategoricalSplit, PartitionStrategy, RandomSplit, SliceSide};
use crate::domain::schema::ColumnKind;
use anyhow::Result;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// How rows are split into the reference and production slices
#[derive(Debug, Clone, PartialEq)]
pub enum PartitionSettings {
    Categorical {
        column: String,
        values: Vec<String>,
        members: SliceSide,
    },
    Random {
        production_fraction: f64,
        seed: Option<u64>,
    },
}

impl PartitionSettings {
    fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        let strategy = lookup("PARTITION_STRATEGY").unwrap_or_else(|| "categorical".to_string());

        match strategy.to_lowercase().as_str() {
            "categorical" => {
                let values = lookup("PARTITION_VALUES")
                    .unwrap_or_else(|| "Some-college,HS-grad,Bachelors".to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>();
                if values.is_empty() {
                    anyhow::bail!("PARTITION_VALUES must name at least one value");
                }
                Ok(PartitionSettings::Categorical {
                    column: lookup("PARTITION_COLUMN").unwrap_or_else(|| "education".to_string()),
                    values,
                    members: parse_or(lookup, "PARTITION_MEMBERS", SliceSide::Reference)?,
                })
            }
            "random" => {
                let production_fraction = parse_or(lookup, "PARTITION_PRODUCTION_FRACTION", 0.5)?;
                if !(production_fraction > 0.0 && production_fraction < 1.0) {
                    anyhow::bail!(
                        "PARTITION_PRODUCTION_FRACTION must be in (0, 1), got {}",
                        production_fraction
                    );
                }
                let seed = match lookup("PARTITION_SEED") {
                    Some(raw) => Some(raw.trim().parse::<u64>().map_err(|e| {
                        anyhow::anyhow!("Invalid PARTITION_SEED='{}': {}", raw, e)
                    })?),
                    None => None,
                };
                Ok(PartitionSettings::Random {
                    production_fraction,
                    seed,
                })
            }
            _ => anyhow::bail!(
                "Invalid PARTITION_STRATEGY: {}. Must be 'categorical' or 'random'",
                strategy
            ),
        }
    }

    pub fn build(&self) -> Arc<dyn PartitionStrategy> {
        match self {
            PartitionSettings::Categorical {
                column,
                values,
                members,
            } => Arc::new(CategoricalSplit::new(
                column.clone(),
                values.iter().cloned(),
                *members,
            )),
            PartitionSettings::Random {
                production_fraction,
                seed,
            } => Arc::new(RandomSplit::new(*production_fraction, *seed)),
        }
    }
}

/// `auto` (or unset) leaves method selection to the column profile
fn parse_method(lookup: Lookup<'_>, key: &str, kind: ColumnKind) -> Result<Option<DriftMethod>> {
    let method = match lookup(key) {
        None => return Ok(None),
        Some(raw) if raw.trim().eq_ignore_ascii_case("auto") => return Ok(None),
        Some(raw) => DriftMethod::from_str(raw.trim())
            .map_err(|e| anyhow::anyhow!("Invalid {}: {}", key, e))?,
    };

    if !method.supports(kind) {
        anyhow::bail!(
            "Invalid {}: {} cannot be applied to {} columns",
            key,
            method,
            kind
        );
    }
    Ok(Some(method))
}

/// Drift monitor environment configuration
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorEnvConfig {
    pub interval_secs: u64,
    pub threshold: f64,
    pub drift_share: f64,
    pub num_method: Option<DriftMethod>,
    pub cat_method: Option<DriftMethod>,
    pub partition: PartitionSettings,
}

impl MonitorEnvConfig {
    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        let defaults = DriftOptions::default();

        let interval_secs = parse_or(lookup, "DRIFT_INTERVAL_SECS", 30u64)?;
        let threshold = parse_or(lookup, "DRIFT_THRESHOLD", defaults.threshold)?;
        if !(threshold > 0.0 && threshold <= 1.0) {
            anyhow::bail!("DRIFT_THRESHOLD must be in (0, 1], got {}", threshold);
        }
        let drift_share = parse_or(lookup, "DRIFT_SHARE", defaults.drift_share)?;
        if !(0.0..=1.0).contains(&drift_share) {
            anyhow::bail!("DRIFT_SHARE must be in [0, 1], got {}", drift_share);
        }

        Ok(Self {
            interval_secs,
            threshold,
            drift_share,
            num_method: parse_method(lookup, "NUM_DRIFT_METHOD", ColumnKind::Numerical)?,
            cat_method: parse_method(lookup, "CAT_DRIFT_METHOD", ColumnKind::Categorical)?,
            partition: PartitionSettings::from_lookup(lookup)?,
        })
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn drift_options(&self) -> DriftOptions {
        DriftOptions {
            threshold: self.threshold,
            drift_share: self.drift_share,
            num_method: self.num_method,
            cat_method: self.cat_method,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_monitor_config_defaults() {
        let config = MonitorEnvConfig::from_lookup(&|_| None).unwrap();
        assert_eq!(config.interval(), Duration::from_secs(30));
        assert_eq!(config.drift_options(), DriftOptions::default());
        assert_eq!(
            config.partition,
            PartitionSettings::Categorical {
                column: "education".to_string(),
                values: vec![
                    "Some-college".to_string(),
                    "HS-grad".to_string(),
                    "Bachelors".to_string()
                ],
                members: SliceSide::Reference,
            }
        );
        assert!(config.partition.build().describe().contains("education"));
    }

    #[test]
    fn test_method_overrides() {
        let lookup = lookup_from(&[("NUM_DRIFT_METHOD", "psi"), ("CAT_DRIFT_METHOD", "AUTO")]);
        let config = MonitorEnvConfig::from_lookup(&lookup).unwrap();
        assert_eq!(config.num_method, Some(DriftMethod::Psi));
        assert_eq!(config.cat_method, None);

        let lookup = lookup_from(&[("NUM_DRIFT_METHOD", "anova")]);
        assert!(MonitorEnvConfig::from_lookup(&lookup).is_err());
    }

    #[test]
    fn test_incompatible_method_rejected() {
        let cases = [
            ("NUM_DRIFT_METHOD", "chisquare"),
            ("NUM_DRIFT_METHOD", "ztest"),
            ("CAT_DRIFT_METHOD", "ks"),
            ("CAT_DRIFT_METHOD", "wasserstein"),
        ];
        for (key, value) in cases {
            let lookup = lookup_from(&[(key, value)]);
            let err = MonitorEnvConfig::from_lookup(&lookup).unwrap_err();
            assert!(err.to_string().contains(key), "{}={}: {}", key, value, err);
        }

        let lookup = lookup_from(&[
            ("NUM_DRIFT_METHOD", "jensenshannon"),
            ("CAT_DRIFT_METHOD", "psi"),
        ]);
        let config = MonitorEnvConfig::from_lookup(&lookup).unwrap();
        assert_eq!(config.num_method, Some(DriftMethod::JensenShannon));
        assert_eq!(config.cat_method, Some(DriftMethod::Psi));
    }

    #[test]
    fn test_threshold_bounds() {
        for bad in ["0", "1.5", "-0.1", "abc"] {
            let lookup = lookup_from(&[("DRIFT_THRESHOLD", bad)]);
            assert!(
                MonitorEnvConfig::from_lookup(&lookup).is_err(),
                "threshold {} accepted",
                bad
            );
        }
        let lookup = lookup_from(&[("DRIFT_THRESHOLD", "1"), ("DRIFT_SHARE", "0")]);
        let config = MonitorEnvConfig::from_lookup(&lookup).unwrap();
        assert_eq!(config.threshold, 1.0);
        assert_eq!(config.drift_share, 0.0);

        let lookup = lookup_from(&[("DRIFT_SHARE", "1.01")]);
        assert!(MonitorEnvConfig::from_lookup(&lookup).is_err());
    }

    #[test]
    fn test_random_partition() {
        let lookup = lookup_from(&[
            ("PARTITION_STRATEGY", "random"),
            ("PARTITION_PRODUCTION_FRACTION", "0.25"),
            ("PARTITION_SEED", "42"),
        ]);
        let config = MonitorEnvConfig::from_lookup(&lookup).unwrap();
        assert_eq!(
            config.partition,
            PartitionSettings::Random {
                production_fraction: 0.25,
                seed: Some(42),
            }
        );
    }

    #[test]
    fn test_invalid_partition_settings() {
        let cases: [&[(&str, &str)]; 4] = [
            &[("PARTITION_STRATEGY", "stratified")],
            &[("PARTITION_STRATEGY", "random"), ("PARTITION_PRODUCTION_FRACTION", "1")],
            &[("PARTITION_MEMBERS", "both")],
            &[("PARTITION_VALUES", " , ")],
        ];
        for pairs in cases {
            let lookup = lookup_from(pairs);
            assert!(MonitorEnvConfig::from_lookup(&lookup).is_err(), "{:?}", pairs);
        }
    }
}
