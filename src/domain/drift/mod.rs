//! Column-by-column drift comparison between two dataset views.

pub mod stattests;

use crate::domain::dataset::DatasetView;
use crate::domain::errors::DriftError;
use crate::domain::report::{ColumnDrift, DriftReport};
use crate::domain::schema::ColumnKind;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Reference samples larger than this switch from p-value tests to distances
pub const LARGE_SAMPLE_ROWS: usize = 1000;

/// Numerical columns with at most this many distinct values are tested as categories
pub const LOW_CARDINALITY: usize = 5;

/// Statistical method used to judge a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftMethod {
    Ks,
    Wasserstein,
    ChiSquare,
    ZTest,
    JensenShannon,
    Psi,
}

impl DriftMethod {
    /// p-value methods flag drift below the threshold, distances at or above it
    pub fn is_p_value(&self) -> bool {
        matches!(self, DriftMethod::Ks | DriftMethod::ChiSquare | DriftMethod::ZTest)
    }

    pub fn supports(&self, kind: ColumnKind) -> bool {
        match self {
            DriftMethod::Ks | DriftMethod::Wasserstein => kind == ColumnKind::Numerical,
            DriftMethod::ChiSquare | DriftMethod::ZTest => kind == ColumnKind::Categorical,
            DriftMethod::JensenShannon | DriftMethod::Psi => true,
        }
    }
}

impl fmt::Display for DriftMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DriftMethod::Ks => "ks",
            DriftMethod::Wasserstein => "wasserstein",
            DriftMethod::ChiSquare => "chisquare",
            DriftMethod::ZTest => "ztest",
            DriftMethod::JensenShannon => "jensenshannon",
            DriftMethod::Psi => "psi",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for DriftMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ks" => Ok(DriftMethod::Ks),
            "wasserstein" => Ok(DriftMethod::Wasserstein),
            "chisquare" => Ok(DriftMethod::ChiSquare),
            "ztest" => Ok(DriftMethod::ZTest),
            "jensenshannon" => Ok(DriftMethod::JensenShannon),
            "psi" => Ok(DriftMethod::Psi),
            _ => anyhow::bail!(
                "Invalid drift method: {}. Must be one of ks, wasserstein, chisquare, ztest, jensenshannon, psi",
                s
            ),
        }
    }
}

/// Comparison settings
#[derive(Debug, Clone, PartialEq)]
pub struct DriftOptions {
    /// Per-column p-value or distance threshold
    pub threshold: f64,
    /// Dataset drift is declared when the drifted share exceeds this
    pub drift_share: f64,
    /// Forced method for numerical columns; `None` selects automatically
    pub num_method: Option<DriftMethod>,
    /// Forced method for categorical columns; `None` selects automatically
    pub cat_method: Option<DriftMethod>,
}

impl Default for DriftOptions {
    fn default() -> Self {
        Self {
            threshold: 0.05,
            drift_share: 0.5,
            num_method: None,
            cat_method: None,
        }
    }
}

enum Sample {
    Numeric(Vec<f64>, Vec<f64>),
    Categorical(Vec<String>, Vec<String>),
}

impl Sample {
    fn reference_len(&self) -> usize {
        match self {
            Sample::Numeric(r, _) => r.len(),
            Sample::Categorical(r, _) => r.len(),
        }
    }

    fn current_len(&self) -> usize {
        match self {
            Sample::Numeric(_, c) => c.len(),
            Sample::Categorical(_, c) => c.len(),
        }
    }

    fn kind(&self) -> ColumnKind {
        match self {
            Sample::Numeric(..) => ColumnKind::Numerical,
            Sample::Categorical(..) => ColumnKind::Categorical,
        }
    }
}

fn distinct_numbers(reference: &[f64], current: &[f64]) -> usize {
    let mut all: Vec<f64> = reference.iter().chain(current.iter()).copied().collect();
    all.sort_by(f64::total_cmp);
    all.dedup();
    all.len()
}

fn distinct_labels(reference: &[String], current: &[String]) -> usize {
    reference
        .iter()
        .chain(current.iter())
        .collect::<std::collections::BTreeSet<_>>()
        .len()
}

fn load_sample(
    column: &str,
    kind: ColumnKind,
    reference: &DatasetView<'_>,
    production: &DatasetView<'_>,
    options: &DriftOptions,
) -> Result<Sample, DriftError> {
    match kind {
        ColumnKind::Numerical => {
            let r = reference.numeric_values(column)?;
            let c = production.numeric_values(column)?;
            if options.num_method.is_none() && distinct_numbers(&r, &c) <= LOW_CARDINALITY {
                Ok(Sample::Categorical(
                    reference.category_values(column)?,
                    production.category_values(column)?,
                ))
            } else {
                Ok(Sample::Numeric(r, c))
            }
        }
        ColumnKind::Categorical => Ok(Sample::Categorical(
            reference.category_values(column)?,
            production.category_values(column)?,
        )),
    }
}

fn select_method(sample: &Sample, declared: ColumnKind, options: &DriftOptions) -> DriftMethod {
    let forced = match declared {
        ColumnKind::Numerical => options.num_method,
        ColumnKind::Categorical => options.cat_method,
    };
    if let Some(method) = forced {
        return method;
    }

    let large = sample.reference_len() > LARGE_SAMPLE_ROWS;
    match sample {
        Sample::Numeric(..) if large => DriftMethod::Wasserstein,
        Sample::Numeric(..) => DriftMethod::Ks,
        Sample::Categorical(..) if large => DriftMethod::JensenShannon,
        Sample::Categorical(r, c) if distinct_labels(r, c) <= 2 => DriftMethod::ZTest,
        Sample::Categorical(..) => DriftMethod::ChiSquare,
    }
}

fn score(column: &str, method: DriftMethod, sample: &Sample) -> Result<f64, DriftError> {
    let stats_err = |reason: String| DriftError::Statistics {
        method: method.to_string(),
        column: column.to_string(),
        reason,
    };

    let value = match (method, sample) {
        (DriftMethod::Ks, Sample::Numeric(r, c)) => stattests::ks_p_value(r, c),
        (DriftMethod::Wasserstein, Sample::Numeric(r, c)) => stattests::wasserstein_normed(r, c),
        (DriftMethod::ChiSquare, Sample::Categorical(r, c)) => {
            stattests::chi_square_p_value(r, c).map_err(stats_err)?
        }
        (DriftMethod::ZTest, Sample::Categorical(r, c)) => {
            stattests::z_test_p_value(r, c).map_err(stats_err)?
        }
        (DriftMethod::JensenShannon | DriftMethod::Psi, sample) => {
            let (p, q) = match sample {
                Sample::Numeric(r, c) => stattests::numerical_frequencies(r, c),
                Sample::Categorical(r, c) => stattests::categorical_frequencies(r, c),
            };
            if method == DriftMethod::Psi {
                stattests::population_stability_index(&p, &q)
            } else {
                stattests::jensen_shannon_distance(&p, &q)
            }
        }
        (method, sample) => {
            return Err(DriftError::IncompatibleMethod {
                method: method.to_string(),
                kind: sample.kind().to_string(),
                column: column.to_string(),
            });
        }
    };

    if value.is_nan() {
        return Err(stats_err("result is NaN".to_string()));
    }
    Ok(value)
}

/// Compare the production view against the reference view, column by column.
///
/// Columns without any non-missing value in one of the slices are not
/// evaluated; they still count in the drifted share's denominator.
pub fn compare(
    reference: &DatasetView<'_>,
    production: &DatasetView<'_>,
    options: &DriftOptions,
) -> Result<DriftReport, DriftError> {
    let total_rows = reference.len() + production.len();
    if reference.is_empty() {
        return Err(DriftError::EmptySlice {
            slice: "reference",
            total_rows,
        });
    }
    if production.is_empty() {
        return Err(DriftError::EmptySlice {
            slice: "production",
            total_rows,
        });
    }

    let mut columns = Vec::new();
    for (column, kind) in reference.schema().columns() {
        let sample = load_sample(column, kind, reference, production, options)?;
        if sample.reference_len() == 0 || sample.current_len() == 0 {
            warn!(column = %column, "Skipping column with no values in one slice");
            continue;
        }

        let method = select_method(&sample, kind, options);
        let value = score(column, method, &sample)?;
        let drifted = if method.is_p_value() {
            value < options.threshold
        } else {
            value >= options.threshold
        };

        debug!(
            column = %column,
            method = %method,
            score = value,
            drifted,
            "Column compared"
        );

        columns.push(ColumnDrift {
            column: column.to_string(),
            kind,
            method,
            score: value,
            threshold: options.threshold,
            drifted,
        });
    }

    Ok(DriftReport::from_columns(
        columns,
        reference.schema().len(),
        options.drift_share,
        reference.len(),
        production.len(),
    ))
}
