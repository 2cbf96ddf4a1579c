use crate::domain::drift::DriftMethod;
use crate::domain::schema::ColumnKind;
use serde::Serialize;

/// Drift verdict for a single column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDrift {
    pub column: String,
    pub kind: ColumnKind,
    pub method: DriftMethod,
    /// p-value for statistical tests, distance otherwise
    pub score: f64,
    pub threshold: f64,
    pub drifted: bool,
}

/// Result of one reference/production comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriftReport {
    /// Evaluated columns, sorted by name
    pub columns: Vec<ColumnDrift>,
    pub drifted_count: Option<usize>,
    pub share_drifted: Option<f64>,
    pub dataset_drift: Option<bool>,
    pub drifted_column_example: Option<String>,
    pub reference_rows: usize,
    pub production_rows: usize,
}

impl DriftReport {
    /// Derive the dataset-level indicators from per-column results.
    ///
    /// The share is taken over `total_columns`, skipped columns included.
    /// Count and share are absent when no column could be evaluated. The
    /// example column is the lexicographically first drifted column.
    pub fn from_columns(
        mut columns: Vec<ColumnDrift>,
        total_columns: usize,
        drift_share: f64,
        reference_rows: usize,
        production_rows: usize,
    ) -> Self {
        columns.sort_by(|a, b| a.column.cmp(&b.column));

        let (drifted_count, share_drifted) = if columns.is_empty() {
            (None, None)
        } else {
            let count = columns.iter().filter(|c| c.drifted).count();
            let total = total_columns.max(columns.len());
            (Some(count), Some(count as f64 / total as f64))
        };

        let dataset_drift = share_drifted.map(|share| share > drift_share);

        let drifted_column_example = columns
            .iter()
            .find(|c| c.drifted)
            .map(|c| c.column.clone());

        Self {
            columns,
            drifted_count,
            share_drifted,
            dataset_drift,
            drifted_column_example,
            reference_rows,
            production_rows,
        }
    }

    pub fn gauge_values(&self) -> GaugeValues {
        GaugeValues::from(self)
    }
}

/// Scalar values published to the metrics sink for one report
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaugeValues {
    pub drifted_columns: f64,
    pub share_drifted: f64,
    pub dataset_drift: f64,
    pub drifted_column_example: f64,
}

impl From<&DriftReport> for GaugeValues {
    fn from(report: &DriftReport) -> Self {
        Self {
            drifted_columns: report.drifted_count.unwrap_or(0) as f64,
            share_drifted: report.share_drifted.unwrap_or(0.0),
            dataset_drift: if report.dataset_drift.unwrap_or(false) {
                1.0
            } else {
                0.0
            },
            drifted_column_example: report
                .drifted_column_example
                .as_deref()
                .map(column_fingerprint)
                .unwrap_or(0) as f64,
        }
    }
}

/// Lossy, deterministic fingerprint of a column name in `1..=99`.
///
/// 64-bit FNV-1a over the UTF-8 bytes; 0 is reserved for "no column".
pub fn column_fingerprint(name: &str) -> u8 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

    let hash = name.bytes().fold(FNV_OFFSET, |acc, b| {
        (acc ^ u64::from(b)).wrapping_mul(FNV_PRIME)
    });
    (1 + hash % 99) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, drifted: bool) -> ColumnDrift {
        ColumnDrift {
            column: name.to_string(),
            kind: ColumnKind::Numerical,
            method: DriftMethod::Ks,
            score: if drifted { 0.001 } else { 0.9 },
            threshold: 0.05,
            drifted,
        }
    }

    #[test]
    fn test_share_and_dataset_flag() {
        let report = DriftReport::from_columns(
            vec![column("b", true), column("a", true), column("c", false)],
            3,
            0.5,
            10,
            10,
        );

        assert_eq!(report.drifted_count, Some(2));
        let share = report.share_drifted.unwrap();
        assert!((share - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(report.dataset_drift, Some(true));
        assert_eq!(report.drifted_column_example.as_deref(), Some("a"));
    }

    #[test]
    fn test_exactly_half_is_not_dataset_drift() {
        let report =
            DriftReport::from_columns(vec![column("a", true), column("b", false)], 2, 0.5, 4, 4);
        assert_eq!(report.share_drifted, Some(0.5));
        assert_eq!(report.dataset_drift, Some(false));
    }

    #[test]
    fn test_share_counts_skipped_columns() {
        let report =
            DriftReport::from_columns(vec![column("a", true), column("b", true)], 4, 0.5, 4, 4);
        assert_eq!(report.drifted_count, Some(2));
        assert_eq!(report.share_drifted, Some(0.5));
        assert_eq!(report.dataset_drift, Some(false));
    }

    #[test]
    fn test_no_columns_means_absent_values() {
        let report = DriftReport::from_columns(vec![], 3, 0.5, 4, 4);
        assert_eq!(report.drifted_count, None);
        assert_eq!(report.share_drifted, None);
        assert_eq!(report.dataset_drift, None);

        let gauges = report.gauge_values();
        assert_eq!(gauges.drifted_columns, 0.0);
        assert_eq!(gauges.share_drifted, 0.0);
        assert_eq!(gauges.dataset_drift, 0.0);
        assert_eq!(gauges.drifted_column_example, 0.0);
    }

    #[test]
    fn test_example_tie_break_is_lexicographic() {
        let report = DriftReport::from_columns(
            vec![column("workclass", true), column("age", true), column("race", true)],
            3,
            0.5,
            1,
            1,
        );
        assert_eq!(report.drifted_column_example.as_deref(), Some("age"));
        assert_eq!(
            report.gauge_values().drifted_column_example,
            column_fingerprint("age") as f64
        );
    }

    #[test]
    fn test_fingerprint_range_and_determinism() {
        for name in ["age", "education", "native-country", "", "ü"] {
            let fp = column_fingerprint(name);
            assert!((1..=99).contains(&fp), "{} -> {}", name, fp);
            assert_eq!(fp, column_fingerprint(name));
        }
    }
}
