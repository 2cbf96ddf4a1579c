//! Reference/production partitioning strategies.
//!
//! A strategy is consulted once per monitoring cycle. `CategoricalSplit` is
//! deterministic and yields the same slices every cycle; `RandomSplit` draws a
//! fresh production window each cycle.

use crate::domain::dataset::Dataset;
use crate::domain::errors::DriftError;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::BTreeSet;

/// Row indices of the two slices compared in a cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub reference: Vec<usize>,
    pub production: Vec<usize>,
}

impl Partition {
    pub fn total(&self) -> usize {
        self.reference.len() + self.production.len()
    }
}

/// Slice that receives the rows matching a categorical predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceSide {
    Reference,
    Production,
}

impl std::str::FromStr for SliceSide {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reference" => Ok(SliceSide::Reference),
            "production" => Ok(SliceSide::Production),
            _ => anyhow::bail!(
                "Invalid PARTITION_MEMBERS: {}. Must be 'reference' or 'production'",
                s
            ),
        }
    }
}

pub trait PartitionStrategy: Send + Sync {
    /// Split the dataset for the given cycle number
    fn split(&self, dataset: &Dataset, cycle: u64) -> Result<Partition, DriftError>;

    /// Check the strategy can be applied to `dataset` at all
    fn validate(&self, _dataset: &Dataset) -> Result<(), DriftError> {
        Ok(())
    }

    fn describe(&self) -> String;
}

/// Split on membership of a column's value in a fixed set
#[derive(Debug, Clone)]
pub struct CategoricalSplit {
    pub column: String,
    pub values: BTreeSet<String>,
    pub members: SliceSide,
}

impl CategoricalSplit {
    pub fn new(
        column: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<String>>,
        members: SliceSide,
    ) -> Self {
        Self {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
            members,
        }
    }

    /// Adult census split: common education levels form the reference slice
    pub fn adult_education() -> Self {
        Self::new(
            "education",
            ["Some-college", "HS-grad", "Bachelors"],
            SliceSide::Reference,
        )
    }
}

impl PartitionStrategy for CategoricalSplit {
    fn split(&self, dataset: &Dataset, _cycle: u64) -> Result<Partition, DriftError> {
        let pos = dataset
            .column_index(&self.column)
            .ok_or_else(|| DriftError::UnknownColumn {
                column: self.column.clone(),
            })?;

        let mut members = Vec::new();
        let mut others = Vec::new();
        for row in 0..dataset.row_count() {
            // Missing values never match the predicate
            let is_member = dataset
                .value(row, pos)
                .category_key()
                .is_some_and(|v| self.values.contains(&v));
            if is_member {
                members.push(row);
            } else {
                others.push(row);
            }
        }

        Ok(match self.members {
            SliceSide::Reference => Partition {
                reference: members,
                production: others,
            },
            SliceSide::Production => Partition {
                reference: others,
                production: members,
            },
        })
    }

    fn validate(&self, dataset: &Dataset) -> Result<(), DriftError> {
        if dataset.column_index(&self.column).is_none() {
            return Err(DriftError::UnknownColumn {
                column: self.column.clone(),
            });
        }
        if self.values.is_empty() {
            return Err(DriftError::InvalidPartition {
                reason: format!("no values given for column '{}'", self.column),
            });
        }
        Ok(())
    }

    fn describe(&self) -> String {
        let values: Vec<&str> = self.values.iter().map(String::as_str).collect();
        format!(
            "categorical split on '{}' in [{}] -> {:?}",
            self.column,
            values.join(", "),
            self.members
        )
    }
}

/// Random production window redrawn every cycle
#[derive(Debug, Clone)]
pub struct RandomSplit {
    pub production_fraction: f64,
    pub seed: Option<u64>,
}

impl RandomSplit {
    pub fn new(production_fraction: f64, seed: Option<u64>) -> Self {
        Self {
            production_fraction,
            seed,
        }
    }
}

impl PartitionStrategy for RandomSplit {
    fn split(&self, dataset: &Dataset, cycle: u64) -> Result<Partition, DriftError> {
        // Both slices need at least one row
        self.validate(dataset)?;

        let total = dataset.row_count();
        let mut indices: Vec<usize> = (0..total).collect();

        let base = self.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(base.wrapping_add(cycle));
        indices.shuffle(&mut rng);

        let production_len = ((total as f64) * self.production_fraction).round() as usize;
        let production_len = production_len.clamp(1, total.saturating_sub(1));
        let mut reference = indices.split_off(production_len);
        let mut production = indices;

        // Keep dataset order inside each slice
        reference.sort_unstable();
        production.sort_unstable();

        Ok(Partition {
            reference,
            production,
        })
    }

    fn validate(&self, dataset: &Dataset) -> Result<(), DriftError> {
        if !(self.production_fraction > 0.0 && self.production_fraction < 1.0) {
            return Err(DriftError::InvalidPartition {
                reason: format!(
                    "production fraction {} must be in (0, 1)",
                    self.production_fraction
                ),
            });
        }
        if dataset.row_count() < 2 {
            return Err(DriftError::InvalidPartition {
                reason: "random split needs at least 2 rows".to_string(),
            });
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!(
            "random split, production fraction {:.2}, seed {:?}",
            self.production_fraction, self.seed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dataset::Value;

    fn education_dataset() -> Dataset {
        let education = ["HS-grad", "Masters", "Bachelors", "Doctorate", "?", "Some-college"];
        let rows = education
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let value = if *e == "?" {
                    Value::Missing
                } else {
                    Value::Categorical(e.to_string())
                };
                vec![Value::Numeric(i as f64), value]
            })
            .collect();
        Dataset::new(vec!["age".to_string(), "education".to_string()], rows)
            .expect("valid dataset")
    }

    fn assert_covers(partition: &Partition, total: usize) {
        let mut all: Vec<usize> = partition
            .reference
            .iter()
            .chain(partition.production.iter())
            .copied()
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..total).collect::<Vec<_>>());
    }

    #[test]
    fn test_categorical_split_members_to_reference() {
        let dataset = education_dataset();
        let split = CategoricalSplit::adult_education();
        let partition = split.split(&dataset, 0).unwrap();

        assert_eq!(partition.reference, vec![0, 2, 5]);
        assert_eq!(partition.production, vec![1, 3, 4]);
        assert_covers(&partition, dataset.row_count());
    }

    #[test]
    fn test_categorical_split_is_stable_across_cycles() {
        let dataset = education_dataset();
        let split = CategoricalSplit::new("education", ["Masters"], SliceSide::Production);

        let first = split.split(&dataset, 0).unwrap();
        let second = split.split(&dataset, 1).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.production, vec![1]);
    }

    #[test]
    fn test_categorical_split_validation() {
        let dataset = education_dataset();
        let unknown = CategoricalSplit::new("degree", ["Masters"], SliceSide::Reference);
        assert!(matches!(
            unknown.validate(&dataset),
            Err(DriftError::UnknownColumn { .. })
        ));

        let empty = CategoricalSplit::new("education", Vec::<String>::new(), SliceSide::Reference);
        assert!(empty.validate(&dataset).is_err());
    }

    #[test]
    fn test_random_split_is_disjoint_and_complete() {
        let dataset = education_dataset();
        let split = RandomSplit::new(0.5, Some(7));

        for cycle in 0..5 {
            let partition = split.split(&dataset, cycle).unwrap();
            assert_eq!(partition.production.len(), 3);
            assert_eq!(partition.total(), dataset.row_count());
            assert_covers(&partition, dataset.row_count());
        }
    }

    #[test]
    fn test_random_split_reproducible_with_seed() {
        let dataset = education_dataset();
        let split = RandomSplit::new(0.5, Some(42));
        assert_eq!(
            split.split(&dataset, 3).unwrap(),
            split.split(&dataset, 3).unwrap()
        );
    }

    #[test]
    fn test_random_split_never_empties_a_slice() {
        let dataset = education_dataset();
        let split = RandomSplit::new(0.01, Some(1));
        let partition = split.split(&dataset, 0).unwrap();
        assert_eq!(partition.production.len(), 1);
        assert_eq!(partition.reference.len(), 5);

        assert!(RandomSplit::new(1.0, None).validate(&dataset).is_err());
    }

    #[test]
    fn test_random_split_rejects_single_row() {
        let dataset = Dataset::new(vec!["age".to_string()], vec![vec![Value::Numeric(30.0)]])
            .expect("valid dataset");
        let split = RandomSplit::new(0.5, Some(3));
        assert!(matches!(
            split.split(&dataset, 0),
            Err(DriftError::InvalidPartition { .. })
        ));

        let bad_fraction = RandomSplit::new(1.5, Some(3));
        assert!(bad_fraction.split(&education_dataset(), 0).is_err());
    }
}
