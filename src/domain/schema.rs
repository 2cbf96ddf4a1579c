use crate::domain::errors::DatasetError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// How a column's values are interpreted when computing drift
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numerical,
    Categorical,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Numerical => write!(f, "numerical"),
            ColumnKind::Categorical => write!(f, "categorical"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SchemaFile {
    #[serde(default)]
    numerical: Vec<String>,
    #[serde(default)]
    categorical: Vec<String>,
}

/// Fixed partition of column names into numerical and categorical sets
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSchema {
    numerical: Vec<String>,
    categorical: Vec<String>,
}

impl ColumnSchema {
    /// Create a schema; a column may appear in only one set and at most once
    pub fn new(numerical: Vec<String>, categorical: Vec<String>) -> Result<Self, DatasetError> {
        let mut seen = HashSet::new();
        for column in numerical.iter().chain(categorical.iter()) {
            if !seen.insert(column.as_str()) {
                return Err(DatasetError::InvalidSchema {
                    reason: format!("column '{}' declared more than once", column),
                });
            }
        }

        if seen.is_empty() {
            return Err(DatasetError::InvalidSchema {
                reason: "no columns declared".to_string(),
            });
        }

        Ok(Self {
            numerical,
            categorical,
        })
    }

    /// Schema of the UCI Adult census dataset
    pub fn adult() -> Self {
        let to_vec = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            numerical: to_vec(&[
                "education-num",
                "age",
                "capital-gain",
                "hours-per-week",
                "capital-loss",
                "fnlwgt",
            ]),
            categorical: to_vec(&[
                "education",
                "occupation",
                "native-country",
                "workclass",
                "marital-status",
                "relationship",
                "race",
                "sex",
                "class",
            ]),
        }
    }

    /// Parse a schema from TOML (`numerical = [...]`, `categorical = [...]`)
    pub fn from_toml_str(content: &str) -> Result<Self, DatasetError> {
        let file: SchemaFile =
            toml::from_str(content).map_err(|e| DatasetError::InvalidSchema {
                reason: e.to_string(),
            })?;
        Self::new(file.numerical, file.categorical)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn numerical(&self) -> &[String] {
        &self.numerical
    }

    pub fn categorical(&self) -> &[String] {
        &self.categorical
    }

    pub fn len(&self) -> usize {
        self.numerical.len() + self.categorical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self, column: &str) -> Option<ColumnKind> {
        if self.numerical.iter().any(|c| c == column) {
            Some(ColumnKind::Numerical)
        } else if self.categorical.iter().any(|c| c == column) {
            Some(ColumnKind::Categorical)
        } else {
            None
        }
    }

    /// Columns with their kinds, numerical first
    pub fn columns(&self) -> impl Iterator<Item = (&str, ColumnKind)> {
        self.numerical
            .iter()
            .map(|c| (c.as_str(), ColumnKind::Numerical))
            .chain(
                self.categorical
                    .iter()
                    .map(|c| (c.as_str(), ColumnKind::Categorical)),
            )
    }

    pub fn all_columns(&self) -> impl Iterator<Item = &str> {
        self.columns().map(|(c, _)| c)
    }
}

impl Default for ColumnSchema {
    fn default() -> Self {
        Self::adult()
    }
}
