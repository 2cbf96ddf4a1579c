//! In-memory tabular dataset and schema-tagged slice views.

use crate::domain::errors::{DatasetError, DriftError};
use crate::domain::schema::ColumnSchema;
use serde::Serialize;
use std::collections::HashMap;

/// A single cell of the dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    Numeric(f64),
    Categorical(String),
    Missing,
}

impl Value {
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Numeric(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Categorical(s) => Some(s),
            _ => None,
        }
    }

    /// Category label for this value; numeric values are rendered with `Display`
    pub fn category_key(&self) -> Option<String> {
        match self {
            Value::Numeric(v) if v.is_finite() => Some(v.to_string()),
            Value::Categorical(s) => Some(s.clone()),
            _ => None,
        }
    }
}

/// Immutable table of rows loaded once at startup
#[derive(Debug, Clone)]
pub struct Dataset {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<Value>>,
}

impl Dataset {
    /// Build a dataset from column names and positional rows.
    ///
    /// Every row must have exactly one value per column and the dataset must
    /// hold at least one row.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self, DatasetError> {
        let mut index = HashMap::with_capacity(columns.len());
        for (i, name) in columns.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(DatasetError::InvalidSchema {
                    reason: format!("duplicate column '{}'", name),
                });
            }
        }

        if rows.is_empty() {
            return Err(DatasetError::Empty);
        }

        if let Some((row, values)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != columns.len())
        {
            return Err(DatasetError::InvalidSchema {
                reason: format!(
                    "row {} has {} values, expected {}",
                    row,
                    values.len(),
                    columns.len()
                ),
            });
        }

        Ok(Self {
            columns,
            index,
            rows,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Cell at `row` for the column at `column` (positional)
    pub fn value(&self, row: usize, column: usize) -> &Value {
        &self.rows[row][column]
    }

    /// Check that every schema column is present
    pub fn ensure_columns(&self, schema: &ColumnSchema) -> Result<(), DatasetError> {
        for column in schema.all_columns() {
            if self.column_index(column).is_none() {
                return Err(DatasetError::MissingColumn {
                    column: column.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Borrowed view over the rows at `indices`, tagged with `schema`
    pub fn view<'a>(&'a self, indices: &'a [usize], schema: &'a ColumnSchema) -> DatasetView<'a> {
        DatasetView {
            dataset: self,
            indices,
            schema,
        }
    }
}

/// One slice of the dataset interpreted through a column schema
#[derive(Debug, Clone, Copy)]
pub struct DatasetView<'a> {
    dataset: &'a Dataset,
    indices: &'a [usize],
    schema: &'a ColumnSchema,
}

impl<'a> DatasetView<'a> {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn schema(&self) -> &'a ColumnSchema {
        self.schema
    }

    fn column_position(&self, column: &str) -> Result<usize, DriftError> {
        self.dataset
            .column_index(column)
            .ok_or_else(|| DriftError::UnknownColumn {
                column: column.to_string(),
            })
    }

    /// Non-missing numeric values of `column`
    pub fn numeric_values(&self, column: &str) -> Result<Vec<f64>, DriftError> {
        let pos = self.column_position(column)?;
        Ok(self
            .indices
            .iter()
            .filter_map(|&row| self.dataset.value(row, pos).as_f64())
            .collect())
    }

    /// Non-missing values of `column` as category labels
    pub fn category_values(&self, column: &str) -> Result<Vec<String>, DriftError> {
        let pos = self.column_position(column)?;
        Ok(self
            .indices
            .iter()
            .filter_map(|&row| self.dataset.value(row, pos).category_key())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::new(
            vec!["age".to_string(), "sex".to_string()],
            vec![
                vec![Value::Numeric(39.0), Value::Categorical("Male".to_string())],
                vec![Value::Missing, Value::Categorical("Female".to_string())],
                vec![Value::Numeric(52.0), Value::Missing],
            ],
        )
        .expect("valid dataset")
    }

    #[test]
    fn test_rejects_ragged_rows() {
        let result = Dataset::new(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![Value::Numeric(1.0)]],
        );
        assert!(matches!(result, Err(DatasetError::InvalidSchema { .. })));
    }

    #[test]
    fn test_rejects_empty_and_duplicate_columns() {
        assert!(matches!(
            Dataset::new(vec!["a".to_string()], vec![]),
            Err(DatasetError::Empty)
        ));
        assert!(matches!(
            Dataset::new(
                vec!["a".to_string(), "a".to_string()],
                vec![vec![Value::Missing, Value::Missing]]
            ),
            Err(DatasetError::InvalidSchema { .. })
        ));
    }

    #[test]
    fn test_view_drops_missing_values() {
        let dataset = sample();
        let schema = ColumnSchema::new(vec!["age".to_string()], vec!["sex".to_string()])
            .expect("valid schema");
        let indices = vec![0, 1, 2];
        let view = dataset.view(&indices, &schema);

        assert_eq!(view.len(), 3);
        assert_eq!(view.numeric_values("age").unwrap(), vec![39.0, 52.0]);
        assert_eq!(view.category_values("sex").unwrap(), vec!["Male", "Female"]);
        assert!(matches!(
            view.numeric_values("income"),
            Err(DriftError::UnknownColumn { .. })
        ));
    }

    #[test]
    fn test_ensure_columns_reports_missing() {
        let dataset = sample();
        let schema = ColumnSchema::new(vec!["age".to_string()], vec!["race".to_string()])
            .expect("valid schema");
        match dataset.ensure_columns(&schema) {
            Err(DatasetError::MissingColumn { column }) => assert_eq!(column, "race"),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
