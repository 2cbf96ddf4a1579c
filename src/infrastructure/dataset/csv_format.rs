use crate::domain::dataset::{Dataset, Value};
use crate::domain::errors::DatasetError;
use crate::domain::schema::{ColumnKind, ColumnSchema};
use std::io::Read;

/// Column order of the headerless UCI `adult.data` file
pub const ADULT_COLUMNS: [&str; 15] = [
    "age",
    "workclass",
    "fnlwgt",
    "education",
    "education-num",
    "marital-status",
    "occupation",
    "relationship",
    "race",
    "sex",
    "capital-gain",
    "capital-loss",
    "hours-per-week",
    "native-country",
    "class",
];

const MISSING_TOKENS: [&str; 5] = ["", "?", "na", "nan", "null"];

/// How to read column names from a CSV source
#[derive(Debug, Clone, PartialEq)]
pub struct CsvFormat {
    pub has_headers: bool,
    /// Explicit column names; override the header row when present
    pub column_names: Option<Vec<String>>,
}

impl CsvFormat {
    pub fn with_headers() -> Self {
        Self {
            has_headers: true,
            column_names: None,
        }
    }

    /// Headerless file in UCI Adult column order
    pub fn adult() -> Self {
        Self {
            has_headers: false,
            column_names: Some(ADULT_COLUMNS.iter().map(|s| s.to_string()).collect()),
        }
    }
}

fn parse_value(
    field: &str,
    kind: Option<ColumnKind>,
    column: &str,
    row: usize,
) -> Result<Value, DatasetError> {
    if MISSING_TOKENS
        .iter()
        .any(|token| field.eq_ignore_ascii_case(token))
    {
        return Ok(Value::Missing);
    }

    match kind {
        Some(ColumnKind::Numerical) => field
            .parse::<f64>()
            .map(Value::Numeric)
            .map_err(|_| DatasetError::InvalidNumber {
                column: column.to_string(),
                row,
                value: field.to_string(),
            }),
        _ => Ok(Value::Categorical(field.to_string())),
    }
}

/// Parse CSV content into a dataset, typing cells through `schema`.
///
/// Fields are whitespace-trimmed. Columns outside the schema are kept as
/// categorical values. Every schema column must be present.
pub fn parse_csv<R: Read>(
    reader: R,
    format: &CsvFormat,
    schema: &ColumnSchema,
) -> Result<Dataset, DatasetError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(format.has_headers)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns: Vec<String> = match &format.column_names {
        Some(names) => names.clone(),
        None if format.has_headers => rdr.headers()?.iter().map(str::to_string).collect(),
        None => {
            return Err(DatasetError::InvalidSchema {
                reason: "headerless CSV requires explicit column names".to_string(),
            });
        }
    };

    let kinds: Vec<Option<ColumnKind>> = columns.iter().map(|c| schema.kind(c)).collect();

    let mut rows = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(i + 1);

        if record.len() != columns.len() {
            return Err(DatasetError::InvalidSchema {
                reason: format!(
                    "line {} has {} fields, expected {}",
                    line,
                    record.len(),
                    columns.len()
                ),
            });
        }

        let row = record
            .iter()
            .zip(kinds.iter())
            .zip(columns.iter())
            .map(|((field, kind), column)| parse_value(field, *kind, column, line))
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(row);
    }

    let dataset = Dataset::new(columns, rows)?;
    dataset.ensure_columns(schema)?;
    Ok(dataset)
}
