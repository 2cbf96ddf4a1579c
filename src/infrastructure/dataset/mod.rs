//! Dataset sources: CSV parsing plus file and HTTP loaders.

pub mod csv_format;
pub mod file;
pub mod http;

pub use csv_format::{ADULT_COLUMNS, CsvFormat, parse_csv};
pub use file::CsvFileSource;
pub use http::{ADULT_DATA_URL, HttpCsvSource};
