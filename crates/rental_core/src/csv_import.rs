//! Car import from comma-separated text files.
//!
//! # Responsibility
//! - Parse `plate, model, year, mileage, status` lines into validated cars.
//!
//! # Invariants
//! - Blank lines and lines starting with `#` are ignored.
//! - One bad line never aborts a file import; it is logged and skipped.

use crate::model::car::{Car, CarStatus};
use crate::model::validation::ValidationError;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const FIELD_COUNT: usize = 5;

pub type CsvResult<T> = Result<T, CsvParseError>;

#[derive(Debug)]
pub enum CsvParseError {
    FieldCount { expected: usize, actual: usize, line: String },
    InvalidNumber { field: &'static str, value: String },
    Invalid(ValidationError),
    NotFound(PathBuf),
    Io { path: PathBuf, source: std::io::Error },
}

impl Display for CsvParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FieldCount {
                expected,
                actual,
                line,
            } => write!(
                f,
                "expected {expected} fields `licensePlate, model, year, mileage, status`, got {actual}: {line}"
            ),
            Self::InvalidNumber { field, value } => {
                write!(f, "invalid number for {field}: `{value}`")
            }
            Self::Invalid(err) => write!(f, "{err}"),
            Self::NotFound(path) => write!(f, "file not found at {}", path.display()),
            Self::Io { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
        }
    }
}

impl Error for CsvParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            Self::FieldCount { .. } | Self::InvalidNumber { .. } | Self::NotFound(_) => None,
        }
    }
}

impl From<ValidationError> for CsvParseError {
    fn from(value: ValidationError) -> Self {
        Self::Invalid(value)
    }
}

/// Parses one `plate, model, year, mileage, status` line.
pub fn parse_car_line(line: &str) -> CsvResult<Car> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let [plate, model, year, mileage, status] = fields.as_slice() else {
        return Err(CsvParseError::FieldCount {
            expected: FIELD_COUNT,
            actual: fields.len(),
            line: line.to_string(),
        });
    };

    let year = year
        .parse::<i32>()
        .map_err(|_| CsvParseError::InvalidNumber {
            field: "year",
            value: year.to_string(),
        })?;
    let mileage = mileage
        .parse::<f64>()
        .map_err(|_| CsvParseError::InvalidNumber {
            field: "mileage",
            value: mileage.to_string(),
        })?;
    let status: CarStatus = status.parse()?;

    Ok(Car::with_status(*plate, *model, year, mileage, status)?)
}

/// Reads every valid car from `path`.
///
/// # Errors
/// - `NotFound` when the file does not exist.
/// - `Io` when the file cannot be read as UTF-8 text.
pub fn parse_cars_csv(path: impl AsRef<Path>) -> CsvResult<Vec<Car>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(CsvParseError::NotFound(path.to_path_buf()));
    }
    let contents = std::fs::read_to_string(path).map_err(|source| CsvParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut cars = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match parse_car_line(trimmed) {
            Ok(car) => cars.push(car),
            Err(err) => error!(
                "event=csv_line module=csv_import status=error path={} line={} error={}",
                path.display(),
                index + 1,
                err
            ),
        }
    }

    info!(
        "event=csv_import module=csv_import status=ok path={} count={}",
        path.display(),
        cars.len()
    );
    Ok(cars)
}
