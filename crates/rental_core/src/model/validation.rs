//! Field-level validation rules shared by all rental entities.
//!
//! # Responsibility
//! - Hold the length, pattern and range rules every constructor enforces.
//! - Define the single validation error type surfaced by model constructors.
//!
//! # Invariants
//! - String lengths are measured on the trimmed value, in characters.
//! - Dates use the `dd.MM.yyyy` wire format everywhere.

use crate::model::car::CarStatus;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Wire and display format for all calendar dates.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{2}\.[0-9]{2}\.[0-9]{4}$").expect("valid date regex"));
static STANDARD_PLATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[АВЕКМНОРСТІХDIPYCE]{2}[0-9]{4}[АВЕКМНОРСТІХDIPYCE]{2}$")
        .expect("valid standard plate regex")
});
static INDIVIDUAL_PLATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[а-яА-Яa-zA-Z0-9]{3,8}$").expect("valid individual plate regex")
});
static DRIVER_LICENSE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[А-Я]{3}[0-9]{6}$").expect("valid driver license regex"));

/// Validation failure raised by entity constructors and deserialization.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    FieldLength {
        field: &'static str,
        min: usize,
        max: usize,
        actual: usize,
    },
    InvalidLicensePlate(String),
    InvalidDriverLicense(String),
    YearOutOfRange {
        year: i32,
        min: i32,
        max: i32,
    },
    NegativeValue {
        field: &'static str,
        value: f64,
    },
    InvalidDate {
        field: &'static str,
        value: String,
    },
    InvalidRentalWindow {
        start: NaiveDate,
        end: NaiveDate,
    },
    InvalidCarStatus(String),
    InvalidPaymentMethod(String),
    CarNotAvailable {
        license_plate: String,
        status: CarStatus,
    },
    EmptyId(&'static str),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FieldLength {
                field,
                min,
                max,
                actual,
            } => write!(
                f,
                "{field} must be between {min} and {max} characters, got {actual}"
            ),
            Self::InvalidLicensePlate(value) => write!(f, "invalid license plate `{value}`"),
            Self::InvalidDriverLicense(value) => write!(
                f,
                "invalid driver license `{value}`; expected three Cyrillic capitals and six digits"
            ),
            Self::YearOutOfRange { year, min, max } => {
                write!(f, "year {year} is outside allowed range {min}..={max}")
            }
            Self::NegativeValue { field, value } => {
                write!(f, "{field} must be a non-negative number, got {value}")
            }
            Self::InvalidDate { field, value } => write!(
                f,
                "invalid {field} `{value}`; expected format dd.MM.yyyy"
            ),
            Self::InvalidRentalWindow { start, end } => write!(
                f,
                "end date ({}) cannot be before start date ({})",
                end.format(DATE_FORMAT),
                start.format(DATE_FORMAT)
            ),
            Self::InvalidCarStatus(value) => write!(
                f,
                "invalid car status `{value}`; expected available|rented|maintenance|reserved"
            ),
            Self::InvalidPaymentMethod(value) => write!(
                f,
                "invalid payment method `{value}`; expected credit_card|debit_card|cash|online"
            ),
            Self::CarNotAvailable {
                license_plate,
                status,
            } => write!(
                f,
                "car {license_plate} is not available for rental (status {status:?})"
            ),
            Self::EmptyId(entity) => write!(f, "{entity} id cannot be empty"),
        }
    }
}

impl Error for ValidationError {}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Checks trimmed character length against an inclusive range.
pub(crate) fn require_length(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> ValidationResult<()> {
    let actual = value.trim().chars().count();
    if actual < min || actual > max {
        return Err(ValidationError::FieldLength {
            field,
            min,
            max,
            actual,
        });
    }
    Ok(())
}

pub(crate) fn require_non_negative(field: &'static str, value: f64) -> ValidationResult<()> {
    // NaN fails both comparisons, so check finiteness explicitly.
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::NegativeValue { field, value });
    }
    Ok(())
}

/// Accepts either the standard regional plate or an individual plate.
///
/// Individual plates are 3..=8 letters or digits and may not contain the
/// Latin capitals `Z` or `V`.
pub fn is_valid_license_plate(value: &str) -> bool {
    if STANDARD_PLATE_RE.is_match(value) {
        return true;
    }
    INDIVIDUAL_PLATE_RE.is_match(value) && !value.contains(['Z', 'V'])
}

pub fn is_valid_driver_license(value: &str) -> bool {
    DRIVER_LICENSE_RE.is_match(value)
}

/// Parses a `dd.MM.yyyy` date, rejecting other shapes and impossible dates.
pub fn parse_date(field: &'static str, value: &str) -> ValidationResult<NaiveDate> {
    let trimmed = value.trim();
    if !DATE_RE.is_match(trimmed) {
        return Err(ValidationError::InvalidDate {
            field,
            value: value.to_string(),
        });
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| ValidationError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::{is_valid_driver_license, is_valid_license_plate, parse_date, require_length};

    #[test]
    fn license_plate_accepts_standard_and_individual_forms() {
        assert!(is_valid_license_plate("АА1234ВВ"));
        assert!(is_valid_license_plate("XX9999XX"));
        assert!(is_valid_license_plate("abc"));
        assert!(!is_valid_license_plate("AB"));
        assert!(!is_valid_license_plate("ZZ1234ZZ"));
        assert!(!is_valid_license_plate("AB-1234"));
    }

    #[test]
    fn driver_license_requires_cyrillic_prefix() {
        assert!(is_valid_driver_license("АБВ123456"));
        assert!(!is_valid_driver_license("ABC123456"));
        assert!(!is_valid_driver_license("АБВ12345"));
    }

    #[test]
    fn parse_date_rejects_wrong_shape_and_impossible_days() {
        assert!(parse_date("start date", "01.02.2024").is_ok());
        assert!(parse_date("start date", "2024-02-01").is_err());
        assert!(parse_date("start date", "31.02.2024").is_err());
    }

    #[test]
    fn length_is_measured_on_trimmed_value() {
        assert!(require_length("name", "  a  ", 1, 1).is_ok());
        assert!(require_length("name", "   ", 1, 5).is_err());
    }
}
