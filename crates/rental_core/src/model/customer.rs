//! Customer model.

use crate::model::validation::{
    format_date, is_valid_driver_license, parse_date, require_length, ValidationError,
    ValidationResult,
};
use crate::model::DefaultOrder;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

const FIRST_NAME_MAX_CHARS: usize = 15;
const LAST_NAME_MAX_CHARS: usize = 20;

/// Registered renter, identified by driver license number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CustomerRecord", into = "CustomerRecord")]
pub struct Customer {
    first_name: String,
    last_name: String,
    driver_license: String,
    birth_date: NaiveDate,
}

#[derive(Serialize, Deserialize)]
struct CustomerRecord {
    first_name: String,
    last_name: String,
    driver_license: String,
    birth_date: String,
}

impl TryFrom<CustomerRecord> for Customer {
    type Error = ValidationError;

    fn try_from(value: CustomerRecord) -> Result<Self, Self::Error> {
        Self::new(
            value.first_name,
            value.last_name,
            value.driver_license,
            &value.birth_date,
        )
    }
}

impl From<Customer> for CustomerRecord {
    fn from(value: Customer) -> Self {
        Self {
            birth_date: format_date(value.birth_date),
            first_name: value.first_name,
            last_name: value.last_name,
            driver_license: value.driver_license,
        }
    }
}

impl Customer {
    /// Creates a validated customer; `birth_date` uses `dd.MM.yyyy`.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        driver_license: impl Into<String>,
        birth_date: &str,
    ) -> ValidationResult<Self> {
        let first_name = first_name.into();
        let last_name = last_name.into();
        let driver_license = driver_license.into();

        require_length("first name", &first_name, 1, FIRST_NAME_MAX_CHARS)?;
        require_length("last name", &last_name, 1, LAST_NAME_MAX_CHARS)?;
        if !is_valid_driver_license(&driver_license) {
            return Err(ValidationError::InvalidDriverLicense(driver_license));
        }
        let birth_date = parse_date("birth date", birth_date)?;

        Ok(Self {
            first_name,
            last_name,
            driver_license,
            birth_date,
        })
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn driver_license(&self) -> &str {
        &self.driver_license
    }

    pub fn birth_date(&self) -> NaiveDate {
        self.birth_date
    }
}

impl DefaultOrder for Customer {
    fn default_cmp(&self, other: &Self) -> Ordering {
        self.last_name
            .cmp(&other.last_name)
            .then_with(|| self.first_name.cmp(&other.first_name))
    }
}
