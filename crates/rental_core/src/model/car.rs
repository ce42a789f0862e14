//! Car model and availability status.
//!
//! # Responsibility
//! - Define the fleet record and its lifecycle status.
//! - Provide the default ordering used by `Repository::sort_by_default`.
//!
//! # Invariants
//! - A constructed `Car` always satisfies plate/model/year/mileage rules.
//! - Default ordering is by status priority only:
//!   `Available < Reserved < Rented < Maintenance`.

use crate::model::validation::{
    is_valid_license_plate, require_length, require_non_negative, ValidationError,
    ValidationResult,
};
use crate::model::DefaultOrder;
use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const MODEL_MIN_CHARS: usize = 5;
const MODEL_MAX_CHARS: usize = 100;
const MAX_CAR_AGE_YEARS: i32 = 40;

/// Fleet lifecycle state of one car.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CarStatus {
    Available,
    Rented,
    Maintenance,
    Reserved,
}

impl CarStatus {
    pub fn is_available(self) -> bool {
        matches!(self, Self::Available)
    }

    fn priority(self) -> u8 {
        match self {
            Self::Available => 1,
            Self::Reserved => 2,
            Self::Rented => 3,
            Self::Maintenance => 4,
        }
    }
}

impl FromStr for CarStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "available" => Ok(Self::Available),
            "rented" => Ok(Self::Rented),
            "maintenance" => Ok(Self::Maintenance),
            "reserved" => Ok(Self::Reserved),
            _ => Err(ValidationError::InvalidCarStatus(value.to_string())),
        }
    }
}

/// One rentable vehicle, identified by its license plate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CarRecord")]
pub struct Car {
    license_plate: String,
    model: String,
    year: i32,
    mileage: f64,
    status: CarStatus,
}

#[derive(Deserialize)]
struct CarRecord {
    license_plate: String,
    model: String,
    year: i32,
    mileage: f64,
    #[serde(default = "default_status")]
    status: CarStatus,
}

fn default_status() -> CarStatus {
    CarStatus::Available
}

impl TryFrom<CarRecord> for Car {
    type Error = ValidationError;

    fn try_from(value: CarRecord) -> Result<Self, Self::Error> {
        Self::with_status(
            value.license_plate,
            value.model,
            value.year,
            value.mileage,
            value.status,
        )
    }
}

impl Car {
    /// Creates an available car.
    pub fn new(
        license_plate: impl Into<String>,
        model: impl Into<String>,
        year: i32,
        mileage: f64,
    ) -> ValidationResult<Self> {
        Self::with_status(license_plate, model, year, mileage, CarStatus::Available)
    }

    /// Creates a car with an explicit status.
    ///
    /// # Errors
    /// - `InvalidLicensePlate` when the plate matches neither plate format.
    /// - `FieldLength` when the model is shorter than 5 or longer than 100.
    /// - `YearOutOfRange` when the year is in the future or older than 40 years.
    /// - `NegativeValue` when mileage is negative or not finite.
    pub fn with_status(
        license_plate: impl Into<String>,
        model: impl Into<String>,
        year: i32,
        mileage: f64,
        status: CarStatus,
    ) -> ValidationResult<Self> {
        let license_plate = license_plate.into();
        let model = model.into();

        if !is_valid_license_plate(&license_plate) {
            return Err(ValidationError::InvalidLicensePlate(license_plate));
        }
        require_length("car model", &model, MODEL_MIN_CHARS, MODEL_MAX_CHARS)?;
        validate_year(year)?;
        require_non_negative("mileage", mileage)?;

        Ok(Self {
            license_plate,
            model,
            year,
            mileage,
            status,
        })
    }

    pub fn license_plate(&self) -> &str {
        &self.license_plate
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn mileage(&self) -> f64 {
        self.mileage
    }

    pub fn status(&self) -> CarStatus {
        self.status
    }

    pub fn set_status(&mut self, status: CarStatus) {
        self.status = status;
    }

    pub fn by_year(a: &Car, b: &Car) -> Ordering {
        a.year.cmp(&b.year)
    }

    pub fn by_mileage(a: &Car, b: &Car) -> Ordering {
        a.mileage.total_cmp(&b.mileage)
    }
}

impl DefaultOrder for Car {
    fn default_cmp(&self, other: &Self) -> Ordering {
        self.status.priority().cmp(&other.status.priority())
    }
}

impl Display for Car {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Car[licensePlate={}, model={}, year={}, mileage={:.1}]",
            self.license_plate, self.model, self.year, self.mileage
        )
    }
}

fn validate_year(year: i32) -> ValidationResult<()> {
    let max = Local::now().year();
    let min = max - MAX_CAR_AGE_YEARS;
    if year < min || year > max {
        return Err(ValidationError::YearOutOfRange { year, min, max });
    }
    Ok(())
}
