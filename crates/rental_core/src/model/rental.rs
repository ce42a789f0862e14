//! Rental agreement model.
//!
//! # Invariants
//! - `end_date` is never earlier than `start_date`.
//! - Default ordering is by rental length in days.

use crate::model::car::{Car, CarStatus};
use crate::model::customer::Customer;
use crate::model::validation::{format_date, parse_date, ValidationError, ValidationResult};
use crate::model::DefaultOrder;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One car rented by one customer for a closed date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RentalRecord", into = "RentalRecord")]
pub struct Rental {
    id: u32,
    car: Car,
    customer: Customer,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

#[derive(Serialize, Deserialize)]
struct RentalRecord {
    id: u32,
    car: Car,
    customer: Customer,
    start_date: String,
    end_date: String,
}

impl TryFrom<RentalRecord> for Rental {
    type Error = ValidationError;

    fn try_from(value: RentalRecord) -> Result<Self, Self::Error> {
        Self::new(
            value.id,
            value.car,
            value.customer,
            &value.start_date,
            &value.end_date,
        )
    }
}

impl From<Rental> for RentalRecord {
    fn from(value: Rental) -> Self {
        Self {
            id: value.id,
            car: value.car,
            customer: value.customer,
            start_date: format_date(value.start_date),
            end_date: format_date(value.end_date),
        }
    }
}

impl Rental {
    /// Creates a rental record from `dd.MM.yyyy` dates.
    ///
    /// Does not touch the car status; use [`Rental::book`] for new bookings.
    pub fn new(
        id: u32,
        car: Car,
        customer: Customer,
        start_date: &str,
        end_date: &str,
    ) -> ValidationResult<Self> {
        let start_date = parse_date("start date", start_date)?;
        let end_date = parse_date("end date", end_date)?;
        Self::from_dates(id, car, customer, start_date, end_date)
    }

    pub fn from_dates(
        id: u32,
        car: Car,
        customer: Customer,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> ValidationResult<Self> {
        if end_date < start_date {
            return Err(ValidationError::InvalidRentalWindow {
                start: start_date,
                end: end_date,
            });
        }
        Ok(Self {
            id,
            car,
            customer,
            start_date,
            end_date,
        })
    }

    /// Books an available car, marking the rental's copy as reserved.
    ///
    /// # Errors
    /// - `CarNotAvailable` when the car is not `Available`.
    /// - Any date validation error from [`Rental::new`].
    pub fn book(
        id: u32,
        mut car: Car,
        customer: Customer,
        start_date: &str,
        end_date: &str,
    ) -> ValidationResult<Self> {
        if !car.status().is_available() {
            return Err(ValidationError::CarNotAvailable {
                license_plate: car.license_plate().to_string(),
                status: car.status(),
            });
        }
        car.set_status(CarStatus::Reserved);
        Self::new(id, car, customer, start_date, end_date)
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn car(&self) -> &Car {
        &self.car
    }

    pub fn car_mut(&mut self) -> &mut Car {
        &mut self.car
    }

    pub fn customer(&self) -> &Customer {
        &self.customer
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    /// Rental length in whole days.
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }

    pub fn by_start_date(a: &Rental, b: &Rental) -> Ordering {
        a.start_date.cmp(&b.start_date)
    }

    pub fn by_end_date(a: &Rental, b: &Rental) -> Ordering {
        a.end_date.cmp(&b.end_date)
    }
}

impl DefaultOrder for Rental {
    fn default_cmp(&self, other: &Self) -> Ordering {
        self.duration_days().cmp(&other.duration_days())
    }
}
