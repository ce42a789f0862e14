//! Payment model.
//!
//! # Invariants
//! - `id` is trimmed and non-empty.
//! - `amount` is finite and non-negative.
//! - The paid rental's car is marked `Rented`.

use crate::model::car::CarStatus;
use crate::model::rental::Rental;
use crate::model::validation::{
    format_date, parse_date, require_non_negative, ValidationError, ValidationResult,
};
use crate::model::DefaultOrder;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;
use uuid::Uuid;

/// How a payment was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    CreditCard,
    DebitCard,
    Cash,
    Online,
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "credit_card" => Ok(Self::CreditCard),
            "debit_card" => Ok(Self::DebitCard),
            "cash" => Ok(Self::Cash),
            "online" => Ok(Self::Online),
            _ => Err(ValidationError::InvalidPaymentMethod(value.to_string())),
        }
    }
}

/// Settlement of one rental.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PaymentRecord", into = "PaymentRecord")]
pub struct Payment {
    id: String,
    rental: Rental,
    amount: f64,
    payment_date: NaiveDate,
    payment_method: PaymentMethod,
}

#[derive(Serialize, Deserialize)]
struct PaymentRecord {
    id: String,
    rental: Rental,
    amount: f64,
    payment_date: String,
    payment_method: PaymentMethod,
}

impl TryFrom<PaymentRecord> for Payment {
    type Error = ValidationError;

    fn try_from(value: PaymentRecord) -> Result<Self, Self::Error> {
        Self::new(
            value.id,
            value.rental,
            value.amount,
            &value.payment_date,
            value.payment_method,
        )
    }
}

impl From<Payment> for PaymentRecord {
    fn from(value: Payment) -> Self {
        Self {
            id: value.id,
            rental: value.rental,
            amount: value.amount,
            payment_date: format_date(value.payment_date),
            payment_method: value.payment_method,
        }
    }
}

impl Payment {
    /// Creates a payment dated `payment_date` (`dd.MM.yyyy`).
    pub fn new(
        id: impl Into<String>,
        rental: Rental,
        amount: f64,
        payment_date: &str,
        payment_method: PaymentMethod,
    ) -> ValidationResult<Self> {
        let payment_date = parse_date("payment date", payment_date)?;
        Self::build(id.into(), rental, amount, payment_date, payment_method)
    }

    /// Creates a payment with a generated id, dated today.
    pub fn create(
        rental: Rental,
        amount: f64,
        payment_method: PaymentMethod,
    ) -> ValidationResult<Self> {
        Self::build(
            Uuid::new_v4().to_string(),
            rental,
            amount,
            Local::now().date_naive(),
            payment_method,
        )
    }

    fn build(
        id: String,
        mut rental: Rental,
        amount: f64,
        payment_date: NaiveDate,
        payment_method: PaymentMethod,
    ) -> ValidationResult<Self> {
        let id = id.trim().to_string();
        if id.is_empty() {
            return Err(ValidationError::EmptyId("payment"));
        }
        require_non_negative("amount", amount)?;
        rental.car_mut().set_status(CarStatus::Rented);

        Ok(Self {
            id,
            rental,
            amount,
            payment_date,
            payment_method,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn rental(&self) -> &Rental {
        &self.rental
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn payment_date(&self) -> NaiveDate {
        self.payment_date
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn by_payment_date(a: &Payment, b: &Payment) -> Ordering {
        a.payment_date.cmp(&b.payment_date)
    }

    pub fn by_amount(a: &Payment, b: &Payment) -> Ordering {
        a.amount.total_cmp(&b.amount)
    }
}

impl DefaultOrder for Payment {
    fn default_cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}
