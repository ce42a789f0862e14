//! Human-readable one-line reports for rental records.

use crate::model::car::{Car, CarStatus};
use crate::model::payment::{Payment, PaymentMethod};
use crate::model::rental::Rental;
use crate::model::validation::format_date;

pub fn car_status_label(status: CarStatus) -> &'static str {
    match status {
        CarStatus::Available => "Available",
        CarStatus::Reserved => "Reserved",
        CarStatus::Rented => "Rented",
        CarStatus::Maintenance => "Under maintenance",
    }
}

pub fn payment_method_label(method: PaymentMethod) -> &'static str {
    match method {
        PaymentMethod::Cash => "Cash",
        PaymentMethod::CreditCard => "Credit card",
        PaymentMethod::DebitCard => "Debit card",
        PaymentMethod::Online => "Online payment",
    }
}

/// `Car <model> (<plate>), Year: <year>, Mileage: <km> km, Status: <label>`
pub fn car_report(car: &Car) -> String {
    format!(
        "Car {} ({}), Year: {}, Mileage: {:.0} km, Status: {}",
        car.model(),
        car.license_plate(),
        car.year(),
        car.mileage(),
        car_status_label(car.status())
    )
}

pub fn rental_report(rental: &Rental) -> String {
    let customer = rental.customer();
    let car = rental.car();
    format!(
        "Rental: {} {} rented {} [{}] since {} to {}",
        customer.first_name(),
        customer.last_name(),
        car.model(),
        car.license_plate(),
        format_date(rental.start_date()),
        format_date(rental.end_date())
    )
}

pub fn payment_report(payment: &Payment) -> String {
    format!(
        "Payment: {:.2} UAH, Method: {}, Date: {}",
        payment.amount(),
        payment_method_label(payment.payment_method()),
        format_date(payment.payment_date())
    )
}
