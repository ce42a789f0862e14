//! Per-entity repository constructors and query helpers.
//!
//! # Responsibility
//! - Bind each entity to its natural-key identity extractor.
//! - Bundle the repositories warmed at startup.
//!
//! # Invariants
//! - Branch identity is the name, car identity the license plate, customer
//!   identity the driver license, rental and payment identity their id.

use crate::model::branch::Branch;
use crate::model::car::Car;
use crate::model::customer::Customer;
use crate::model::payment::Payment;
use crate::model::rental::Rental;
use crate::repo::repository::Repository;
use log::warn;

pub fn branch_repository() -> Repository<Branch> {
    Repository::new("Branch", |branch: &Branch| branch.name().to_string())
}

pub fn car_repository() -> Repository<Car> {
    Repository::new("Car", |car: &Car| car.license_plate().to_string())
}

pub fn customer_repository() -> Repository<Customer> {
    Repository::new("Customer", |customer: &Customer| {
        customer.driver_license().to_string()
    })
}

pub fn rental_repository() -> Repository<Rental> {
    Repository::new("Rental", |rental: &Rental| rental.id().to_string())
}

pub fn payment_repository() -> Repository<Payment> {
    Repository::new("Payment", |payment: &Payment| payment.id().to_string())
}

/// All rental-domain repositories owned by one application instance.
///
/// Fields are public so callers can hand out disjoint `&mut` borrows to
/// concurrent loaders.
#[derive(Debug)]
pub struct EntityRepositories {
    pub branches: Repository<Branch>,
    pub cars: Repository<Car>,
    pub customers: Repository<Customer>,
    pub rentals: Repository<Rental>,
    pub payments: Repository<Payment>,
}

impl EntityRepositories {
    pub fn new() -> Self {
        Self {
            branches: branch_repository(),
            cars: car_repository(),
            customers: customer_repository(),
            rentals: rental_repository(),
            payments: payment_repository(),
        }
    }

    pub fn clear(&mut self) {
        self.branches.clear();
        self.cars.clear();
        self.customers.clear();
        self.rentals.clear();
        self.payments.clear();
    }
}

impl Default for EntityRepositories {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository<Car> {
    pub fn sort_by_year(&self) -> Vec<Car> {
        self.sort_by_comparator(Some(Car::by_year))
    }

    pub fn sort_by_mileage(&self) -> Vec<Car> {
        self.sort_by_comparator(Some(Car::by_mileage))
    }

    pub fn find_available(&self) -> impl Iterator<Item = &Car> + '_ {
        self.find_by_predicate(|car| car.status().is_available())
    }
}

impl Repository<Payment> {
    pub fn sort_by_payment_date(&self) -> Vec<Payment> {
        self.sort_by_comparator(Some(Payment::by_payment_date))
    }

    pub fn sort_by_amount(&self) -> Vec<Payment> {
        self.sort_by_comparator(Some(Payment::by_amount))
    }

    /// Payments for one rental id, compared trimmed and case-insensitively.
    pub fn find_by_rental_id(&self, rental_id: &str) -> Vec<Payment> {
        let wanted = rental_id.trim().to_lowercase();
        if wanted.is_empty() {
            warn!("event=payment_lookup module=repo status=skip reason=empty_rental_id");
            return Vec::new();
        }
        self.find_by_predicate(move |payment| {
            payment.rental().id().to_string().to_lowercase() == wanted
        })
        .cloned()
        .collect()
    }
}
