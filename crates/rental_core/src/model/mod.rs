//! Rental domain model.
//!
//! # Responsibility
//! - Define the branch/car/customer/rental/payment records.
//! - Validate every record on construction and on deserialization.
//!
//! # Invariants
//! - No public constructor returns a record that violates field rules.
//! - Each record has one natural key used as repository identity.
//!
//! # See also
//! - `repo::entities` for identity extractors.

use std::cmp::Ordering;

pub mod branch;
pub mod car;
pub mod customer;
pub mod payment;
pub mod rental;
pub mod validation;

/// Intrinsic default ordering of a record type.
///
/// Kept separate from `Ord` because several entities order by a field that
/// does not agree with their equality (cars order by status only).
pub trait DefaultOrder {
    fn default_cmp(&self, other: &Self) -> Ordering;
}

/// Persisted entity collections, in loading order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Branches,
    Cars,
    Customers,
    Rentals,
    Payments,
}

impl EntityKind {
    /// The four collections warmed by a loading strategy, in result order.
    pub const LOADABLE: [EntityKind; 4] = [
        EntityKind::Branches,
        EntityKind::Cars,
        EntityKind::Customers,
        EntityKind::Rentals,
    ];

    /// Stable collection name used for file names and config keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Branches => "branches",
            Self::Cars => "cars",
            Self::Customers => "customers",
            Self::Rentals => "rentals",
            Self::Payments => "payments",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
