//! Summary of one bulk load.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Immutable per-entity counts and wall-clock duration of one `load` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadResult {
    branches_loaded: usize,
    cars_loaded: usize,
    customers_loaded: usize,
    rentals_loaded: usize,
    duration_ms: u64,
}

impl LoadResult {
    pub fn new(
        branches_loaded: usize,
        cars_loaded: usize,
        customers_loaded: usize,
        rentals_loaded: usize,
        duration: Duration,
    ) -> Self {
        Self {
            branches_loaded,
            cars_loaded,
            customers_loaded,
            rentals_loaded,
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Builds a result from counts in `branches, cars, customers, rentals`
    /// order.
    pub fn from_counts(counts: [usize; 4], duration: Duration) -> Self {
        let [branches, cars, customers, rentals] = counts;
        Self::new(branches, cars, customers, rentals, duration)
    }

    pub fn branches_loaded(&self) -> usize {
        self.branches_loaded
    }

    pub fn cars_loaded(&self) -> usize {
        self.cars_loaded
    }

    pub fn customers_loaded(&self) -> usize {
        self.customers_loaded
    }

    pub fn rentals_loaded(&self) -> usize {
        self.rentals_loaded
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn total_loaded(&self) -> usize {
        self.branches_loaded + self.cars_loaded + self.customers_loaded + self.rentals_loaded
    }
}

impl Display for LoadResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "LoadResult {{ branchesLoaded={}, carsLoaded={}, customersLoaded={}, rentalsLoaded={}, totalLoaded={}, durationMs={} }}",
            self.branches_loaded,
            self.cars_loaded,
            self.customers_loaded,
            self.rentals_loaded,
            self.total_loaded(),
            self.duration_ms
        )
    }
}

impl Serialize for LoadResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("LoadResult", 6)?;
        state.serialize_field("branchesLoaded", &self.branches_loaded)?;
        state.serialize_field("carsLoaded", &self.cars_loaded)?;
        state.serialize_field("customersLoaded", &self.customers_loaded)?;
        state.serialize_field("rentalsLoaded", &self.rentals_loaded)?;
        state.serialize_field("durationMs", &self.duration_ms)?;
        state.serialize_field("totalLoaded", &self.total_loaded())?;
        state.end()
    }
}
