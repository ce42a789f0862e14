//! Rental branch (office location) model.

use crate::model::validation::{require_length, ValidationError, ValidationResult};
use crate::model::DefaultOrder;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

const NAME_MAX_CHARS: usize = 50;
const LOCATION_MAX_CHARS: usize = 50;

/// Branch office where cars are picked up and returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BranchRecord")]
pub struct Branch {
    name: String,
    location: String,
}

#[derive(Deserialize)]
struct BranchRecord {
    name: String,
    location: String,
}

impl TryFrom<BranchRecord> for Branch {
    type Error = ValidationError;

    fn try_from(value: BranchRecord) -> Result<Self, Self::Error> {
        Self::new(value.name, value.location)
    }
}

impl Branch {
    /// Creates a validated branch.
    ///
    /// # Errors
    /// - `FieldLength` when `name` or `location` is empty or longer than 50
    ///   characters after trimming.
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> ValidationResult<Self> {
        let name = name.into();
        let location = location.into();
        require_length("branch name", &name, 1, NAME_MAX_CHARS)?;
        require_length("branch location", &location, 1, LOCATION_MAX_CHARS)?;
        Ok(Self { name, location })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

impl DefaultOrder for Branch {
    fn default_cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.location.cmp(&other.location))
    }
}
