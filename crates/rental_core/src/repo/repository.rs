//! Identity-indexed in-memory repository.
//!
//! # Responsibility
//! - Own an ordered collection of one record type.
//! - Reject records whose identity is already present.
//! - Offer lookup, removal and sorted snapshot views.
//!
//! # Invariants
//! - No two stored records yield the same identity string.
//! - Records are only mutated through repository methods; bulk reads return
//!   clones or shared borrows.
//! - Insertion order is preserved.
//!
//! Uniqueness checks scan the collection linearly. The type has no internal
//! locking; concurrent writers must hold distinct `&mut` borrows.

use crate::model::DefaultOrder;
use log::{debug, info, warn};
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// Extracts the identity string of one record.
pub type IdentityFn<T> = Box<dyn Fn(&T) -> String + Send + Sync>;

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Positional access errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    IndexOutOfRange { index: usize, len: usize },
}

impl Display for RepositoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range for repository of size {len}")
            }
        }
    }
}

impl Error for RepositoryError {}

/// Requested direction for identity sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    /// Recognizes `asc|ascending|desc|descending`, case-insensitive.
    ///
    /// Returns `None` for anything else, including a missing value.
    pub fn parse(value: Option<&str>) -> Option<Self> {
        match value?.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(Self::Ascending),
            "desc" | "descending" => Some(Self::Descending),
            _ => None,
        }
    }
}

/// In-memory collection enforcing identity uniqueness.
pub struct Repository<T> {
    entity: &'static str,
    items: Vec<T>,
    identity: IdentityFn<T>,
}

impl<T> Repository<T> {
    /// Creates an empty repository for `entity` records.
    pub fn new<F>(entity: &'static str, identity: F) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        debug!("event=repo_create module=repo status=ok entity={entity}");
        Self {
            entity,
            items: Vec::new(),
            identity: Box::new(identity),
        }
    }

    /// Entity label used in diagnostics.
    pub fn entity(&self) -> &'static str {
        self.entity
    }

    pub fn identity_of(&self, item: &T) -> String {
        (self.identity)(item)
    }

    /// Appends `item` unless its identity is already present.
    ///
    /// Returns `true` when the repository grew by one.
    pub fn add(&mut self, item: T) -> bool {
        let identity = self.identity_of(&item);
        if self.contains_identity(&identity) {
            warn!(
                "event=repo_add module=repo status=skip reason=duplicate entity={} identity={}",
                self.entity, identity
            );
            return false;
        }

        self.items.push(item);
        debug!(
            "event=repo_add module=repo status=ok entity={} identity={}",
            self.entity, identity
        );
        true
    }

    /// Applies [`Repository::add`] to every item, skipping duplicates.
    ///
    /// Returns `true` when at least one item was added.
    pub fn add_all<I>(&mut self, items: I) -> bool
    where
        I: IntoIterator<Item = T>,
    {
        let mut added = 0usize;
        let mut skipped = 0usize;
        for item in items {
            if self.add(item) {
                added += 1;
            } else {
                skipped += 1;
            }
        }

        info!(
            "event=repo_add_all module=repo status=ok entity={} added={} skipped={}",
            self.entity, added, skipped
        );
        added > 0
    }

    /// Zero-based positional access.
    pub fn get(&self, index: usize) -> RepositoryResult<&T> {
        self.items
            .get(index)
            .ok_or(RepositoryError::IndexOutOfRange {
                index,
                len: self.items.len(),
            })
    }

    /// Removes the first record with identity `identity`.
    pub fn remove_by_identity(&mut self, identity: &str) -> bool {
        let position = self
            .items
            .iter()
            .position(|item| (self.identity)(item) == identity);

        match position {
            Some(index) => {
                self.items.remove(index);
                info!(
                    "event=repo_remove module=repo status=ok entity={} identity={}",
                    self.entity, identity
                );
                true
            }
            None => {
                warn!(
                    "event=repo_remove module=repo status=skip reason=not_found entity={} identity={}",
                    self.entity, identity
                );
                false
            }
        }
    }

    pub fn contains_identity(&self, identity: &str) -> bool {
        self.items
            .iter()
            .any(|item| (self.identity)(item) == identity)
    }

    pub fn find_by_identity(&self, identity: &str) -> Option<&T> {
        self.items
            .iter()
            .find(|item| (self.identity)(item) == identity)
    }

    /// Lazily yields records matching `predicate`.
    ///
    /// The iterator borrows the repository, so it cannot observe a mutation.
    pub fn find_by_predicate<'a, P>(&'a self, predicate: P) -> impl Iterator<Item = &'a T> + 'a
    where
        P: Fn(&T) -> bool + 'a,
    {
        self.items.iter().filter(move |item| predicate(item))
    }

    /// Read-only view over stored records in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        let removed = self.items.len();
        self.items.clear();
        info!(
            "event=repo_clear module=repo status=ok entity={} removed={}",
            self.entity, removed
        );
    }
}

impl<T: PartialEq> Repository<T> {
    /// Removes the first record equal to `item`.
    pub fn remove(&mut self, item: &T) -> bool {
        match self.items.iter().position(|stored| stored == item) {
            Some(index) => {
                let removed = self.items.remove(index);
                info!(
                    "event=repo_remove module=repo status=ok entity={} identity={}",
                    self.entity,
                    self.identity_of(&removed)
                );
                true
            }
            None => {
                warn!(
                    "event=repo_remove module=repo status=skip reason=not_found entity={} identity={}",
                    self.entity,
                    self.identity_of(item)
                );
                false
            }
        }
    }

    pub fn contains(&self, item: &T) -> bool {
        self.items.contains(item)
    }
}

impl<T: Clone> Repository<T> {
    /// Copy of all records in insertion order.
    pub fn get_all(&self) -> Vec<T> {
        self.items.clone()
    }

    /// Sorted copy using a caller-supplied comparator.
    ///
    /// `None` yields an unsorted copy.
    pub fn sort_by_comparator<F>(&self, comparator: Option<F>) -> Vec<T>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        if self.warn_if_empty() {
            return Vec::new();
        }

        let mut sorted = self.items.clone();
        match comparator {
            Some(comparator) => {
                sorted.sort_by(comparator);
                debug!(
                    "event=repo_sort module=repo status=ok entity={} by=comparator",
                    self.entity
                );
            }
            None => {
                warn!(
                    "event=repo_sort module=repo status=skip reason=no_comparator entity={}",
                    self.entity
                );
            }
        }
        sorted
    }

    /// Sorted copy by identity string.
    ///
    /// Unrecognized or missing `order` falls back to ascending with a warning.
    pub fn sort_by_identity(&self, order: Option<&str>) -> Vec<T> {
        if self.warn_if_empty() {
            return Vec::new();
        }

        let direction = SortOrder::parse(order).unwrap_or_else(|| {
            warn!(
                "event=repo_sort module=repo status=warn reason=invalid_order entity={} order={:?} fallback=ascending",
                self.entity, order
            );
            SortOrder::Ascending
        });

        let mut keyed: Vec<(String, T)> = self
            .items
            .iter()
            .map(|item| ((self.identity)(item), item.clone()))
            .collect();
        keyed.sort_by(|(a, _), (b, _)| match direction {
            SortOrder::Ascending => a.cmp(b),
            SortOrder::Descending => b.cmp(a),
        });

        debug!(
            "event=repo_sort module=repo status=ok entity={} by=identity order={:?}",
            self.entity, direction
        );
        keyed.into_iter().map(|(_, item)| item).collect()
    }

    fn warn_if_empty(&self) -> bool {
        if self.items.is_empty() {
            warn!(
                "event=repo_sort module=repo status=skip reason=empty entity={}",
                self.entity
            );
            return true;
        }
        false
    }
}

impl<T: Clone + DefaultOrder> Repository<T> {
    /// Sorted copy using the record type's default ordering.
    pub fn sort_by_default(&self) -> Vec<T> {
        self.sort_by_comparator(Some(T::default_cmp))
    }
}

impl<T: Debug> Debug for Repository<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("entity", &self.entity)
            .field("items", &self.items)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::{Repository, SortOrder};

    fn words() -> Repository<String> {
        Repository::new("word", |value: &String| value.to_lowercase())
    }

    #[test]
    fn sort_order_parse_is_case_insensitive() {
        assert_eq!(SortOrder::parse(Some(" ASC ")), Some(SortOrder::Ascending));
        assert_eq!(
            SortOrder::parse(Some("Descending")),
            Some(SortOrder::Descending)
        );
        assert_eq!(SortOrder::parse(Some("upward")), None);
        assert_eq!(SortOrder::parse(None), None);
    }

    #[test]
    fn identity_uniqueness_uses_extractor_not_equality() {
        let mut repo = words();
        assert!(repo.add("Alpha".to_string()));
        assert!(!repo.add("ALPHA".to_string()));
        assert_eq!(repo.len(), 1);
        assert_eq!(repo.get(0).unwrap(), "Alpha");
    }

    #[test]
    fn find_by_predicate_is_lazy_and_restartable() {
        let mut repo = words();
        repo.add_all(["a", "bb", "ccc"].map(String::from));

        let long: Vec<&String> = repo.find_by_predicate(|w| w.len() > 1).collect();
        assert_eq!(long.len(), 2);
        assert_eq!(repo.find_by_predicate(|w| w.len() > 1).count(), 2);
    }
}
