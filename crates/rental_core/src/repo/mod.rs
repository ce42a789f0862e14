//! Repository layer: identity-indexed in-memory collections.
//!
//! # Responsibility
//! - Provide the generic `Repository<T>` and its per-entity bindings.
//! - Keep identity uniqueness out of callers' hands.
//!
//! # Invariants
//! - Every repository write goes through identity checks.
//! - Duplicates are reported as `false`, never as errors.

pub mod entities;
pub mod repository;
