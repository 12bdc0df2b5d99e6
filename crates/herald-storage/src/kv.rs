//! Key-value persistence seam.
//!
//! The rule engine only ever talks to storage through this trait, so any
//! durable string-keyed store can back it. [`crate::Database`] is the SQLite
//! implementation.

use anyhow::Result;
use std::collections::BTreeSet;

/// Serialized category collection (one JSON blob)
pub const CATEGORIES_KEY: &str = "categories";
/// Derived block set read by the announcement pipeline
pub const BLOCKED_PACKAGES_KEY: &str = "blocked_packages";
/// Derived private-flag set read by the announcement pipeline
pub const PRIVATE_PACKAGES_KEY: &str = "private_packages";
/// Marker describing how the derived sets are to be read
pub const FILTER_MODE_KEY: &str = "filter_mode";
/// Exact-package filter overrides (JSON map)
pub const APP_OVERRIDES_KEY: &str = "app_overrides";
/// User-defined notification rules (JSON array)
pub const RULES_KEY: &str = "notification_rules";

/// Durable mapping from string keys to string and string-set values.
///
/// A value written by `put_*` must be visible to the next `get_*` once the
/// call returns. Each single-key write replaces the whole value.
pub trait KeyValueStore: Send + Sync {
    /// Read a string value
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store cannot be read
    fn get_string(&self, key: &str) -> Result<Option<String>>;

    /// Write a string value, replacing any previous value
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store cannot be written
    fn put_string(&self, key: &str, value: &str) -> Result<()>;

    /// Read a string-set value
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or the value is not a set
    fn get_string_set(&self, key: &str) -> Result<Option<BTreeSet<String>>>;

    /// Write a string-set value, replacing any previous value
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store cannot be written
    fn put_string_set(&self, key: &str, values: &BTreeSet<String>) -> Result<()>;

    /// Remove a key. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store cannot be written
    fn remove(&self, key: &str) -> Result<()>;

    /// All stored keys, sorted
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store cannot be read
    fn keys(&self) -> Result<Vec<String>>;

    /// Delete every stored key, returning how many were removed
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store cannot be written
    fn clear(&self) -> Result<usize>;
}
