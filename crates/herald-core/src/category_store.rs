//! Category persistence and derived filter settings.
//!
//! Categories are stored as one JSON blob. Every change regenerates the flat
//! block and private sets the announcement pipeline reads. All writes go
//! through one mutex so load-modify-save sequences never interleave.

use anyhow::{bail, Result};
use herald_storage::kv::{
    APP_OVERRIDES_KEY, BLOCKED_PACKAGES_KEY, CATEGORIES_KEY, FILTER_MODE_KEY,
    PRIVATE_PACKAGES_KEY,
};
use herald_storage::{default_categories, Category, FilterMode, KeyValueStore};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::persist::{or_default_logged, read_json, write_json, StoreError};

/// Marker stored next to the derived sets: they list packages to restrict
pub const BLOCKLIST_MARKER: &str = "blocklist";

/// Derived block/private sets consumed by the announcement pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedFilters {
    pub blocked: BTreeSet<String>,
    pub private: BTreeSet<String>,
}

impl ResolvedFilters {
    /// Full recomputation from a category collection.
    /// ALLOW categories contribute nothing.
    #[must_use]
    pub fn from_categories(categories: &[Category]) -> Self {
        let mut filters = Self::default();
        for category in categories {
            let target = match category.filter_mode {
                FilterMode::Allow => continue,
                FilterMode::Block => &mut filters.blocked,
                FilterMode::Private => &mut filters.private,
            };
            target.extend(
                category
                    .package_patterns
                    .iter()
                    .filter(|p| !p.is_empty())
                    .cloned(),
            );
        }
        filters
    }

    /// Mode for a package: PRIVATE > BLOCK > ALLOW.
    ///
    /// A pattern present in both sets resolves to PRIVATE so content never
    /// leaks.
    #[must_use]
    pub fn mode_for(&self, package: &str) -> FilterMode {
        let matches = |set: &BTreeSet<String>| {
            set.iter()
                .any(|pattern| !pattern.is_empty() && package.starts_with(pattern.as_str()))
        };

        if matches(&self.private) {
            FilterMode::Private
        } else if matches(&self.blocked) {
            FilterMode::Block
        } else {
            FilterMode::Allow
        }
    }
}

/// Owns the category collection, app overrides and the derived settings
pub struct CategoryStore<S: KeyValueStore + ?Sized> {
    store: Arc<S>,
    defaults: Vec<Category>,
    write_lock: Mutex<()>,
}

impl<S: KeyValueStore + ?Sized> CategoryStore<S> {
    /// Create a store seeded with the built-in default catalog
    pub fn new(store: Arc<S>) -> Self {
        Self::with_defaults(store, default_categories())
    }

    /// Create a store with a caller-supplied first-run catalog
    pub fn with_defaults(store: Arc<S>, defaults: Vec<Category>) -> Self {
        Self {
            store,
            defaults,
            write_lock: Mutex::new(()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// The persisted categories, if any were saved
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreadable or the saved blob is corrupt
    pub fn read_saved(&self) -> Result<Option<Vec<Category>>, StoreError> {
        read_json(self.store.as_ref(), CATEGORIES_KEY)
    }

    /// Load categories, falling back to the defaults when nothing usable is saved.
    ///
    /// A corrupt blob counts as nothing saved: it is dropped and the derived
    /// sets are rebuilt from the defaults so both views agree.
    pub fn load_categories(&self) -> Vec<Category> {
        let _guard = self.lock();
        self.load_locked()
    }

    /// Caller holds the write lock
    fn load_locked(&self) -> Vec<Category> {
        match self.read_saved() {
            Err(StoreError::Corrupt { key, source }) => {
                log::warn!("Saved {key} are corrupt, resetting to defaults: {source}");
                if let Err(e) = self.discard_corrupt() {
                    log::warn!("Could not rebuild derived sets from defaults: {e}");
                }
                self.defaults.clone()
            }
            result => or_default_logged(result, "categories", || self.defaults.clone()),
        }
    }

    fn discard_corrupt(&self) -> Result<()> {
        self.store.remove(CATEGORIES_KEY)?;
        self.write_filters(&self.defaults)?;
        Ok(())
    }

    /// Persist the whole collection and regenerate the derived settings
    ///
    /// # Errors
    ///
    /// Returns an error if two categories share an id or a write fails
    pub fn save_categories(&self, categories: &[Category]) -> Result<ResolvedFilters> {
        let mut seen = HashSet::new();
        for category in categories {
            if !seen.insert(category.id.as_str()) {
                bail!("Duplicate category id '{}'", category.id);
            }
        }

        let _guard = self.lock();
        write_json(self.store.as_ref(), CATEGORIES_KEY, categories)?;
        log::info!("Saved {} categories", categories.len());
        self.write_filters(categories)
    }

    /// Change one category's filter mode.
    ///
    /// Returns `false` without writing anything if no category has that id.
    ///
    /// # Errors
    ///
    /// Returns an error if a write fails
    pub fn update_category_filter(&self, category_id: &str, mode: FilterMode) -> Result<bool> {
        let _guard = self.lock();
        let mut categories = self.load_locked();

        let Some(category) = categories.iter_mut().find(|c| c.id == category_id) else {
            log::debug!("No category '{category_id}', filter update ignored");
            return Ok(false);
        };
        category.filter_mode = mode;

        write_json(self.store.as_ref(), CATEGORIES_KEY, &categories)?;
        log::info!("Category '{category_id}' set to {mode}");
        self.write_filters(&categories)?;
        Ok(true)
    }

    /// Regenerate the derived block/private sets from the current categories
    ///
    /// # Errors
    ///
    /// Returns an error if a write fails
    pub fn apply_filters(&self) -> Result<ResolvedFilters> {
        let _guard = self.lock();
        let categories = self.load_locked();
        self.write_filters(&categories)
    }

    fn write_filters(&self, categories: &[Category]) -> Result<ResolvedFilters> {
        let filters = ResolvedFilters::from_categories(categories);
        self.store
            .put_string_set(BLOCKED_PACKAGES_KEY, &filters.blocked)?;
        self.store
            .put_string_set(PRIVATE_PACKAGES_KEY, &filters.private)?;
        self.store.put_string(FILTER_MODE_KEY, BLOCKLIST_MARKER)?;
        log::info!(
            "Applied filters: {} blocked, {} private",
            filters.blocked.len(),
            filters.private.len()
        );
        Ok(filters)
    }

    /// Read back the derived settings; anything unreadable counts as empty
    pub fn resolved_filters(&self) -> ResolvedFilters {
        let _guard = self.lock();
        // Sets derived from a corrupt blob are stale until rebuilt.
        self.load_locked();

        let read_set = |key: &str| match self.store.get_string_set(key) {
            Ok(set) => set.unwrap_or_default(),
            Err(e) => {
                log::warn!("Derived set '{key}' unreadable, treating as empty: {e}");
                BTreeSet::new()
            }
        };

        if let Ok(Some(marker)) = self.store.get_string(FILTER_MODE_KEY) {
            if marker != BLOCKLIST_MARKER {
                log::warn!("Unknown filter marker '{marker}', reading sets as {BLOCKLIST_MARKER}");
            }
        }

        ResolvedFilters {
            blocked: read_set(BLOCKED_PACKAGES_KEY),
            private: read_set(PRIVATE_PACKAGES_KEY),
        }
    }

    /// Drop saved categories and derived settings, then re-apply the defaults
    ///
    /// # Errors
    ///
    /// Returns an error if a write fails
    pub fn reset_categories(&self) -> Result<Vec<Category>> {
        let _guard = self.lock();
        self.store.remove(CATEGORIES_KEY)?;
        self.store.remove(APP_OVERRIDES_KEY)?;
        log::info!("Categories reset to defaults");
        self.write_filters(&self.defaults)?;
        Ok(self.defaults.clone())
    }

    /// Exact-package overrides, replacing the category-derived mode
    pub fn app_overrides(&self) -> BTreeMap<String, FilterMode> {
        or_default_logged(
            read_json(self.store.as_ref(), APP_OVERRIDES_KEY),
            "app overrides",
            BTreeMap::new,
        )
    }

    /// Override for exactly this package, if any
    pub fn override_for(&self, package: &str) -> Option<FilterMode> {
        self.app_overrides().get(package).copied()
    }

    /// Set (`Some`) or clear (`None`) an exact-package override
    ///
    /// # Errors
    ///
    /// Returns an error if the package is blank or the write fails
    pub fn set_app_override(&self, package: &str, mode: Option<FilterMode>) -> Result<()> {
        let package = package.trim();
        if package.is_empty() {
            bail!("Package name must not be empty");
        }

        let _guard = self.lock();
        let mut overrides = self.app_overrides();
        match mode {
            Some(mode) => {
                overrides.insert(package.to_string(), mode);
                log::info!("Override for '{package}' set to {mode}");
            }
            None => {
                if overrides.remove(package).is_none() {
                    return Ok(());
                }
                log::info!("Override for '{package}' cleared");
            }
        }
        write_json(self.store.as_ref(), APP_OVERRIDES_KEY, &overrides)
    }
}
