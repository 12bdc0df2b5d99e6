use herald_storage::{Category, FilterMode, KeyValueStore};

use crate::category_store::CategoryStore;

/// Classifier for mapping packages onto categories by prefix pattern.
/// The first category in stored order with a matching pattern wins.
#[derive(Debug, Clone, Default)]
pub struct CategoryClassifier {
    categories: Vec<Category>,
}

impl CategoryClassifier {
    #[must_use]
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    /// Create a classifier from the persisted categories (or the defaults)
    #[must_use]
    pub fn from_store<S: KeyValueStore + ?Sized>(store: &CategoryStore<S>) -> Self {
        let categories = store.load_categories();
        log::info!("Loaded {} categories", categories.len());
        Self { categories }
    }

    /// Reload categories after they were changed elsewhere
    pub fn reload<S: KeyValueStore + ?Sized>(&mut self, store: &CategoryStore<S>) {
        self.categories = store.load_categories();
        log::info!("Reloaded {} categories", self.categories.len());
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Find the category a package belongs to
    #[must_use]
    pub fn category_for_package(&self, package: &str) -> Option<&Category> {
        let category = self.categories.iter().find(|c| c.matches(package));
        match category {
            Some(c) => log::debug!("Classified '{package}' as '{}'", c.id),
            None => log::debug!("'{package}' not matched by any category"),
        }
        category
    }

    /// Filter mode for a package; unclassified packages are never restricted
    #[must_use]
    pub fn filter_mode_for_package(&self, package: &str) -> FilterMode {
        self.category_for_package(package)
            .map_or(FilterMode::Allow, |c| c.filter_mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_storage::Database;
    use std::sync::Arc;

    fn social_private() -> Category {
        Category::new(
            "social",
            "Social",
            ["com.whatsapp", "com.facebook"],
            FilterMode::Private,
        )
    }

    #[test]
    fn test_prefix_match_includes_sub_packages() {
        let classifier = CategoryClassifier::new(vec![social_private()]);
        assert_eq!(
            classifier.filter_mode_for_package("com.whatsapp.w4b"),
            FilterMode::Private
        );
        assert_eq!(
            classifier.filter_mode_for_package("com.facebook"),
            FilterMode::Private
        );
    }

    #[test]
    fn test_unmatched_package_is_allowed() {
        let classifier = CategoryClassifier::new(vec![social_private()]);
        assert!(classifier.category_for_package("com.spotify").is_none());
        assert_eq!(
            classifier.filter_mode_for_package("com.spotify"),
            FilterMode::Allow
        );
    }

    #[test]
    fn test_empty_classifier_allows_everything() {
        let classifier = CategoryClassifier::default();
        for package in ["", "com.android.systemui", "org.example.app"] {
            assert_eq!(classifier.filter_mode_for_package(package), FilterMode::Allow);
        }
    }

    #[test]
    fn test_first_match_in_stored_order_wins() {
        let first = Category::new("meta", "Meta", ["com.facebook."], FilterMode::Block);
        let second = Category::new("chat", "Chat", ["com.facebook.orca"], FilterMode::Private);

        let classifier = CategoryClassifier::new(vec![first.clone(), second.clone()]);
        assert_eq!(
            classifier.category_for_package("com.facebook.orca").map(|c| c.id.as_str()),
            Some("meta")
        );

        let classifier = CategoryClassifier::new(vec![second, first]);
        assert_eq!(
            classifier.category_for_package("com.facebook.orca").map(|c| c.id.as_str()),
            Some("chat")
        );
    }

    #[test]
    fn test_reload_picks_up_saved_changes() {
        let store = CategoryStore::new(Arc::new(Database::in_memory().unwrap()));
        let mut classifier = CategoryClassifier::from_store(&store);
        assert_eq!(
            classifier.filter_mode_for_package("com.whatsapp"),
            FilterMode::Allow
        );

        store.save_categories(&[social_private()]).unwrap();
        classifier.reload(&store);
        assert_eq!(classifier.categories().len(), 1);
        assert_eq!(
            classifier.filter_mode_for_package("com.whatsapp"),
            FilterMode::Private
        );
    }
}
