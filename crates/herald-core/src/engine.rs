use anyhow::Result;
use herald_storage::{Database, KeyValueStore};
use std::sync::Arc;

use crate::category_store::CategoryStore;
use crate::classifier::CategoryClassifier;
use crate::config::{get_data_dir, HeraldConfig};
use crate::foreground::{ForegroundTracker, SystemClock};
use crate::resolver::DispositionResolver;
use crate::rule_store::RuleStore;

/// Process-wide state, constructed once and handed to consumers
pub struct Engine {
    store: Arc<dyn KeyValueStore>,
    foreground: Arc<ForegroundTracker>,
    categories: CategoryStore<dyn KeyValueStore>,
    rules: RuleStore<dyn KeyValueStore>,
}

impl Engine {
    /// Build an engine over any key-value store
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, foreground: Arc<ForegroundTracker>) -> Self {
        Self {
            categories: CategoryStore::new(Arc::clone(&store)),
            rules: RuleStore::new(Arc::clone(&store)),
            store,
            foreground,
        }
    }

    /// Build an engine from configuration, opening the SQLite database
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory is unknown or the database cannot be opened
    pub fn from_config(config: &HeraldConfig) -> Result<Self> {
        let db_path = match &config.database_path {
            Some(path) => path.clone(),
            None => get_data_dir()?.join("herald.db"),
        };
        let db = Database::new(Some(db_path))?;
        let foreground =
            ForegroundTracker::with_clock(Arc::new(SystemClock), config.fallback_window());
        Ok(Self::new(Arc::new(db), Arc::new(foreground)))
    }

    #[must_use]
    pub fn foreground(&self) -> &Arc<ForegroundTracker> {
        &self.foreground
    }

    #[must_use]
    pub fn categories(&self) -> &CategoryStore<dyn KeyValueStore> {
        &self.categories
    }

    #[must_use]
    pub fn rules(&self) -> &RuleStore<dyn KeyValueStore> {
        &self.rules
    }

    /// Wipe all persisted state: categories, derived sets, overrides and rules.
    /// The next load starts again from the built-in catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be cleared
    pub fn reset_all(&self) -> Result<usize> {
        let removed = self.store.clear()?;
        log::info!("Reset all stored state ({removed} keys)");
        Ok(removed)
    }

    /// Resolver over the current persisted configuration.
    /// Build a new one after categories, overrides or rules change.
    #[must_use]
    pub fn resolver(&self) -> DispositionResolver {
        DispositionResolver::new(
            self.categories.resolved_filters(),
            self.categories.app_overrides(),
            CategoryClassifier::from_store(&self.categories),
            self.rules.load_rules(),
            Arc::clone(&self.foreground),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::NotificationContext;
    use herald_storage::{Condition, Disposition, FilterMode, Rule};

    fn engine() -> Engine {
        Engine::new(
            Arc::new(Database::in_memory().unwrap()),
            Arc::new(ForegroundTracker::new()),
        )
    }

    #[test]
    fn test_fresh_engine_speaks_everything() {
        let engine = engine();
        let resolver = engine.resolver();
        assert_eq!(
            resolver.disposition(&NotificationContext::new("com.whatsapp")),
            Disposition::Speak
        );
    }

    #[test]
    fn test_category_change_reaches_new_resolver() {
        let engine = engine();
        engine
            .categories()
            .update_category_filter("messaging", FilterMode::Private)
            .unwrap();

        let resolver = engine.resolver();
        assert_eq!(
            resolver.disposition(&NotificationContext::new("com.whatsapp.w4b")),
            Disposition::Private
        );
    }

    #[test]
    fn test_override_and_rule_combine() {
        let engine = engine();
        engine
            .categories()
            .set_app_override("com.spotify", Some(FilterMode::Block))
            .unwrap();
        engine
            .rules()
            .add_rule(Rule::new(
                "driving".to_string(),
                Condition::BluetoothConnected {
                    devices: ["car".to_string()].into(),
                },
                Disposition::Private,
            ))
            .unwrap();

        let resolver = engine.resolver();
        let plain = NotificationContext::new("com.spotify");
        let driving = NotificationContext::new("com.spotify").with_device("car");
        assert_eq!(resolver.disposition(&plain), Disposition::Block);
        assert_eq!(resolver.disposition(&driving), Disposition::Private);
    }

    #[test]
    fn test_reset_all_restores_first_run_state() {
        let engine = engine();
        engine
            .categories()
            .update_category_filter("messaging", FilterMode::Block)
            .unwrap();
        engine
            .rules()
            .add_rule(Rule::new(
                "otp".to_string(),
                Condition::ContainsWords {
                    words: vec!["otp".to_string()],
                },
                Disposition::Private,
            ))
            .unwrap();

        assert!(engine.reset_all().unwrap() > 0);
        assert!(engine.rules().load_rules().is_empty());
        assert_eq!(
            engine.categories().load_categories(),
            herald_storage::default_categories()
        );
        assert_eq!(
            engine
                .resolver()
                .disposition(&NotificationContext::new("com.whatsapp")),
            Disposition::Speak
        );
    }

    #[test]
    fn test_from_config_uses_database_path() {
        let dir = tempfile::tempdir().unwrap();
        let config = HeraldConfig {
            fallback_window_ms: 1000,
            database_path: Some(dir.path().join("herald.db")),
        };

        let engine = Engine::from_config(&config).unwrap();
        engine
            .categories()
            .update_category_filter("games", FilterMode::Block)
            .unwrap();
        assert_eq!(
            engine.foreground().fallback_window(),
            std::time::Duration::from_secs(1)
        );

        let reopened = Engine::from_config(&config).unwrap();
        let games = reopened
            .categories()
            .load_categories()
            .into_iter()
            .find(|c| c.id == "games")
            .unwrap();
        assert_eq!(games.filter_mode, FilterMode::Block);
    }
}
