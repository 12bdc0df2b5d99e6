use anyhow::Result;
use herald_storage::kv::RULES_KEY;
use herald_storage::{KeyValueStore, Rule};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use crate::persist::{or_default_logged, read_json, write_json};

/// Persisted, ordered list of user-defined notification rules
pub struct RuleStore<S: KeyValueStore + ?Sized> {
    store: Arc<S>,
    write_lock: Mutex<()>,
}

impl<S: KeyValueStore + ?Sized> RuleStore<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Saved rules in order; empty if none were saved or they are unreadable
    pub fn load_rules(&self) -> Vec<Rule> {
        or_default_logged(
            read_json(self.store.as_ref(), RULES_KEY),
            "rules",
            Vec::new,
        )
    }

    /// Replace all rules
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails
    pub fn save_rules(&self, rules: &[Rule]) -> Result<()> {
        let _guard = self.lock();
        write_json(self.store.as_ref(), RULES_KEY, rules)?;
        log::info!("Saved {} rules", rules.len());
        Ok(())
    }

    /// Append a rule
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails
    pub fn add_rule(&self, rule: Rule) -> Result<Uuid> {
        let _guard = self.lock();
        let mut rules = self.load_rules();
        let id = rule.id;
        log::info!(
            "Added rule '{}' ({} -> {})",
            rule.name,
            rule.condition.kind(),
            rule.action
        );
        rules.push(rule);
        write_json(self.store.as_ref(), RULES_KEY, &rules)?;
        Ok(id)
    }

    /// Delete a rule; `false` if no rule has that id
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails
    pub fn remove_rule(&self, id: Uuid) -> Result<bool> {
        let _guard = self.lock();
        let mut rules = self.load_rules();
        let before = rules.len();
        rules.retain(|r| r.id != id);
        if rules.len() == before {
            log::debug!("No rule {id}, remove ignored");
            return Ok(false);
        }
        write_json(self.store.as_ref(), RULES_KEY, &rules)?;
        Ok(true)
    }

    /// Enable or disable a rule; `false` if no rule has that id
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails
    pub fn set_rule_enabled(&self, id: Uuid, enabled: bool) -> Result<bool> {
        let _guard = self.lock();
        let mut rules = self.load_rules();
        let Some(rule) = rules.iter_mut().find(|r| r.id == id) else {
            log::debug!("No rule {id}, enable ignored");
            return Ok(false);
        };
        rule.enabled = enabled;
        write_json(self.store.as_ref(), RULES_KEY, &rules)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_storage::{Condition, Database, Disposition};

    fn store() -> RuleStore<Database> {
        RuleStore::new(Arc::new(Database::in_memory().unwrap()))
    }

    fn words_rule(name: &str) -> Rule {
        Rule::new(
            name.to_string(),
            Condition::ContainsWords {
                words: vec!["otp".to_string()],
            },
            Disposition::Private,
        )
    }

    #[test]
    fn test_no_rules_by_default() {
        assert!(store().load_rules().is_empty());
    }

    #[test]
    fn test_add_keeps_order() {
        let store = store();
        store.add_rule(words_rule("first")).unwrap();
        store.add_rule(words_rule("second")).unwrap();

        let names: Vec<_> = store.load_rules().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn test_remove_rule() {
        let store = store();
        let id = store.add_rule(words_rule("codes")).unwrap();
        assert!(store.remove_rule(id).unwrap());
        assert!(!store.remove_rule(id).unwrap());
        assert!(store.load_rules().is_empty());
    }

    #[test]
    fn test_toggle_rule() {
        let store = store();
        let id = store.add_rule(words_rule("codes")).unwrap();
        assert!(store.set_rule_enabled(id, false).unwrap());
        assert!(!store.load_rules()[0].enabled);
        assert!(!store.set_rule_enabled(Uuid::new_v4(), true).unwrap());
    }

    #[test]
    fn test_corrupt_rules_read_as_empty() {
        let db = Arc::new(Database::in_memory().unwrap());
        db.put_string(RULES_KEY, "{\"rules\": true}").unwrap();
        let store = RuleStore::new(db);
        assert!(store.load_rules().is_empty());
    }

    #[test]
    fn test_save_rules_replaces_all() {
        let store = store();
        store.add_rule(words_rule("old")).unwrap();
        store.save_rules(&[words_rule("new")]).unwrap();
        let rules = store.load_rules();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].name, "new");
    }
}
