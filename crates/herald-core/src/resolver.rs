//! Notification disposition resolution
//!
//! The base mode comes from an exact app override if one exists, otherwise
//! from the derived category filters (PRIVATE > BLOCK > ALLOW). Each enabled
//! rule whose condition holds then contributes its action, and the final
//! disposition is whichever contribution ranks highest:
//! PRIVATE > BLOCK > SPEAK.

use herald_storage::{Condition, Disposition, FilterMode, Rule};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use uuid::Uuid;

use crate::category_store::ResolvedFilters;
use crate::classifier::CategoryClassifier;
use crate::foreground::ForegroundTracker;

/// Everything known about one incoming notification
#[derive(Debug, Clone, Default)]
pub struct NotificationContext {
    pub package: String,
    pub title: Option<String>,
    pub text: Option<String>,
    /// Identifiers of connected accessories
    pub connected_devices: BTreeSet<String>,
    pub wifi_ssid: Option<String>,
}

impl NotificationContext {
    #[must_use]
    pub fn new(package: &str) -> Self {
        Self {
            package: package.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    #[must_use]
    pub fn with_device(mut self, device: &str) -> Self {
        self.connected_devices.insert(device.to_string());
        self
    }

    #[must_use]
    pub fn with_wifi(mut self, ssid: &str) -> Self {
        self.wifi_ssid = Some(ssid.to_string());
        self
    }
}

/// Why a disposition was reached
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    /// Exact-package override
    AppOverride(FilterMode),
    /// Derived category filter sets restricted the package
    CategoryFilter(FilterMode),
    /// Package is in a category that is allowed
    CategoryAllowed(String),
    /// Package is in no category
    Unclassified,
    /// A rule's condition held
    Rule {
        id: Uuid,
        name: String,
        action: Disposition,
    },
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AppOverride(mode) => write!(f, "app override: {mode}"),
            Self::CategoryFilter(mode) => write!(f, "category filter: {mode}"),
            Self::CategoryAllowed(id) => write!(f, "category '{id}' allowed"),
            Self::Unclassified => write!(f, "unclassified: ALLOW"),
            Self::Rule { name, action, .. } => write!(f, "rule '{name}': {action}"),
        }
    }
}

/// Outcome of resolving one notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub disposition: Disposition,
    pub reasons: Vec<Reason>,
}

/// A rule with its word list compiled up front
struct CompiledRule {
    rule: Rule,
    words: Option<Regex>,
}

impl CompiledRule {
    fn new(rule: Rule) -> Self {
        let words = match &rule.condition {
            Condition::ContainsWords { words } => word_matcher(words),
            _ => None,
        };
        Self { rule, words }
    }
}

/// Resolves notifications against a snapshot of the persisted configuration
/// and the live foreground tracker
pub struct DispositionResolver {
    filters: ResolvedFilters,
    overrides: BTreeMap<String, FilterMode>,
    classifier: CategoryClassifier,
    rules: Vec<CompiledRule>,
    foreground: Arc<ForegroundTracker>,
}

impl DispositionResolver {
    #[must_use]
    pub fn new(
        filters: ResolvedFilters,
        overrides: BTreeMap<String, FilterMode>,
        classifier: CategoryClassifier,
        rules: Vec<Rule>,
        foreground: Arc<ForegroundTracker>,
    ) -> Self {
        Self {
            filters,
            overrides,
            classifier,
            rules: rules.into_iter().map(CompiledRule::new).collect(),
            foreground,
        }
    }

    /// Disposition only
    #[must_use]
    pub fn disposition(&self, ctx: &NotificationContext) -> Disposition {
        self.resolve(ctx).disposition
    }

    /// Disposition with the reasons that produced it
    #[must_use]
    pub fn resolve(&self, ctx: &NotificationContext) -> Resolution {
        let (base, base_reason) = self.base_mode(&ctx.package);
        let mut disposition = base.disposition();
        let mut reasons = vec![base_reason];

        let foreground = self.foreground.effective_package_default();
        for compiled in self.rules.iter().filter(|c| c.rule.enabled) {
            let rule = &compiled.rule;
            if self.condition_holds(compiled, ctx, foreground.as_deref()) {
                disposition = disposition.max_precedence(rule.action);
                reasons.push(Reason::Rule {
                    id: rule.id,
                    name: rule.name.clone(),
                    action: rule.action,
                });
            }
        }

        log::debug!("'{}' resolved to {disposition}", ctx.package);
        Resolution {
            disposition,
            reasons,
        }
    }

    fn base_mode(&self, package: &str) -> (FilterMode, Reason) {
        if let Some(mode) = self.overrides.get(package) {
            return (*mode, Reason::AppOverride(*mode));
        }

        match self.filters.mode_for(package) {
            FilterMode::Allow => {
                let reason = self
                    .classifier
                    .category_for_package(package)
                    .map_or(Reason::Unclassified, |c| {
                        Reason::CategoryAllowed(c.id.clone())
                    });
                (FilterMode::Allow, reason)
            }
            mode => (mode, Reason::CategoryFilter(mode)),
        }
    }

    fn condition_holds(
        &self,
        compiled: &CompiledRule,
        ctx: &NotificationContext,
        foreground: Option<&str>,
    ) -> bool {
        match &compiled.rule.condition {
            Condition::BluetoothConnected { devices } => {
                if devices.is_empty() {
                    !ctx.connected_devices.is_empty()
                } else {
                    devices.iter().any(|d| ctx.connected_devices.contains(d))
                }
            }
            Condition::WifiConnected { ssids } => ctx
                .wifi_ssid
                .as_ref()
                .is_some_and(|ssid| ssids.contains(ssid)),
            Condition::ForegroundApp { packages } => {
                foreground.is_some_and(|p| packages.contains(p))
            }
            Condition::AppInCategory { category_id } => self
                .classifier
                .category_for_package(&ctx.package)
                .is_some_and(|c| &c.id == category_id),
            Condition::ContainsWords { .. } => compiled.words.as_ref().is_some_and(|re| {
                [ctx.title.as_deref(), ctx.text.as_deref()]
                    .into_iter()
                    .flatten()
                    .any(|text| re.is_match(text))
            }),
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Whole-word pattern for one word. A word boundary is only required on an
/// edge that is itself a word character; "c++" or "#urgent" still match.
fn word_pattern(word: &str) -> String {
    let starts_word = word.chars().next().is_some_and(is_word_char);
    let ends_word = word.chars().next_back().is_some_and(is_word_char);
    format!(
        "{}{}{}",
        if starts_word { r"\b" } else { "" },
        regex::escape(word),
        if ends_word { r"\b" } else { "" },
    )
}

/// Case-insensitive matcher for any of the words; `None` when no word is usable
fn word_matcher(words: &[String]) -> Option<Regex> {
    let alternatives: Vec<String> = words
        .iter()
        .map(|w| w.trim())
        .filter(|w| !w.is_empty())
        .map(word_pattern)
        .collect();
    if alternatives.is_empty() {
        return None;
    }

    let pattern = format!("(?i)(?:{})", alternatives.join("|"));
    match Regex::new(&pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            log::warn!("Word list did not compile, ignoring: {e}");
            None
        }
    }
}
