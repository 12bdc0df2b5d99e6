pub mod category_store;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod foreground;
pub mod persist;
pub mod resolver;
pub mod rule_store;

pub use category_store::{CategoryStore, ResolvedFilters};
pub use classifier::CategoryClassifier;
pub use config::HeraldConfig;
pub use engine::Engine;
pub use foreground::{Clock, ForegroundSnapshot, ForegroundTracker, SystemClock};
pub use persist::StoreError;
pub use resolver::{DispositionResolver, NotificationContext, Reason, Resolution};
pub use rule_store::RuleStore;
