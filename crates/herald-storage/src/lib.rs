pub mod db;
pub mod defaults;
pub mod kv;
pub mod migrations;
pub mod models;

pub use db::Database;
pub use defaults::default_categories;
pub use kv::KeyValueStore;
pub use models::{Category, Condition, Disposition, FilterMode, Rule};
