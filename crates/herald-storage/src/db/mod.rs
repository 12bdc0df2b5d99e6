//! SQLite-backed key-value store.

mod helpers;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use crate::kv::KeyValueStore;
use crate::migrations;

/// Database connection wrapper
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Create a new database connection
    ///
    /// # Errors
    ///
    /// Returns an error if database directory creation, connection opening, or schema initialization fails
    pub fn new(db_path: Option<PathBuf>) -> Result<Self> {
        let path = db_path.unwrap_or_else(Self::default_db_path);

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create database directory")?;
        }

        let conn = Connection::open(&path).context("Failed to open database connection")?;
        migrations::init_schema(&conn)?;

        log::info!("Database initialized at: {}", path.display());

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a private in-memory database, discarded on drop
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or schema initialization fails
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        migrations::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Get default database path
    fn default_db_path() -> PathBuf {
        let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("herald");
        path.push("herald.db");
        path
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("Database connection lock poisoned"))
    }

    fn put_raw(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO kv (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                value = ?2,
                updated_at = ?3",
            params![key, value, Utc::now().to_rfc3339()],
        )
        .with_context(|| format!("Failed to write key '{key}'"))?;
        Ok(())
    }
}

impl KeyValueStore for Database {
    fn get_string(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()
            .with_context(|| format!("Failed to read key '{key}'"))?;
        Ok(value)
    }

    fn put_string(&self, key: &str, value: &str) -> Result<()> {
        self.put_raw(key, value)
    }

    fn get_string_set(&self, key: &str) -> Result<Option<BTreeSet<String>>> {
        let conn = self.conn()?;
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
                helpers::parse_string_set(&row.get::<_, String>(0)?)
            })
            .optional()
            .with_context(|| format!("Failed to read string set '{key}'"))?;
        Ok(value)
    }

    fn put_string_set(&self, key: &str, values: &BTreeSet<String>) -> Result<()> {
        let json = serde_json::to_string(values)?;
        self.put_raw(key, &json)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM kv WHERE key = ?1", [key])
            .with_context(|| format!("Failed to remove key '{key}'"))?;
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT key FROM kv ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }

    fn clear(&self) -> Result<usize> {
        let conn = self.conn()?;
        let removed = conn
            .execute("DELETE FROM kv", [])
            .context("Failed to clear stored keys")?;
        log::info!("Cleared {removed} stored keys");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_string_roundtrip_and_overwrite() {
        let db = Database::in_memory().unwrap();
        assert_eq!(db.get_string("greeting").unwrap(), None);

        db.put_string("greeting", "hello").unwrap();
        db.put_string("greeting", "hi").unwrap();
        assert_eq!(db.get_string("greeting").unwrap().as_deref(), Some("hi"));
    }

    #[test]
    fn test_string_set_roundtrip() {
        let db = Database::in_memory().unwrap();
        let blocked = set(&["com.example.", "com.games."]);
        db.put_string_set("blocked", &blocked).unwrap();
        assert_eq!(db.get_string_set("blocked").unwrap(), Some(blocked));
    }

    #[test]
    fn test_string_set_read_of_scalar_fails() {
        let db = Database::in_memory().unwrap();
        db.put_string("blocked", "not a set").unwrap();
        assert!(db.get_string_set("blocked").is_err());
    }

    #[test]
    fn test_remove_and_keys() {
        let db = Database::in_memory().unwrap();
        db.put_string("b", "2").unwrap();
        db.put_string("a", "1").unwrap();
        assert_eq!(db.keys().unwrap(), vec!["a", "b"]);

        db.remove("a").unwrap();
        db.remove("missing").unwrap();
        assert_eq!(db.keys().unwrap(), vec!["b"]);

        assert_eq!(db.clear().unwrap(), 1);
        assert!(db.keys().unwrap().is_empty());
    }

    #[test]
    fn test_file_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("herald.db");

        {
            let db = Database::new(Some(path.clone())).unwrap();
            db.put_string("categories", "[]").unwrap();
        }

        let db = Database::new(Some(path)).unwrap();
        assert_eq!(db.get_string("categories").unwrap().as_deref(), Some("[]"));
    }
}
