//! Typed JSON reads and writes over a [`KeyValueStore`].
//!
//! Reads return `Ok(None)` for a missing key and [`StoreError::Corrupt`] for
//! a value that no longer decodes, so every caller decides explicitly which
//! default it falls back to.

use anyhow::Context;
use herald_storage::KeyValueStore;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Storage(#[from] anyhow::Error),
    #[error("value under '{key}' is corrupt: {source}")]
    Corrupt {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Read and decode a JSON value
///
/// # Errors
///
/// Returns [`StoreError::Storage`] if the read fails and
/// [`StoreError::Corrupt`] if the stored value does not decode
pub fn read_json<T, S>(store: &S, key: &'static str) -> Result<Option<T>, StoreError>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let Some(raw) = store.get_string(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StoreError::Corrupt { key, source })
}

/// Encode and write a JSON value as one key
///
/// # Errors
///
/// Returns an error if encoding or the write fails
pub fn write_json<T, S>(store: &S, key: &'static str, value: &T) -> anyhow::Result<()>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let json =
        serde_json::to_string(value).with_context(|| format!("Failed to encode '{key}'"))?;
    store.put_string(key, &json)
}

/// Resolve a fallible read to a value, logging why a default was used
pub fn or_default_logged<T>(
    result: Result<Option<T>, StoreError>,
    what: &str,
    default: impl FnOnce() -> T,
) -> T {
    match result {
        Ok(Some(value)) => value,
        Ok(None) => default(),
        Err(e) => {
            log::warn!("Saved {what} unreadable, reverting to defaults: {e}");
            default()
        }
    }
}
