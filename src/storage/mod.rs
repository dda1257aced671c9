//! Key-value persistence for the two record collections.
//!
//! Each collection is stored whole, as one JSON array under a fixed key.

mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StorageError;

pub const TASKS_KEY: &str = "tasks";
pub const GOALS_KEY: &str = "goals";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Key under which an unreadable blob is kept before it gets overwritten.
pub fn backup_key(key: &str) -> String {
    format!("{key}.bak")
}

struct Loaded<T> {
    records: Vec<T>,
    skipped: usize,
}

// Records are decoded one at a time; a bad record is logged and skipped.
// Only a blob that is not a JSON array at all is an error.
fn decode<T: DeserializeOwned>(key: &str, json: &str) -> Result<Loaded<T>, StorageError> {
    let values: Vec<serde_json::Value> =
        serde_json::from_str(json).map_err(|source| StorageError::Serialize {
            key: key.to_string(),
            source,
        })?;
    let mut records = Vec::with_capacity(values.len());
    let mut skipped = 0;
    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value(value) {
            Ok(record) => records.push(record),
            Err(e) => {
                log::warn!("Skipping stored {} record #{}: {}", key, index, e);
                skipped += 1;
            }
        }
    }
    Ok(Loaded { records, skipped })
}

/// Read a stored collection. A missing key is an empty collection.
///
/// Whenever the stored blob cannot be reproduced from what was decoded
/// (corrupt JSON, skipped records) it is copied to [`backup_key`] first.
/// An error means the blob could be neither read nor backed up, and the
/// caller must not overwrite `key`.
pub fn load<T: DeserializeOwned>(
    store: &mut dyn KeyValueStore,
    key: &str,
) -> Result<Vec<T>, StorageError> {
    let Some(json) = store.get(key)? else {
        return Ok(Vec::new());
    };
    let (records, lossy) = match decode(key, &json) {
        Ok(loaded) => (loaded.records, loaded.skipped > 0),
        Err(e) => {
            log::error!("Failed to load {}: {}", key, e);
            (Vec::new(), true)
        }
    };
    if lossy {
        let backup = backup_key(key);
        store.set(&backup, &json)?;
        log::warn!("Kept a copy of the stored {} under `{}`", key, backup);
    }
    Ok(records)
}

pub fn save<T: Serialize>(
    store: &mut dyn KeyValueStore,
    key: &str,
    records: &[T],
) -> Result<(), StorageError> {
    let json = serde_json::to_string_pretty(records).map_err(|source| StorageError::Serialize {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &json)
}
