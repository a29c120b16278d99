//! Note and preference persistence
//!
//! Two independent JSON records live in a key-value store:
//!
//! - `memory_lane_notes` - array of notes, newest first
//! - `memory_lane_user_preferences` - the preferences object
//!
//! There is no versioning. A missing record means first run; a record
//! that fails to decode is backed up under `<key>.corrupt.backup` and
//! reported as [`StorageError::CorruptRecord`] so callers can fall back to
//! empty/default state.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::error::{StorageError, StorageResult};
use super::kv::KeyValueStore;
use crate::models::{Note, UserPreferences};

/// Storage key for the note list
pub const NOTES_KEY: &str = "memory_lane_notes";
/// Storage key for user preferences
pub const PREFERENCES_KEY: &str = "memory_lane_user_preferences";

/// Load/save contract used by the application
pub trait Persistence: Send + Sync {
    /// Load all notes; an empty list if nothing was ever saved
    fn load_notes(&self) -> StorageResult<Vec<Note>>;

    /// Replace the stored note list with `notes`
    fn save_notes(&self, notes: &[Note]) -> StorageResult<()>;

    /// Load preferences; `None` on first run
    fn load_preferences(&self) -> StorageResult<Option<UserPreferences>>;

    /// Replace the stored preferences
    fn save_preferences(&self, preferences: &UserPreferences) -> StorageResult<()>;
}

/// JSON records over any [`KeyValueStore`]
pub struct KeyValuePersistence<S> {
    store: S,
}

impl<S: KeyValueStore> KeyValuePersistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Get the underlying key-value store
    pub fn store(&self) -> &S {
        &self.store
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(None);
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                let backup_key = format!("{}.corrupt.backup", key);
                if let Err(backup_err) = self.store.set(&backup_key, &raw) {
                    warn!("Could not back up corrupt record '{}': {}", key, backup_err);
                }
                Err(StorageError::CorruptRecord {
                    key: key.to_string(),
                    backup_key,
                    details: e.to_string(),
                })
            }
        }
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StorageResult<()> {
        let json = serde_json::to_string(value).map_err(|source| StorageError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.store.set(key, &json)
    }
}

impl<S: KeyValueStore> Persistence for KeyValuePersistence<S> {
    fn load_notes(&self) -> StorageResult<Vec<Note>> {
        let notes: Vec<Note> = self.read(NOTES_KEY)?.unwrap_or_default();
        debug!("Loaded {} note(s)", notes.len());
        Ok(notes)
    }

    fn save_notes(&self, notes: &[Note]) -> StorageResult<()> {
        self.write(NOTES_KEY, notes)?;
        debug!("Saved {} note(s)", notes.len());
        Ok(())
    }

    fn load_preferences(&self) -> StorageResult<Option<UserPreferences>> {
        self.read(PREFERENCES_KEY)
    }

    fn save_preferences(&self, preferences: &UserPreferences) -> StorageResult<()> {
        self.write(PREFERENCES_KEY, preferences)
    }
}
