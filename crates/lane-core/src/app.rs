//! Application facade
//!
//! `MemoryLane` owns both stores and the lifecycle service, loads
//! persisted state on startup and wires store changes to the background
//! writer. It is the only type a presentation layer needs.
//!
//! ## Usage
//!
//! ```ignore
//! let config = Config::load()?;
//! let mut lane = MemoryLane::open(&config)?;
//!
//! let note = lane.create_note(NoteDraft::new("buy milk"))?;
//! lane.delete_note(&note.id);
//! lane.undo_delete();
//!
//! lane.flush().await;
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Duration as ChronoDuration, Utc};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::config::{Config, StorageBackend};
use crate::error::NoteResult;
use crate::lifecycle::{LifecycleEvent, NoteLifecycle, PendingUndo, DEFAULT_UNDO_WINDOW};
use crate::location::{resolve_location, LocationProvider, NoLocation};
use crate::models::{
    CaptureMode, Location, Note, NoteDraft, NoteId, NotePatch, Theme, UserPreferences,
};
use crate::storage::{
    FileStore, KeyValuePersistence, Persistence, PersistenceWriter, SqliteStore,
};
use crate::store::{NoteStore, NotesChange, PreferencesStore};

/// Message shown when the note list could not be loaded
pub const LOAD_ERROR_MESSAGE: &str = "Failed to load notes";

/// Runtime collaborators for [`MemoryLane`]
#[derive(Clone)]
pub struct LaneOptions {
    /// How long a deleted note stays restorable
    pub undo_window: Duration,
    /// Where new notes get their location from
    pub location: Arc<dyn LocationProvider>,
}

impl Default for LaneOptions {
    fn default() -> Self {
        Self {
            undo_window: DEFAULT_UNDO_WINDOW,
            location: Arc::new(NoLocation),
        }
    }
}

impl LaneOptions {
    /// Options described by a configuration
    pub fn from_config(config: &Config) -> Self {
        let location: Arc<dyn LocationProvider> = match &config.location {
            Some(fixed) => Arc::new(fixed.clone()),
            None => Arc::new(NoLocation),
        };
        Self {
            undo_window: config.undo_window(),
            location,
        }
    }
}

/// Memory Lane application state
pub struct MemoryLane {
    lifecycle: NoteLifecycle,
    preferences: PreferencesStore,
    location: Arc<dyn LocationProvider>,
    writer: PersistenceWriter,
    first_run: bool,
}

impl MemoryLane {
    /// Open the backend named by the configuration and load its data
    pub fn open(config: &Config) -> Result<Self> {
        let persistence: Arc<dyn Persistence> = match config.backend {
            StorageBackend::Sqlite => {
                let path = config.sqlite_path();
                let store = SqliteStore::open(&path)
                    .with_context(|| format!("Failed to open database {:?}", path))?;
                Arc::new(KeyValuePersistence::new(store))
            }
            StorageBackend::File => {
                Arc::new(KeyValuePersistence::new(FileStore::new(config.records_dir())))
            }
        };
        debug!("Opened {} storage in {:?}", config.backend, config.data_dir);

        Ok(Self::with_persistence(
            persistence,
            LaneOptions::from_config(config),
        ))
    }

    /// Load state from `persistence` and start persisting changes to it
    ///
    /// Load failures are not fatal: unreadable notes leave an empty list
    /// with the error flag set, unreadable preferences fall back to
    /// defaults.
    pub fn with_persistence(persistence: Arc<dyn Persistence>, options: LaneOptions) -> Self {
        let writer = PersistenceWriter::new(Arc::clone(&persistence));

        let mut store = NoteStore::new();
        store.set_loading(true);
        match persistence.load_notes() {
            Ok(notes) => {
                debug!("Loaded {} notes", notes.len());
                store.replace_all(notes);
            }
            Err(e) => {
                error!("Error loading notes: {}", e);
                store.set_error(Some(LOAD_ERROR_MESSAGE.to_string()));
                store.replace_all(Vec::new());
            }
        }
        store.set_loading(false);

        let (preferences, first_run) = match persistence.load_preferences() {
            Ok(Some(preferences)) => (preferences, false),
            Ok(None) => {
                info!("No saved preferences; using defaults");
                (UserPreferences::default(), true)
            }
            Err(e) => {
                warn!("Error loading preferences, using defaults: {}", e);
                (UserPreferences::default(), false)
            }
        };
        if first_run {
            writer.save_preferences(preferences.clone());
        }

        let notes_writer = writer.clone();
        store.subscribe(move |state, change| {
            if change == NotesChange::Notes {
                notes_writer.save_notes(state.notes.clone());
            }
        });

        let mut preferences = PreferencesStore::new(preferences);
        let prefs_writer = writer.clone();
        preferences.subscribe(move |prefs| prefs_writer.save_preferences(prefs.clone()));

        Self {
            lifecycle: NoteLifecycle::new(store, options.undo_window),
            preferences,
            location: options.location,
            writer,
            first_run,
        }
    }

    /// True if no preferences had been saved before this session
    pub fn is_first_run(&self) -> bool {
        self.first_run
    }

    // ==================== Notes ====================

    /// Create a note
    ///
    /// A draft without a location gets one from the location provider
    /// when tracking is enabled. A draft without a capture mode uses the
    /// preferred default.
    pub fn create_note(&mut self, mut draft: NoteDraft) -> NoteResult<Note> {
        let prefs = self.preferences.get();
        if draft.location.is_none() && prefs.location_tracking_enabled {
            draft.location = Some(resolve_location(self.location.as_ref()));
        }
        let default_mode = prefs.default_capture_mode;
        self.lifecycle.create(draft, default_mode)
    }

    /// Apply a partial edit; `Ok(None)` if the note does not exist
    pub fn edit_note(&mut self, patch: NotePatch) -> NoteResult<Option<Note>> {
        self.lifecycle.edit(patch)
    }

    /// Delete a note, keeping it restorable for the undo window
    pub fn delete_note(&mut self, id: &NoteId) -> Option<Note> {
        self.lifecycle.delete(id)
    }

    /// Restore the most recently deleted note if still possible
    pub fn undo_delete(&mut self) -> Option<Note> {
        self.lifecycle.undo_delete()
    }

    pub fn toggle_favorite(&mut self, id: &NoteId) -> bool {
        self.lifecycle.toggle_favorite(id)
    }

    /// All notes, newest first
    pub fn notes(&self) -> &[Note] {
        self.lifecycle.store().notes()
    }

    pub fn get_note(&self, id: &NoteId) -> Option<&Note> {
        self.lifecycle.store().get(id)
    }

    /// Find a note by full id or unambiguous id prefix
    pub fn find_by_prefix(&self, prefix: &str) -> Option<&Note> {
        if prefix.is_empty() {
            return None;
        }
        if let Some(exact) = self.notes().iter().find(|n| n.id.as_str() == prefix) {
            return Some(exact);
        }

        let mut matches = self
            .notes()
            .iter()
            .filter(|n| n.id.as_str().starts_with(prefix));
        match (matches.next(), matches.next()) {
            (Some(note), None) => Some(note),
            _ => None,
        }
    }

    pub fn loading(&self) -> bool {
        self.lifecycle.store().loading()
    }

    /// Load error message, if the last load failed
    pub fn error(&self) -> Option<&str> {
        self.lifecycle.store().error()
    }

    pub fn pending_undo(&self) -> Option<PendingUndo> {
        self.lifecycle.pending_undo()
    }

    /// Make any pending deletion permanent now
    pub fn commit_pending(&mut self) -> Option<NoteId> {
        self.lifecycle.commit_pending()
    }

    pub fn undo_window(&self) -> Duration {
        self.lifecycle.undo_window()
    }

    /// Receive undo notifications
    pub fn subscribe_events(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.lifecycle.subscribe_events()
    }

    /// Get mutable access to the note store (extra subscriptions)
    pub fn note_store_mut(&mut self) -> &mut NoteStore {
        self.lifecycle.store_mut()
    }

    /// Insert the sample timeline shown on an empty first launch
    ///
    /// Returns the number of notes added.
    pub fn seed_sample_notes(&mut self) -> usize {
        let samples = sample_notes();
        let count = samples.len();
        let store = self.lifecycle.store_mut();
        // Oldest first so the newest ends up at the front
        for note in samples.into_iter().rev() {
            store.add(note);
        }
        info!("Seeded {} sample notes", count);
        count
    }

    // ==================== Preferences ====================

    pub fn preferences(&self) -> &UserPreferences {
        self.preferences.get()
    }

    /// Get mutable access to the preferences store
    pub fn preferences_mut(&mut self) -> &mut PreferencesStore {
        &mut self.preferences
    }

    pub fn set_theme(&mut self, theme: Theme) -> bool {
        self.preferences.set_theme(theme)
    }

    pub fn set_font_size(&mut self, size: u32) -> bool {
        self.preferences.set_font_size(size)
    }

    pub fn set_animations_enabled(&mut self, enabled: bool) -> bool {
        self.preferences.set_animations_enabled(enabled)
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) -> bool {
        self.preferences.set_reduced_motion(reduced)
    }

    pub fn set_default_capture_mode(&mut self, mode: CaptureMode) -> bool {
        self.preferences.set_default_capture_mode(mode)
    }

    pub fn set_location_tracking_enabled(&mut self, enabled: bool) -> bool {
        self.preferences.set_location_tracking_enabled(enabled)
    }

    pub fn set_voice_input_enabled(&mut self, enabled: bool) -> bool {
        self.preferences.set_voice_input_enabled(enabled)
    }

    pub fn set_auto_save(&mut self, enabled: bool) -> bool {
        self.preferences.set_auto_save(enabled)
    }

    pub fn set_user_preferences(&mut self, preferences: UserPreferences) -> bool {
        self.preferences.set_user_preferences(preferences)
    }

    // ==================== Persistence ====================

    /// Wait for all scheduled writes to finish
    pub async fn flush(&self) {
        self.writer.flush().await;
    }

    /// Number of background writes that failed this session
    pub fn failed_writes(&self) -> usize {
        self.writer.failed_writes()
    }
}

fn sample_note(
    minutes_ago: i64,
    title: &str,
    content: &str,
    location: Location,
    tags: &[&str],
    is_favorite: bool,
    capture_mode: CaptureMode,
) -> Note {
    let at = Utc::now() - ChronoDuration::minutes(minutes_ago);
    Note {
        id: NoteId::generate(),
        title: Some(title.to_string()),
        content: content.to_string(),
        created_at: at,
        updated_at: at,
        location,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        is_favorite,
        capture_mode,
    }
}

/// The sample timeline, newest first
fn sample_notes() -> Vec<Note> {
    vec![
        sample_note(
            2,
            "Coffee Shop Ideas",
            "Need to explore more about the new project structure. Maybe we can implement a modular approach with feature-based organization.",
            Location::new(37.7749, -122.4194).with_address("Starbucks, Downtown"),
            &["work", "ideas", "project"],
            false,
            CaptureMode::Quick,
        ),
        sample_note(
            60,
            "Meeting Notes",
            "Key points from today's team sync: 1. Review sprint goals 2. Discuss blockers 3. Plan for next iteration 4. Assign new tasks",
            Location::new(37.7833, -122.4167).with_address("Office, Meeting Room 3"),
            &["work", "meeting", "sprint"],
            true,
            CaptureMode::Detailed,
        ),
        sample_note(
            3 * 60,
            "Weekend Plans",
            "Things to do this weekend: 1. Grocery shopping 2. Call parents 3. Finish reading book 4. Go for a hike if weather permits",
            Location::new(37.7694, -122.4862).with_address("Home"),
            &["personal", "weekend", "planning"],
            false,
            CaptureMode::Detailed,
        ),
        sample_note(
            24 * 60,
            "App Feature Ideas",
            "Potential features for Memory Lane: 1. Dark mode 2. Cloud sync 3. Voice memos 4. Image attachments 5. Handwriting recognition",
            Location::new(37.7739, -122.4312).with_address("Cafe, Mission District"),
            &["work", "ideas", "features"],
            true,
            CaptureMode::Quick,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::FixedLocation;
    use crate::storage::{KeyValueStore, MemoryStore, NOTES_KEY, PREFERENCES_KEY};

    type MemoryPersistence = KeyValuePersistence<MemoryStore>;

    fn backend() -> Arc<MemoryPersistence> {
        Arc::new(KeyValuePersistence::new(MemoryStore::new()))
    }

    fn open(backend: &Arc<MemoryPersistence>) -> MemoryLane {
        MemoryLane::with_persistence(backend.clone(), LaneOptions::default())
    }

    #[test]
    fn test_first_run_writes_default_preferences() {
        let backend = backend();
        let lane = open(&backend);

        assert!(lane.is_first_run());
        assert!(lane.notes().is_empty());
        assert!(!lane.loading());
        assert!(lane.error().is_none());
        assert_eq!(
            backend.load_preferences().unwrap(),
            Some(UserPreferences::default())
        );

        let again = open(&backend);
        assert!(!again.is_first_run());
    }

    #[test]
    fn test_changes_are_persisted() {
        let backend = backend();
        let mut lane = open(&backend);

        let note = lane.create_note(NoteDraft::new("buy milk")).unwrap();
        assert_eq!(backend.load_notes().unwrap(), vec![note.clone()]);

        lane.toggle_favorite(&note.id);
        assert!(backend.load_notes().unwrap()[0].is_favorite);

        lane.delete_note(&note.id);
        assert!(backend.load_notes().unwrap().is_empty());

        lane.undo_delete();
        assert_eq!(backend.load_notes().unwrap().len(), 1);

        lane.set_theme(Theme::Dark);
        assert_eq!(
            backend.load_preferences().unwrap().unwrap().theme,
            Theme::Dark
        );
    }

    #[test]
    fn test_reopen_sees_saved_state() {
        let backend = backend();
        let mut lane = open(&backend);
        let note = lane
            .create_note(NoteDraft::new("remember").tags(["x"]))
            .unwrap();
        lane.set_font_size(20);
        drop(lane);

        let lane = open(&backend);
        assert_eq!(lane.notes(), &[note]);
        assert_eq!(lane.preferences().font_size, 20);
    }

    #[test]
    fn test_corrupt_notes_set_error() {
        let backend = backend();
        backend.store().set(NOTES_KEY, "{not json").unwrap();

        let lane = open(&backend);
        assert!(lane.notes().is_empty());
        assert_eq!(lane.error(), Some(LOAD_ERROR_MESSAGE));
        assert!(!lane.loading());
    }

    #[test]
    fn test_corrupt_preferences_fall_back_to_defaults() {
        let backend = backend();
        backend.store().set(PREFERENCES_KEY, "[1, 2").unwrap();

        let lane = open(&backend);
        assert_eq!(*lane.preferences(), UserPreferences::default());
        assert!(lane.error().is_none());
    }

    #[test]
    fn test_default_capture_mode_from_preferences() {
        let backend = backend();
        let mut lane = open(&backend);
        lane.set_default_capture_mode(CaptureMode::Voice);

        let note = lane.create_note(NoteDraft::new("spoken")).unwrap();
        assert_eq!(note.capture_mode, CaptureMode::Voice);
    }

    #[test]
    fn test_location_from_provider() {
        let options = LaneOptions {
            location: Arc::new(FixedLocation {
                latitude: 37.7694,
                longitude: -122.4862,
                address: Some("Home".to_string()),
            }),
            ..LaneOptions::default()
        };
        let mut lane = MemoryLane::with_persistence(backend(), options);

        let tracked = lane.create_note(NoteDraft::new("here")).unwrap();
        assert_eq!(tracked.location.address.as_deref(), Some("Home"));

        let explicit = Location::new(1.0, 2.0);
        let supplied = lane
            .create_note(NoteDraft::new("there").location(explicit.clone()))
            .unwrap();
        assert_eq!(supplied.location, explicit);

        lane.set_location_tracking_enabled(false);
        let untracked = lane.create_note(NoteDraft::new("nowhere")).unwrap();
        assert!(untracked.location.is_unknown());
    }

    #[test]
    fn test_find_by_prefix() {
        let mut lane = open(&backend());
        let store = lane.note_store_mut();
        store.add(Note::with_id("abc123", "one"));
        store.add(Note::with_id("abd456", "two"));

        assert_eq!(lane.find_by_prefix("abc").unwrap().content, "one");
        assert_eq!(lane.find_by_prefix("abd456").unwrap().content, "two");
        assert!(lane.find_by_prefix("ab").is_none());
        assert!(lane.find_by_prefix("zzz").is_none());
        assert!(lane.find_by_prefix("").is_none());
    }

    #[test]
    fn test_seed_sample_notes() {
        let backend = backend();
        let mut lane = open(&backend);

        assert_eq!(lane.seed_sample_notes(), 4);
        let titles: Vec<_> = lane.notes().iter().map(|n| n.display_title()).collect();
        assert_eq!(
            titles,
            vec![
                "Coffee Shop Ideas",
                "Meeting Notes",
                "Weekend Plans",
                "App Feature Ideas"
            ]
        );
        assert!(lane.notes()[0].created_at > lane.notes()[3].created_at);
        assert_eq!(backend.load_notes().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_flush_waits_for_writes() {
        let backend = backend();
        let mut lane = open(&backend);

        lane.create_note(NoteDraft::new("async")).unwrap();
        lane.flush().await;

        assert_eq!(backend.load_notes().unwrap().len(), 1);
        assert_eq!(lane.failed_writes(), 0);
    }
}
