//! Note lifecycle service
//!
//! Turns user intents into note store actions:
//!
//! - `create` fills in identity, timestamps and defaults, then prepends
//! - `edit` merges a partial patch over an existing note
//! - `delete` removes a note and parks it in the undo buffer
//! - `undo_delete` puts the parked note back at the front of the list
//! - `toggle_favorite` flips the flag
//!
//! Unknown ids are silent no-ops. Validation failures leave all state
//! untouched, including any pending undo.

mod undo;

use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::info;

use crate::error::NoteResult;
use crate::models::{
    normalize_content, normalize_tags, normalize_title, CaptureMode, Note, NoteDraft, NoteId,
    NotePatch,
};
use crate::store::NoteStore;

pub use undo::{LifecycleEvent, PendingUndo, UndoState};
use undo::UndoBuffer;

/// How long a deleted note stays restorable by default
pub const DEFAULT_UNDO_WINDOW: Duration = Duration::from_secs(4);

/// Longest undo window honored; larger settings are clamped to this
pub const MAX_UNDO_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

const EVENT_CAPACITY: usize = 32;

/// Create/edit/delete/undo orchestration over a [`NoteStore`]
pub struct NoteLifecycle {
    store: NoteStore,
    undo: UndoBuffer,
    events: broadcast::Sender<LifecycleEvent>,
}

impl NoteLifecycle {
    pub fn new(store: NoteStore, undo_window: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            store,
            undo: UndoBuffer::new(undo_window, events.clone()),
            events,
        }
    }

    /// Get the underlying store
    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    /// Get mutable access to the store (loading, subscriptions)
    pub fn store_mut(&mut self) -> &mut NoteStore {
        &mut self.store
    }

    /// Receive undo notifications
    pub fn subscribe_events(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.events.subscribe()
    }

    pub fn undo_window(&self) -> Duration {
        self.undo.window()
    }

    /// Create a note from a draft
    ///
    /// `default_mode` is used when the draft has no capture mode. Any
    /// pending undo is committed once the draft passes validation.
    pub fn create(&mut self, draft: NoteDraft, default_mode: CaptureMode) -> NoteResult<Note> {
        let content = normalize_content(&draft.content)?;
        let title = normalize_title(draft.title.as_deref())?;
        let tags = match draft.tags {
            Some(tags) => normalize_tags(&tags)?,
            None => Vec::new(),
        };

        self.undo.commit();

        let now = Utc::now();
        let note = Note {
            id: NoteId::generate(),
            title,
            content,
            created_at: now,
            updated_at: now,
            location: draft.location.unwrap_or_default(),
            tags,
            is_favorite: draft.is_favorite.unwrap_or(false),
            capture_mode: draft.capture_mode.unwrap_or(default_mode),
        };

        self.store.add(note.clone());
        info!("Created note {}", note.id);
        Ok(note)
    }

    /// Apply a partial edit
    ///
    /// Returns `Ok(None)` if no note has the patch's id.
    pub fn edit(&mut self, patch: NotePatch) -> NoteResult<Option<Note>> {
        let Some(existing) = self.store.get(&patch.id) else {
            return Ok(None);
        };
        let mut note = existing.clone();

        if let Some(content) = patch.content {
            note.content = normalize_content(&content)?;
        }
        if let Some(title) = patch.title {
            note.title = normalize_title(title.as_deref())?;
        }
        if let Some(tags) = patch.tags {
            note.tags = normalize_tags(&tags)?;
        }
        if let Some(location) = patch.location {
            note.location = location;
        }
        if let Some(is_favorite) = patch.is_favorite {
            note.is_favorite = is_favorite;
        }
        note.updated_at = Utc::now();

        self.store.update(note.clone());
        info!("Edited note {}", note.id);
        Ok(Some(note))
    }

    /// Delete a note, keeping it restorable for the undo window
    ///
    /// Returns the removed note, or `None` if the id is unknown. A note
    /// already pending undo is committed first.
    pub fn delete(&mut self, id: &NoteId) -> Option<Note> {
        let note = self.store.get(id)?.clone();
        self.store.remove(id);
        info!("Deleted note {} (undo available)", id);
        self.undo.hold(note.clone());
        Some(note)
    }

    /// Restore the most recent deletion if its window is still open
    ///
    /// The note goes back to the front of the list, not to its old
    /// position.
    pub fn undo_delete(&mut self) -> Option<Note> {
        let note = self.undo.take()?;
        let note_id = note.id.clone();
        self.store.add(note.clone());
        info!("Restored note {}", note_id);
        let _ = self.events.send(LifecycleEvent::Restored { note_id });
        Some(note)
    }

    /// Flip the favorite flag. Returns false if the id is unknown.
    pub fn toggle_favorite(&mut self, id: &NoteId) -> bool {
        self.store.toggle_favorite(id)
    }

    /// The note currently restorable with `undo_delete`, if any
    pub fn pending_undo(&self) -> Option<PendingUndo> {
        self.undo.pending()
    }

    /// Make a pending deletion permanent immediately
    pub fn commit_pending(&mut self) -> Option<NoteId> {
        self.undo.commit()
    }

    /// Current undo slot state
    pub fn undo_state(&self) -> UndoState {
        self.undo.state()
    }
}
