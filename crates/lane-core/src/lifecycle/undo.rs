//! Single-slot undo buffer for deletions
//!
//! ```text
//!            delete(id)                 undo() before deadline
//!   Idle ──────────────────▶ PendingUndo ─────────────────────▶ Idle (restored)
//!    ▲                           │
//!    └───────────────────────────┘
//!     deadline, new delete, undo after deadline, create
//!     (deletion becomes permanent)
//! ```
//!
//! At most one note is pending. Arming the slot while it is occupied
//! commits the previous deletion first. The expiry timer is a tokio task
//! tagged with the slot generation, so a timer that lost a race with undo
//! or a newer delete does nothing when it wakes. Without a runtime no
//! timer is spawned and the deadline is checked lazily.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::MAX_UNDO_WINDOW;
use crate::models::{Note, NoteId};

/// Notifications for the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    /// A note was deleted and can be restored for `window`
    UndoAvailable { note_id: NoteId, window: Duration },
    /// A pending deletion was undone
    Restored { note_id: NoteId },
    /// A pending deletion became permanent
    DeletionCommitted { note_id: NoteId },
}

/// Undo slot state
#[derive(Debug, Clone, PartialEq, Default)]
pub enum UndoState {
    #[default]
    Idle,
    PendingUndo { note: Note, deadline: Instant },
}

/// A deleted note that can still be restored
#[derive(Debug, Clone, PartialEq)]
pub struct PendingUndo {
    pub note: Note,
    /// Time left before the deletion becomes permanent
    pub remaining: Duration,
}

#[derive(Default)]
struct Slot {
    state: UndoState,
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

impl Slot {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    /// Make any pending deletion permanent
    fn commit(&mut self, events: &broadcast::Sender<LifecycleEvent>) -> Option<NoteId> {
        self.cancel_timer();
        match std::mem::take(&mut self.state) {
            UndoState::PendingUndo { note, .. } => {
                info!("Deletion of note {} is now permanent", note.id);
                let _ = events.send(LifecycleEvent::DeletionCommitted {
                    note_id: note.id.clone(),
                });
                Some(note.id)
            }
            UndoState::Idle => None,
        }
    }
}

pub(crate) struct UndoBuffer {
    slot: Arc<Mutex<Slot>>,
    window: Duration,
    events: broadcast::Sender<LifecycleEvent>,
}

impl UndoBuffer {
    pub(crate) fn new(window: Duration, events: broadcast::Sender<LifecycleEvent>) -> Self {
        if window > MAX_UNDO_WINDOW {
            warn!(
                "Undo window of {:?} is too long; using {:?}",
                window, MAX_UNDO_WINDOW
            );
        }
        let window = window.min(MAX_UNDO_WINDOW);
        Self {
            slot: Arc::new(Mutex::new(Slot::default())),
            window,
            events,
        }
    }

    pub(crate) fn window(&self) -> Duration {
        self.window
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Hold a just-deleted note, committing whatever was pending before
    pub(crate) fn hold(&self, note: Note) {
        let mut slot = self.lock();
        slot.commit(&self.events);

        slot.generation += 1;
        let generation = slot.generation;
        let now = Instant::now();
        let deadline = now.checked_add(self.window).unwrap_or(now);
        let note_id = note.id.clone();

        slot.state = UndoState::PendingUndo { note, deadline };
        slot.timer = self.spawn_expiry(generation, deadline);
        drop(slot);

        debug!("Note {} pending undo for {:?}", note_id, self.window);
        let _ = self.events.send(LifecycleEvent::UndoAvailable {
            note_id,
            window: self.window,
        });
    }

    /// Take the pending note if its window is still open
    ///
    /// The slot is left idle either way; a note whose deadline already
    /// passed is committed instead of returned.
    pub(crate) fn take(&self) -> Option<Note> {
        let mut slot = self.lock();
        let still_open = match &slot.state {
            UndoState::PendingUndo { deadline, .. } => Instant::now() < *deadline,
            UndoState::Idle => return None,
        };
        if !still_open {
            slot.commit(&self.events);
            return None;
        }

        slot.cancel_timer();
        match std::mem::take(&mut slot.state) {
            UndoState::PendingUndo { note, .. } => Some(note),
            UndoState::Idle => None,
        }
    }

    /// Make any pending deletion permanent now
    pub(crate) fn commit(&self) -> Option<NoteId> {
        self.lock().commit(&self.events)
    }

    /// Currently restorable note, if any
    pub(crate) fn pending(&self) -> Option<PendingUndo> {
        let mut slot = self.lock();
        let now = Instant::now();
        match &slot.state {
            UndoState::PendingUndo { note, deadline } if now < *deadline => Some(PendingUndo {
                note: note.clone(),
                remaining: *deadline - now,
            }),
            UndoState::PendingUndo { .. } => {
                slot.commit(&self.events);
                None
            }
            UndoState::Idle => None,
        }
    }

    pub(crate) fn state(&self) -> UndoState {
        self.lock().state.clone()
    }

    fn spawn_expiry(&self, generation: u64, deadline: Instant) -> Option<JoinHandle<()>> {
        let handle = Handle::try_current().ok()?;
        let slot = Arc::clone(&self.slot);
        let events = self.events.clone();

        Some(handle.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let mut slot = slot.lock().unwrap_or_else(|e| e.into_inner());
            if slot.generation == generation {
                // Our own handle; dropping it is enough
                slot.timer = None;
                slot.commit(&events);
            }
        }))
    }
}

impl Drop for UndoBuffer {
    fn drop(&mut self) {
        self.lock().cancel_timer();
    }
}
