//! Fire-and-forget persistence
//!
//! Store change hooks hand full snapshots to the writer, which saves them
//! on tokio's blocking pool without making the caller wait. A failed
//! write is logged and counted; the in-memory state is never rolled back.
//!
//! Callers never wait on each other's writes. Snapshots of one record
//! still land in the order they were scheduled: a snapshot that has been
//! superseded by the time it reaches the backend is skipped. Outside a
//! tokio runtime the write runs inline.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::error::StorageResult;
use super::persistence::Persistence;
use crate::models::{Note, UserPreferences};

/// Write ordering for one record
#[derive(Default)]
struct RecordSlot {
    /// Sequence number of the newest snapshot scheduled
    issued: AtomicU64,
    /// Held while a snapshot of this record is written
    write: Mutex<()>,
}

/// Best-effort background writer over a [`Persistence`] backend
#[derive(Clone)]
pub struct PersistenceWriter {
    persistence: Arc<dyn Persistence>,
    notes: Arc<RecordSlot>,
    preferences: Arc<RecordSlot>,
    pending: Arc<Mutex<Vec<JoinHandle<()>>>>,
    failures: Arc<AtomicUsize>,
}

impl PersistenceWriter {
    pub fn new(persistence: Arc<dyn Persistence>) -> Self {
        Self {
            persistence,
            notes: Arc::default(),
            preferences: Arc::default(),
            pending: Arc::new(Mutex::new(Vec::new())),
            failures: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the backend this writer saves to
    pub fn persistence(&self) -> &Arc<dyn Persistence> {
        &self.persistence
    }

    /// Schedule a save of the full note list
    pub fn save_notes(&self, notes: Vec<Note>) {
        self.schedule("notes", &self.notes, move |p| p.save_notes(&notes));
    }

    /// Schedule a save of the preferences record
    pub fn save_preferences(&self, preferences: UserPreferences) {
        self.schedule("preferences", &self.preferences, move |p| {
            p.save_preferences(&preferences)
        });
    }

    /// Number of writes that failed since this writer was created
    pub fn failed_writes(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }

    /// Wait for every write scheduled so far to finish
    pub async fn flush(&self) {
        let handles = std::mem::take(&mut *self.pending_guard());
        for handle in handles {
            if let Err(e) = handle.await {
                warn!("Persistence task did not complete: {}", e);
            }
        }
    }

    fn schedule<F>(&self, record: &'static str, slot: &Arc<RecordSlot>, job: F)
    where
        F: FnOnce(&dyn Persistence) -> StorageResult<()> + Send + 'static,
    {
        let persistence = Arc::clone(&self.persistence);
        let failures = Arc::clone(&self.failures);
        let slot = Arc::clone(slot);
        let sequence = slot.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let run = move || {
            let _write = slot.write.lock().unwrap_or_else(|e| e.into_inner());
            if slot.issued.load(Ordering::SeqCst) > sequence {
                debug!("Skipping superseded {} snapshot {}", record, sequence);
                return;
            }
            if let Err(e) = job(persistence.as_ref()) {
                failures.fetch_add(1, Ordering::Relaxed);
                warn!("Error saving {} to storage: {}", record, e);
                if let Some(hint) = e.recovery_suggestion() {
                    warn!("{}", hint);
                }
            } else {
                debug!("Saved {} to storage", record);
            }
        };

        match Handle::try_current() {
            Ok(handle) => {
                let task = handle.spawn_blocking(run);
                let mut pending = self.pending_guard();
                pending.retain(|h| !h.is_finished());
                pending.push(task);
            }
            Err(_) => run(),
        }
    }

    fn pending_guard(&self) -> std::sync::MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }
}
