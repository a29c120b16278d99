//! Memory Lane Core Library
//!
//! This crate provides the core functionality for Memory Lane, a
//! capture-first note timeline: short notes tagged with where they were
//! written, listed newest first, with a brief undo window after deletes.
//!
//! # Architecture
//!
//! - **Stores**: in-memory note and preference state, changed only by
//!   dispatched actions, with synchronous change listeners
//! - **Lifecycle**: create/edit/delete/undo over the note store
//! - **Storage**: JSON records in a key-value backend (SQLite or files),
//!   written in the background after every change
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let mut lane = MemoryLane::open(&config)?;
//!
//! let note = lane.create_note(NoteDraft::new("buy milk").tags(["errand"]))?;
//! lane.delete_note(&note.id);
//! lane.undo_delete();            // back at the front of the list
//!
//! lane.flush().await;
//! ```
//!
//! # Modules
//!
//! - `app`: `MemoryLane` facade (main entry point)
//! - `models`: notes, drafts, patches and preferences
//! - `store`: note and preference stores
//! - `lifecycle`: note operations and the undo buffer
//! - `storage`: key-value backends, persistence and the background writer
//! - `location`: position and address lookup
//! - `config`: Application configuration

pub mod app;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod location;
pub mod models;
pub mod storage;
pub mod store;

pub use app::{LaneOptions, MemoryLane};
pub use config::{Config, StorageBackend};
pub use error::{NoteError, NoteResult, ValidationError};
pub use lifecycle::{LifecycleEvent, NoteLifecycle, PendingUndo, UndoState};
pub use location::{FixedLocation, GeocodedAddress, LocationProvider, NoLocation};
pub use models::{
    CaptureMode, Location, Note, NoteDraft, NoteId, NotePatch, Theme, UserPreferences,
};
pub use storage::{Persistence, PersistenceWriter, StorageError};
pub use store::{NoteStore, PreferencesStore};
