//! In-memory state containers
//!
//! Both stores are owned by a single mutator and apply actions
//! synchronously. Persistence hooks are ordinary listeners.

mod listeners;
pub mod notes;
pub mod preferences;

pub use listeners::SubscriptionId;
pub use notes::{NoteAction, NoteStore, NotesChange, NotesState};
pub use preferences::{PreferencesAction, PreferencesStore};
