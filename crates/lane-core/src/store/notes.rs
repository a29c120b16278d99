//! Note store
//!
//! The single in-memory owner of the note collection. Every mutation is an
//! action applied through [`NoteStore::dispatch`]; listeners run
//! synchronously right after any action that changed state, in the order
//! they subscribed. Actions that change nothing (unknown id, same value)
//! notify nobody.
//!
//! Ordering is newest-created-first: `add` inserts at the front and
//! `update` keeps a note where it is.

use tracing::{debug, warn};

use super::listeners::{Listeners, SubscriptionId};
use crate::models::{Note, NoteId};

/// A mutation of the note store
#[derive(Debug, Clone, PartialEq)]
pub enum NoteAction {
    /// Replace the whole collection (startup load)
    ReplaceAll(Vec<Note>),
    /// Insert at the front
    Add(Note),
    /// Replace the note with the same id, in place
    Update(Note),
    /// Delete by id
    Remove(NoteId),
    /// Flip `is_favorite`
    ToggleFavorite(NoteId),
    SetLoading(bool),
    SetError(Option<String>),
}

impl NoteAction {
    fn name(&self) -> &'static str {
        match self {
            NoteAction::ReplaceAll(_) => "replace_all",
            NoteAction::Add(_) => "add",
            NoteAction::Update(_) => "update",
            NoteAction::Remove(_) => "remove",
            NoteAction::ToggleFavorite(_) => "toggle_favorite",
            NoteAction::SetLoading(_) => "set_loading",
            NoteAction::SetError(_) => "set_error",
        }
    }

    fn change(&self) -> NotesChange {
        match self {
            NoteAction::SetLoading(_) | NoteAction::SetError(_) => NotesChange::Status,
            _ => NotesChange::Notes,
        }
    }
}

/// What part of the state an action changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotesChange {
    /// The note collection
    Notes,
    /// Only the loading/error flags
    Status,
}

/// Observable note state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotesState {
    pub notes: Vec<Note>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Ordered note collection with change listeners
pub struct NoteStore {
    state: NotesState,
    listeners: Listeners<NotesState, NotesChange>,
}

impl Default for NoteStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NoteStore {
    pub fn new() -> Self {
        Self {
            state: NotesState::default(),
            listeners: Listeners::new(),
        }
    }

    /// Register a listener; it sees every state-changing action from now on
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&NotesState, NotesChange) + Send + 'static,
    {
        self.listeners.add(Box::new(listener))
    }

    /// Remove a listener. Returns false if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.remove(id)
    }

    /// Apply an action. Returns true if the state changed.
    pub fn dispatch(&mut self, action: NoteAction) -> bool {
        let name = action.name();
        let change = action.change();
        let changed = self.reduce(action);
        if changed {
            debug!(action = name, notes = self.state.notes.len(), "Note store changed");
            self.listeners.notify(&self.state, change);
        }
        changed
    }

    fn reduce(&mut self, action: NoteAction) -> bool {
        let state = &mut self.state;
        match action {
            NoteAction::ReplaceAll(notes) => {
                if state.notes == notes {
                    return false;
                }
                state.notes = notes;
                true
            }
            NoteAction::Add(note) => {
                if state.notes.iter().any(|n| n.id == note.id) {
                    warn!("Refusing to add duplicate note id {}", note.id);
                    return false;
                }
                state.notes.insert(0, note);
                true
            }
            NoteAction::Update(note) => match state.notes.iter_mut().find(|n| n.id == note.id) {
                Some(existing) if *existing != note => {
                    *existing = note;
                    true
                }
                _ => false,
            },
            NoteAction::Remove(id) => {
                let before = state.notes.len();
                state.notes.retain(|n| n.id != id);
                state.notes.len() != before
            }
            NoteAction::ToggleFavorite(id) => match state.notes.iter_mut().find(|n| n.id == id) {
                Some(note) => {
                    note.is_favorite = !note.is_favorite;
                    true
                }
                None => false,
            },
            NoteAction::SetLoading(loading) => {
                let changed = state.loading != loading;
                state.loading = loading;
                changed
            }
            NoteAction::SetError(error) => {
                let changed = state.error != error;
                state.error = error;
                changed
            }
        }
    }

    // ==================== Mutations ====================

    pub fn replace_all(&mut self, notes: Vec<Note>) -> bool {
        self.dispatch(NoteAction::ReplaceAll(notes))
    }

    pub fn add(&mut self, note: Note) -> bool {
        self.dispatch(NoteAction::Add(note))
    }

    pub fn update(&mut self, note: Note) -> bool {
        self.dispatch(NoteAction::Update(note))
    }

    pub fn remove(&mut self, id: &NoteId) -> bool {
        self.dispatch(NoteAction::Remove(id.clone()))
    }

    pub fn toggle_favorite(&mut self, id: &NoteId) -> bool {
        self.dispatch(NoteAction::ToggleFavorite(id.clone()))
    }

    pub fn set_loading(&mut self, loading: bool) -> bool {
        self.dispatch(NoteAction::SetLoading(loading))
    }

    pub fn set_error(&mut self, error: Option<String>) -> bool {
        self.dispatch(NoteAction::SetError(error))
    }

    // ==================== Queries ====================

    pub fn state(&self) -> &NotesState {
        &self.state
    }

    /// All notes, newest first
    pub fn notes(&self) -> &[Note] {
        &self.state.notes
    }

    pub fn get(&self, id: &NoteId) -> Option<&Note> {
        self.state.notes.iter().find(|n| &n.id == id)
    }

    pub fn contains(&self, id: &NoteId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.state.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.notes.is_empty()
    }

    pub fn loading(&self) -> bool {
        self.state.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn note(id: &str) -> Note {
        Note::with_id(id, format!("content of {}", id))
    }

    fn ids(store: &NoteStore) -> Vec<&str> {
        store.notes().iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn test_add_prepends() {
        let mut store = NoteStore::new();
        store.add(note("a"));
        store.add(note("b"));
        store.add(note("c"));

        assert_eq!(ids(&store), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_add_rejects_duplicate_id() {
        let mut store = NoteStore::new();
        assert!(store.add(note("a")));
        assert!(!store.add(note("a")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_update_in_place() {
        let mut store = NoteStore::new();
        store.replace_all(vec![note("a"), note("b"), note("c")]);

        let mut edited = store.get(&"b".into()).unwrap().clone();
        edited.content = "edited".to_string();
        assert!(store.update(edited));

        assert_eq!(ids(&store), vec!["a", "b", "c"]);
        assert_eq!(store.get(&"b".into()).unwrap().content, "edited");
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let mut store = NoteStore::new();
        store.replace_all(vec![note("a"), note("b")]);
        let before = store.state().clone();

        assert!(!store.update(note("x")));
        assert_eq!(*store.state(), before);
    }

    #[test]
    fn test_remove() {
        let mut store = NoteStore::new();
        store.replace_all(vec![note("a"), note("b")]);

        assert!(store.remove(&"a".into()));
        assert_eq!(ids(&store), vec!["b"]);

        assert!(!store.remove(&"a".into()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_toggle_favorite_twice_restores() {
        let mut store = NoteStore::new();
        store.add(note("a"));
        let id = NoteId::from("a");

        assert!(store.toggle_favorite(&id));
        assert!(store.get(&id).unwrap().is_favorite);
        assert!(store.toggle_favorite(&id));
        assert!(!store.get(&id).unwrap().is_favorite);

        assert!(!store.toggle_favorite(&"missing".into()));
    }

    #[test]
    fn test_status_flags() {
        let mut store = NoteStore::new();
        assert!(!store.loading());
        assert!(store.error().is_none());

        assert!(store.set_loading(true));
        assert!(!store.set_loading(true));
        assert!(store.loading());

        store.set_error(Some("Failed to load notes".to_string()));
        assert_eq!(store.error(), Some("Failed to load notes"));
    }

    #[test]
    fn test_listeners_see_each_change_immediately() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut store = NoteStore::new();

        let sink = Arc::clone(&log);
        store.subscribe(move |state, change| {
            sink.lock().unwrap().push((state.notes.len(), change));
        });

        store.add(note("a"));
        store.add(note("b"));
        store.set_loading(true);
        store.remove(&"a".into());

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                (1, NotesChange::Notes),
                (2, NotesChange::Notes),
                (2, NotesChange::Status),
                (1, NotesChange::Notes),
            ]
        );
    }

    #[test]
    fn test_noop_does_not_notify() {
        let count = Arc::new(Mutex::new(0));
        let mut store = NoteStore::new();
        store.add(note("a"));

        let counter = Arc::clone(&count);
        store.subscribe(move |_, _| *counter.lock().unwrap() += 1);

        store.update(note("zzz"));
        store.remove(&"zzz".into());
        store.toggle_favorite(&"zzz".into());
        let same = store.get(&"a".into()).unwrap().clone();
        store.update(same);

        assert_eq!(*count.lock().unwrap(), 0);
    }

    #[test]
    fn test_unsubscribe() {
        let count = Arc::new(Mutex::new(0));
        let mut store = NoteStore::new();

        let counter = Arc::clone(&count);
        let id = store.subscribe(move |_, _| *counter.lock().unwrap() += 1);
        store.add(note("a"));
        assert!(store.unsubscribe(id));
        store.add(note("b"));

        assert_eq!(*count.lock().unwrap(), 1);
    }
}
