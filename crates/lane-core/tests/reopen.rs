//! Round trips through real on-disk backends

use lane_core::storage::{FileStore, KeyValuePersistence, SqliteStore, NOTES_KEY};
use lane_core::{Config, MemoryLane, NoteDraft, NotePatch, StorageBackend, Theme};
use tempfile::TempDir;

fn config(dir: &TempDir, backend: StorageBackend) -> Config {
    Config {
        data_dir: dir.path().to_path_buf(),
        backend,
        ..Config::default()
    }
}

fn create_edit_reopen(backend: StorageBackend) {
    let dir = TempDir::new().unwrap();
    let config = config(&dir, backend);

    let mut lane = MemoryLane::open(&config).unwrap();
    assert!(lane.is_first_run());
    let kept = lane
        .create_note(NoteDraft::new("pick up film").tags(["errand"]))
        .unwrap();
    let gone = lane.create_note(NoteDraft::new("old idea")).unwrap();
    lane.edit_note(NotePatch::new(kept.id.clone()).title(Some("Film".into())))
        .unwrap();
    lane.delete_note(&gone.id);
    lane.set_theme(Theme::Dark);
    drop(lane);

    let lane = MemoryLane::open(&config).unwrap();
    assert!(!lane.is_first_run());
    assert_eq!(lane.notes().len(), 1);
    let note = &lane.notes()[0];
    assert_eq!(note.id, kept.id);
    assert_eq!(note.title.as_deref(), Some("Film"));
    assert_eq!(note.created_at, kept.created_at);
    assert_eq!(lane.preferences().theme, Theme::Dark);
}

#[test]
fn test_sqlite_backend_survives_reopen() {
    create_edit_reopen(StorageBackend::Sqlite);
}

#[test]
fn test_file_backend_survives_reopen() {
    create_edit_reopen(StorageBackend::File);
}

#[test]
fn test_file_backend_writes_camel_case_json() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir, StorageBackend::File);

    let mut lane = MemoryLane::open(&config).unwrap();
    lane.create_note(NoteDraft::new("hello").favorite(true))
        .unwrap();
    drop(lane);

    let store = FileStore::new(config.records_dir());
    let raw = std::fs::read_to_string(store.path_for(NOTES_KEY)).unwrap();
    assert!(raw.contains("\"isFavorite\":true"));
    assert!(raw.contains("\"captureMode\":\"quick\""));
    assert!(!raw.contains("\"title\""));
}

#[test]
fn test_corrupt_file_recovers_with_backup() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir, StorageBackend::File);
    let store = FileStore::new(config.records_dir());
    std::fs::create_dir_all(store.dir()).unwrap();
    std::fs::write(store.path_for(NOTES_KEY), "[{\"id\": ").unwrap();

    let mut lane = MemoryLane::open(&config).unwrap();
    assert!(lane.notes().is_empty());
    assert_eq!(lane.error(), Some("Failed to load notes"));

    let backup = store.path_for(&format!("{}.corrupt.backup", NOTES_KEY));
    assert_eq!(std::fs::read_to_string(backup).unwrap(), "[{\"id\": ");

    // The next change overwrites the bad record
    lane.create_note(NoteDraft::new("fresh start")).unwrap();
    drop(lane);
    let lane = MemoryLane::open(&config).unwrap();
    assert_eq!(lane.notes().len(), 1);
    assert!(lane.error().is_none());
}

#[test]
fn test_sqlite_store_holds_both_records() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir, StorageBackend::Sqlite);

    let mut lane = MemoryLane::open(&config).unwrap();
    lane.create_note(NoteDraft::new("one")).unwrap();
    drop(lane);

    let persistence = KeyValuePersistence::new(SqliteStore::open(&config.sqlite_path()).unwrap());
    assert_eq!(persistence.store().len().unwrap(), 2);
}

async fn seed_flush_reopen(backend: StorageBackend) {
    let dir = TempDir::new().unwrap();
    let config = config(&dir, backend);

    // Each seeded note schedules its own background save
    let mut lane = MemoryLane::open(&config).unwrap();
    assert_eq!(lane.seed_sample_notes(), 4);
    lane.flush().await;
    assert_eq!(lane.failed_writes(), 0);
    let seeded: Vec<_> = lane.notes().iter().map(|n| n.id.clone()).collect();
    drop(lane);

    let lane = MemoryLane::open(&config).unwrap();
    assert!(lane.error().is_none());
    let reloaded: Vec<_> = lane.notes().iter().map(|n| n.id.clone()).collect();
    assert_eq!(reloaded, seeded);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_file_backend_overlapping_saves() {
    for _ in 0..10 {
        seed_flush_reopen(StorageBackend::File).await;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_sqlite_backend_overlapping_saves() {
    seed_flush_reopen(StorageBackend::Sqlite).await;
}
