//! Composition store over an on-disk storage partition.

use sangeet_core::{CompositionDraft, CompositionStore, FileStorage, KeyValueStore, STORAGE_KEY};
use tempfile::TempDir;

fn draft(title: &str, raga: &str) -> CompositionDraft {
    CompositionDraft::new(title, raga, "Rupak")
        .with_instruments(["Santoor"])
        .with_tempo(100.0)
        .with_mood("Playful")
        .with_audio_url("https://cdn.example.com/audio.mp3")
}

#[test]
fn test_collection_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();

    let saved = {
        let mut store = CompositionStore::new(FileStorage::open(temp_dir.path()).unwrap());
        store.save(draft("First", "Kafi")).unwrap();
        store.save(draft("Second", "Desh")).unwrap()
    };

    let store = CompositionStore::new(FileStorage::open(temp_dir.path()).unwrap());
    let all = store.get_all();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0], saved);
    assert_eq!(all[1].title, "First");
}

#[test]
fn test_blob_is_a_json_array_with_browser_keys() {
    let temp_dir = TempDir::new().unwrap();
    let mut store = CompositionStore::new(FileStorage::open(temp_dir.path()).unwrap());
    store
        .save(draft("Noon", "Sarang").with_description("bright"))
        .unwrap();

    let raw = store.storage().get_item(STORAGE_KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let records = value.as_array().unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["raga"], "Sarang");
    assert!(records[0]["createdAt"].is_string());
    assert!(records[0]["generatedAt"].is_string());
    assert_eq!(records[0]["description"], "bright");
}

#[test]
fn test_concurrent_handles_last_writer_wins() {
    let temp_dir = TempDir::new().unwrap();
    let mut tab_a = CompositionStore::new(FileStorage::open(temp_dir.path()).unwrap());
    let mut tab_b = CompositionStore::new(FileStorage::open(temp_dir.path()).unwrap());

    tab_a.save(draft("From A", "Kafi")).unwrap();
    // tab_b reads after tab_a's write, so both records survive.
    tab_b.save(draft("From B", "Desh")).unwrap();
    assert_eq!(tab_a.count(), 2);

    // A delete replaces the whole blob with whatever that handle read.
    let first = tab_a.get_all();
    assert!(tab_b.delete_by_id(first[0].id.as_str()));
    assert_eq!(tab_a.count(), 1);
}

#[test]
fn test_corrupt_file_reads_as_empty() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("saved_compositions.json"), "[{\"id\": 1").unwrap();

    let store = CompositionStore::new(FileStorage::open(temp_dir.path()).unwrap());
    assert!(store.get_all().is_empty());
    assert!(store.search("anything").is_empty());
}
