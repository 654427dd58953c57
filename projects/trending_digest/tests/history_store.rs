mod common;

use common::at;
use projects_trending_digest::history::{HistoryStore, JsonHistoryStore, SnapshotHistoryStore};
use projects_trending_digest::model::{History, RepositoryRecord};

fn sample_history() -> History {
    let mut history = History::new();

    let mut uv = RepositoryRecord::new("astral-sh/uv", at(1, 9));
    uv.description = "An extremely fast Python package manager, written in Rust.".to_string();
    uv.language = "Rust".to_string();
    uv.stars = "54,321".to_string();
    history.insert(uv.repo.clone(), uv);

    let mut quoted = RepositoryRecord::new("someone/\"quoted\"", at(2, 18));
    quoted.description = "Unicode ✓ and <tags> & \"quotes\"".to_string();
    history.insert(quoted.repo.clone(), quoted);

    history
}

#[test]
fn missing_file_loads_as_empty_history() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonHistoryStore::new(dir.path().join("absent.json"));

    assert!(store.load().is_empty());
}

#[test]
fn corrupt_file_loads_as_empty_history() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    std::fs::write(&path, "{ \"astral-sh/uv\": { truncated").unwrap();

    let store = JsonHistoryStore::new(&path);

    assert!(store.load().is_empty());
}

#[test]
fn wrong_shape_loads_as_empty_history() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    std::fs::write(&path, "[1, 2, 3]").unwrap();

    assert!(JsonHistoryStore::new(&path).load().is_empty());
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonHistoryStore::new(dir.path().join("state").join("history.json"));
    let history = sample_history();

    store.save(&history).unwrap();

    assert_eq!(store.load(), history);
}

#[test]
fn save_overwrites_previous_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    let store = JsonHistoryStore::new(&path);

    store.save(&sample_history()).unwrap();
    let mut smaller = History::new();
    let only = RepositoryRecord::new("solo/repo", at(3, 0));
    smaller.insert(only.repo.clone(), only);
    store.save(&smaller).unwrap();

    assert_eq!(store.load(), smaller);
    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(leftovers, vec![std::ffi::OsString::from("history.json")]);
}

#[test]
fn saved_file_is_indented_json_keyed_by_identifier() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");

    JsonHistoryStore::new(&path).save(&sample_history()).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("{\n  \"astral-sh/uv\": {\n"));
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["astral-sh/uv"]["stars"], "54,321");
    assert_eq!(value["astral-sh/uv"]["url"], "https://github.com/astral-sh/uv");
}

#[test]
fn snapshot_store_always_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    let store = SnapshotHistoryStore::new(Some(path.clone()));

    store.save(&sample_history()).unwrap();

    assert!(store.load().is_empty());
    assert_eq!(JsonHistoryStore::new(&path).load(), sample_history());
}

#[test]
fn snapshot_store_without_file_writes_nothing() {
    let store = SnapshotHistoryStore::default();

    store.save(&sample_history()).unwrap();

    assert!(store.load().is_empty());
}

// Layout written by the earlier tracker: no `url`, space-separated
// `first_seen`.
const LEGACY_HISTORY: &str = r#"{
  "astral-sh/uv": {
    "repo": "astral-sh/uv",
    "description": "An extremely fast Python package and project manager, written in Rust.",
    "language": "Rust",
    "stars": "54,321",
    "first_seen": "2024-05-01 09:00:00"
  },
  "someone/dotfiles": {
    "repo": "someone/dotfiles",
    "description": "",
    "language": "Unknown",
    "stars": "812",
    "first_seen": "2024-05-02 18:00:00"
  }
}"#;

#[test]
fn legacy_history_file_loads_with_derived_url() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("github_trending_history.json");
    std::fs::write(&path, LEGACY_HISTORY).unwrap();

    let history = JsonHistoryStore::new(&path).load();

    assert_eq!(history.len(), 2);
    let uv = &history["astral-sh/uv"];
    assert_eq!(uv.url, "https://github.com/astral-sh/uv");
    assert_eq!(uv.stars, "54,321");
    assert_eq!(uv.first_seen, at(1, 9));
    assert_eq!(history["someone/dotfiles"].first_seen, at(2, 18));
    assert_eq!(history["someone/dotfiles"].url, "https://github.com/someone/dotfiles");
}

#[test]
fn iso_timestamps_are_accepted_on_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    std::fs::write(
        &path,
        r#"{"o/r": {"repo": "o/r", "url": "https://github.com/o/r", "description": "d",
            "language": "Go", "stars": "1", "first_seen": "2024-05-03T07:00:00"}}"#,
    )
    .unwrap();

    let history = JsonHistoryStore::new(&path).load();

    assert_eq!(history["o/r"].first_seen, at(3, 7));
}

#[test]
fn first_seen_is_written_space_separated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");

    JsonHistoryStore::new(&path).save(&sample_history()).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains(r#""first_seen": "2024-05-01 09:00:00""#));
}

#[test]
fn legacy_history_survives_a_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("github_trending_history.json");
    std::fs::write(&path, LEGACY_HISTORY).unwrap();
    let store = JsonHistoryStore::new(&path);

    let history = store.load();
    store.save(&history).unwrap();

    assert_eq!(store.load(), history);
}
