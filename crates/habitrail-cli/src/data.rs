//! JSON snapshot persistence for the CLI.
//!
//! Habits and completions live together in one `records.json` file
//! under the data directory. Each command loads the snapshot into a
//! memory store, works through the tracker, and writes the snapshot
//! back after mutations.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use habitrail_core::{storage, CompletionRecord, Habit, MemoryStore, Settings, Tracker};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    #[serde(default)]
    habits: Vec<Habit>,
    #[serde(default)]
    completions: Vec<CompletionRecord>,
}

fn snapshot_path() -> Result<PathBuf, std::io::Error> {
    Ok(storage::data_dir()?.join("records.json"))
}

/// Open a tracker backed by the on-disk snapshot. A missing file reads
/// as empty collections.
pub fn open_tracker() -> Result<Tracker<MemoryStore>, Box<dyn std::error::Error>> {
    let path = snapshot_path()?;
    let snapshot: Snapshot = match fs::read_to_string(&path) {
        Ok(content) => serde_json::from_str(&content)?,
        Err(_) => Snapshot::default(),
    };
    let store = MemoryStore::from_collections(snapshot.habits, snapshot.completions);
    let settings = Settings::load_or_default();
    Ok(Tracker::with_settings(store, &settings))
}

/// Write the tracker's collections back to the snapshot file.
pub fn save(tracker: &Tracker<MemoryStore>) -> Result<(), Box<dyn std::error::Error>> {
    let (habits, completions) = tracker.store().snapshot()?;
    let snapshot = Snapshot {
        habits,
        completions,
    };
    fs::write(snapshot_path()?, serde_json::to_string_pretty(&snapshot)?)?;
    Ok(())
}
