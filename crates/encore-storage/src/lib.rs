pub mod config;
pub mod models;

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info};

use encore_core::domain::{DuplicateGroup, GroupKey, TrackId, TrackRecord};
use encore_core::ports::IgnoredItems;

pub use config::StorageConfig;
pub use models::{IgnoredFile, IgnoredGroup, IgnoredSong};

use crate::models::FORMAT_VERSION;

#[derive(Debug, Error)]
pub enum StorageError {
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("corrupt ignored-items file: {0}")]
  Corrupt(#[from] serde_json::Error),

  #[error("unsupported ignored-items format version {0}")]
  UnsupportedVersion(u32),
}

/// File-backed store of ignored songs and groups.
///
/// Entries are kept in insertion order and written back whole, so a load/save
/// cycle is lossless (timestamps included). Changes stay in memory until
/// [`IgnoredStore::save`].
#[derive(Debug)]
pub struct IgnoredStore {
  path: PathBuf,
  songs: Vec<IgnoredSong>,
  groups: Vec<IgnoredGroup>,
  song_index: HashSet<TrackId>,
  group_index: HashMap<GroupKey, usize>,
}

impl IgnoredStore {
  /// Opens the store at `path`; a missing file is an empty store.
  pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
    let path = path.into();

    let file = match fs::read_to_string(&path) {
      Ok(content) => serde_json::from_str::<IgnoredFile>(&content)?,
      Err(e) if e.kind() == ErrorKind::NotFound => {
        debug!(path = %path.display(), "no ignored-items file yet");
        IgnoredFile::default()
      }
      Err(e) => return Err(e.into()),
    };

    if file.version > FORMAT_VERSION {
      return Err(StorageError::UnsupportedVersion(file.version));
    }

    let mut store =
      Self { path, songs: Vec::new(), groups: Vec::new(), song_index: HashSet::new(), group_index: HashMap::new() };
    for song in file.songs {
      store.insert_song(song);
    }
    for group in file.groups {
      store.insert_group(group);
    }

    Ok(store)
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn songs(&self) -> &[IgnoredSong] {
    &self.songs
  }

  pub fn groups(&self) -> &[IgnoredGroup] {
    &self.groups
  }

  /// Returns `false` if the song was already ignored; its original timestamp
  /// is kept.
  pub fn ignore_song(&mut self, track: &TrackRecord) -> bool {
    if self.song_index.contains(&track.id) {
      return false;
    }
    info!(id = %track.id, "ignoring song");
    self.insert_song(IgnoredSong::from_track(track, Utc::now()))
  }

  pub fn unignore_song(&mut self, id: &TrackId) -> bool {
    if !self.song_index.remove(id) {
      return false;
    }
    self.songs.retain(|s| &s.id != id);
    info!(%id, "song no longer ignored");
    true
  }

  pub fn ignore_group(&mut self, group: &DuplicateGroup) -> bool {
    if self.group_index.contains_key(group.key()) {
      return false;
    }
    info!(key = %group.key(), "ignoring group");
    self.insert_group(IgnoredGroup::from_group(group, Utc::now()))
  }

  /// Ignores a key without a group at hand (e.g. typed by the user).
  pub fn ignore_group_key(&mut self, key: GroupKey) -> bool {
    if self.group_index.contains_key(&key) {
      return false;
    }
    info!(%key, "ignoring group key");
    self.insert_group(IgnoredGroup::from_key(key, Utc::now()))
  }

  pub fn unignore_group(&mut self, key: &GroupKey) -> bool {
    if self.group_index.remove(key).is_none() {
      return false;
    }
    self.groups.retain(|g| &g.key != key);
    self.reindex_groups();
    info!(%key, "group no longer ignored");
    true
  }

  pub fn save(&self) -> Result<(), StorageError> {
    let file = IgnoredFile { version: FORMAT_VERSION, songs: self.songs.clone(), groups: self.groups.clone() };
    let json = serde_json::to_string_pretty(&file)?;
    encore_config::atomic_write_str(&self.path, &json)?;
    debug!(path = %self.path.display(), songs = self.songs.len(), groups = self.groups.len(), "ignored items saved");
    Ok(())
  }

  fn insert_song(&mut self, song: IgnoredSong) -> bool {
    if !self.song_index.insert(song.id.clone()) {
      return false;
    }
    self.songs.push(song);
    true
  }

  fn insert_group(&mut self, group: IgnoredGroup) -> bool {
    if self.group_index.contains_key(&group.key) {
      return false;
    }
    self.group_index.insert(group.key.clone(), self.groups.len());
    self.groups.push(group);
    true
  }

  fn reindex_groups(&mut self) {
    self.group_index = self.groups.iter().enumerate().map(|(i, g)| (g.key.clone(), i)).collect();
  }
}

impl IgnoredItems for IgnoredStore {
  fn is_song_ignored(&self, id: &TrackId) -> bool {
    self.song_index.contains(id)
  }

  fn is_group_ignored(&self, key: &GroupKey) -> bool {
    self.group_index.contains_key(key)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::{DateTime, TimeZone};
  use encore_core::services::{apply_ignored, detect_duplicates};
  use tempfile::tempdir;

  fn track(id: &str, album: &str, plays: u64) -> TrackRecord {
    TrackRecord {
      id: TrackId::from(id),
      title: Some("Harbor".into()),
      artist: Some("Lumen".into()),
      album: Some(album.into()),
      play_count: plays,
      duration: 240.0,
      date_added: DateTime::<Utc>::UNIX_EPOCH,
    }
  }

  #[test]
  fn missing_file_opens_empty() {
    let tmp = tempdir().unwrap();
    let store = IgnoredStore::open(tmp.path().join("ignored.json")).unwrap();
    assert!(store.songs().is_empty());
    assert!(store.groups().is_empty());
  }

  #[test]
  fn round_trip_is_lossless() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("ignored.json");

    let groups = detect_duplicates(&[track("a", "Single", 9), track("b", "LP", 1)], |_| {});
    let mut store = IgnoredStore::open(&path).unwrap();
    assert!(store.ignore_song(&track("x", "Live", 4)));
    assert!(store.ignore_group(&groups[0]));
    store.save().unwrap();

    let reopened = IgnoredStore::open(&path).unwrap();
    assert_eq!(reopened.songs(), store.songs());
    assert_eq!(reopened.groups(), store.groups());
    assert_eq!(reopened.groups()[0].member_ids, vec![TrackId::from("a"), TrackId::from("b")]);
    assert!(reopened.is_song_ignored(&TrackId::from("x")));
    assert!(reopened.is_group_ignored(&GroupKey::new("Harbor", "Lumen")));
  }

  #[test]
  fn reignoring_keeps_original_timestamp() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("ignored.json");
    let when = Utc.with_ymd_and_hms(2022, 5, 1, 8, 30, 0).unwrap();
    let file = IgnoredFile {
      version: FORMAT_VERSION,
      songs: vec![IgnoredSong::from_track(&track("x", "Live", 4), when)],
      groups: vec![],
    };
    fs::write(&path, serde_json::to_string(&file).unwrap()).unwrap();

    let mut store = IgnoredStore::open(&path).unwrap();
    assert!(!store.ignore_song(&track("x", "Live", 4)));
    assert_eq!(store.songs()[0].ignored_at, when);
  }

  #[test]
  fn unignore_removes_entries() {
    let tmp = tempdir().unwrap();
    let mut store = IgnoredStore::open(tmp.path().join("ignored.json")).unwrap();
    let first = GroupKey::from_raw("one|band");
    let second = GroupKey::from_raw("two|band");

    store.ignore_group_key(first.clone());
    store.ignore_group_key(second.clone());
    store.ignore_song(&track("x", "Live", 4));

    assert!(store.unignore_group(&first));
    assert!(!store.unignore_group(&first));
    assert!(store.is_group_ignored(&second));
    assert!(store.unignore_song(&TrackId::from("x")));
    assert!(!store.is_song_ignored(&TrackId::from("x")));
  }

  #[test]
  fn store_filters_detection_results() {
    let tmp = tempdir().unwrap();
    let mut store = IgnoredStore::open(tmp.path().join("ignored.json")).unwrap();
    let catalog = [track("a", "Single", 9), track("b", "LP", 1), track("c", "Live", 3)];

    store.ignore_song(&catalog[0]);
    let groups = apply_ignored(detect_duplicates(&catalog, |_| {}), &store);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].source_candidate().id.as_str(), "c");
  }

  #[test]
  fn newer_format_is_rejected() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("ignored.json");
    fs::write(&path, r#"{ "version": 99 }"#).unwrap();
    assert!(matches!(IgnoredStore::open(&path), Err(StorageError::UnsupportedVersion(99))));
  }
}
