use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use encore_core::domain::{DuplicateGroup, GroupKey, TrackId, TrackRecord};

pub const FORMAT_VERSION: u32 = 1;

/// Song the user dismissed from every group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IgnoredSong {
  pub id: TrackId,
  pub title: String,
  pub artist: String,
  pub album: String,
  pub ignored_at: DateTime<Utc>,
}

impl IgnoredSong {
  pub fn from_track(track: &TrackRecord, ignored_at: DateTime<Utc>) -> Self {
    Self {
      id: track.id.clone(),
      title: track.display_title().to_owned(),
      artist: track.display_artist().to_owned(),
      album: track.display_album().to_owned(),
      ignored_at,
    }
  }
}

/// Whole group the user dismissed.
///
/// Display fields and member ids are stored as they were when ignored, so
/// listing ignored groups never needs the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IgnoredGroup {
  pub key: GroupKey,
  pub title: String,
  pub artist: String,
  pub member_ids: Vec<TrackId>,
  pub ignored_at: DateTime<Utc>,
}

impl IgnoredGroup {
  pub fn from_group(group: &DuplicateGroup, ignored_at: DateTime<Utc>) -> Self {
    Self {
      key: group.key().clone(),
      title: group.title().to_owned(),
      artist: group.artist().to_owned(),
      member_ids: group.members().iter().map(|m| m.id.clone()).collect(),
      ignored_at,
    }
  }

  /// Entry for a key the catalog no longer (or not yet) produces a group for.
  pub fn from_key(key: GroupKey, ignored_at: DateTime<Utc>) -> Self {
    Self { key, title: String::new(), artist: String::new(), member_ids: Vec::new(), ignored_at }
  }
}

/// File layout of the ignored-items store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IgnoredFile {
  pub version: u32,
  #[serde(default)]
  pub songs: Vec<IgnoredSong>,
  #[serde(default)]
  pub groups: Vec<IgnoredGroup>,
}

impl Default for IgnoredFile {
  fn default() -> Self {
    Self { version: FORMAT_VERSION, songs: Vec::new(), groups: Vec::new() }
  }
}
