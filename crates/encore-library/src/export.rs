use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use encore_core::domain::{TrackId, TrackRecord};

#[derive(Debug, Error)]
pub enum LibraryError {
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("invalid library export: {0}")]
  Json(#[from] serde_json::Error),
}

/// On-disk library export: `{ "tracks": [ ... ] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryExport {
  pub tracks: Vec<ExportEntry>,
}

/// One catalog entry as the media library exports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportEntry {
  pub persistent_id: String,
  pub name: Option<String>,
  pub artist: Option<String>,
  pub album: Option<String>,
  #[serde(default)]
  pub play_count: u64,
  #[serde(default)]
  pub total_time_ms: u64,
  pub date_added: Option<DateTime<Utc>>,
  pub location: Option<PathBuf>,
}

impl ExportEntry {
  pub fn to_record(&self) -> TrackRecord {
    TrackRecord {
      id: TrackId::new(self.persistent_id.clone()),
      title: self.name.clone(),
      artist: self.artist.clone(),
      album: self.album.clone(),
      play_count: self.play_count,
      duration: self.total_time_ms as f64 / 1000.0,
      date_added: self.date_added.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
    }
  }
}

/// Reads and decodes an export file. Blocking: call it from a blocking worker.
///
/// Entries repeating an already seen `persistent_id` are dropped (first one
/// wins) so that every id in the resulting catalog is unique.
pub fn read_export(path: &Path) -> Result<LibraryExport, LibraryError> {
  let reader = BufReader::new(File::open(path)?);
  let mut export: LibraryExport = serde_json::from_reader(reader)?;

  let mut seen = HashSet::new();
  export.tracks.retain(|entry| {
    let fresh = seen.insert(entry.persistent_id.clone());
    if !fresh {
      warn!(id = %entry.persistent_id, "duplicate persistent id in export, keeping first entry");
    }
    fresh
  });

  Ok(export)
}
