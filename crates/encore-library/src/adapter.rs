use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use encore_config::EncorePaths;
use encore_core::domain::{TrackId, TrackRecord};
use encore_core::ports::{CatalogError, CatalogProvider, PlaybackDevice, PlaybackError};

use crate::config::LibraryConfig;
use crate::export::{LibraryError, read_export};
use crate::player::CommandPlayer;

/// `CatalogProvider` and `PlaybackDevice` backed by a library export file and
/// an external player.
///
/// Keeps the file locations seen in the latest fetch so that playback can
/// resolve a `TrackRecord` (which carries no location) to something playable.
#[derive(Clone)]
pub struct MediaLibrary {
  export_file: PathBuf,
  player: CommandPlayer,
  // Key: TrackId, Value: file location from the last fetch
  locations: Arc<Mutex<HashMap<TrackId, PathBuf>>>,
}

impl MediaLibrary {
  pub fn new(export_file: PathBuf, player: CommandPlayer) -> Self {
    Self { export_file, player, locations: Arc::new(Mutex::new(HashMap::new())) }
  }

  pub fn from_config(cfg: &LibraryConfig, paths: &EncorePaths) -> Self {
    Self::new(cfg.export_path(paths), CommandPlayer::from_config(cfg))
  }

  pub fn export_file(&self) -> &PathBuf {
    &self.export_file
  }

  pub fn location_of(&self, id: &TrackId) -> Option<PathBuf> {
    self.locations.lock().ok().and_then(|guard| guard.get(id).cloned())
  }
}

#[async_trait]
impl CatalogProvider for MediaLibrary {
  async fn fetch_all_tracks(&self) -> Result<Vec<TrackRecord>, CatalogError> {
    let path = self.export_file.clone();
    debug!(path = %path.display(), "reading library export");

    // 1. Blocking read + decode off the async executor.
    let export = tokio::task::spawn_blocking(move || read_export(&path))
      .await
      .map_err(|e| CatalogError::Internal(format!("join error: {e}")))?
      .map_err(map_library_error)?;

    // 2. Map to domain records, collecting locations on the way.
    let mut locations = HashMap::with_capacity(export.tracks.len());
    let records: Vec<TrackRecord> = export
      .tracks
      .iter()
      .map(|entry| {
        let record = entry.to_record();
        if let Some(location) = &entry.location {
          locations.insert(record.id.clone(), location.clone());
        }
        record
      })
      .collect();

    // 3. Replace the location cache.
    {
      let mut guard =
        self.locations.lock().map_err(|_| CatalogError::Internal("location cache mutex poisoned".to_string()))?;
      *guard = locations;
    }

    info!(tracks = records.len(), "library export loaded");
    Ok(records)
  }
}

#[async_trait]
impl PlaybackDevice for MediaLibrary {
  async fn play_once(&self, track: &TrackRecord) -> Result<(), PlaybackError> {
    let location = self
      .location_of(&track.id)
      .ok_or_else(|| PlaybackError::Unplayable(format!("no file location known for {}", track.id)))?;

    self.player.play(&location).await
  }
}

fn map_library_error(err: LibraryError) -> CatalogError {
  match err {
    LibraryError::Io(e) if e.kind() == std::io::ErrorKind::PermissionDenied => CatalogError::Denied(e.to_string()),
    LibraryError::Io(e) => CatalogError::Io(e.to_string()),
    LibraryError::Json(e) => CatalogError::Format(e.to_string()),
  }
}
