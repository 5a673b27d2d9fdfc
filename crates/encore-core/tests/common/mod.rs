//! Shared helpers for encore-core integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use encore_core::domain::{ScanId, SyncSnapshot, TrackId, TrackRecord};
use encore_core::ports::{CatalogError, CatalogProvider, PlaybackDevice, PlaybackError, ProgressReporter};
use tokio::sync::oneshot;

pub fn track(id: &str, title: &str, album: &str, plays: u64) -> TrackRecord {
  TrackRecord {
    id: TrackId::from(id),
    title: Some(title.to_owned()),
    artist: Some("Artist".to_owned()),
    album: Some(album.to_owned()),
    play_count: plays,
    duration: 200.0,
    date_added: DateTime::<Utc>::UNIX_EPOCH,
  }
}

/// Playback device that confirms every play immediately, except for an
/// optional play number where it pauses until the test releases it, and an
/// optional play number that fails.
pub struct GatedDevice {
  plays: AtomicU64,
  pause_at: Option<u64>,
  fail_at: Option<u64>,
  reached: Mutex<Option<oneshot::Sender<()>>>,
  release: tokio::sync::Mutex<Option<oneshot::Receiver<()>>>,
}

pub struct Gate {
  pub reached: oneshot::Receiver<()>,
  pub release: oneshot::Sender<()>,
}

impl GatedDevice {
  pub fn immediate() -> Self {
    Self {
      plays: AtomicU64::new(0),
      pause_at: None,
      fail_at: None,
      reached: Mutex::new(None),
      release: tokio::sync::Mutex::new(None),
    }
  }

  pub fn pausing_at(play: u64) -> (Self, Gate) {
    let (reached_tx, reached_rx) = oneshot::channel();
    let (release_tx, release_rx) = oneshot::channel();
    let device = Self {
      plays: AtomicU64::new(0),
      pause_at: Some(play),
      fail_at: None,
      reached: Mutex::new(Some(reached_tx)),
      release: tokio::sync::Mutex::new(Some(release_rx)),
    };
    (device, Gate { reached: reached_rx, release: release_tx })
  }

  pub fn failing_at(play: u64) -> Self {
    Self { fail_at: Some(play), ..Self::immediate() }
  }

  pub fn plays(&self) -> u64 {
    self.plays.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl PlaybackDevice for GatedDevice {
  async fn play_once(&self, _track: &TrackRecord) -> Result<(), PlaybackError> {
    let n = self.plays.fetch_add(1, Ordering::SeqCst) + 1;

    if self.fail_at == Some(n) {
      return Err(PlaybackError::Device("output device disappeared".into()));
    }

    if self.pause_at == Some(n) {
      if let Some(tx) = self.reached.lock().unwrap().take() {
        let _ = tx.send(());
      }
      let rx = self.release.lock().await.take();
      if let Some(rx) = rx {
        let _ = rx.await;
      }
    }

    tokio::task::yield_now().await;
    Ok(())
  }
}

/// Reporter that keeps every notification it receives.
#[derive(Default)]
pub struct RecordingReporter {
  pub scans: Mutex<Vec<(ScanId, f64)>>,
  pub syncs: Mutex<Vec<SyncSnapshot>>,
}

impl ProgressReporter for RecordingReporter {
  fn scan_progress(&self, scan: ScanId, fraction: f64) {
    self.scans.lock().unwrap().push((scan, fraction));
  }

  fn sync_progress(&self, snapshot: &SyncSnapshot) {
    self.syncs.lock().unwrap().push(*snapshot);
  }
}

/// Catalog whose first fetch blocks until released; later fetches return at once.
pub struct ScriptedCatalog {
  tracks: Vec<TrackRecord>,
  calls: AtomicUsize,
  entered: Mutex<Option<oneshot::Sender<()>>>,
  release: tokio::sync::Mutex<Option<oneshot::Receiver<()>>>,
}

impl ScriptedCatalog {
  pub fn new(tracks: Vec<TrackRecord>) -> Self {
    Self {
      tracks,
      calls: AtomicUsize::new(0),
      entered: Mutex::new(None),
      release: tokio::sync::Mutex::new(None),
    }
  }

  pub fn blocking_first(tracks: Vec<TrackRecord>) -> (Self, Gate) {
    let (entered_tx, entered_rx) = oneshot::channel();
    let (release_tx, release_rx) = oneshot::channel();
    let catalog = Self {
      tracks,
      calls: AtomicUsize::new(0),
      entered: Mutex::new(Some(entered_tx)),
      release: tokio::sync::Mutex::new(Some(release_rx)),
    };
    (catalog, Gate { reached: entered_rx, release: release_tx })
  }

  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl CatalogProvider for ScriptedCatalog {
  async fn fetch_all_tracks(&self) -> Result<Vec<TrackRecord>, CatalogError> {
    let call = self.calls.fetch_add(1, Ordering::SeqCst);

    if call == 0 {
      if let Some(tx) = self.entered.lock().unwrap().take() {
        let _ = tx.send(());
      }
      let rx = self.release.lock().await.take();
      if let Some(rx) = rx {
        let _ = rx.await;
      }
    }

    Ok(self.tracks.clone())
  }
}

pub struct FailingCatalog;

#[async_trait]
impl CatalogProvider for FailingCatalog {
  async fn fetch_all_tracks(&self) -> Result<Vec<TrackRecord>, CatalogError> {
    Err(CatalogError::Io("library volume not mounted".into()))
  }
}
