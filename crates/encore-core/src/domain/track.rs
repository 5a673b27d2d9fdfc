use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::group_key::GroupKey;
use crate::domain::ids::TrackId;

/// Valor que se muestra (y se compara) cuando falta un campo de texto.
pub const UNKNOWN: &str = "Unknown";

/// Instantánea inmutable de una entrada del catálogo.
///
/// Se crea en cada lectura del catálogo y nunca se modifica. Dos registros con
/// el mismo título y artista pero distinto `id` son justamente el caso de
/// "copia duplicada" que detecta el motor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
  pub id: TrackId,
  /// `None` es distinto de `Some("")`: el primero es "Unknown", el segundo
  /// queda fuera de la detección.
  pub title: Option<String>,
  pub artist: Option<String>,
  pub album: Option<String>,
  pub play_count: u64,
  /// Duración en segundos.
  pub duration: f64,
  pub date_added: DateTime<Utc>,
}

impl TrackRecord {
  pub fn display_title(&self) -> &str {
    self.title.as_deref().unwrap_or(UNKNOWN)
  }

  pub fn display_artist(&self) -> &str {
    self.artist.as_deref().unwrap_or(UNKNOWN)
  }

  pub fn display_album(&self) -> &str {
    self.album.as_deref().unwrap_or(UNKNOWN)
  }

  pub fn group_key(&self) -> GroupKey {
    GroupKey::new(self.display_title(), self.display_artist())
  }
}

/// Lista inmutable de pistas obtenida en una única lectura del catálogo.
///
/// Se comparte entre el motor de detección y el controlador como
/// `Arc<CatalogSnapshot>`; nadie la modifica después de crearla.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
  tracks: Vec<TrackRecord>,
  fetched_at: DateTime<Utc>,
}

impl CatalogSnapshot {
  pub fn new(tracks: Vec<TrackRecord>) -> Self {
    Self { tracks, fetched_at: Utc::now() }
  }

  pub fn with_timestamp(tracks: Vec<TrackRecord>, fetched_at: DateTime<Utc>) -> Self {
    Self { tracks, fetched_at }
  }

  pub fn tracks(&self) -> &[TrackRecord] {
    &self.tracks
  }

  pub fn fetched_at(&self) -> DateTime<Utc> {
    self.fetched_at
  }

  pub fn len(&self) -> usize {
    self.tracks.len()
  }

  pub fn is_empty(&self) -> bool {
    self.tracks.is_empty()
  }

  pub fn find(&self, id: &TrackId) -> Option<&TrackRecord> {
    self.tracks.iter().find(|t| &t.id == id)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn record(title: Option<&str>, artist: Option<&str>) -> TrackRecord {
    TrackRecord {
      id: TrackId::from("t1"),
      title: title.map(str::to_owned),
      artist: artist.map(str::to_owned),
      album: None,
      play_count: 0,
      duration: 180.0,
      date_added: DateTime::<Utc>::UNIX_EPOCH,
    }
  }

  #[test]
  fn missing_fields_display_as_unknown() {
    let t = record(None, None);
    assert_eq!(t.display_title(), "Unknown");
    assert_eq!(t.display_artist(), "Unknown");
    assert_eq!(t.display_album(), "Unknown");
    assert_eq!(t.group_key().as_str(), "unknown|unknown");
  }

  #[test]
  fn empty_title_is_not_unknown() {
    let t = record(Some(""), Some("Artist"));
    assert_eq!(t.display_title(), "");
    assert_eq!(t.group_key().as_str(), "|artist");
  }

  #[test]
  fn snapshot_lookup_by_id() {
    let snapshot = CatalogSnapshot::new(vec![record(Some("a"), Some("b"))]);
    assert!(snapshot.find(&TrackId::from("t1")).is_some());
    assert!(snapshot.find(&TrackId::from("missing")).is_none());
    assert_eq!(snapshot.len(), 1);
  }
}
