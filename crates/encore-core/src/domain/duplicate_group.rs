use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::group_key::GroupKey;
use crate::domain::track::TrackRecord;

/// Grupo de copias de la misma canción repartidas en más de un álbum.
///
/// Invariantes (garantizadas por [`DuplicateGroup::build`]):
/// - `members.len() >= 2`
/// - al menos dos álbumes distintos entre los miembros
/// - `members` ordenado por `play_count` descendente, estable respecto al
///   orden del catálogo
///
/// Se crea una vez por escaneo y no se modifica. Al deserializar se vuelven a
/// comprobar las invariantes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDuplicateGroup")]
pub struct DuplicateGroup {
  key: GroupKey,
  title: String,
  artist: String,
  members: Vec<TrackRecord>,
}

impl DuplicateGroup {
  /// Construye el grupo a partir de los miembros en orden de catálogo.
  ///
  /// El título y el artista que se muestran salen del primer miembro. Devuelve
  /// `None` si la partición no cumple las invariantes de un grupo duplicado.
  pub fn build(key: GroupKey, mut members: Vec<TrackRecord>) -> Option<Self> {
    if !is_duplicate_candidate(&members) {
      return None;
    }

    let first = members.first()?;
    let title = first.display_title().to_owned();
    let artist = first.display_artist().to_owned();

    // sort_by es estable: los empates conservan el orden del catálogo.
    members.sort_by(|a, b| b.play_count.cmp(&a.play_count));

    Some(Self { key, title, artist, members })
  }

  /// Devuelve una copia sin los miembros que cumplan `drop`, o `None` si lo
  /// que queda ya no es un grupo duplicado.
  pub fn without_members<F>(&self, mut drop: F) -> Option<Self>
  where
    F: FnMut(&TrackRecord) -> bool,
  {
    let members: Vec<TrackRecord> = self.members.iter().filter(|m| !drop(m)).cloned().collect();

    if !is_duplicate_candidate(&members) {
      return None;
    }

    Some(Self { key: self.key.clone(), title: self.title.clone(), artist: self.artist.clone(), members })
  }

  pub fn key(&self) -> &GroupKey {
    &self.key
  }

  pub fn title(&self) -> &str {
    &self.title
  }

  pub fn artist(&self) -> &str {
    &self.artist
  }

  pub fn members(&self) -> &[TrackRecord] {
    &self.members
  }

  /// Miembro con más reproducciones; en caso de empate, el primero.
  pub fn source_candidate(&self) -> &TrackRecord {
    // members nunca está vacío y ya viene ordenado de mayor a menor.
    &self.members[0]
  }

  /// Miembros con estrictamente menos reproducciones que el candidato origen.
  pub fn target_candidates(&self) -> impl Iterator<Item = &TrackRecord> {
    let max = self.source_candidate().play_count;
    self.members.iter().filter(move |m| m.play_count < max)
  }

  pub fn has_play_count_spread(&self) -> bool {
    self.impact() > 0
  }

  /// Diferencia entre el máximo y el mínimo de reproducciones del grupo.
  pub fn impact(&self) -> u64 {
    let max = self.members.iter().map(|m| m.play_count).max().unwrap_or(0);
    let min = self.members.iter().map(|m| m.play_count).min().unwrap_or(0);
    max - min
  }

  pub fn distinct_albums(&self) -> usize {
    distinct_album_count(&self.members)
  }
}

/// Forma serializada, sin validar.
#[derive(Deserialize)]
struct RawDuplicateGroup {
  key: GroupKey,
  title: String,
  artist: String,
  members: Vec<TrackRecord>,
}

impl TryFrom<RawDuplicateGroup> for DuplicateGroup {
  type Error = String;

  fn try_from(raw: RawDuplicateGroup) -> Result<Self, Self::Error> {
    let RawDuplicateGroup { key, title, artist, mut members } = raw;
    if !is_duplicate_candidate(&members) {
      return Err(format!("group {key} needs at least two members on two distinct albums"));
    }

    members.sort_by(|a, b| b.play_count.cmp(&a.play_count));
    Ok(Self { key, title, artist, members })
  }
}

pub(crate) fn distinct_album_count(members: &[TrackRecord]) -> usize {
  members.iter().map(TrackRecord::display_album).collect::<HashSet<_>>().len()
}

fn is_duplicate_candidate(members: &[TrackRecord]) -> bool {
  members.len() >= 2 && distinct_album_count(members) >= 2
}
