use crate::domain::{GroupKey, TrackId};

/// Predicados del colaborador de elementos ignorados.
///
/// La persistencia vive fuera del núcleo; aquí solo se consulta.
pub trait IgnoredItems {
  fn is_song_ignored(&self, id: &TrackId) -> bool;
  fn is_group_ignored(&self, key: &GroupKey) -> bool;
}

/// Implementación vacía: no ignora nada.
#[derive(Debug, Clone, Copy, Default)]
pub struct NothingIgnored;

impl IgnoredItems for NothingIgnored {
  fn is_song_ignored(&self, _id: &TrackId) -> bool {
    false
  }

  fn is_group_ignored(&self, _key: &GroupKey) -> bool {
    false
  }
}
