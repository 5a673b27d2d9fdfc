use serde::{Deserialize, Serialize};
use std::fmt;

/// Clave de agrupación: `normalize(title) + "|" + normalize(artist)`.
///
/// La normalización recorta espacios en los extremos y pasa a minúsculas. Es
/// pura y total: nunca falla, ni siquiera con cadenas vacías.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupKey(String);

impl GroupKey {
  pub fn new(title: &str, artist: &str) -> Self {
    GroupKey(format!("{}|{}", normalize(title), normalize(artist)))
  }

  /// Reconstruye una clave ya calculada (p. ej. leída de disco o de la CLI).
  pub fn from_raw(raw: impl Into<String>) -> Self {
    GroupKey(raw.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for GroupKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

pub fn normalize(value: &str) -> String {
  value.trim().to_lowercase()
}
