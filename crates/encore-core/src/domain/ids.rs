use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identificador persistente de una pista dentro de la biblioteca.
///
/// Lo asigna el proveedor del catálogo y se trata como opaco: solo se compara
/// por igualdad. Debe ser estable entre escaneos y entre sesiones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
  pub fn new(raw: impl Into<String>) -> Self {
    TrackId(raw.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl From<&str> for TrackId {
  fn from(raw: &str) -> Self {
    TrackId(raw.to_owned())
  }
}

impl From<String> for TrackId {
  fn from(raw: String) -> Self {
    TrackId(raw)
  }
}

impl fmt::Display for TrackId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// Identificador de un trabajo de sincronización.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(Uuid);

impl JobId {
  pub fn new() -> Self {
    JobId(Uuid::new_v4())
  }

  pub fn as_uuid(&self) -> Uuid {
    self.0
  }
}

impl Default for JobId {
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Display for JobId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.fmt(f)
  }
}

/// Identificador de una ejecución de escaneo.
///
/// Cada llamada a `ScanService::scan` genera uno nuevo; las notificaciones de
/// progreso van etiquetadas con él para que el consumidor pueda descartar las
/// de escaneos anteriores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanId(Uuid);

impl ScanId {
  pub fn new() -> Self {
    ScanId(Uuid::new_v4())
  }

  pub fn as_uuid(&self) -> Uuid {
    self.0
  }
}

impl Default for ScanId {
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Display for ScanId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.fmt(f)
  }
}
