use std::fmt;

use thiserror::Error;

use crate::domain::TrackId;

/// Motivo por el que un trabajo no llega a crearse porque no hay nada que hacer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NothingToReconcile {
  /// Modo `Match`: el destino ya tiene tantas reproducciones como el origen.
  AlreadyMatched,
  /// Modo `Add`: el origen tiene cero reproducciones.
  NothingToAdd,
}

impl fmt::Display for NothingToReconcile {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      NothingToReconcile::AlreadyMatched => f.write_str("target already matches the source play count"),
      NothingToReconcile::NothingToAdd => f.write_str("source has no plays to add"),
    }
  }
}

/// Error del núcleo de Encore.
///
/// Ninguna variante es fatal: todas se devuelven a la capa que compone el
/// núcleo (CLI, etc.), que decide cómo mostrarlas o si reintentar.
#[derive(Debug, Error)]
pub enum CoreError {
  #[error("source and target are the same track")]
  SameTrackSelected,

  #[error("nothing to reconcile: {0}")]
  NothingToReconcile(NothingToReconcile),

  #[error("scan superseded by a newer scan")]
  ScanSuperseded,

  #[error("a sync job is already running")]
  JobAlreadyRunning,

  #[error("catalog unavailable: {0}")]
  CatalogUnavailable(String),

  #[error("track not found: {0}")]
  TrackNotFound(TrackId),

  #[error("internal error: {0}")]
  Internal(String),
}

impl CoreError {
  /// `true` para los resultados informativos que no son un fallo del sistema.
  pub fn is_notice(&self) -> bool {
    matches!(self, CoreError::NothingToReconcile(_))
  }
}
