use crate::domain::{ScanId, SyncSnapshot};

/// Port de salida para notificar progreso a la capa que compone el núcleo.
///
/// Se llama desde el worker del escaneo y desde el bucle del controlador, así
/// que las implementaciones no deben bloquear.
pub trait ProgressReporter: Send + Sync {
  /// Fracción en `[0, 1]`; la última notificación de un escaneo es `1.0`.
  fn scan_progress(&self, scan: ScanId, fraction: f64);

  fn sync_progress(&self, _snapshot: &SyncSnapshot) {}
}

/// Reporter que descarta todo.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {
  fn scan_progress(&self, _scan: ScanId, _fraction: f64) {}
}
