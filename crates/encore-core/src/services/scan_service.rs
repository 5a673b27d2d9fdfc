use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info, warn};

use crate::domain::{CatalogSnapshot, DuplicateGroup, ScanId};
use crate::errors::CoreError;
use crate::ports::{CatalogProvider, ProgressReporter};
use crate::services::duplicate_detection::detect_duplicates_until;

/// Resultado de un escaneo completo.
#[derive(Debug, Clone)]
pub struct ScanReport {
  pub scan_id: ScanId,
  /// Instantánea sobre la que se calcularon los grupos. Es la que debe usarse
  /// para elegir origen y destino.
  pub snapshot: Arc<CatalogSnapshot>,
  pub groups: Vec<DuplicateGroup>,
}

/// Orquesta escaneos: lee el catálogo y ejecuta la detección en un worker.
///
/// Solo hay un escaneo vigente. Un `scan()` nuevo reemplaza al anterior: el
/// viejo deja de notificar progreso en cuanto el nuevo empieza y termina con
/// [`CoreError::ScanSuperseded`].
pub struct ScanService<C, R>
where
  C: CatalogProvider,
  R: ProgressReporter + 'static,
{
  catalog: C,
  reporter: Arc<R>,
  gate: Arc<ScanGate>,
}

impl<C, R> ScanService<C, R>
where
  C: CatalogProvider,
  R: ProgressReporter + 'static,
{
  pub fn new(catalog: C, reporter: Arc<R>) -> Self {
    Self { catalog, reporter, gate: Arc::new(ScanGate::default()) }
  }

  pub fn catalog(&self) -> &C {
    &self.catalog
  }

  pub async fn scan(&self) -> Result<ScanReport, CoreError> {
    let scan_id = ScanId::new();
    self.gate.begin(scan_id);
    info!(%scan_id, "scan started");

    // Único punto de espera: la lectura del catálogo.
    let fetched = self.catalog.fetch_all_tracks().await;

    if !self.gate.is_current(scan_id) {
      debug!(%scan_id, "scan superseded while fetching catalog");
      return Err(CoreError::ScanSuperseded);
    }

    let tracks = fetched.map_err(|e| {
      warn!(%scan_id, error = %e, "catalog unavailable");
      CoreError::CatalogUnavailable(e.to_string())
    })?;

    let snapshot = Arc::new(CatalogSnapshot::new(tracks));
    let worker_snapshot = Arc::clone(&snapshot);
    let gate = Arc::clone(&self.gate);
    let reporter = Arc::clone(&self.reporter);

    let groups = tokio::task::spawn_blocking(move || {
      detect_duplicates_until(worker_snapshot.tracks(), |fraction| {
        gate.report(scan_id, reporter.as_ref(), fraction)
      })
    })
    .await
    .map_err(|e| CoreError::Internal(format!("detection worker failed: {e}")))?;

    match groups {
      Some(groups) => {
        info!(%scan_id, tracks = snapshot.len(), groups = groups.len(), "scan finished");
        Ok(ScanReport { scan_id, snapshot, groups })
      }
      None => {
        debug!(%scan_id, "scan superseded during detection");
        Err(CoreError::ScanSuperseded)
      }
    }
  }
}

/// Compuerta que decide qué escaneo puede notificar.
///
/// `begin` y `report` comparten el mismo lock, así que una vez que un escaneo
/// nuevo ha empezado ninguna notificación del anterior puede colarse.
#[derive(Debug, Default)]
struct ScanGate {
  current: Mutex<Option<ScanId>>,
}

impl ScanGate {
  fn begin(&self, scan_id: ScanId) {
    let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(previous) = current.replace(scan_id) {
      debug!(%previous, next = %scan_id, "superseding scan");
    }
  }

  fn is_current(&self, scan_id: ScanId) -> bool {
    *self.current.lock().unwrap_or_else(PoisonError::into_inner) == Some(scan_id)
  }

  /// Entrega la notificación si `scan_id` sigue vigente. Devuelve `false` si
  /// el escaneo ya fue reemplazado.
  fn report<R>(&self, scan_id: ScanId, reporter: &R, fraction: f64) -> bool
  where
    R: ProgressReporter + ?Sized,
  {
    let current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
    if *current != Some(scan_id) {
      return false;
    }
    reporter.scan_progress(scan_id, fraction);
    true
  }
}
