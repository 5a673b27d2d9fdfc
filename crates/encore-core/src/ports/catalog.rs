use async_trait::async_trait;

use crate::domain::TrackRecord;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
  #[error("io error: {0}")]
  Io(String),

  #[error("unreadable catalog: {0}")]
  Format(String),

  #[error("catalog access denied: {0}")]
  Denied(String),

  #[error("internal error: {0}")]
  Internal(String),
}

/// Port del proveedor del catálogo de medios.
///
/// Una llamada equivale a una lectura completa de la biblioteca. Puede tardar
/// (I/O bloqueante en el adapter) y es el único punto de espera del escaneo.
/// El núcleo no reintenta: si falla, el error sube como `CatalogUnavailable`.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
  async fn fetch_all_tracks(&self) -> Result<Vec<TrackRecord>, CatalogError>;
}
