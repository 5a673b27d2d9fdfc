use std::collections::HashMap;

use crate::domain::group_key::normalize;
use crate::domain::{DuplicateGroup, GroupKey, TrackRecord};

/// Número de notificaciones de progreso intermedias por escaneo (aprox.).
const PROGRESS_STEPS: usize = 100;

/// Detecta grupos de duplicados en una instantánea del catálogo.
///
/// `on_progress` recibe fracciones no decrecientes en `[0, 1]` según las
/// entradas procesadas; la última llamada es siempre exactamente `1.0`.
///
/// El resultado está ordenado por `impact` descendente. Los empates conservan
/// el orden en que se descubrió cada partición, así que dos ejecuciones sobre
/// el mismo catálogo dan exactamente el mismo resultado.
pub fn detect_duplicates<F>(catalog: &[TrackRecord], mut on_progress: F) -> Vec<DuplicateGroup>
where
  F: FnMut(f64),
{
  let groups = detect_duplicates_until(catalog, |fraction| {
    on_progress(fraction);
    true
  });

  // Sin interrupción siempre hay resultado.
  groups.unwrap_or_default()
}

/// Variante interrumpible de [`detect_duplicates`].
///
/// Si `on_progress` devuelve `false` el recorrido se detiene y el resultado es
/// `None`. Se usa para abandonar escaneos reemplazados por uno más nuevo.
pub fn detect_duplicates_until<F>(catalog: &[TrackRecord], mut on_progress: F) -> Option<Vec<DuplicateGroup>>
where
  F: FnMut(f64) -> bool,
{
  let total = catalog.len();
  let step = (total / PROGRESS_STEPS).max(1);

  // 1) Particionar por GroupKey en orden de catálogo.
  let mut index: HashMap<GroupKey, usize> = HashMap::new();
  let mut partitions: Vec<(GroupKey, Vec<TrackRecord>)> = Vec::new();

  for (i, track) in catalog.iter().enumerate() {
    if is_matchable(track) {
      let key = track.group_key();
      match index.get(&key) {
        Some(&slot) => partitions[slot].1.push(track.clone()),
        None => {
          index.insert(key.clone(), partitions.len());
          partitions.push((key, vec![track.clone()]));
        }
      }
    }

    let processed = i + 1;
    if processed < total && processed % step == 0 && !on_progress(processed as f64 / total as f64) {
      return None;
    }
  }

  // 2) y 3) Filtrar y construir grupos.
  let mut groups: Vec<DuplicateGroup> =
    partitions.into_iter().filter_map(|(key, members)| DuplicateGroup::build(key, members)).collect();

  // 4) Orden estable por impacto descendente.
  groups.sort_by(|a, b| b.impact().cmp(&a.impact()));

  // 5) Cierre.
  if !on_progress(1.0) {
    return None;
  }

  Some(groups)
}

/// Las pistas con título o artista vacío tras normalizar no se pueden
/// emparejar y quedan fuera por completo.
fn is_matchable(track: &TrackRecord) -> bool {
  !normalize(track.display_title()).is_empty() && !normalize(track.display_artist()).is_empty()
}
