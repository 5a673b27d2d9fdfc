use crate::domain::DuplicateGroup;
use crate::ports::IgnoredItems;

/// Quita de los resultados los grupos y las canciones ignoradas.
///
/// Un grupo que, tras quitar miembros, se queda con menos de dos miembros o
/// con un solo álbum deja de presentarse. El orden de ranking se mantiene.
pub fn apply_ignored<I>(groups: Vec<DuplicateGroup>, ignored: &I) -> Vec<DuplicateGroup>
where
  I: IgnoredItems + ?Sized,
{
  groups
    .into_iter()
    .filter(|g| !ignored.is_group_ignored(g.key()))
    .filter_map(|g| {
      if g.members().iter().any(|m| ignored.is_song_ignored(&m.id)) {
        g.without_members(|m| ignored.is_song_ignored(&m.id))
      } else {
        Some(g)
      }
    })
    .collect()
}
