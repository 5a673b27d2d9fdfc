//! Property-based tests for the duplicate detection engine.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use encore_core::domain::{TrackId, TrackRecord};
use encore_core::services::detect_duplicates;
use proptest::prelude::*;

// ===== Helpers =====

fn arbitrary_fields() -> impl Strategy<Value = (Option<String>, Option<String>, Option<String>, u64)> {
  (
    proptest::option::of(prop::sample::select(vec!["Song", " song", "SONG ", "Other", "", "  "])),
    proptest::option::of(prop::sample::select(vec!["Band", "band ", "Solo", ""])),
    proptest::option::of(prop::sample::select(vec!["Single", "Album", "Live", "single"])),
    0u64..200,
  )
    .prop_map(|(title, artist, album, plays)| {
      (title.map(str::to_owned), artist.map(str::to_owned), album.map(str::to_owned), plays)
    })
}

fn arbitrary_catalog() -> impl Strategy<Value = Vec<TrackRecord>> {
  prop::collection::vec(arbitrary_fields(), 0..60).prop_map(|rows| {
    rows
      .into_iter()
      .enumerate()
      .map(|(i, (title, artist, album, play_count))| TrackRecord {
        id: TrackId::new(format!("track-{i}")),
        title,
        artist,
        album,
        play_count,
        duration: 180.0,
        date_added: DateTime::<Utc>::UNIX_EPOCH,
      })
      .collect()
  })
}

// ===== Property Tests =====

proptest! {
  /// Property: every track appears in at most one group
  #[test]
  fn groups_are_disjoint(catalog in arbitrary_catalog()) {
    let groups = detect_duplicates(&catalog, |_| {});
    let mut seen = HashSet::new();
    for group in &groups {
      for member in group.members() {
        prop_assert!(seen.insert(member.id.clone()), "{} appears twice", member.id);
      }
    }
  }

  /// Property: every reported group honours the size and album invariants
  #[test]
  fn groups_have_two_members_and_two_albums(catalog in arbitrary_catalog()) {
    for group in detect_duplicates(&catalog, |_| {}) {
      prop_assert!(group.members().len() >= 2);
      prop_assert!(group.distinct_albums() >= 2);
      prop_assert!(group.members().windows(2).all(|w| w[0].play_count >= w[1].play_count));
      prop_assert!(group.members().iter().all(|m| m.group_key() == *group.key()));
    }
  }

  /// Property: groups are ranked by impact, highest first
  #[test]
  fn groups_are_ranked_by_impact(catalog in arbitrary_catalog()) {
    let groups = detect_duplicates(&catalog, |_| {});
    prop_assert!(groups.windows(2).all(|w| w[0].impact() >= w[1].impact()));
  }

  /// Property: every qualifying partition is reported
  #[test]
  fn no_qualifying_partition_is_missed(catalog in arbitrary_catalog()) {
    let mut partitions: HashMap<String, Vec<&TrackRecord>> = HashMap::new();
    for t in &catalog {
      if t.display_title().trim().is_empty() || t.display_artist().trim().is_empty() {
        continue;
      }
      partitions.entry(t.group_key().as_str().to_owned()).or_default().push(t);
    }
    let expected = partitions
      .values()
      .filter(|members| {
        members.len() >= 2 && members.iter().map(|m| m.display_album()).collect::<HashSet<_>>().len() >= 2
      })
      .count();

    prop_assert_eq!(detect_duplicates(&catalog, |_| {}).len(), expected);
  }

  /// Property: detection is deterministic and progress ends at exactly 1.0
  #[test]
  fn detection_is_deterministic(catalog in arbitrary_catalog()) {
    let mut progress = Vec::new();
    let first = detect_duplicates(&catalog, |f| progress.push(f));
    let second = detect_duplicates(&catalog, |_| {});

    prop_assert_eq!(first, second);
    prop_assert_eq!(progress.last().copied(), Some(1.0));
    prop_assert!(progress.windows(2).all(|w| w[0] <= w[1]));
  }
}
