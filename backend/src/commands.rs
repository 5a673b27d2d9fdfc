use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use encore_core::domain::{CatalogSnapshot, DuplicateGroup, GroupKey, TrackId};
use encore_core::ports::CatalogProvider;
use encore_core::services::{ScanService, SyncController, apply_ignored};
use encore_library::MediaLibrary;
use encore_storage::IgnoredStore;

use crate::cli::{Command, IgnoreTarget, ScanArgs, SyncArgs};
use crate::config::AppConfig;
use crate::infrastructure::reporter::LogReporter;

type LibraryScanService = ScanService<MediaLibrary, LogReporter>;
type LibrarySyncController = SyncController<MediaLibrary, LogReporter>;

/// Adapters wired once per invocation.
pub struct App {
  cfg: AppConfig,
  library: MediaLibrary,
  reporter: Arc<LogReporter>,
}

impl App {
  pub fn new(cfg: AppConfig) -> Self {
    let library = MediaLibrary::from_config(&cfg.library, &cfg.paths);
    Self { cfg, library, reporter: Arc::new(LogReporter::new()) }
  }

  pub async fn dispatch(&self, command: Command) -> Result<()> {
    match command {
      Command::Scan(args) => self.scan(args).await,
      Command::Sync(args) => self.sync(args).await,
      Command::Ignore { item } => self.ignore(item).await,
      Command::Unignore { item } => self.unignore(item),
      Command::Ignored => self.list_ignored(),
      Command::Config => {
        self.show_config();
        Ok(())
      }
    }
  }

  fn open_store(&self) -> Result<IgnoredStore> {
    let path = self.cfg.storage.ignored_path(&self.cfg.paths);
    IgnoredStore::open(&path).with_context(|| format!("cannot open ignored items at {}", path.display()))
  }

  fn scan_service(&self) -> LibraryScanService {
    ScanService::new(self.library.clone(), Arc::clone(&self.reporter))
  }

  /// Scans the library; unless `all`, ignored songs and groups are filtered out.
  pub async fn duplicate_groups(&self, all: bool) -> Result<Vec<DuplicateGroup>> {
    let report = self.scan_service().scan().await?;
    if all {
      return Ok(report.groups);
    }

    let store = self.open_store()?;
    Ok(apply_ignored(report.groups, &store))
  }

  async fn scan(&self, args: ScanArgs) -> Result<()> {
    let groups = self.duplicate_groups(args.all).await?;

    if args.json {
      println!("{}", serde_json::to_string_pretty(&groups)?);
      return Ok(());
    }

    if groups.is_empty() {
      println!("No duplicates found.");
      return Ok(());
    }

    for group in &groups {
      print_group(group);
    }
    println!("{} group(s)", groups.len());
    Ok(())
  }

  async fn sync(&self, args: SyncArgs) -> Result<()> {
    // 1. Fresh snapshot to resolve both ids.
    let tracks = self.library.fetch_all_tracks().await.context("cannot read the library")?;
    let snapshot = CatalogSnapshot::new(tracks);

    // 2. Preflight. "Nothing to do" is a notice, not a failure.
    let controller: LibrarySyncController =
      SyncController::new(Arc::new(self.library.clone()), Arc::clone(&self.reporter));
    let job = match controller.prepare_from_snapshot(
      &snapshot,
      &TrackId::from(args.source),
      &TrackId::from(args.target),
      args.mode,
    ) {
      Ok(job) => job,
      Err(e) if e.is_notice() => {
        println!("{e}");
        return Ok(());
      }
      Err(e) => return Err(e.into()),
    };

    println!(
      "Playing \"{}\" ({}) {} time(s) to reach {} plays",
      job.target().display_title(),
      job.target().display_album(),
      job.required_iterations(),
      job.goal_play_count()
    );

    // 3. Run, with Ctrl-C mapped to a cooperative cancel.
    let handle = controller.start(job)?;

    let canceller = handle.canceller();
    let interrupt = tokio::spawn(async move {
      if tokio::signal::ctrl_c().await.is_ok() {
        warn!("interrupt received, stopping after the current play");
        canceller.cancel();
      }
    });

    let mut progress = handle.subscribe();
    let printer = tokio::spawn(async move {
      while progress.changed().await.is_ok() {
        let snap = *progress.borrow_and_update();
        eprintln!("[{}/{}] {}", snap.completed_iterations, snap.required_iterations, snap.state);
      }
    });

    let summary = handle.wait().await;
    interrupt.abort();
    let _ = printer.await;

    let summary = summary?;
    info!(job = %summary.job_id, state = %summary.state, plays = summary.plays_added, "sync finished");
    println!("{summary}");
    Ok(())
  }

  async fn ignore(&self, item: IgnoreTarget) -> Result<()> {
    let mut store = self.open_store()?;

    match item {
      IgnoreTarget::Song { id } => {
        let tracks = self.library.fetch_all_tracks().await.context("cannot read the library")?;
        let snapshot = CatalogSnapshot::new(tracks);
        let id = TrackId::from(id);
        let Some(track) = snapshot.find(&id) else {
          bail!("track not found: {id}");
        };

        if store.ignore_song(track) {
          println!("Ignored \"{}\" ({})", track.display_title(), track.display_album());
        } else {
          println!("Already ignored: {id}");
        }
      }
      IgnoreTarget::Group { key_or_id } => {
        let groups = self.duplicate_groups(true).await?;
        let key = parse_group_key(&key_or_id);
        let found = match &key {
          Some(key) => groups.iter().find(|g| g.key() == key),
          None => groups.iter().find(|g| g.members().iter().any(|m| m.id.as_str() == key_or_id)),
        };

        let added = match (found, key) {
          (Some(group), _) => store.ignore_group(group),
          // Not a group right now; keep the key so it stays hidden if it becomes one.
          (None, Some(key)) => store.ignore_group_key(key),
          (None, None) => bail!("no duplicate group contains track {key_or_id}"),
        };

        println!("{}", if added { "Group ignored" } else { "Group was already ignored" });
      }
    }

    store.save()?;
    Ok(())
  }

  fn unignore(&self, item: IgnoreTarget) -> Result<()> {
    let mut store = self.open_store()?;

    let removed = match item {
      IgnoreTarget::Song { id } => store.unignore_song(&TrackId::from(id)),
      IgnoreTarget::Group { key_or_id } => {
        let key = match parse_group_key(&key_or_id) {
          Some(key) => Some(key),
          None => store
            .groups()
            .iter()
            .find(|g| g.member_ids.iter().any(|m| m.as_str() == key_or_id))
            .map(|g| g.key.clone()),
        };
        key.is_some_and(|key| store.unignore_group(&key))
      }
    };

    if removed {
      store.save()?;
      println!("Removed from ignored items");
    } else {
      println!("Nothing to remove");
    }
    Ok(())
  }

  fn list_ignored(&self) -> Result<()> {
    let store = self.open_store()?;

    if store.songs().is_empty() && store.groups().is_empty() {
      println!("Nothing is ignored.");
      return Ok(());
    }

    if !store.songs().is_empty() {
      println!("Songs:");
      for song in store.songs() {
        println!(
          "  {}  {} / {} ({})  since {}",
          song.id,
          song.title,
          song.artist,
          song.album,
          song.ignored_at.format("%Y-%m-%d")
        );
      }
    }

    if !store.groups().is_empty() {
      println!("Groups:");
      for group in store.groups() {
        println!(
          "  {}  {} member(s)  since {}",
          group.key,
          group.member_ids.len(),
          group.ignored_at.format("%Y-%m-%d")
        );
      }
    }
    Ok(())
  }

  fn show_config(&self) {
    let paths = &self.cfg.paths;
    println!("config file:   {}", paths.config_file().display());
    println!("data dir:      {}", paths.data_dir.display());
    println!("library:       {}", self.cfg.library.export_path(paths).display());
    println!("ignored items: {}", self.cfg.storage.ignored_path(paths).display());
    println!("player:        {} {}", self.cfg.library.player_program, self.cfg.library.player_args.join(" "));
    println!("log level:     {}", self.cfg.logging.level);
  }
}

/// `title|artist` typed by the user, normalized the way detection does it.
fn parse_group_key(raw: &str) -> Option<GroupKey> {
  let (title, artist) = raw.split_once('|')?;
  Some(GroupKey::new(title, artist))
}

fn print_group(group: &DuplicateGroup) {
  println!("{} / {}  [{}]  impact {}", group.title(), group.artist(), group.key(), group.impact());
  for (i, member) in group.members().iter().enumerate() {
    let marker = if i == 0 { '*' } else { ' ' };
    println!("  {marker} {:<20} {:>6} plays  {}", member.id.as_str(), member.play_count, member.display_album());
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::LoggingConfig;
  use encore_config::EncorePaths;
  use encore_library::LibraryConfig;
  use encore_storage::StorageConfig;
  use tempfile::{TempDir, tempdir};

  const EXPORT: &str = r#"{ "tracks": [
    { "persistent_id": "S1", "name": "Harbor", "artist": "Lumen", "album": "Harbor - Single", "play_count": 30 },
    { "persistent_id": "A1", "name": "harbor ", "artist": "LUMEN", "album": "Tidewater", "play_count": 4 },
    { "persistent_id": "S2", "name": "Ember", "artist": "Lumen", "album": "Ember - Single", "play_count": 2 },
    { "persistent_id": "A2", "name": "Ember", "artist": "Lumen", "album": "Tidewater", "play_count": 9 },
    { "persistent_id": "X1", "name": "Solo", "artist": "Lumen", "album": "Tidewater", "play_count": 1 }
  ] }"#;

  fn app() -> (TempDir, App) {
    let tmp = tempdir().unwrap();
    let paths = EncorePaths::with_base(tmp.path()).unwrap();
    let export = tmp.path().join("library.json");
    std::fs::write(&export, EXPORT).unwrap();

    let cfg = AppConfig {
      paths,
      logging: LoggingConfig::default(),
      library: LibraryConfig { export_file: Some(export), ..LibraryConfig::default() },
      storage: StorageConfig { ignored_file: Some(tmp.path().join("ignored.json")) },
    };
    (tmp, App::new(cfg))
  }

  #[test]
  fn group_keys_are_normalized() {
    assert_eq!(parse_group_key(" Harbor |LUMEN"), Some(GroupKey::from_raw("harbor|lumen")));
    assert_eq!(parse_group_key("A1"), None);
  }

  #[tokio::test]
  async fn scan_ranks_groups_by_impact() {
    let (_tmp, app) = app();
    let groups = app.duplicate_groups(false).await.unwrap();

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].key().as_str(), "harbor|lumen");
    assert_eq!(groups[0].source_candidate().id.as_str(), "S1");
    assert_eq!(groups[1].source_candidate().id.as_str(), "A2");
  }

  #[tokio::test]
  async fn ignored_group_is_hidden_unless_all() {
    let (_tmp, app) = app();
    app.dispatch(Command::Ignore { item: IgnoreTarget::Group { key_or_id: "A1".into() } }).await.unwrap();

    let visible = app.duplicate_groups(false).await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].key().as_str(), "ember|lumen");
    assert_eq!(app.duplicate_groups(true).await.unwrap().len(), 2);

    app.dispatch(Command::Unignore { item: IgnoreTarget::Group { key_or_id: "harbor|lumen".into() } }).await.unwrap();
    assert_eq!(app.duplicate_groups(false).await.unwrap().len(), 2);
  }

  #[tokio::test]
  async fn ignored_song_breaks_its_group() {
    let (_tmp, app) = app();
    app.dispatch(Command::Ignore { item: IgnoreTarget::Song { id: "S2".into() } }).await.unwrap();

    let groups = app.duplicate_groups(false).await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].key().as_str(), "harbor|lumen");
  }

  #[tokio::test]
  async fn ignoring_an_unknown_song_fails() {
    let (_tmp, app) = app();
    let err = app.dispatch(Command::Ignore { item: IgnoreTarget::Song { id: "nope".into() } }).await;
    assert!(err.is_err());
  }

  #[tokio::test]
  async fn nothing_to_reconcile_is_not_an_error() {
    let (_tmp, app) = app();
    // S1 (30) into A1 (4) would play; A1 into S1 is already matched.
    let args = SyncArgs { source: "A1".into(), target: "S1".into(), mode: encore_core::domain::SyncMode::Match };
    app.dispatch(Command::Sync(args)).await.unwrap();
  }
}
