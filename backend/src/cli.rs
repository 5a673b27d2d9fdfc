use clap::{Args, Parser, Subcommand};

use encore_core::domain::SyncMode;

/// Find the same song spread across albums and bring their play counts in line.
#[derive(Debug, Parser)]
#[command(name = "encore", version, about)]
pub struct Cli {
  #[command(subcommand)]
  pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
  /// Scan the library and list duplicate groups, highest impact first.
  Scan(ScanArgs),

  /// Play the target track until its play count reaches the goal.
  Sync(SyncArgs),

  /// Hide a song or a whole group from future scans.
  Ignore {
    #[command(subcommand)]
    item: IgnoreTarget,
  },

  /// Undo a previous `ignore`.
  Unignore {
    #[command(subcommand)]
    item: IgnoreTarget,
  },

  /// List ignored songs and groups.
  Ignored,

  /// Show resolved paths and configuration.
  Config,
}

#[derive(Debug, Args)]
pub struct ScanArgs {
  /// Include ignored songs and groups.
  #[arg(long)]
  pub all: bool,

  /// Print groups as JSON instead of a table.
  #[arg(long)]
  pub json: bool,
}

#[derive(Debug, Args)]
pub struct SyncArgs {
  /// Persistent id of the track whose play count is the reference.
  #[arg(long)]
  pub source: String,

  /// Persistent id of the track that gets played.
  #[arg(long)]
  pub target: String,

  /// `match` raises the target to the source count; `add` adds the source count on top.
  #[arg(long, default_value_t = SyncMode::Match)]
  pub mode: SyncMode,
}

#[derive(Debug, Subcommand)]
pub enum IgnoreTarget {
  /// A single track, by persistent id.
  Song { id: String },

  /// A duplicate group, by key (`title|artist`, normalized) or by any member id.
  Group { key_or_id: String },
}
