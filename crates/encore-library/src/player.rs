use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use encore_core::ports::PlaybackError;

use crate::config::LibraryConfig;

/// Drives an external player process, one process per play-through.
///
/// The process exiting successfully is the "play-through finished" signal.
/// Nothing here measures time: a play lasts as long as the player runs.
#[derive(Debug, Clone)]
pub struct CommandPlayer {
  program: String,
  args: Vec<String>,
}

impl CommandPlayer {
  pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
    Self { program: program.into(), args }
  }

  pub fn from_config(cfg: &LibraryConfig) -> Self {
    Self::new(cfg.player_program.clone(), cfg.player_args.clone())
  }

  pub fn program(&self) -> &str {
    &self.program
  }

  pub async fn play(&self, location: &Path) -> Result<(), PlaybackError> {
    debug!(program = %self.program, location = %location.display(), "starting player");

    let status = Command::new(&self.program)
      .args(&self.args)
      .arg(location)
      .stdin(Stdio::null())
      .stdout(Stdio::null())
      .stderr(Stdio::null())
      // An aborted task must not leave an orphaned player behind.
      .kill_on_drop(true)
      .status()
      .await
      .map_err(|e| PlaybackError::Device(format!("cannot start {}: {e}", self.program)))?;

    if status.success() {
      Ok(())
    } else {
      Err(PlaybackError::Interrupted(format!("{} exited with {status}", self.program)))
    }
  }
}
