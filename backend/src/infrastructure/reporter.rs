use std::sync::{Mutex, PoisonError};

use encore_core::domain::{ScanId, SyncSnapshot};
use encore_core::ports::ProgressReporter;
use tracing::{debug, info};

/// A `ProgressReporter` that forwards progress to the log.
///
/// Scan progress is logged once per 10% step; sync progress on every
/// confirmed play (at debug level, the CLI prints its own progress line).
#[derive(Default)]
pub struct LogReporter {
  // Last logged (scan, decile)
  last_scan_step: Mutex<Option<(ScanId, u32)>>,
}

impl LogReporter {
  pub fn new() -> Self {
    Self::default()
  }
}

impl ProgressReporter for LogReporter {
  fn scan_progress(&self, scan: ScanId, fraction: f64) {
    let step = (fraction * 10.0).floor() as u32;
    let mut last = self.last_scan_step.lock().unwrap_or_else(PoisonError::into_inner);

    if *last == Some((scan, step)) {
      return;
    }
    *last = Some((scan, step));

    info!(%scan, progress = format!("{:.0}%", fraction * 100.0), "scanning library");
  }

  fn sync_progress(&self, snapshot: &SyncSnapshot) {
    debug!(
      job = %snapshot.job_id,
      state = %snapshot.state,
      completed = snapshot.completed_iterations,
      required = snapshot.required_iterations,
      "sync progress"
    );
  }
}
