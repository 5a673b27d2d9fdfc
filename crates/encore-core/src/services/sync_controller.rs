use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::{
  CatalogSnapshot, JobId, SyncJob, SyncMode, SyncSnapshot, SyncState, SyncSummary, TrackId, TrackRecord,
};
use crate::errors::CoreError;
use crate::ports::{PlaybackDevice, ProgressReporter};

/// Petición de cancelación cooperativa.
///
/// El bucle la consulta entre reproducciones, nunca a mitad de una.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
  pub fn cancel(&self) {
    self.0.store(true, Ordering::SeqCst);
  }

  pub fn is_cancelled(&self) -> bool {
    self.0.load(Ordering::SeqCst)
  }
}

/// Controlador de sincronización de reproducciones.
///
/// Como mucho un trabajo en `Running` por controlador; la composición crea un
/// único controlador por proceso. Intentar arrancar otro mientras hay uno en
/// marcha devuelve [`CoreError::JobAlreadyRunning`] y no toca el existente.
pub struct SyncController<D, R>
where
  D: PlaybackDevice + 'static,
  R: ProgressReporter + 'static,
{
  device: Arc<D>,
  reporter: Arc<R>,
  active: Arc<Mutex<Option<JobId>>>,
}

impl<D, R> SyncController<D, R>
where
  D: PlaybackDevice + 'static,
  R: ProgressReporter + 'static,
{
  pub fn new(device: Arc<D>, reporter: Arc<R>) -> Self {
    Self { device, reporter, active: Arc::new(Mutex::new(None)) }
  }

  /// Validación previa. Crea el trabajo en `Idle` o rechaza el par.
  pub fn prepare(&self, source: TrackRecord, target: TrackRecord, mode: SyncMode) -> Result<SyncJob, CoreError> {
    let job = SyncJob::new(source, target, mode)?;
    debug!(
      job = %job.id(),
      %mode,
      required = job.required_iterations(),
      goal = job.goal_play_count(),
      "sync job prepared"
    );
    Ok(job)
  }

  /// Igual que [`prepare`](Self::prepare) pero resolviendo los ids contra una
  /// instantánea del catálogo.
  pub fn prepare_from_snapshot(
    &self,
    snapshot: &CatalogSnapshot,
    source: &TrackId,
    target: &TrackId,
    mode: SyncMode,
  ) -> Result<SyncJob, CoreError> {
    if source == target {
      return Err(CoreError::SameTrackSelected);
    }

    let source = snapshot.find(source).cloned().ok_or_else(|| CoreError::TrackNotFound(source.clone()))?;
    let target = snapshot.find(target).cloned().ok_or_else(|| CoreError::TrackNotFound(target.clone()))?;
    self.prepare(source, target, mode)
  }

  pub fn running_job(&self) -> Option<JobId> {
    *self.active.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Arranca el trabajo en una tarea propia y devuelve el handle para
  /// observarlo y cancelarlo. Requiere un runtime de Tokio.
  pub fn start(&self, mut job: SyncJob) -> Result<SyncHandle, CoreError> {
    if job.state() != SyncState::Idle {
      return Err(CoreError::Internal(format!("job {} is {}, not idle", job.id(), job.state())));
    }

    let slot = RunningSlot::acquire(&self.active, job.id())?;

    job.start();
    let job_id = job.id();
    let (progress_tx, progress_rx) = watch::channel(job.snapshot());
    self.reporter.sync_progress(&job.snapshot());

    let cancel = CancelToken::default();
    let task = tokio::spawn(run_job(
      job,
      Arc::clone(&self.device),
      Arc::clone(&self.reporter),
      progress_tx,
      cancel.clone(),
      slot,
    ));

    Ok(SyncHandle { job_id, progress: progress_rx, cancel, task })
  }
}

/// Handle de un trabajo en marcha.
///
/// Soltar el handle no cancela el trabajo.
#[derive(Debug)]
pub struct SyncHandle {
  job_id: JobId,
  progress: watch::Receiver<SyncSnapshot>,
  cancel: CancelToken,
  task: JoinHandle<SyncSummary>,
}

impl SyncHandle {
  pub fn job_id(&self) -> JobId {
    self.job_id
  }

  /// Última copia publicada del estado del trabajo.
  pub fn snapshot(&self) -> SyncSnapshot {
    *self.progress.borrow()
  }

  pub fn subscribe(&self) -> watch::Receiver<SyncSnapshot> {
    self.progress.clone()
  }

  pub fn cancel(&self) {
    info!(job = %self.job_id, "sync cancellation requested");
    self.cancel.cancel();
  }

  pub fn canceller(&self) -> CancelToken {
    self.cancel.clone()
  }

  pub fn is_finished(&self) -> bool {
    self.task.is_finished()
  }

  /// Espera al final del trabajo (completado o cancelado).
  pub async fn wait(self) -> Result<SyncSummary, CoreError> {
    self.task.await.map_err(|e| CoreError::Internal(format!("sync task failed: {e}")))
  }
}

/// Bucle del trabajo. Es el único dueño de `job`.
async fn run_job<D, R>(
  mut job: SyncJob,
  device: Arc<D>,
  reporter: Arc<R>,
  progress: watch::Sender<SyncSnapshot>,
  cancel: CancelToken,
  _slot: RunningSlot,
) -> SyncSummary
where
  D: PlaybackDevice + ?Sized,
  R: ProgressReporter + ?Sized,
{
  info!(
    job = %job.id(),
    target = %job.target().id,
    mode = %job.mode(),
    required = job.required_iterations(),
    "sync job started"
  );

  let mut interrupted_by = None;

  loop {
    if job.is_finished() {
      job.complete();
      break;
    }
    if cancel.is_cancelled() {
      job.cancel();
      break;
    }

    // Único punto de espera: la confirmación del dispositivo.
    match device.play_once(job.target()).await {
      Ok(()) => {
        job.record_play();
        debug!(job = %job.id(), completed = job.completed_iterations(), "play-through confirmed");
        publish(&progress, reporter.as_ref(), &job);
      }
      Err(e) => {
        warn!(job = %job.id(), error = %e, completed = job.completed_iterations(), "playback failed, stopping job");
        interrupted_by = Some(e.to_string());
        job.cancel();
        break;
      }
    }
  }

  publish(&progress, reporter.as_ref(), &job);

  let summary = job.summary(interrupted_by);
  info!(
    job = %summary.job_id,
    state = %summary.state,
    plays_added = summary.plays_added,
    best_effort_play_count = summary.best_effort_play_count,
    "sync job finished"
  );
  summary
}

fn publish<R>(progress: &watch::Sender<SyncSnapshot>, reporter: &R, job: &SyncJob)
where
  R: ProgressReporter + ?Sized,
{
  let snapshot = job.snapshot();
  progress.send_replace(snapshot);
  reporter.sync_progress(&snapshot);
}

/// Reserva del hueco de "trabajo en marcha". Se libera al soltarse, también
/// si la tarea se aborta o entra en pánico.
struct RunningSlot {
  active: Arc<Mutex<Option<JobId>>>,
  job_id: JobId,
}

impl RunningSlot {
  fn acquire(active: &Arc<Mutex<Option<JobId>>>, job_id: JobId) -> Result<Self, CoreError> {
    let mut guard = active.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(running) = *guard {
      warn!(%running, rejected = %job_id, "sync job already running");
      return Err(CoreError::JobAlreadyRunning);
    }
    *guard = Some(job_id);
    Ok(Self { active: Arc::clone(active), job_id })
  }
}

impl Drop for RunningSlot {
  fn drop(&mut self) {
    let mut guard = self.active.lock().unwrap_or_else(PoisonError::into_inner);
    if *guard == Some(self.job_id) {
      *guard = None;
    }
  }
}
