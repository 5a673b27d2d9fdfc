use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::ids::{JobId, TrackId};
use crate::domain::track::TrackRecord;
use crate::errors::{CoreError, NothingToReconcile};

/// Cómo se calcula la meta del destino a partir del origen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
  /// Subir el destino exactamente hasta las reproducciones del origen.
  #[default]
  Match,
  /// Sumar las reproducciones del origen a las que ya tiene el destino.
  Add,
}

impl fmt::Display for SyncMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SyncMode::Match => f.write_str("match"),
      SyncMode::Add => f.write_str("add"),
    }
  }
}

impl FromStr for SyncMode {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "match" => Ok(SyncMode::Match),
      "add" => Ok(SyncMode::Add),
      other => Err(format!("unknown sync mode: {other}")),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
  Idle,
  Running,
  Cancelled,
  Completed,
}

impl SyncState {
  pub fn is_terminal(&self) -> bool {
    matches!(self, SyncState::Cancelled | SyncState::Completed)
  }
}

impl fmt::Display for SyncState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      SyncState::Idle => "idle",
      SyncState::Running => "running",
      SyncState::Cancelled => "cancelled",
      SyncState::Completed => "completed",
    };
    f.write_str(s)
  }
}

/// Resultado de la validación previa: cuántas reproducciones hacen falta y a
/// qué valor debería llegar el destino.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncPlan {
  pub required_iterations: u64,
  pub goal_play_count: u64,
}

impl SyncPlan {
  pub fn compute(source: &TrackRecord, target: &TrackRecord, mode: SyncMode) -> Result<Self, CoreError> {
    if source.id == target.id {
      return Err(CoreError::SameTrackSelected);
    }

    match mode {
      SyncMode::Match => {
        let required_iterations = source.play_count.saturating_sub(target.play_count);
        if required_iterations == 0 {
          return Err(CoreError::NothingToReconcile(NothingToReconcile::AlreadyMatched));
        }
        Ok(Self { required_iterations, goal_play_count: source.play_count })
      }
      SyncMode::Add => {
        if source.play_count == 0 {
          return Err(CoreError::NothingToReconcile(NothingToReconcile::NothingToAdd));
        }
        Ok(Self {
          required_iterations: source.play_count,
          goal_play_count: target.play_count.saturating_add(source.play_count),
        })
      }
    }
  }
}

/// Estado de trabajo de una reconciliación.
///
/// Solo el bucle del controlador avanza el estado; los observadores leen
/// copias publicadas ([`SyncSnapshot`]). Un trabajo terminado no se reanuda.
#[derive(Debug)]
pub struct SyncJob {
  id: JobId,
  source: TrackRecord,
  target: TrackRecord,
  mode: SyncMode,
  required_iterations: u64,
  completed_iterations: u64,
  goal_play_count: u64,
  state: SyncState,
}

impl SyncJob {
  /// Valida el par y crea el trabajo en `Idle`.
  pub fn new(source: TrackRecord, target: TrackRecord, mode: SyncMode) -> Result<Self, CoreError> {
    let plan = SyncPlan::compute(&source, &target, mode)?;

    Ok(Self {
      id: JobId::new(),
      source,
      target,
      mode,
      required_iterations: plan.required_iterations,
      completed_iterations: 0,
      goal_play_count: plan.goal_play_count,
      state: SyncState::Idle,
    })
  }

  pub fn id(&self) -> JobId {
    self.id
  }

  pub fn source(&self) -> &TrackRecord {
    &self.source
  }

  pub fn target(&self) -> &TrackRecord {
    &self.target
  }

  pub fn mode(&self) -> SyncMode {
    self.mode
  }

  pub fn required_iterations(&self) -> u64 {
    self.required_iterations
  }

  pub fn completed_iterations(&self) -> u64 {
    self.completed_iterations
  }

  pub fn goal_play_count(&self) -> u64 {
    self.goal_play_count
  }

  pub fn state(&self) -> SyncState {
    self.state
  }

  pub fn is_finished(&self) -> bool {
    self.completed_iterations >= self.required_iterations
  }

  /// Estimación local de las reproducciones del destino. No se vuelve a
  /// consultar el catálogo.
  pub fn best_effort_play_count(&self) -> u64 {
    self.target.play_count.saturating_add(self.completed_iterations)
  }

  pub fn snapshot(&self) -> SyncSnapshot {
    SyncSnapshot {
      job_id: self.id,
      state: self.state,
      completed_iterations: self.completed_iterations,
      required_iterations: self.required_iterations,
      goal_play_count: self.goal_play_count,
    }
  }

  pub fn summary(&self, interrupted_by: Option<String>) -> SyncSummary {
    SyncSummary {
      job_id: self.id,
      source_id: self.source.id.clone(),
      target_id: self.target.id.clone(),
      mode: self.mode,
      state: self.state,
      plays_added: self.completed_iterations,
      required_iterations: self.required_iterations,
      best_effort_play_count: self.best_effort_play_count(),
      interrupted_by,
    }
  }

  pub(crate) fn start(&mut self) {
    debug_assert_eq!(self.state, SyncState::Idle);
    self.state = SyncState::Running;
  }

  pub(crate) fn record_play(&mut self) {
    if self.state == SyncState::Running && !self.is_finished() {
      self.completed_iterations += 1;
    }
  }

  pub(crate) fn complete(&mut self) {
    if self.state == SyncState::Running {
      self.state = SyncState::Completed;
    }
  }

  pub(crate) fn cancel(&mut self) {
    if !self.state.is_terminal() {
      self.state = SyncState::Cancelled;
    }
  }
}

/// Copia consistente y de solo lectura del progreso de un trabajo.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SyncSnapshot {
  pub job_id: JobId,
  pub state: SyncState,
  pub completed_iterations: u64,
  pub required_iterations: u64,
  pub goal_play_count: u64,
}

impl SyncSnapshot {
  /// Fracción `completed / required` en `[0, 1]`.
  pub fn progress(&self) -> f64 {
    if self.required_iterations == 0 {
      return 1.0;
    }
    self.completed_iterations as f64 / self.required_iterations as f64
  }
}

/// Informe final de un trabajo terminado (completado o cancelado).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSummary {
  pub job_id: JobId,
  pub source_id: TrackId,
  pub target_id: TrackId,
  pub mode: SyncMode,
  pub state: SyncState,
  pub plays_added: u64,
  pub required_iterations: u64,
  /// `target.play_count + plays_added`. Es una estimación: el catálogo no
  /// se vuelve a leer.
  pub best_effort_play_count: u64,
  /// Motivo por el que el dispositivo cortó el trabajo, si lo hubo.
  pub interrupted_by: Option<String>,
}

impl fmt::Display for SyncSummary {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{}: added {} of {} plays; target play count is now about {} (best-effort estimate)",
      self.state, self.plays_added, self.required_iterations, self.best_effort_play_count
    )?;
    if let Some(reason) = &self.interrupted_by {
      write!(f, "; interrupted: {reason}")?;
    }
    Ok(())
  }
}
