use async_trait::async_trait;

use crate::domain::TrackRecord;

#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
  #[error("track cannot be played: {0}")]
  Unplayable(String),

  #[error("device error: {0}")]
  Device(String),

  #[error("playback interrupted: {0}")]
  Interrupted(String),
}

/// Port del dispositivo de reproducción.
///
/// `play_once` reproduce la pista desde el principio y el futuro se resuelve
/// cuando el dispositivo confirma que terminó la reproducción completa. El
/// controlador no mide tiempos: una reproducción puede tardar lo que sea.
#[async_trait]
pub trait PlaybackDevice: Send + Sync {
  async fn play_once(&self, track: &TrackRecord) -> Result<(), PlaybackError>;
}
