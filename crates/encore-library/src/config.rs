use encore_config::{ConfigBackend, ConfigError, EncorePaths};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LibraryConfig {
  /// Library export to read. Defaults to `<data_dir>/library.json`.
  pub export_file: Option<PathBuf>,

  /// Player used to drive play-throughs; it must exit once the track ends.
  #[serde(default = "default_player_program")]
  pub player_program: String,

  /// Arguments placed before the track location.
  #[serde(default = "default_player_args")]
  pub player_args: Vec<String>,
}

fn default_player_program() -> String {
  "mpv".into()
}

fn default_player_args() -> Vec<String> {
  vec!["--no-video".into(), "--really-quiet".into()]
}

impl Default for LibraryConfig {
  fn default() -> Self {
    LibraryConfig {
      export_file: None,
      player_program: default_player_program(),
      player_args: default_player_args(),
    }
  }
}

impl LibraryConfig {
  /// Loads `[library]`, writing the effective values back so the user has a
  /// section to edit.
  pub fn load_from<B: ConfigBackend>(backend: &B) -> Result<Self, ConfigError> {
    let cfg: Self = backend.load_section_with_default("library")?;
    backend.save_section("library", &cfg)?;
    Ok(cfg)
  }

  pub fn save_to<B: ConfigBackend>(&self, backend: &B) -> Result<(), ConfigError> {
    backend.save_section("library", self)
  }

  pub fn export_path(&self, paths: &EncorePaths) -> PathBuf {
    self.export_file.clone().unwrap_or_else(|| paths.data_dir.join("library.json"))
  }
}
