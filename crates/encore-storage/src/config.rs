use encore_config::{ConfigBackend, ConfigError, EncorePaths};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct StorageConfig {
  /// Ignored songs/groups file. Defaults to `<data_dir>/ignored.json`.
  pub ignored_file: Option<PathBuf>,
}

impl StorageConfig {
  pub fn load_from<B: ConfigBackend>(backend: &B) -> Result<Self, ConfigError> {
    let cfg: Self = backend.load_section_with_default("storage")?;
    backend.save_section("storage", &cfg)?;
    Ok(cfg)
  }

  pub fn save_to<B: ConfigBackend>(&self, backend: &B) -> Result<(), ConfigError> {
    backend.save_section("storage", self)
  }

  pub fn ignored_path(&self, paths: &EncorePaths) -> PathBuf {
    self.ignored_file.clone().unwrap_or_else(|| paths.data_dir.join("ignored.json"))
  }
}
