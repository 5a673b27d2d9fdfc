use encore_config::{ConfigBackend, ConfigError, EncorePaths, TomlConfigBackend};
use encore_library::LibraryConfig;
use encore_storage::StorageConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LoggingConfig {
  /// Default filter when `RUST_LOG` is not set.
  #[serde(default = "default_level")]
  pub level: String,
}

fn default_level() -> String {
  "info".into()
}

impl Default for LoggingConfig {
  fn default() -> Self {
    LoggingConfig { level: default_level() }
  }
}

impl LoggingConfig {
  pub fn load_from<B: ConfigBackend>(backend: &B) -> Result<Self, ConfigError> {
    let cfg: Self = backend.load_section_with_default("logging")?;
    backend.save_section("logging", &cfg)?;
    Ok(cfg)
  }
}

/// Every config section the application reads, resolved once at startup.
pub struct AppConfig {
  pub paths: EncorePaths,
  pub logging: LoggingConfig,
  pub library: LibraryConfig,
  pub storage: StorageConfig,
}

impl AppConfig {
  pub fn load() -> Result<Self, ConfigError> {
    let paths = EncorePaths::detect()?;
    let backend = TomlConfigBackend::new(paths.clone());

    Ok(Self {
      logging: LoggingConfig::load_from(&backend)?,
      library: LibraryConfig::load_from(&backend)?,
      storage: StorageConfig::load_from(&backend)?,
      paths,
    })
  }
}
