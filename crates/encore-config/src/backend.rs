use crate::paths::{ConfigError, EncorePaths};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

// toml_edit para escribir sin perder los comentarios del usuario
use toml_edit::{DocumentMut, Item};

pub trait ConfigBackend {
  fn load_section<T: DeserializeOwned>(&self, section: &str) -> Result<T, ConfigError>;
  fn save_section<T: Serialize>(&self, section: &str, value: &T) -> Result<(), ConfigError>;

  /// Como `load_section`, pero un archivo o una sección ausentes dan
  /// `T::default()`.
  fn load_section_with_default<T>(&self, section: &str) -> Result<T, ConfigError>
  where
    T: DeserializeOwned + Default;
}

pub struct TomlConfigBackend {
  paths: EncorePaths,
}

impl TomlConfigBackend {
  pub fn new(paths: EncorePaths) -> Self {
    Self { paths }
  }

  pub fn paths(&self) -> &EncorePaths {
    &self.paths
  }

  pub fn config_file(&self) -> PathBuf {
    self.paths.config_file()
  }

  fn read_value(&self) -> Result<Option<toml::Value>, ConfigError> {
    let path = self.paths.config_file();
    let content = match fs::read_to_string(&path) {
      Ok(c) => c,
      Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
      Err(e) => return Err(e.into()),
    };

    Ok(Some(toml::from_str(&content)?))
  }
}

fn decode<T: DeserializeOwned>(section: &str, table: &toml::Value) -> Result<T, ConfigError> {
  table
    .clone()
    .try_into()
    .map_err(|e| ConfigError::Other(format!("decode section [{section}]: {e}")))
}

impl ConfigBackend for TomlConfigBackend {
  fn load_section<T: DeserializeOwned>(&self, section: &str) -> Result<T, ConfigError> {
    let path = self.paths.config_file();
    let toml_val = self
      .read_value()?
      .ok_or_else(|| ConfigError::Other(format!("config file {:?} does not exist", path)))?;

    let table = toml_val
      .get(section)
      .ok_or_else(|| ConfigError::Other(format!("missing section [{section}] in {:?}", path)))?;

    decode(section, table)
  }

  fn load_section_with_default<T>(&self, section: &str) -> Result<T, ConfigError>
  where
    T: DeserializeOwned + Default,
  {
    let Some(toml_val) = self.read_value()? else {
      debug!(section, "no config file, using defaults");
      return Ok(T::default());
    };

    let Some(table) = toml_val.get(section) else {
      debug!(section, "section missing, using defaults");
      return Ok(T::default());
    };

    decode(section, table)
  }

  fn save_section<T: Serialize>(&self, section: &str, value: &T) -> Result<(), ConfigError> {
    let path = self.paths.config_file();

    // 1) Leer el documento actual o empezar uno vacío.
    let mut doc: DocumentMut = match fs::read_to_string(&path) {
      Ok(content) => content
        .parse::<DocumentMut>()
        .map_err(|e| ConfigError::Other(format!("parse toml_edit doc: {e}")))?,
      Err(e) if e.kind() == ErrorKind::NotFound => DocumentMut::new(),
      Err(e) => return Err(e.into()),
    };

    // 2) Serializar la sección con serde.
    let section_str = toml::to_string(value)
      .map_err(|e| ConfigError::Other(format!("encode section [{section}]: {e}")))?;

    // 3) Convertirla en un Item (tabla sin cabecera).
    let section_item: Item = section_str
      .parse::<DocumentMut>()
      .map_err(|e| ConfigError::Other(format!("parse section as doc: {e}")))?
      .into_item();

    // 4) Reemplazar solo esa sección; el resto del documento queda intacto.
    doc[section] = section_item;

    crate::io::atomic_write_str(&path, &doc.to_string())?;
    debug!(section, path = %path.display(), "config section saved");

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde::Deserialize;
  use tempfile::tempdir;

  #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
  struct Sample {
    level: String,
    retries: u32,
  }

  impl Default for Sample {
    fn default() -> Self {
      Sample { level: "info".into(), retries: 0 }
    }
  }

  fn backend() -> (tempfile::TempDir, TomlConfigBackend) {
    let tmp = tempdir().unwrap();
    let paths = EncorePaths::with_base(tmp.path()).unwrap();
    (tmp, TomlConfigBackend::new(paths))
  }

  #[test]
  fn missing_file_yields_default() {
    let (_tmp, backend) = backend();
    let loaded: Sample = backend.load_section_with_default("sample").unwrap();
    assert_eq!(loaded, Sample::default());
    assert!(backend.load_section::<Sample>("sample").is_err());
  }

  #[test]
  fn save_then_load_round_trips() {
    let (_tmp, backend) = backend();
    let value = Sample { level: "debug".into(), retries: 3 };

    backend.save_section("sample", &value).unwrap();

    let loaded: Sample = backend.load_section("sample").unwrap();
    assert_eq!(loaded, value);
  }

  #[test]
  fn saving_keeps_other_sections_and_comments() {
    let (_tmp, backend) = backend();
    fs::write(backend.config_file(), "# user notes\n[other]\nkeep = true\n").unwrap();

    backend.save_section("sample", &Sample::default()).unwrap();

    let content = fs::read_to_string(backend.config_file()).unwrap();
    assert!(content.contains("# user notes"));
    assert!(content.contains("keep = true"));
    assert!(content.contains("[sample]"));
  }

  #[test]
  fn malformed_section_is_reported() {
    let (_tmp, backend) = backend();
    fs::write(backend.config_file(), "[sample]\nlevel = 3\n").unwrap();

    let err = backend.load_section_with_default::<Sample>("sample").unwrap_err();
    assert!(err.to_string().contains("decode section [sample]"));
  }
}
