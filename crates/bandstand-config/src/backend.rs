use crate::io::atomic_write_str;
use crate::paths::{BandstandPaths, ConfigError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::ErrorKind;
use toml_edit::{DocumentMut, Item};
use tracing::debug;

/// Acceso por secciones (`[storage]`, ...) a `bandstand.toml`.
pub trait ConfigBackend {
  fn load_section<T: DeserializeOwned>(&self, section: &str) -> Result<T, ConfigError>;
  fn save_section<T: Serialize>(&self, section: &str, value: &T) -> Result<(), ConfigError>;
}

pub struct TomlConfigBackend {
  paths: BandstandPaths,
}

impl TomlConfigBackend {
  pub fn new(paths: BandstandPaths) -> Self {
    Self { paths }
  }

  pub fn paths(&self) -> &BandstandPaths {
    &self.paths
  }

  /// Igual que [`ConfigBackend::load_section`], pero un archivo o una sección
  /// ausentes devuelven `T::default()` en vez de error.
  pub fn load_section_with_default<T>(&self, section: &str) -> Result<T, ConfigError>
  where
    T: DeserializeOwned + Default,
  {
    match self.read_table(section)? {
      Some(table) => decode_section(section, table),
      None => {
        debug!(section, "config section missing, using defaults");
        Ok(T::default())
      }
    }
  }

  /// Contenido de `[section]`, o `None` si no hay archivo o no está.
  fn read_table(&self, section: &str) -> Result<Option<toml::Value>, ConfigError> {
    let path = self.paths.config_file();
    let content = match fs::read_to_string(&path) {
      Ok(c) => c,
      Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
      Err(e) => return Err(e.into()),
    };

    let mut doc: toml::Table = toml::from_str(&content)?;
    Ok(doc.remove(section))
  }
}

fn decode_section<T: DeserializeOwned>(section: &str, table: toml::Value) -> Result<T, ConfigError> {
  table.try_into().map_err(|e| ConfigError::section(section, e))
}

impl ConfigBackend for TomlConfigBackend {
  fn load_section<T: DeserializeOwned>(&self, section: &str) -> Result<T, ConfigError> {
    let table = self
      .read_table(section)?
      .ok_or_else(|| ConfigError::section(section, format!("not present in {}", self.paths.config_file().display())))?;
    decode_section(section, table)
  }

  fn save_section<T: Serialize>(&self, section: &str, value: &T) -> Result<(), ConfigError> {
    let path = self.paths.config_file();

    // Se parte del documento existente para conservar comentarios y orden.
    let mut doc = match fs::read_to_string(&path) {
      Ok(content) => content.parse::<DocumentMut>().map_err(|e| ConfigError::Other(format!("{}: {e}", path.display())))?,
      Err(e) if e.kind() == ErrorKind::NotFound => DocumentMut::new(),
      Err(e) => return Err(e.into()),
    };

    // `toml` serializa la sección sin cabecera; se reinterpreta como tabla.
    let encoded = toml::to_string(value).map_err(|e| ConfigError::section(section, e))?;
    let table: Item = encoded.parse::<DocumentMut>().map_err(|e| ConfigError::section(section, e))?.into_item();
    doc[section] = table;

    atomic_write_str(&path, &doc.to_string())?;
    debug!(section, path = %path.display(), "config section saved");
    Ok(())
  }
}
