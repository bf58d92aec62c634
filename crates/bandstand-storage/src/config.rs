use bandstand_config::{CONFIG_BACKEND, ConfigBackend, ConfigError, PATHS};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Sección `[storage]` de `bandstand.toml`.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
  pub db_path: PathBuf,
  pub journal_mode: Option<String>,
  pub max_connections: u32,
  pub busy_timeout_ms: u64,
}

impl Default for StorageConfig {
  fn default() -> Self {
    Self::at(PATHS.data_dir.join("bandstand.db"))
  }
}

impl StorageConfig {
  /// Valores por defecto con la base en `db_path`, sin tocar el fichero de
  /// configuración.
  pub fn at(db_path: impl Into<PathBuf>) -> Self {
    StorageConfig { db_path: db_path.into(), journal_mode: Some("WAL".to_string()), max_connections: 4, busy_timeout_ms: 5_000 }
  }

  /// `db_path = ":memory:"`: base volátil, útil en pruebas.
  pub fn is_in_memory(&self) -> bool {
    self.db_path.as_os_str() == ":memory:"
  }

  pub fn load() -> Result<Self, ConfigError> {
    let cfg = CONFIG_BACKEND.load_section_with_default("storage")?;
    CONFIG_BACKEND.save_section("storage", &cfg)?;
    Ok(cfg)
  }

  pub fn save(&self) -> Result<(), ConfigError> {
    CONFIG_BACKEND.save_section("storage", self)
  }
}
