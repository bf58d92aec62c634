use directories::ProjectDirs;
use std::ffi::OsString;
use std::path::PathBuf;
use thiserror::Error;

/// Variable de entorno que fuerza un directorio base (modo portable, tests).
pub const BASE_DIR_ENV: &str = "BANDSTAND_BASE_DIR";

const CONFIG_FILE: &str = "bandstand.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
  #[error("invalid toml: {0}")]
  Toml(#[from] toml::de::Error),
  #[error("could not determine a home directory for bandstand")]
  Directories,
  #[error("section [{section}]: {message}")]
  Section { section: String, message: String },
  #[error("{0}")]
  Other(String),
}

impl ConfigError {
  pub(crate) fn section(section: &str, message: impl ToString) -> Self {
    ConfigError::Section { section: section.to_string(), message: message.to_string() }
  }
}

/// Directorios donde Bandstand guarda configuración, datos y caché.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandstandPaths {
  pub base_dir: PathBuf,
  pub config_dir: PathBuf,
  pub data_dir: PathBuf,
  pub cache_dir: PathBuf,
}

impl BandstandPaths {
  /// Resuelve los directorios (ver [`Self::resolve`]) y los crea.
  pub fn detect() -> Result<Self, ConfigError> {
    let paths = Self::resolve(std::env::var_os(BASE_DIR_ENV))?;
    paths.ensure_dirs()?;
    Ok(paths)
  }

  /// Con `base_override` todo cuelga de ese directorio; sin él se usan los
  /// directorios de usuario de la plataforma.
  pub fn resolve(base_override: Option<OsString>) -> Result<Self, ConfigError> {
    if let Some(base) = base_override.filter(|b| !b.is_empty()) {
      return Ok(Self::under(PathBuf::from(base)));
    }

    let dirs = ProjectDirs::from("org", "bandstand", "bandstand").ok_or(ConfigError::Directories)?;
    Ok(Self {
      base_dir: dirs.config_dir().to_path_buf(),
      config_dir: dirs.config_dir().to_path_buf(),
      data_dir: dirs.data_dir().to_path_buf(),
      cache_dir: dirs.cache_dir().to_path_buf(),
    })
  }

  /// Layout portable: `config/`, `data/` y `cache/` bajo `base`.
  pub fn under(base: PathBuf) -> Self {
    Self {
      config_dir: base.join("config"),
      data_dir: base.join("data"),
      cache_dir: base.join("cache"),
      base_dir: base,
    }
  }

  pub fn ensure_dirs(&self) -> Result<(), ConfigError> {
    for dir in [&self.config_dir, &self.data_dir, &self.cache_dir] {
      std::fs::create_dir_all(dir)?;
    }
    Ok(())
  }

  pub fn config_file(&self) -> PathBuf {
    self.config_dir.join(CONFIG_FILE)
  }
}
