mod backend;
mod io;
mod paths;

pub use backend::{ConfigBackend, TomlConfigBackend};
pub use io::atomic_write_str;
pub use paths::{BandstandPaths, ConfigError};

use once_cell::sync::Lazy;

// Singleton de paths (BANDSTAND_BASE_DIR o directorios del sistema)
pub static PATHS: Lazy<BandstandPaths> =
  Lazy::new(|| BandstandPaths::detect().expect("failed to init BandstandPaths"));

// Singleton del backend de config
pub static CONFIG_BACKEND: Lazy<TomlConfigBackend> = Lazy::new(|| TomlConfigBackend::new(PATHS.clone()));
