//! Adaptador SQLite (diesel + r2d2) de los repositorios de `bandstand-core`.
//!
//! Las consultas son síncronas; cada operación se ejecuta en el pool de
//! bloqueo de tokio con una conexión del pool de r2d2.

pub mod config;
mod error;
pub mod models;
mod repository;
pub mod schema;

use std::fs;
use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, error, info};

use bandstand_core::ports::RepoError;

pub use config::StorageConfig;
pub use error::StorageError;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

type SqlitePool = Pool<ConnectionManager<SqliteConnection>>;

#[derive(Debug)]
struct ConnectionPragmas {
  journal_mode: Option<String>,
  busy_timeout: Duration,
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionPragmas {
  fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
    let mut pragmas = format!(
      "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = {};",
      self.busy_timeout.as_millis()
    );
    if let Some(mode) = &self.journal_mode {
      pragmas.push_str(&format!(" PRAGMA journal_mode = {mode};"));
    }
    conn.batch_execute(&pragmas).map_err(diesel::r2d2::Error::QueryError)
  }
}

/// Implementa todos los puertos de repositorio sobre un único fichero
/// SQLite. Clonarlo es barato: comparte el pool.
#[derive(Clone)]
pub struct SqliteStore {
  pool: SqlitePool,
}

impl SqliteStore {
  /// Abre (o crea) la base descrita por `config` y aplica las migraciones
  /// pendientes.
  pub fn open(config: &StorageConfig) -> Result<Self, StorageError> {
    let in_memory = config.is_in_memory();
    if let Some(parent) = config.db_path.parent().filter(|p| !in_memory && !p.as_os_str().is_empty()) {
      fs::create_dir_all(parent)?;
    }

    let url = config.db_path.to_string_lossy().into_owned();
    let manager = ConnectionManager::<SqliteConnection>::new(url);
    let mut builder = Pool::builder()
      .max_size(config.max_connections.max(1))
      .connection_customizer(Box::new(ConnectionPragmas {
        journal_mode: config.journal_mode.clone(),
        busy_timeout: Duration::from_millis(config.busy_timeout_ms),
      }));
    // Cada conexión a `:memory:` es una base distinta: una sola y que no se
    // recicle nunca.
    if in_memory {
      builder = builder.max_size(1).idle_timeout(None).max_lifetime(None);
    }
    let pool = builder.build(manager)?;

    let mut pooled = pool.get()?;
    let conn: &mut SqliteConnection = &mut pooled;
    let applied = conn.run_pending_migrations(MIGRATIONS).map_err(|e| StorageError::Migration(e.to_string()))?;
    if !applied.is_empty() {
      info!(count = applied.len(), "applied database migrations");
    }

    info!(path = %config.db_path.display(), "storage ready");
    Ok(Self { pool })
  }

  /// Abre la base según la sección `[storage]` de la configuración.
  pub fn from_config() -> Result<Self, StorageError> {
    let config = StorageConfig::load()?;
    Self::open(&config)
  }

  /// Ejecuta `op` con una conexión del pool fuera del runtime async.
  async fn run<T, F>(&self, op: &'static str, f: F) -> Result<T, RepoError>
  where
    T: Send + 'static,
    F: FnOnce(&mut SqliteConnection) -> Result<T, StorageError> + Send + 'static,
  {
    let pool = self.pool.clone();
    let result = tokio::task::spawn_blocking(move || {
      let mut conn = pool.get()?;
      f(&mut *conn)
    })
    .await
    .map_err(StorageError::from)
    .and_then(|r| r);

    result.map_err(|e| {
      if e.is_expected() {
        debug!(op, error = %e, "storage rejected operation");
      } else {
        error!(op, error = %e, "storage operation failed");
      }
      e.into()
    })
  }
}
