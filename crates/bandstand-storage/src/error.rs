use bandstand_config::ConfigError;
use bandstand_core::ports::RepoError;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
  #[error("database error: {0}")]
  Query(#[from] DieselError),

  #[error("connection pool error: {0}")]
  Pool(#[from] diesel::r2d2::PoolError),

  #[error("migrations failed: {0}")]
  Migration(String),

  #[error("corrupt row in {table}: {detail}")]
  Corrupt { table: &'static str, detail: String },

  /// Una fila que debía existir dentro de un lote no está.
  #[error("no row with id {0}")]
  Missing(String),

  #[error("blocking task failed: {0}")]
  Join(#[from] tokio::task::JoinError),

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error(transparent)]
  Config(#[from] ConfigError),
}

impl From<StorageError> for RepoError {
  fn from(e: StorageError) -> Self {
    match e {
      StorageError::Missing(id) => RepoError::NotFound(id),
      StorageError::Query(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info)) => {
        RepoError::Conflict(info.message().to_string())
      }
      other => RepoError::Storage(other.to_string()),
    }
  }
}

impl StorageError {
  /// Los conflictos y filas ausentes son resultados esperados; el resto se
  /// registra antes de subir.
  pub(crate) fn is_expected(&self) -> bool {
    matches!(
      self,
      StorageError::Missing(_) | StorageError::Query(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _))
    )
  }
}
