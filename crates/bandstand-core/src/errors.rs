use thiserror::Error;

use crate::ports::RepoError;

/// Error del núcleo de Bandstand.
///
/// Ninguna operación pública entra en pánico: todas devuelven este error y
/// las capas superiores lo convierten en un aviso para el usuario.
#[derive(Debug, Error)]
pub enum CoreError {
  /// Falta un campo obligatorio o un valor está fuera de rango.
  #[error("validation error: {0}")]
  Validation(String),

  #[error("{entity} not found: {id}")]
  NotFound { entity: &'static str, id: String },

  #[error("{0}")]
  Duplicate(String),

  /// Fallo de la capa de datos, con su mensaje tal cual.
  #[error("persistence error: {0}")]
  Persistence(String),

  #[error("not authenticated")]
  Unauthenticated,

  #[error("forbidden: {0}")]
  Forbidden(String),
}

impl CoreError {
  pub fn validation(msg: impl Into<String>) -> Self {
    CoreError::Validation(msg.into())
  }

  pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
    CoreError::NotFound { entity, id: id.to_string() }
  }
}

impl From<RepoError> for CoreError {
  fn from(e: RepoError) -> Self {
    match e {
      RepoError::NotFound(id) => CoreError::NotFound { entity: "record", id },
      RepoError::Conflict(msg) => CoreError::Duplicate(msg),
      RepoError::Storage(msg) => CoreError::Persistence(msg),
    }
  }
}
