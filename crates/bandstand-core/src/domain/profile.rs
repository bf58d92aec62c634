use crate::domain::ids::ProfileId;
use serde::{Deserialize, Serialize};

/// Rol de un usuario dentro del equipo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
  /// Puede crear y modificar eventos, setlists y asignaciones.
  Organiser,
  #[default]
  Member,
}

/// Quién está ejecutando una operación.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
  pub id: ProfileId,
  pub role: UserRole,
}

impl Actor {
  pub fn organiser(id: ProfileId) -> Self {
    Self { id, role: UserRole::Organiser }
  }

  pub fn member(id: ProfileId) -> Self {
    Self { id, role: UserRole::Member }
  }

  pub fn is_organiser(&self) -> bool {
    self.role == UserRole::Organiser
  }
}
