use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::domain::ids::{ProfileId, RoleAssignmentId, SongId};

/// Vocabulario sugerido para los roles de una canción.
///
/// Es sólo una ayuda para la interfaz: el rol es texto libre y cualquier
/// otro valor ("Host / MC", "Cajón"...) es igual de válido.
pub const COMMON_ROLES: [&str; 9] = [
  "Lead Vocals",
  "Backing Vocals",
  "Lead Guitar",
  "Acoustic Guitar",
  "Bass",
  "Keys",
  "Drums",
  "Sound",
  "Visuals",
];

/// Roles sugeridos que empiezan por `prefix` (sin distinguir mayúsculas).
/// Un prefijo vacío devuelve la lista entera.
pub fn suggest_roles(prefix: &str) -> Vec<&'static str> {
  let prefix = prefix.trim().to_lowercase();
  COMMON_ROLES.iter().copied().filter(|r| r.to_lowercase().starts_with(&prefix)).collect()
}

/// A quién se asigna un rol: un miembro del equipo o alguien escrito a mano
/// (invitado, artista de open mic...).
///
/// Se guarda como el UUID del perfil o como el literal `"manual"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum PersonRef {
  Member(ProfileId),
  Manual,
}

impl PersonRef {
  pub const MANUAL: &'static str = "manual";
}

impl fmt::Display for PersonRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PersonRef::Member(id) => id.fmt(f),
      PersonRef::Manual => f.write_str(Self::MANUAL),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid person reference: {0:?}")]
pub struct ParsePersonRefError(pub String);

impl FromStr for PersonRef {
  type Err = ParsePersonRefError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    if s == Self::MANUAL {
      return Ok(PersonRef::Manual);
    }
    s.parse::<ProfileId>().map(PersonRef::Member).map_err(|_| ParsePersonRefError(s.to_string()))
  }
}

impl From<PersonRef> for String {
  fn from(p: PersonRef) -> Self {
    p.to_string()
  }
}

impl TryFrom<String> for PersonRef {
  type Error = ParsePersonRefError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    value.parse()
  }
}

/// Par (rol, persona) asociado a una canción.
///
/// No hay unicidad: la misma persona puede tener varios roles en la misma
/// canción y varias personas pueden compartir rol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleAssignment {
  pub id: RoleAssignmentId,
  pub song_id: SongId,
  pub role: String,
  pub person_id: PersonRef,
  /// Nombre para mostrar, copiado en el momento de la asignación.
  pub person_name: String,
  pub is_open_mic_performer: bool,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRoleAssignment {
  pub role: String,
  pub person_id: PersonRef,
  pub person_name: String,
  #[serde(default)]
  pub is_open_mic_performer: bool,
}

impl NewRoleAssignment {
  pub fn new(role: impl Into<String>, person_id: PersonRef, person_name: impl Into<String>) -> Self {
    Self { role: role.into(), person_id, person_name: person_name.into(), is_open_mic_performer: false }
  }

  pub fn open_mic_performer(mut self) -> Self {
    self.is_open_mic_performer = true;
    self
  }
}
