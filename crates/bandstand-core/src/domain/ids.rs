use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Declara un identificador opaco respaldado por un UUID v4.
///
/// Todos comparten la misma forma: `new()` genera uno aleatorio,
/// `from_uuid`/`as_uuid` convierten, y `Display`/`FromStr` usan la forma
/// canónica con guiones (así se guardan en la base de datos).
macro_rules! uuid_id {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct $name(Uuid);

    impl $name {
      pub fn new() -> Self {
        $name(Uuid::new_v4())
      }

      pub fn from_uuid(u: Uuid) -> Self {
        $name(u)
      }

      pub fn as_uuid(&self) -> Uuid {
        self.0
      }
    }

    impl Default for $name {
      fn default() -> Self {
        Self::new()
      }
    }

    impl From<Uuid> for $name {
      fn from(u: Uuid) -> Self {
        $name(u)
      }
    }

    impl From<$name> for Uuid {
      fn from(id: $name) -> Self {
        id.0
      }
    }

    impl FromStr for $name {
      type Err = uuid::Error;

      fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map($name)
      }
    }

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
      }
    }
  };
}

uuid_id!(
  /// Usuario del equipo (perfil del proveedor de identidad).
  ProfileId
);

uuid_id!(
  /// Evento (concierto, ensayo, noche de open mic...).
  EventId
);

uuid_id!(
  /// Setlist: contenedor ordenado de canciones.
  SetlistId
);

uuid_id!(
  /// Canción dentro de una setlist concreta.
  ///
  /// No es una obra abstracta: la misma canción tocada en dos setlists son
  /// dos filas con ids distintos.
  SongId
);

uuid_id!(RoleAssignmentId);

uuid_id!(
  /// Solicitud pública para tocar en el open mic de un evento.
  ApplicationId
);
