use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ids::{EventId, ProfileId, SetlistId};
use crate::domain::song::SongWithRoles;

/// Contenedor con nombre de canciones para una actuación.
///
/// Puede existir sin evento. `event_id` es un enlace de un solo sentido:
/// varios setlists pueden apuntar al mismo evento y se considera "el" setlist
/// del evento al creado más recientemente.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setlist {
  pub id: SetlistId,
  pub name: String,
  pub event_id: Option<EventId>,
  pub created_by: ProfileId,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Fila del listado de setlists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetlistSummary {
  pub setlist: Setlist,
  pub song_count: u32,
}

/// Qué setlists devolver en un listado. Siempre ordenados del más nuevo al
/// más antiguo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetlistFilter {
  All,
  /// Sin evento asociado (candidatos para adjuntar).
  Unattached,
  ForEvent(EventId),
}

/// Modelo de lectura completo: la setlist, sus canciones ordenadas y los
/// roles de cada una, obtenido de una sola vez.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetlistWithSongs {
  pub setlist: Setlist,
  pub songs: Vec<SongWithRoles>,
}

impl SetlistWithSongs {
  /// Carril principal, en orden de posición.
  pub fn regular_songs(&self) -> impl Iterator<Item = &SongWithRoles> {
    self.songs.iter().filter(|s| !s.song.is_open_mic)
  }

  /// Carril de open mic, en orden de posición.
  pub fn open_mic_songs(&self) -> impl Iterator<Item = &SongWithRoles> {
    self.songs.iter().filter(|s| s.song.is_open_mic)
  }
}
