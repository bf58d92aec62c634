use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ids::{ApplicationId, SetlistId, SongId};
use crate::domain::key::MusicalKey;
use crate::domain::role::RoleAssignment;
use crate::domain::tempo::Bpm;

/// Una entrada de una setlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
  pub id: SongId,
  pub setlist_id: SetlistId,
  pub name: String,
  pub key: MusicalKey,
  pub bpm: Bpm,
  pub arrangement_notes: String,
  /// Posición 1-based dentro de la setlist.
  ///
  /// Tras un reorden correcto las canciones normales ocupan exactamente
  /// `1..=N`. Las de open mic comparten la columna pero no se renumeran.
  pub position: u32,
  /// Generada a partir de una solicitud pública de open mic.
  pub is_open_mic: bool,
  pub open_mic_application_id: Option<ApplicationId>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Datos que aporta quien añade una canción. Lo que falta toma su valor por
/// defecto (`C`, 120 BPM, sin notas).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewSong {
  pub name: String,
  pub key: Option<MusicalKey>,
  pub bpm: Option<Bpm>,
  pub arrangement_notes: Option<String>,
}

impl NewSong {
  pub fn named(name: impl Into<String>) -> Self {
    Self { name: name.into(), ..Self::default() }
  }
}

/// Cambio campo a campo de una canción. `None` deja el campo como está.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SongPatch {
  pub name: Option<String>,
  pub key: Option<MusicalKey>,
  pub bpm: Option<Bpm>,
  pub arrangement_notes: Option<String>,
}

impl SongPatch {
  pub fn is_empty(&self) -> bool {
    self.name.is_none() && self.key.is_none() && self.bpm.is_none() && self.arrangement_notes.is_none()
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongWithRoles {
  #[serde(flatten)]
  pub song: Song,
  pub roles: Vec<RoleAssignment>,
}
