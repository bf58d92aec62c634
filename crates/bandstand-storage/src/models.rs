use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, NaiveTime, SecondsFormat, Utc};
use diesel::prelude::*;

use bandstand_core::domain::application::OpenMicApplication;
use bandstand_core::domain::event::Event;
use bandstand_core::domain::role::RoleAssignment;
use bandstand_core::domain::setlist::Setlist;
use bandstand_core::domain::song::{Song, SongPatch};
use bandstand_core::domain::Bpm;

use crate::error::StorageError;
use crate::schema::{events, open_mic_applications, setlists, song_role_assignments, songs};

/// Formato único de fechas en la base: RFC 3339 en UTC con microsegundos,
/// así el orden lexicográfico coincide con el cronológico.
pub(crate) fn timestamp(at: DateTime<Utc>) -> String {
  at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Horas de evento como `HH:MM:SS`; la fracción de segundo no se guarda.
fn clock_time(time: NaiveTime) -> String {
  time.format("%H:%M:%S").to_string()
}

fn parse<T>(table: &'static str, raw: &str) -> Result<T, StorageError>
where
  T: FromStr,
  T::Err: Display,
{
  raw.parse().map_err(|e: T::Err| StorageError::Corrupt { table, detail: format!("{raw:?}: {e}") })
}

fn parse_opt<T>(table: &'static str, raw: Option<&str>) -> Result<Option<T>, StorageError>
where
  T: FromStr,
  T::Err: Display,
{
  raw.map(|r| parse(table, r)).transpose()
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = events)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct EventRow {
  pub id: String,
  pub name: String,
  pub slug: String,
  pub date: String,
  pub start_time: String,
  pub end_time: String,
  pub venue: String,
  pub description: String,
  pub open_mic_enabled: bool,
  pub created_by: String,
  pub created_at: String,
  pub updated_at: String,
}

impl From<&Event> for EventRow {
  fn from(e: &Event) -> Self {
    EventRow {
      id: e.id.to_string(),
      name: e.name.clone(),
      slug: e.slug.clone(),
      date: e.date.to_string(),
      start_time: clock_time(e.start_time),
      end_time: clock_time(e.end_time),
      venue: e.venue.clone(),
      description: e.description.clone(),
      open_mic_enabled: e.open_mic_enabled,
      created_by: e.created_by.to_string(),
      created_at: timestamp(e.created_at),
      updated_at: timestamp(e.updated_at),
    }
  }
}

impl EventRow {
  pub fn into_domain(self) -> Result<Event, StorageError> {
    const T: &str = "events";
    Ok(Event {
      id: parse(T, &self.id)?,
      name: self.name,
      slug: self.slug,
      date: parse(T, &self.date)?,
      start_time: parse(T, &self.start_time)?,
      end_time: parse(T, &self.end_time)?,
      venue: self.venue,
      description: self.description,
      open_mic_enabled: self.open_mic_enabled,
      created_by: parse(T, &self.created_by)?,
      created_at: parse(T, &self.created_at)?,
      updated_at: parse(T, &self.updated_at)?,
    })
  }
}

/// Edición de evento: todo salvo slug y autoría.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = events)]
pub struct EventChanges {
  pub name: String,
  pub date: String,
  pub start_time: String,
  pub end_time: String,
  pub venue: String,
  pub description: String,
  pub open_mic_enabled: bool,
  pub updated_at: String,
}

impl From<&Event> for EventChanges {
  fn from(e: &Event) -> Self {
    EventChanges {
      name: e.name.clone(),
      date: e.date.to_string(),
      start_time: clock_time(e.start_time),
      end_time: clock_time(e.end_time),
      venue: e.venue.clone(),
      description: e.description.clone(),
      open_mic_enabled: e.open_mic_enabled,
      updated_at: timestamp(e.updated_at),
    }
  }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = setlists)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SetlistRow {
  pub id: String,
  pub name: String,
  pub event_id: Option<String>,
  pub created_by: String,
  pub created_at: String,
  pub updated_at: String,
}

impl From<&Setlist> for SetlistRow {
  fn from(s: &Setlist) -> Self {
    SetlistRow {
      id: s.id.to_string(),
      name: s.name.clone(),
      event_id: s.event_id.map(|id| id.to_string()),
      created_by: s.created_by.to_string(),
      created_at: timestamp(s.created_at),
      updated_at: timestamp(s.updated_at),
    }
  }
}

impl SetlistRow {
  pub fn into_domain(self) -> Result<Setlist, StorageError> {
    const T: &str = "setlists";
    Ok(Setlist {
      id: parse(T, &self.id)?,
      name: self.name,
      event_id: parse_opt(T, self.event_id.as_deref())?,
      created_by: parse(T, &self.created_by)?,
      created_at: parse(T, &self.created_at)?,
      updated_at: parse(T, &self.updated_at)?,
    })
  }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = songs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SongRow {
  pub id: String,
  pub setlist_id: String,
  pub name: String,
  pub musical_key: String,
  pub bpm: i32,
  pub arrangement_notes: String,
  pub position: i32,
  pub is_open_mic: bool,
  pub open_mic_application_id: Option<String>,
  pub created_at: String,
  pub updated_at: String,
}

impl SongRow {
  pub fn from_domain(s: &Song) -> Result<Self, StorageError> {
    let position = i32::try_from(s.position)
      .map_err(|_| StorageError::Corrupt { table: "songs", detail: format!("position {} overflows", s.position) })?;
    Ok(SongRow {
      id: s.id.to_string(),
      setlist_id: s.setlist_id.to_string(),
      name: s.name.clone(),
      musical_key: s.key.to_string(),
      bpm: i32::from(s.bpm.get()),
      arrangement_notes: s.arrangement_notes.clone(),
      position,
      is_open_mic: s.is_open_mic,
      open_mic_application_id: s.open_mic_application_id.map(|id| id.to_string()),
      created_at: timestamp(s.created_at),
      updated_at: timestamp(s.updated_at),
    })
  }

  pub fn into_domain(self) -> Result<Song, StorageError> {
    const T: &str = "songs";
    let bpm = Bpm::from_i64(i64::from(self.bpm))
      .ok_or_else(|| StorageError::Corrupt { table: T, detail: format!("bpm {} out of range", self.bpm) })?;
    let position = u32::try_from(self.position)
      .map_err(|_| StorageError::Corrupt { table: T, detail: format!("negative position {}", self.position) })?;

    Ok(Song {
      id: parse(T, &self.id)?,
      setlist_id: parse(T, &self.setlist_id)?,
      name: self.name,
      key: parse(T, &self.musical_key)?,
      bpm,
      arrangement_notes: self.arrangement_notes,
      position,
      is_open_mic: self.is_open_mic,
      open_mic_application_id: parse_opt(T, self.open_mic_application_id.as_deref())?,
      created_at: parse(T, &self.created_at)?,
      updated_at: parse(T, &self.updated_at)?,
    })
  }
}

/// Parche de canción; los `None` no se tocan.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = songs)]
pub struct SongChanges {
  pub name: Option<String>,
  pub musical_key: Option<String>,
  pub bpm: Option<i32>,
  pub arrangement_notes: Option<String>,
  pub updated_at: String,
}

impl SongChanges {
  pub fn new(patch: &SongPatch, at: DateTime<Utc>) -> Self {
    SongChanges {
      name: patch.name.clone(),
      musical_key: patch.key.map(|k| k.to_string()),
      bpm: patch.bpm.map(|b| i32::from(b.get())),
      arrangement_notes: patch.arrangement_notes.clone(),
      updated_at: timestamp(at),
    }
  }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = song_role_assignments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RoleRow {
  pub id: String,
  pub song_id: String,
  pub role: String,
  pub person_id: String,
  pub person_name: String,
  pub is_open_mic_performer: bool,
  pub created_at: String,
}

impl From<&RoleAssignment> for RoleRow {
  fn from(r: &RoleAssignment) -> Self {
    RoleRow {
      id: r.id.to_string(),
      song_id: r.song_id.to_string(),
      role: r.role.clone(),
      person_id: r.person_id.to_string(),
      person_name: r.person_name.clone(),
      is_open_mic_performer: r.is_open_mic_performer,
      created_at: timestamp(r.created_at),
    }
  }
}

impl RoleRow {
  pub fn into_domain(self) -> Result<RoleAssignment, StorageError> {
    const T: &str = "song_role_assignments";
    Ok(RoleAssignment {
      id: parse(T, &self.id)?,
      song_id: parse(T, &self.song_id)?,
      role: self.role,
      person_id: parse(T, &self.person_id)?,
      person_name: self.person_name,
      is_open_mic_performer: self.is_open_mic_performer,
      created_at: parse(T, &self.created_at)?,
    })
  }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = open_mic_applications)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ApplicationRow {
  pub id: String,
  pub event_id: String,
  pub full_name: String,
  pub email: String,
  pub phone: Option<String>,
  pub song: String,
  pub instrument_needs: String,
  pub status: String,
  pub organiser_notes: Option<String>,
  pub submitted_at: String,
  pub updated_at: String,
}

impl From<&OpenMicApplication> for ApplicationRow {
  fn from(a: &OpenMicApplication) -> Self {
    ApplicationRow {
      id: a.id.to_string(),
      event_id: a.event_id.to_string(),
      full_name: a.full_name.clone(),
      email: a.email.clone(),
      phone: a.phone.clone(),
      song: a.song.clone(),
      instrument_needs: a.instrument_needs.clone(),
      status: a.status.as_str().to_string(),
      organiser_notes: a.organiser_notes.clone(),
      submitted_at: timestamp(a.submitted_at),
      updated_at: timestamp(a.updated_at),
    }
  }
}

impl ApplicationRow {
  pub fn into_domain(self) -> Result<OpenMicApplication, StorageError> {
    const T: &str = "open_mic_applications";
    Ok(OpenMicApplication {
      id: parse(T, &self.id)?,
      event_id: parse(T, &self.event_id)?,
      full_name: self.full_name,
      email: self.email,
      phone: self.phone,
      song: self.song,
      instrument_needs: self.instrument_needs,
      status: parse(T, &self.status)?,
      organiser_notes: self.organiser_notes,
      submitted_at: parse(T, &self.submitted_at)?,
      updated_at: parse(T, &self.updated_at)?,
    })
  }
}

/// Cambio de estado; `organiser_notes` sólo se escribe si viene.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = open_mic_applications)]
pub struct ApplicationStatusChange {
  pub status: String,
  pub organiser_notes: Option<String>,
  pub updated_at: String,
}
