#![allow(dead_code)]

use std::cmp::Reverse;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use bandstand_core::domain::application::{ApplicationStatus, OpenMicApplication};
use bandstand_core::domain::event::{Event, NewEvent};
use bandstand_core::domain::ids::{ApplicationId, EventId, ProfileId, RoleAssignmentId, SetlistId, SongId};
use bandstand_core::domain::role::RoleAssignment;
use bandstand_core::domain::setlist::{Setlist, SetlistFilter, SetlistSummary};
use bandstand_core::domain::song::{Song, SongPatch};
use bandstand_core::domain::Actor;
use bandstand_core::ports::{
  ApplicationRepository, EventRepository, FixedActor, RepoError, RoleRepository, SetlistRepository, SongRepository,
};
use bandstand_core::services::{EventService, OpenMicService, RoleLedger, SetlistService, SongSequencer};

#[derive(Default)]
struct State {
  setlists: Vec<Setlist>,
  songs: Vec<Song>,
  roles: Vec<RoleAssignment>,
  events: Vec<Event>,
  applications: Vec<OpenMicApplication>,
  fail_writes: bool,
}

/// Repositorio en memoria con la misma semántica que el adaptador SQLite:
/// cascadas, unicidad por solicitud y lotes de posiciones todo-o-nada.
#[derive(Clone, Default)]
pub struct MemoryStore {
  state: Arc<Mutex<State>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> MutexGuard<'_, State> {
    self.state.lock().unwrap()
  }

  /// Hace fallar todas las escrituras siguientes con `RepoError::Storage`.
  pub fn fail_writes(&self, fail: bool) {
    self.lock().fail_writes = fail;
  }

  /// Escribe una posición directamente, saltándose los servicios.
  pub fn force_position(&self, song_id: SongId, position: u32) {
    let mut state = self.lock();
    if let Some(song) = state.songs.iter_mut().find(|s| s.id == song_id) {
      song.position = position;
    }
  }

  pub fn song_count(&self) -> usize {
    self.lock().songs.len()
  }

  pub fn role_count(&self) -> usize {
    self.lock().roles.len()
  }
}

fn check_writable(state: &State) -> Result<(), RepoError> {
  if state.fail_writes {
    return Err(RepoError::Storage("disk I/O error".into()));
  }
  Ok(())
}

#[async_trait]
impl SetlistRepository for MemoryStore {
  async fn insert_setlist(&self, setlist: &Setlist) -> Result<(), RepoError> {
    let mut state = self.lock();
    check_writable(&state)?;
    state.setlists.push(setlist.clone());
    Ok(())
  }

  async fn find_setlist(&self, id: SetlistId) -> Result<Option<Setlist>, RepoError> {
    Ok(self.lock().setlists.iter().find(|s| s.id == id).cloned())
  }

  async fn list_setlists(&self, filter: SetlistFilter) -> Result<Vec<SetlistSummary>, RepoError> {
    let state = self.lock();
    let mut out: Vec<SetlistSummary> = state
      .setlists
      .iter()
      .rev()
      .filter(|s| match filter {
        SetlistFilter::All => true,
        SetlistFilter::Unattached => s.event_id.is_none(),
        SetlistFilter::ForEvent(event_id) => s.event_id == Some(event_id),
      })
      .map(|s| SetlistSummary {
        setlist: s.clone(),
        song_count: state.songs.iter().filter(|song| song.setlist_id == s.id).count() as u32,
      })
      .collect();
    out.sort_by_key(|s| Reverse(s.setlist.created_at));
    Ok(out)
  }

  async fn rename_setlist(&self, id: SetlistId, name: &str, at: DateTime<Utc>) -> Result<bool, RepoError> {
    let mut state = self.lock();
    check_writable(&state)?;
    Ok(match state.setlists.iter_mut().find(|s| s.id == id) {
      Some(s) => {
        s.name = name.to_string();
        s.updated_at = at;
        true
      }
      None => false,
    })
  }

  async fn set_setlist_event(
    &self,
    id: SetlistId,
    event_id: Option<EventId>,
    at: DateTime<Utc>,
  ) -> Result<bool, RepoError> {
    let mut state = self.lock();
    check_writable(&state)?;
    Ok(match state.setlists.iter_mut().find(|s| s.id == id) {
      Some(s) => {
        s.event_id = event_id;
        s.updated_at = at;
        true
      }
      None => false,
    })
  }

  async fn delete_setlist(&self, id: SetlistId) -> Result<bool, RepoError> {
    let mut state = self.lock();
    check_writable(&state)?;
    let before = state.setlists.len();
    state.setlists.retain(|s| s.id != id);
    if state.setlists.len() == before {
      return Ok(false);
    }
    let gone: Vec<SongId> = state.songs.iter().filter(|s| s.setlist_id == id).map(|s| s.id).collect();
    state.songs.retain(|s| s.setlist_id != id);
    state.roles.retain(|r| !gone.contains(&r.song_id));
    Ok(true)
  }
}

#[async_trait]
impl SongRepository for MemoryStore {
  async fn count_songs(&self, setlist_id: SetlistId) -> Result<u32, RepoError> {
    Ok(self.lock().songs.iter().filter(|s| s.setlist_id == setlist_id).count() as u32)
  }

  async fn insert_song(&self, song: &Song) -> Result<(), RepoError> {
    let mut state = self.lock();
    check_writable(&state)?;
    if song.open_mic_application_id.is_some()
      && state
        .songs
        .iter()
        .any(|s| s.setlist_id == song.setlist_id && s.open_mic_application_id == song.open_mic_application_id)
    {
      return Err(RepoError::Conflict("UNIQUE constraint failed: songs.setlist_id, songs.open_mic_application_id".into()));
    }
    state.songs.push(song.clone());
    Ok(())
  }

  async fn find_song(&self, id: SongId) -> Result<Option<Song>, RepoError> {
    Ok(self.lock().songs.iter().find(|s| s.id == id).cloned())
  }

  async fn find_song_by_application(
    &self,
    setlist_id: SetlistId,
    application_id: ApplicationId,
  ) -> Result<Option<Song>, RepoError> {
    Ok(
      self
        .lock()
        .songs
        .iter()
        .find(|s| s.setlist_id == setlist_id && s.open_mic_application_id == Some(application_id))
        .cloned(),
    )
  }

  async fn list_songs(&self, setlist_id: SetlistId) -> Result<Vec<Song>, RepoError> {
    let mut songs: Vec<Song> = self.lock().songs.iter().filter(|s| s.setlist_id == setlist_id).cloned().collect();
    // `songs` está en orden de inserción y el sort es estable.
    songs.sort_by_key(|s| s.position);
    Ok(songs)
  }

  async fn update_song(&self, id: SongId, patch: &SongPatch, at: DateTime<Utc>) -> Result<bool, RepoError> {
    let mut state = self.lock();
    check_writable(&state)?;
    let Some(song) = state.songs.iter_mut().find(|s| s.id == id) else {
      return Ok(false);
    };
    if let Some(name) = &patch.name {
      song.name = name.clone();
    }
    if let Some(key) = patch.key {
      song.key = key;
    }
    if let Some(bpm) = patch.bpm {
      song.bpm = bpm;
    }
    if let Some(notes) = &patch.arrangement_notes {
      song.arrangement_notes = notes.clone();
    }
    song.updated_at = at;
    Ok(true)
  }

  async fn delete_song(&self, id: SongId) -> Result<bool, RepoError> {
    let mut state = self.lock();
    check_writable(&state)?;
    let before = state.songs.len();
    state.songs.retain(|s| s.id != id);
    state.roles.retain(|r| r.song_id != id);
    Ok(state.songs.len() != before)
  }

  async fn set_positions(
    &self,
    setlist_id: SetlistId,
    positions: &[(SongId, u32)],
    at: DateTime<Utc>,
  ) -> Result<(), RepoError> {
    let mut state = self.lock();
    check_writable(&state)?;
    if let Some((missing, _)) =
      positions.iter().find(|(id, _)| !state.songs.iter().any(|s| s.id == *id && s.setlist_id == setlist_id))
    {
      return Err(RepoError::NotFound(missing.to_string()));
    }
    for (id, position) in positions {
      if let Some(song) = state.songs.iter_mut().find(|s| s.id == *id) {
        song.position = *position;
        song.updated_at = at;
      }
    }
    Ok(())
  }
}

#[async_trait]
impl RoleRepository for MemoryStore {
  async fn insert_role(&self, assignment: &RoleAssignment) -> Result<(), RepoError> {
    let mut state = self.lock();
    check_writable(&state)?;
    state.roles.push(assignment.clone());
    Ok(())
  }

  async fn delete_role(&self, id: RoleAssignmentId) -> Result<bool, RepoError> {
    let mut state = self.lock();
    check_writable(&state)?;
    let before = state.roles.len();
    state.roles.retain(|r| r.id != id);
    Ok(state.roles.len() != before)
  }

  async fn list_roles(&self, song_ids: &[SongId]) -> Result<Vec<RoleAssignment>, RepoError> {
    Ok(self.lock().roles.iter().filter(|r| song_ids.contains(&r.song_id)).cloned().collect())
  }
}

#[async_trait]
impl EventRepository for MemoryStore {
  async fn insert_event(&self, event: &Event) -> Result<(), RepoError> {
    let mut state = self.lock();
    check_writable(&state)?;
    if state.events.iter().any(|e| e.slug == event.slug) {
      return Err(RepoError::Conflict("UNIQUE constraint failed: events.slug".into()));
    }
    state.events.push(event.clone());
    Ok(())
  }

  async fn find_event(&self, id: EventId) -> Result<Option<Event>, RepoError> {
    Ok(self.lock().events.iter().find(|e| e.id == id).cloned())
  }

  async fn find_event_by_slug(&self, slug: &str) -> Result<Option<Event>, RepoError> {
    Ok(self.lock().events.iter().find(|e| e.slug == slug).cloned())
  }

  async fn update_event(&self, event: &Event) -> Result<bool, RepoError> {
    let mut state = self.lock();
    check_writable(&state)?;
    let Some(stored) = state.events.iter_mut().find(|e| e.id == event.id) else {
      return Ok(false);
    };
    *stored = Event { slug: stored.slug.clone(), created_by: stored.created_by, created_at: stored.created_at, ..event.clone() };
    Ok(true)
  }
}

#[async_trait]
impl ApplicationRepository for MemoryStore {
  async fn insert_application(&self, application: &OpenMicApplication) -> Result<(), RepoError> {
    let mut state = self.lock();
    check_writable(&state)?;
    state.applications.push(application.clone());
    Ok(())
  }

  async fn find_application(&self, id: ApplicationId) -> Result<Option<OpenMicApplication>, RepoError> {
    Ok(self.lock().applications.iter().find(|a| a.id == id).cloned())
  }

  async fn list_applications(
    &self,
    event_id: EventId,
    status: Option<ApplicationStatus>,
  ) -> Result<Vec<OpenMicApplication>, RepoError> {
    let mut apps: Vec<OpenMicApplication> = self
      .lock()
      .applications
      .iter()
      .filter(|a| a.event_id == event_id && status.is_none_or(|s| a.status == s))
      .cloned()
      .collect();
    apps.sort_by_key(|a| a.submitted_at);
    Ok(apps)
  }

  async fn update_application_status(
    &self,
    id: ApplicationId,
    status: ApplicationStatus,
    organiser_notes: Option<&str>,
    at: DateTime<Utc>,
  ) -> Result<bool, RepoError> {
    let mut state = self.lock();
    check_writable(&state)?;
    let Some(app) = state.applications.iter_mut().find(|a| a.id == id) else {
      return Ok(false);
    };
    app.status = status;
    if let Some(notes) = organiser_notes {
      app.organiser_notes = Some(notes.to_string());
    }
    app.updated_at = at;
    Ok(true)
  }
}

pub fn organiser() -> FixedActor {
  FixedActor::new(Actor::organiser(ProfileId::new()))
}

pub fn member() -> FixedActor {
  FixedActor::new(Actor::member(ProfileId::new()))
}

/// Todos los servicios sobre el mismo almacén y el mismo actor.
pub struct Team {
  pub store: MemoryStore,
  pub setlists: SetlistService<MemoryStore, FixedActor>,
  pub sequencer: SongSequencer<MemoryStore, FixedActor>,
  pub roles: RoleLedger<MemoryStore, FixedActor>,
  pub open_mic: OpenMicService<MemoryStore, FixedActor>,
  pub events: EventService<MemoryStore, FixedActor>,
}

impl Team {
  pub fn new(store: MemoryStore, actor: FixedActor) -> Self {
    Self {
      setlists: SetlistService::new(store.clone(), actor),
      sequencer: SongSequencer::new(store.clone(), actor),
      roles: RoleLedger::new(store.clone(), actor),
      open_mic: OpenMicService::new(store.clone(), actor),
      events: EventService::new(store.clone(), actor),
      store,
    }
  }

  pub fn organiser() -> Self {
    Self::new(MemoryStore::new(), organiser())
  }
}

pub fn event_form(name: &str) -> NewEvent {
  NewEvent {
    name: name.to_string(),
    date: chrono::NaiveDate::from_ymd_opt(2026, 11, 15).unwrap(),
    start_time: chrono::NaiveTime::from_hms_opt(19, 30, 0).unwrap(),
    end_time: None,
    venue: "The Crown".to_string(),
    description: String::new(),
    open_mic_enabled: true,
  }
}

pub fn positions(songs: &[Song]) -> Vec<(String, u32)> {
  songs.iter().map(|s| (s.name.clone(), s.position)).collect()
}
