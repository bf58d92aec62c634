use std::collections::HashMap;

use tracing::{debug, info};

use crate::domain::ids::{EventId, SetlistId, SongId};
use crate::domain::role::RoleAssignment;
use crate::domain::setlist::{Setlist, SetlistFilter, SetlistSummary, SetlistWithSongs};
use crate::domain::song::SongWithRoles;
use crate::errors::CoreError;
use crate::ports::{ActorContext, EventRepository, RoleRepository, SetlistRepository, SongRepository};
use crate::services::access::{require_organiser, required_text};
use crate::services::clock::now;

/// Alta, baja y consulta de setlists, y su enlace opcional con un evento.
pub struct SetlistService<R, A> {
  repo: R,
  actor: A,
}

impl<R, A> SetlistService<R, A>
where
  R: SetlistRepository + SongRepository + RoleRepository + EventRepository,
  A: ActorContext,
{
  pub fn new(repo: R, actor: A) -> Self {
    Self { repo, actor }
  }

  // -------- COMMAND (write) --------

  /// Crea una setlist vacía y sin evento a nombre del actor actual.
  pub async fn create_setlist(&self, name: &str) -> Result<Setlist, CoreError> {
    let actor = require_organiser(&self.actor, "create setlists")?;
    let name = required_text("setlist name", name)?;

    let at = now();
    let setlist = Setlist {
      id: SetlistId::new(),
      name,
      event_id: None,
      created_by: actor.id,
      created_at: at,
      updated_at: at,
    };

    self.repo.insert_setlist(&setlist).await?;
    info!(setlist = %setlist.id, name = %setlist.name, "setlist created");
    Ok(setlist)
  }

  pub async fn rename_setlist(&self, id: SetlistId, name: &str) -> Result<Setlist, CoreError> {
    require_organiser(&self.actor, "rename setlists")?;
    let name = required_text("setlist name", name)?;

    if !self.repo.rename_setlist(id, &name, now()).await? {
      return Err(CoreError::not_found("setlist", id));
    }
    info!(setlist = %id, name = %name, "setlist renamed");
    self.find(id).await
  }

  /// Borra la setlist con sus canciones y asignaciones.
  pub async fn delete_setlist(&self, id: SetlistId) -> Result<(), CoreError> {
    require_organiser(&self.actor, "delete setlists")?;
    if !self.repo.delete_setlist(id).await? {
      return Err(CoreError::not_found("setlist", id));
    }
    info!(setlist = %id, "setlist deleted");
    Ok(())
  }

  /// Enlaza la setlist con un evento.
  ///
  /// No se comprueba si el evento ya tiene otra: pueden convivir varias y
  /// [`Self::event_setlist`] devuelve la más reciente.
  pub async fn attach(&self, setlist_id: SetlistId, event_id: EventId) -> Result<Setlist, CoreError> {
    require_organiser(&self.actor, "attach setlists")?;
    if self.repo.find_event(event_id).await?.is_none() {
      return Err(CoreError::not_found("event", event_id));
    }

    if !self.repo.set_setlist_event(setlist_id, Some(event_id), now()).await? {
      return Err(CoreError::not_found("setlist", setlist_id));
    }
    info!(setlist = %setlist_id, event = %event_id, "setlist attached");
    self.find(setlist_id).await
  }

  pub async fn detach(&self, setlist_id: SetlistId) -> Result<Setlist, CoreError> {
    require_organiser(&self.actor, "detach setlists")?;
    if !self.repo.set_setlist_event(setlist_id, None, now()).await? {
      return Err(CoreError::not_found("setlist", setlist_id));
    }
    info!(setlist = %setlist_id, "setlist detached");
    self.find(setlist_id).await
  }

  // -------- QUERY (read) --------

  /// Setlist completa: canciones en orden de presentación con sus roles.
  pub async fn get_setlist(&self, id: SetlistId) -> Result<SetlistWithSongs, CoreError> {
    let setlist = self.find(id).await?;
    load_songs(&self.repo, setlist).await
  }

  pub async fn list_setlists(&self) -> Result<Vec<SetlistSummary>, CoreError> {
    Ok(self.repo.list_setlists(SetlistFilter::All).await?)
  }

  /// Setlists sin evento, candidatas a adjuntarse a uno.
  pub async fn unattached_setlists(&self) -> Result<Vec<SetlistSummary>, CoreError> {
    Ok(self.repo.list_setlists(SetlistFilter::Unattached).await?)
  }

  /// "La" setlist del evento: la creada más recientemente de las enlazadas.
  pub async fn event_setlist(&self, event_id: EventId) -> Result<Option<SetlistWithSongs>, CoreError> {
    if self.repo.find_event(event_id).await?.is_none() {
      return Err(CoreError::not_found("event", event_id));
    }

    let attached = self.repo.list_setlists(SetlistFilter::ForEvent(event_id)).await?;
    debug!(event = %event_id, attached = attached.len(), "resolving event setlist");

    match attached.into_iter().next() {
      Some(summary) => Ok(Some(load_songs(&self.repo, summary.setlist).await?)),
      None => Ok(None),
    }
  }

  async fn find(&self, id: SetlistId) -> Result<Setlist, CoreError> {
    self.repo.find_setlist(id).await?.ok_or_else(|| CoreError::not_found("setlist", id))
  }
}

/// Arma el modelo de lectura con dos consultas: canciones y roles.
async fn load_songs<R>(repo: &R, setlist: Setlist) -> Result<SetlistWithSongs, CoreError>
where
  R: SongRepository + RoleRepository + ?Sized,
{
  let songs = repo.list_songs(setlist.id).await?;
  let ids: Vec<SongId> = songs.iter().map(|s| s.id).collect();

  let mut roles_by_song: HashMap<SongId, Vec<RoleAssignment>> = HashMap::new();
  for role in repo.list_roles(&ids).await? {
    roles_by_song.entry(role.song_id).or_default().push(role);
  }

  let songs = songs
    .into_iter()
    .map(|song| {
      let roles = roles_by_song.remove(&song.id).unwrap_or_default();
      SongWithRoles { song, roles }
    })
    .collect();

  Ok(SetlistWithSongs { setlist, songs })
}
