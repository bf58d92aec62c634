use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use crate::domain::ids::{SetlistId, SongId};
use crate::domain::song::{NewSong, Song, SongPatch};
use crate::errors::CoreError;
use crate::ports::{ActorContext, RepoError, SetlistRepository, SongRepository};
use crate::services::access::{require_organiser, required_text};
use crate::services::clock::now;

/// Mantiene el orden 1-based de las canciones de cada setlist.
///
/// El reorden sólo afecta al carril principal (canciones que no son de open
/// mic) y se persiste como un único lote todo-o-nada.
pub struct SongSequencer<R, A> {
  repo: R,
  actor: A,
}

impl<R, A> SongSequencer<R, A>
where
  R: SetlistRepository + SongRepository,
  A: ActorContext,
{
  pub fn new(repo: R, actor: A) -> Self {
    Self { repo, actor }
  }

  /// Añade una canción al final: `position = canciones actuales + 1`.
  pub async fn append(&self, setlist_id: SetlistId, data: NewSong) -> Result<Song, CoreError> {
    require_organiser(&self.actor, "add songs")?;
    let name = required_text("song name", &data.name)?;
    ensure_setlist(&self.repo, setlist_id).await?;

    let at = now();
    let draft = Song {
      id: SongId::new(),
      setlist_id,
      name,
      key: data.key.unwrap_or_default(),
      bpm: data.bpm.unwrap_or_default(),
      arrangement_notes: data.arrangement_notes.unwrap_or_default(),
      position: 0,
      is_open_mic: false,
      open_mic_application_id: None,
      created_at: at,
      updated_at: at,
    };

    let song = append_row(&self.repo, draft).await?;
    info!(setlist = %setlist_id, song = %song.id, position = song.position, "song appended");
    Ok(song)
  }

  /// Cambia nombre, tonalidad, tempo o notas; lo que venga en el parche.
  pub async fn update_song(&self, song_id: SongId, mut patch: SongPatch) -> Result<Song, CoreError> {
    require_organiser(&self.actor, "edit songs")?;
    if patch.is_empty() {
      return Err(CoreError::validation("nothing to update"));
    }
    if let Some(name) = &patch.name {
      patch.name = Some(required_text("song name", name)?);
    }

    if !self.repo.update_song(song_id, &patch, now()).await? {
      return Err(CoreError::not_found("song", song_id));
    }

    let song = self.repo.find_song(song_id).await?.ok_or_else(|| CoreError::not_found("song", song_id))?;
    info!(song = %song_id, "song updated");
    Ok(song)
  }

  /// Borra la canción y sus roles. No renumera el resto: el hueco se
  /// tolera en lectura hasta el siguiente [`Self::reorder`] o [`Self::compact`].
  pub async fn remove(&self, song_id: SongId) -> Result<(), CoreError> {
    require_organiser(&self.actor, "remove songs")?;
    if !self.repo.delete_song(song_id).await? {
      return Err(CoreError::not_found("song", song_id));
    }
    info!(song = %song_id, "song removed");
    Ok(())
  }

  /// Aplica un orden completo del carril principal.
  ///
  /// `ordering` debe contener exactamente las canciones que no son de open
  /// mic, cada una una vez; si no, no se escribe nada. Cada canción pasa a
  /// tener como posición su índice 1-based en la lista. Las de open mic no
  /// se tocan. Devuelve la setlist releída.
  pub async fn reorder(&self, setlist_id: SetlistId, ordering: &[SongId]) -> Result<Vec<Song>, CoreError> {
    require_organiser(&self.actor, "reorder songs")?;
    ensure_setlist(&self.repo, setlist_id).await?;

    let current = self.repo.list_songs(setlist_id).await?;
    let changes = plan_reorder(&current, ordering)?;
    self.persist_positions(setlist_id, current, changes).await
  }

  /// Arrastrar y soltar: mueve `song_id` a `new_index` (0-based dentro del
  /// carril principal) y reordena.
  pub async fn move_song(
    &self,
    setlist_id: SetlistId,
    song_id: SongId,
    new_index: usize,
  ) -> Result<Vec<Song>, CoreError> {
    require_organiser(&self.actor, "reorder songs")?;
    let current = self.repo.list_songs(setlist_id).await?;
    let regular: Vec<SongId> = current.iter().filter(|s| !s.is_open_mic).map(|s| s.id).collect();

    let Some(old_index) = regular.iter().position(|id| *id == song_id) else {
      if current.iter().any(|s| s.id == song_id) {
        return Err(CoreError::validation("open-mic songs are not part of the main running order"));
      }
      return Err(CoreError::not_found("song", song_id));
    };

    let ordering = move_item(&regular, old_index, new_index)
      .ok_or_else(|| CoreError::validation(format!("index {new_index} is out of range")))?;

    self.reorder(setlist_id, &ordering).await
  }

  /// Renumera toda la setlist a `1..=N`: primero el carril principal y luego
  /// el de open mic, conservando el orden actual de cada uno.
  pub async fn compact(&self, setlist_id: SetlistId) -> Result<Vec<Song>, CoreError> {
    require_organiser(&self.actor, "reorder songs")?;
    ensure_setlist(&self.repo, setlist_id).await?;

    let current = self.repo.list_songs(setlist_id).await?;
    let lanes = current.iter().filter(|s| !s.is_open_mic).chain(current.iter().filter(|s| s.is_open_mic));
    let changes = changed_positions(lanes);

    self.persist_positions(setlist_id, current, changes).await
  }

  async fn persist_positions(
    &self,
    setlist_id: SetlistId,
    current: Vec<Song>,
    changes: Vec<(SongId, u32)>,
  ) -> Result<Vec<Song>, CoreError> {
    if changes.is_empty() {
      debug!(setlist = %setlist_id, "positions already in place");
      return Ok(current);
    }

    match self.repo.set_positions(setlist_id, &changes, now()).await {
      Ok(()) => {}
      Err(RepoError::NotFound(id)) => {
        warn!(setlist = %setlist_id, song = %id, "position batch rejected");
        return Err(CoreError::not_found("song", id));
      }
      Err(e) => return Err(e.into()),
    }

    info!(setlist = %setlist_id, updated = changes.len(), "songs reordered");
    Ok(self.repo.list_songs(setlist_id).await?)
  }
}

pub(crate) async fn ensure_setlist<R>(repo: &R, setlist_id: SetlistId) -> Result<(), CoreError>
where
  R: SetlistRepository + ?Sized,
{
  match repo.find_setlist(setlist_id).await? {
    Some(_) => Ok(()),
    None => Err(CoreError::not_found("setlist", setlist_id)),
  }
}

/// Inserta `song` al final de su setlist.
pub(crate) async fn append_row<R>(repo: &R, mut song: Song) -> Result<Song, CoreError>
where
  R: SongRepository + ?Sized,
{
  song.position = repo.count_songs(song.setlist_id).await? + 1;
  repo.insert_song(&song).await?;
  Ok(song)
}

/// Valida `ordering` contra las canciones actuales y devuelve sólo las
/// posiciones que cambian.
fn plan_reorder(current: &[Song], ordering: &[SongId]) -> Result<Vec<(SongId, u32)>, CoreError> {
  let by_id: HashMap<SongId, &Song> = current.iter().map(|s| (s.id, s)).collect();
  let regular_count = current.iter().filter(|s| !s.is_open_mic).count();

  if ordering.len() != regular_count {
    return Err(CoreError::validation(format!(
      "ordering must list all {regular_count} songs of the main running order, got {}",
      ordering.len()
    )));
  }

  let mut seen = HashSet::with_capacity(ordering.len());
  let mut lane = Vec::with_capacity(ordering.len());

  for id in ordering {
    if !seen.insert(*id) {
      return Err(CoreError::validation(format!("song {id} appears more than once")));
    }
    match by_id.get(id) {
      None => return Err(CoreError::validation(format!("song {id} is not in this setlist"))),
      Some(song) if song.is_open_mic => {
        return Err(CoreError::validation(format!("open-mic song {id} cannot be placed in the main running order")));
      }
      Some(song) => lane.push(*song),
    }
  }

  Ok(changed_positions(lane))
}

/// Posición 1-based de cada canción según el orden del iterador, omitiendo
/// las que ya están en su sitio.
fn changed_positions<'a>(songs: impl IntoIterator<Item = &'a Song>) -> Vec<(SongId, u32)> {
  songs
    .into_iter()
    .zip(1u32..)
    .filter(|(song, position)| song.position != *position)
    .map(|(song, position)| (song.id, position))
    .collect()
}

/// Quita el elemento en `from` y lo inserta en `to`.
///
/// Es el cálculo que hace el cliente al soltar una fila arrastrada.
/// Devuelve `None` si algún índice está fuera de rango.
pub fn move_item<T: Clone>(items: &[T], from: usize, to: usize) -> Option<Vec<T>> {
  if from >= items.len() || to >= items.len() {
    return None;
  }
  let mut out = items.to_vec();
  let moved = out.remove(from);
  out.insert(to, moved);
  Some(out)
}
