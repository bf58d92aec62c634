use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::application::{ApplicationStatus, OpenMicApplication};
use crate::domain::event::Event;
use crate::domain::ids::{ApplicationId, EventId, RoleAssignmentId, SetlistId, SongId};
use crate::domain::role::RoleAssignment;
use crate::domain::setlist::{Setlist, SetlistFilter, SetlistSummary};
use crate::domain::song::{Song, SongPatch};

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
  /// La fila a modificar no existe (lleva el id).
  #[error("entity not found: {0}")]
  NotFound(String),
  /// Violación de una restricción de unicidad del almacenamiento.
  #[error("conflict: {0}")]
  Conflict(String),
  #[error("storage error: {0}")]
  Storage(String),
}

// Los métodos de actualización/borrado devuelven `false` cuando el id no
// existe; decidir si eso es un error es cosa del servicio.

#[async_trait]
pub trait SetlistRepository: Send + Sync {
  async fn insert_setlist(&self, setlist: &Setlist) -> Result<(), RepoError>;
  async fn find_setlist(&self, id: SetlistId) -> Result<Option<Setlist>, RepoError>;
  /// Ordenado por `created_at` descendente.
  async fn list_setlists(&self, filter: SetlistFilter) -> Result<Vec<SetlistSummary>, RepoError>;
  async fn rename_setlist(&self, id: SetlistId, name: &str, at: DateTime<Utc>) -> Result<bool, RepoError>;
  async fn set_setlist_event(
    &self,
    id: SetlistId,
    event_id: Option<EventId>,
    at: DateTime<Utc>,
  ) -> Result<bool, RepoError>;
  /// Borra en cascada canciones y asignaciones.
  async fn delete_setlist(&self, id: SetlistId) -> Result<bool, RepoError>;
}

#[async_trait]
pub trait SongRepository: Send + Sync {
  async fn count_songs(&self, setlist_id: SetlistId) -> Result<u32, RepoError>;
  /// Devuelve `Conflict` si ya hay una canción de la misma solicitud de open
  /// mic en la setlist.
  async fn insert_song(&self, song: &Song) -> Result<(), RepoError>;
  async fn find_song(&self, id: SongId) -> Result<Option<Song>, RepoError>;
  async fn find_song_by_application(
    &self,
    setlist_id: SetlistId,
    application_id: ApplicationId,
  ) -> Result<Option<Song>, RepoError>;
  /// Por `position` ascendente; los empates, en orden de inserción.
  async fn list_songs(&self, setlist_id: SetlistId) -> Result<Vec<Song>, RepoError>;
  async fn update_song(&self, id: SongId, patch: &SongPatch, at: DateTime<Utc>) -> Result<bool, RepoError>;
  /// Borra en cascada sus asignaciones de roles.
  async fn delete_song(&self, id: SongId) -> Result<bool, RepoError>;
  /// Aplica todas las posiciones o ninguna. Si una canción no existe o no
  /// pertenece a `setlist_id` se devuelve `NotFound` con su id.
  async fn set_positions(
    &self,
    setlist_id: SetlistId,
    positions: &[(SongId, u32)],
    at: DateTime<Utc>,
  ) -> Result<(), RepoError>;
}

#[async_trait]
pub trait RoleRepository: Send + Sync {
  async fn insert_role(&self, assignment: &RoleAssignment) -> Result<(), RepoError>;
  async fn delete_role(&self, id: RoleAssignmentId) -> Result<bool, RepoError>;
  /// Asignaciones de todas las canciones dadas, en orden de creación.
  async fn list_roles(&self, song_ids: &[SongId]) -> Result<Vec<RoleAssignment>, RepoError>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
  /// Devuelve `Conflict` si el slug ya existe.
  async fn insert_event(&self, event: &Event) -> Result<(), RepoError>;
  async fn find_event(&self, id: EventId) -> Result<Option<Event>, RepoError>;
  async fn find_event_by_slug(&self, slug: &str) -> Result<Option<Event>, RepoError>;
  /// Sobrescribe los campos editables; `slug`, `created_by` y `created_at`
  /// no se tocan.
  async fn update_event(&self, event: &Event) -> Result<bool, RepoError>;
}

#[async_trait]
pub trait ApplicationRepository: Send + Sync {
  async fn insert_application(&self, application: &OpenMicApplication) -> Result<(), RepoError>;
  async fn find_application(&self, id: ApplicationId) -> Result<Option<OpenMicApplication>, RepoError>;
  /// Ordenadas por fecha de envío; con `status` sólo las de ese estado.
  async fn list_applications(
    &self,
    event_id: EventId,
    status: Option<ApplicationStatus>,
  ) -> Result<Vec<OpenMicApplication>, RepoError>;
  /// `organiser_notes` sólo se sobrescribe si es `Some`.
  async fn update_application_status(
    &self,
    id: ApplicationId,
    status: ApplicationStatus,
    organiser_notes: Option<&str>,
    at: DateTime<Utc>,
  ) -> Result<bool, RepoError>;
}
