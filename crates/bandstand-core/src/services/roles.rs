use tracing::info;

use crate::domain::ids::{RoleAssignmentId, SongId};
use crate::domain::role::{NewRoleAssignment, RoleAssignment};
use crate::errors::CoreError;
use crate::ports::{ActorContext, RoleRepository, SongRepository};
use crate::services::access::{require_organiser, required_text};
use crate::services::clock::now;

/// Registro de quién hace qué en cada canción.
///
/// No deduplica: dos asignaciones idénticas son dos filas. Evitar
/// duplicados, si se quiere, es cosa de la interfaz.
pub struct RoleLedger<R, A> {
  repo: R,
  actor: A,
}

impl<R, A> RoleLedger<R, A>
where
  R: SongRepository + RoleRepository,
  A: ActorContext,
{
  pub fn new(repo: R, actor: A) -> Self {
    Self { repo, actor }
  }

  pub async fn add_role(&self, song_id: SongId, data: NewRoleAssignment) -> Result<RoleAssignment, CoreError> {
    require_organiser(&self.actor, "assign roles")?;
    let role = required_text("role", &data.role)?;
    let person_name = required_text("person name", &data.person_name)?;

    if self.repo.find_song(song_id).await?.is_none() {
      return Err(CoreError::not_found("song", song_id));
    }

    let assignment = RoleAssignment {
      id: RoleAssignmentId::new(),
      song_id,
      role,
      person_id: data.person_id,
      person_name,
      is_open_mic_performer: data.is_open_mic_performer,
      created_at: now(),
    };

    self.repo.insert_role(&assignment).await?;
    info!(
      song = %song_id,
      role = %assignment.role,
      person = %assignment.person_id,
      "role assigned"
    );
    Ok(assignment)
  }

  pub async fn remove_role(&self, id: RoleAssignmentId) -> Result<(), CoreError> {
    require_organiser(&self.actor, "remove roles")?;
    if !self.repo.delete_role(id).await? {
      return Err(CoreError::not_found("role assignment", id));
    }
    info!(assignment = %id, "role removed");
    Ok(())
  }

  /// Asignaciones de la canción en orden de creación.
  pub async fn roles_for_song(&self, song_id: SongId) -> Result<Vec<RoleAssignment>, CoreError> {
    if self.repo.find_song(song_id).await?.is_none() {
      return Err(CoreError::not_found("song", song_id));
    }
    Ok(self.repo.list_roles(&[song_id]).await?)
  }
}
