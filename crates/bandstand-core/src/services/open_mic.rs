use tracing::{debug, info, warn};

use crate::domain::application::{ApplicationForm, ApplicationStatus, Lineup, OpenMicApplication};
use crate::domain::ids::{ApplicationId, EventId, SetlistId, SongId};
use crate::domain::song::Song;
use crate::errors::CoreError;
use crate::ports::{ActorContext, ApplicationRepository, EventRepository, SetlistRepository, SongRepository};
use crate::services::access::{optional_text, require_organiser, required_text};
use crate::services::clock::now;
use crate::services::sequencer::{append_row, ensure_setlist};

const ALREADY_IN_SETLIST: &str = "This performer is already in the setlist.";

/// Solicitudes públicas de open mic y su paso a la setlist.
pub struct OpenMicService<R, A> {
  repo: R,
  actor: A,
}

impl<R, A> OpenMicService<R, A>
where
  R: SetlistRepository + SongRepository + EventRepository + ApplicationRepository,
  A: ActorContext,
{
  pub fn new(repo: R, actor: A) -> Self {
    Self { repo, actor }
  }

  /// Alta pública de una solicitud; no requiere sesión.
  pub async fn submit_application(
    &self,
    event_id: EventId,
    form: ApplicationForm,
  ) -> Result<OpenMicApplication, CoreError> {
    let full_name = required_text("full name", &form.full_name)?;
    let email = required_text("email", &form.email)?;
    let song = required_text("song", &form.song)?;

    let event = self.repo.find_event(event_id).await?.ok_or_else(|| CoreError::not_found("event", event_id))?;
    if !event.open_mic_enabled {
      return Err(CoreError::validation("open mic is not enabled for this event"));
    }

    let at = now();
    let application = OpenMicApplication {
      id: ApplicationId::new(),
      event_id,
      full_name,
      email,
      phone: optional_text(form.phone.as_deref()),
      song,
      instrument_needs: optional_text(form.instrument_needs.as_deref()).unwrap_or_default(),
      status: ApplicationStatus::Pending,
      organiser_notes: None,
      submitted_at: at,
      updated_at: at,
    };

    self.repo.insert_application(&application).await?;
    info!(event = %event_id, application = %application.id, "open mic application submitted");
    Ok(application)
  }

  /// Cambia el estado sin restricciones de transición. Las notas sólo se
  /// reemplazan si se pasan.
  pub async fn set_application_status(
    &self,
    id: ApplicationId,
    status: ApplicationStatus,
    organiser_notes: Option<&str>,
  ) -> Result<OpenMicApplication, CoreError> {
    require_organiser(&self.actor, "review applications")?;

    if !self.repo.update_application_status(id, status, organiser_notes, now()).await? {
      return Err(CoreError::not_found("application", id));
    }
    info!(application = %id, %status, "application status changed");

    self.repo.find_application(id).await?.ok_or_else(|| CoreError::not_found("application", id))
  }

  /// Solicitudes de un evento por orden de llegada. Sólo organizadores:
  /// contienen datos de contacto.
  pub async fn applications_for_event(&self, event_id: EventId) -> Result<Vec<OpenMicApplication>, CoreError> {
    require_organiser(&self.actor, "review applications")?;
    Ok(self.repo.list_applications(event_id, None).await?)
  }

  /// Cartel público: artistas aprobados de un evento con open mic, sin datos
  /// de contacto. Un slug desconocido y un evento sin open mic dan el mismo
  /// `NotFound`.
  pub async fn lineup(&self, slug: &str) -> Result<Lineup, CoreError> {
    let event = match self.repo.find_event_by_slug(slug).await? {
      Some(event) if event.open_mic_enabled => event,
      _ => return Err(CoreError::not_found("event", slug)),
    };

    let approved = self.repo.list_applications(event.id, Some(ApplicationStatus::Approved)).await?;
    debug!(event = %event.id, performers = approved.len(), "lineup loaded");
    Ok(Lineup { event, performers: approved.into_iter().map(Into::into).collect() })
  }

  /// Añade al artista de una solicitud como canción de open mic al final de
  /// la setlist. Cada solicitud entra como mucho una vez por setlist.
  pub async fn add_from_application(
    &self,
    setlist_id: SetlistId,
    application_id: ApplicationId,
    performer_name: &str,
  ) -> Result<Song, CoreError> {
    require_organiser(&self.actor, "add open mic performers")?;
    let name = required_text("performer name", performer_name)?;
    ensure_setlist(&self.repo, setlist_id).await?;

    if self.repo.find_application(application_id).await?.is_none() {
      return Err(CoreError::not_found("application", application_id));
    }

    if self.repo.find_song_by_application(setlist_id, application_id).await?.is_some() {
      warn!(setlist = %setlist_id, application = %application_id, "performer already in setlist");
      return Err(CoreError::Duplicate(ALREADY_IN_SETLIST.into()));
    }

    let at = now();
    let draft = Song {
      id: SongId::new(),
      setlist_id,
      name,
      key: Default::default(),
      bpm: Default::default(),
      arrangement_notes: String::new(),
      position: 0,
      is_open_mic: true,
      open_mic_application_id: Some(application_id),
      created_at: at,
      updated_at: at,
    };

    // La restricción única del almacenamiento cubre la carrera entre la
    // comprobación anterior y esta inserción.
    let song = match append_row(&self.repo, draft).await {
      Err(CoreError::Duplicate(_)) => return Err(CoreError::Duplicate(ALREADY_IN_SETLIST.into())),
      other => other?,
    };

    info!(setlist = %setlist_id, application = %application_id, song = %song.id, "open mic performer added");
    Ok(song)
  }
}
