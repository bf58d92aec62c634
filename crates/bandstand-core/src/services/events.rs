use tracing::info;

use crate::domain::event::{Event, NewEvent, event_slug};
use crate::domain::ids::EventId;
use crate::errors::CoreError;
use crate::ports::{ActorContext, EventRepository, RepoError};
use crate::services::access::{require_organiser, required_text};
use crate::services::clock::{now, whole_seconds};

pub struct EventService<R, A> {
  repo: R,
  actor: A,
}

/// Campos editables de un evento ya validados.
struct EventFields {
  name: String,
  venue: String,
}

fn validate(form: &NewEvent) -> Result<EventFields, CoreError> {
  Ok(EventFields { name: required_text("event name", &form.name)?, venue: required_text("venue", &form.venue)? })
}

impl<R, A> EventService<R, A>
where
  R: EventRepository,
  A: ActorContext,
{
  pub fn new(repo: R, actor: A) -> Self {
    Self { repo, actor }
  }

  /// Crea un evento. El slug sale del nombre y la fecha, así que dos eventos
  /// con el mismo nombre el mismo día chocan.
  pub async fn create_event(&self, form: NewEvent) -> Result<Event, CoreError> {
    let actor = require_organiser(&self.actor, "create events")?;
    let EventFields { name, venue } = validate(&form)?;

    let at = now();
    let start_time = whole_seconds(form.start_time);
    let event = Event {
      id: EventId::new(),
      slug: event_slug(&name, form.date),
      name,
      date: form.date,
      start_time,
      end_time: form.end_time.map(whole_seconds).unwrap_or(start_time),
      venue,
      description: form.description.trim().to_string(),
      open_mic_enabled: form.open_mic_enabled,
      created_by: actor.id,
      created_at: at,
      updated_at: at,
    };

    match self.repo.insert_event(&event).await {
      Ok(()) => {}
      Err(RepoError::Conflict(_)) => {
        return Err(CoreError::Duplicate("An event with this name and date already exists.".into()));
      }
      Err(e) => return Err(e.into()),
    }

    info!(event = %event.id, slug = %event.slug, "event created");
    Ok(event)
  }

  /// Reemplaza los datos del evento con las mismas reglas que el alta.
  ///
  /// El slug no cambia aunque cambien nombre o fecha: los enlaces públicos
  /// ya repartidos siguen funcionando.
  pub async fn update_event(&self, id: EventId, form: NewEvent) -> Result<Event, CoreError> {
    require_organiser(&self.actor, "edit events")?;
    let EventFields { name, venue } = validate(&form)?;

    let current = self.get_event(id).await?;
    let start_time = whole_seconds(form.start_time);
    let event = Event {
      name,
      date: form.date,
      start_time,
      end_time: form.end_time.map(whole_seconds).unwrap_or(start_time),
      venue,
      description: form.description.trim().to_string(),
      open_mic_enabled: form.open_mic_enabled,
      updated_at: now(),
      ..current
    };

    if !self.repo.update_event(&event).await? {
      return Err(CoreError::not_found("event", id));
    }
    info!(event = %id, open_mic = event.open_mic_enabled, "event updated");
    Ok(event)
  }

  pub async fn get_event(&self, id: EventId) -> Result<Event, CoreError> {
    self.repo.find_event(id).await?.ok_or_else(|| CoreError::not_found("event", id))
  }

  /// Búsqueda por slug para las páginas públicas.
  pub async fn event_by_slug(&self, slug: &str) -> Result<Event, CoreError> {
    self.repo.find_event_by_slug(slug).await?.ok_or_else(|| CoreError::not_found("event", slug))
  }
}
