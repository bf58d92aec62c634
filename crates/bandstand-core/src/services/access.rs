use tracing::warn;

use crate::domain::profile::Actor;
use crate::errors::CoreError;
use crate::ports::ActorContext;

/// Exige un actor autenticado con rol de organizador.
///
/// `action` completa el mensaje: "only organisers can {action}".
pub(crate) fn require_organiser<A>(ctx: &A, action: &str) -> Result<Actor, CoreError>
where
  A: ActorContext + ?Sized,
{
  let Some(actor) = ctx.current_actor() else {
    warn!(action, "rejected anonymous mutation");
    return Err(CoreError::Unauthenticated);
  };

  if !actor.is_organiser() {
    warn!(actor = %actor.id, action, "rejected: organiser capability required");
    return Err(CoreError::Forbidden(format!("only organisers can {action}")));
  }

  Ok(actor)
}

/// Texto obligatorio: se recorta y no puede quedar vacío.
pub(crate) fn required_text(field: &str, value: &str) -> Result<String, CoreError> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    return Err(CoreError::validation(format!("{field} is required")));
  }
  Ok(trimmed.to_string())
}

/// Texto opcional: vacío o sólo espacios cuenta como ausente.
pub(crate) fn optional_text(value: Option<&str>) -> Option<String> {
  value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}
