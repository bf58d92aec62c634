use crate::domain::profile::Actor;

/// Identidad y capacidades de quien llama, resueltas por el proveedor de
/// autenticación externo.
pub trait ActorContext: Send + Sync {
  /// `None` si la petición es anónima.
  fn current_actor(&self) -> Option<Actor>;
}

/// Contexto con un actor fijo: binarios, integraciones y tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixedActor(Option<Actor>);

impl FixedActor {
  pub fn new(actor: Actor) -> Self {
    Self(Some(actor))
  }

  pub fn anonymous() -> Self {
    Self(None)
  }
}

impl ActorContext for FixedActor {
  fn current_actor(&self) -> Option<Actor> {
    self.0
  }
}

impl<T: ActorContext + ?Sized> ActorContext for std::sync::Arc<T> {
  fn current_actor(&self) -> Option<Actor> {
    (**self).current_actor()
  }
}
