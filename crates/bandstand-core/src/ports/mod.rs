pub mod identity;
pub mod repository;

pub use identity::{ActorContext, FixedActor};
pub use repository::{
  ApplicationRepository, EventRepository, RepoError, RoleRepository, SetlistRepository, SongRepository,
};
