pub mod application;
pub mod event;
pub mod ids;
pub mod key;
pub mod profile;
pub mod role;
pub mod setlist;
pub mod song;
pub mod tempo;

pub use ids::{ApplicationId, EventId, ProfileId, RoleAssignmentId, SetlistId, SongId};
pub use key::MusicalKey;
pub use profile::{Actor, UserRole};
pub use tempo::Bpm;
