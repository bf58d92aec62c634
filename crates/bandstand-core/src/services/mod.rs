mod access;
mod clock;
pub mod events;
pub mod open_mic;
pub mod roles;
pub mod sequencer;
pub mod setlists;

pub use events::EventService;
pub use open_mic::OpenMicService;
pub use roles::RoleLedger;
pub use sequencer::{SongSequencer, move_item};
pub use setlists::SetlistService;
