mod error;
mod events;
mod registry;
mod room;
mod validate;

pub use error::GuessError;
pub use events::{ClientEvent, GuessRecord, RoomStateView, ServerEvent, TopEntry, HINT_AUTHOR};
pub use registry::RoomRegistry;
pub use room::{Room, RoomPhase};
pub use validate::is_legal_guess;
