pub mod error;
pub mod types;
pub mod value;

pub use types::{CombatKind, ParticipantId, Side};
pub use value::ConfigValue;
