//! Combat resolution: participants, actions, rolls, consequences and the
//! encounter state machine

pub mod action;
pub mod constants;
pub mod encounter;
pub mod events;
pub mod modifiers;
pub mod participant;
pub mod propagator;
pub mod resolver;
pub mod result;
pub mod rolls;
pub mod state;

pub use action::{ActionType, CombatAction};
pub use encounter::{Encounter, EncounterReport};
pub use events::CombatEvent;
pub use modifiers::{derive_modifiers, ModifierSet};
pub use participant::{Combatant, CombatParticipant, InventoryItem};
pub use resolver::{resolve, ResolvedEffect};
pub use result::CombatResult;
pub use rolls::{RollSource, ScriptedRolls};
pub use state::{CombatState, EntryOutcome, HistoryEntry, Phase};
