//! Error taxonomy for the combat engine
//!
//! Config errors are fatal at load time. Resolve errors are recoverable and
//! recorded on the history entry they came from. State errors reject the call
//! but leave the encounter untouched.

use crate::combat::action::ActionType;
use crate::combat::state::Phase;
use crate::core::types::ParticipantId;
use thiserror::Error;

/// Errors raised while loading a rules document
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Malformed combat config: {0}")]
    Malformed(String),

    #[error("Value out of range for '{field}': {value}")]
    OutOfRange { field: String, value: f64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-action resolution failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("Unknown action type: {0}")]
    UnknownActionType(ActionType),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Initiator {0} is incapacitated")]
    DeadInitiator(ParticipantId),

    #[error("{initiator} cannot use {action}")]
    AbilityUnavailable {
        initiator: ParticipantId,
        action: ActionType,
    },

    #[error("{initiator} does not carry item {item}")]
    MissingItem { initiator: ParticipantId, item: String },
}

/// Illegal transitions on the encounter state machine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("Encounter has not started")]
    NotStarted,

    #[error("Encounter already started (phase {0:?})")]
    AlreadyStarted(Phase),

    #[error("An action is already pending")]
    ActionPending,

    #[error("No action is pending")]
    NoPendingAction,

    #[error("Encounter is in terminal phase {0:?}")]
    TerminalState(Phase),

    #[error("Encounter needs at least one participant")]
    NoParticipants,

    #[error("Encounter needs active participants on at least two sides")]
    NoOpposition,

    #[error("Initiator {0} is not a participant")]
    UnknownInitiator(ParticipantId),

    #[error("Participant {0} listed twice")]
    DuplicateParticipant(ParticipantId),
}

/// Any failure surfaced by the engine
#[derive(Error, Debug)]
pub enum CombatError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CombatError>;
