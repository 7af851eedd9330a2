//! Signals emitted to collaborators outside the engine
//!
//! The investigation and awareness systems consume these; the engine never
//! calls into world systems directly.

use crate::combat::action::ActionType;
use crate::core::types::ParticipantId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum CombatEvent {
    /// An uninvolved participant saw the action
    Witnessed {
        witness: ParticipantId,
        initiator: ParticipantId,
        target: Option<ParticipantId>,
        action: ActionType,
    },
    /// Accumulated noise crossed the investigation threshold
    InvestigationTriggered {
        noise: f64,
        threshold: f64,
        participants: Vec<ParticipantId>,
    },
    /// A bite happened in public view
    BiteRevealed {
        vampire: ParticipantId,
        victim: ParticipantId,
    },
    /// Health reached zero
    Incapacitated { participant: ParticipantId },
    Escaped { participant: ParticipantId },
}

impl CombatEvent {
    pub fn is_escalation(&self) -> bool {
        matches!(self, CombatEvent::InvestigationTriggered { .. })
    }
}
