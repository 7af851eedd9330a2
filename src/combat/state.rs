//! Encounter state: participants, phase, history and noise

use crate::combat::action::{ActionType, CombatAction};
use crate::combat::participant::CombatParticipant;
use crate::combat::result::CombatResult;
use crate::core::types::{CombatKind, ParticipantId, Side};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Encounter phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    #[default]
    Idle,
    Engaged,
    ActionPending,
    Resolving,
    Concluded,
    Escalated,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Concluded | Phase::Escalated)
    }
}

/// What became of a submitted action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum EntryOutcome {
    Pending,
    Resolved { success: bool, critical: bool },
    Rejected { error: String },
}

/// One line of the audit trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub action: CombatAction,
    pub outcome: EntryOutcome,
}

impl HistoryEntry {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, EntryOutcome::Resolved { success: true, .. })
    }
}

/// The aggregate owned by one encounter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombatState {
    pub participants: Vec<CombatParticipant>,
    pub initiator: ParticipantId,
    pub kind: CombatKind,
    pub phase: Phase,
    pub history: Vec<HistoryEntry>,
    /// Running noise total; never decreases
    pub noise: f64,
    /// Set once the investigation threshold has been crossed
    pub investigation_flagged: bool,
    pub result: Option<CombatResult>,
}

impl CombatState {
    pub fn new(participants: Vec<CombatParticipant>, initiator: ParticipantId, kind: CombatKind) -> Self {
        Self {
            participants,
            initiator,
            kind,
            phase: Phase::Idle,
            history: Vec::new(),
            noise: 0.0,
            investigation_flagged: false,
            result: None,
        }
    }

    pub fn participant(&self, id: &ParticipantId) -> Option<&CombatParticipant> {
        self.participants.iter().find(|p| &p.id == id)
    }

    pub fn participant_mut(&mut self, id: &ParticipantId) -> Option<&mut CombatParticipant> {
        self.participants.iter_mut().find(|p| &p.id == id)
    }

    pub fn participant_ids(&self) -> Vec<ParticipantId> {
        self.participants.iter().map(|p| p.id.clone()).collect()
    }

    /// Most recent entry that has finished resolving, skipping the pending one
    pub fn previous_resolved(&self) -> Option<&HistoryEntry> {
        self.history
            .iter()
            .rev()
            .find(|e| !matches!(e.outcome, EntryOutcome::Pending))
    }

    /// Did `defender` successfully defend, against `attacker` or anyone, in the
    /// action immediately before this one?
    pub fn is_defending_against(&self, defender: &ParticipantId, attacker: &ParticipantId) -> bool {
        self.previous_resolved().is_some_and(|entry| {
            entry.action.kind == ActionType::Defend
                && &entry.action.initiator == defender
                && entry.succeeded()
                && entry.action.target.as_ref().map_or(true, |t| t == attacker)
        })
    }

    /// Sides that still have someone able to fight
    pub fn active_sides(&self) -> BTreeSet<Side> {
        self.participants
            .iter()
            .filter(|p| p.is_active())
            .map(|p| p.side())
            .collect()
    }

    pub(crate) fn set_pending_outcome(&mut self, outcome: EntryOutcome) {
        if let Some(entry) = self
            .history
            .iter_mut()
            .rev()
            .find(|e| matches!(e.outcome, EntryOutcome::Pending))
        {
            entry.outcome = outcome;
        }
    }
}
