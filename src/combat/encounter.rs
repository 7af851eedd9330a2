//! Encounter state machine
//!
//! Idle -> Engaged -> ActionPending -> Resolving -> Engaged | Concluded | Escalated
//!
//! One action is pending at a time. Concluded and Escalated are terminal.

use crate::combat::action::CombatAction;
use crate::combat::participant::CombatParticipant;
use crate::combat::propagator;
use crate::combat::resolver::{self, ResolvedEffect};
use crate::combat::result::CombatResult;
use crate::combat::rolls::RollSource;
use crate::combat::state::{CombatState, EntryOutcome, HistoryEntry, Phase};
use crate::core::error::{CombatError, StateError};
use crate::core::types::{CombatKind, ParticipantId};
use crate::rules::CombatConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Final record handed back when an encounter is discarded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterReport {
    pub kind: CombatKind,
    pub phase: Phase,
    pub participants: Vec<CombatParticipant>,
    pub history: Vec<HistoryEntry>,
    pub noise: f64,
    /// Totals over every resolved action
    pub result: CombatResult,
}

/// One combat encounter; owns its participant snapshots and roll source
pub struct Encounter<R: RollSource> {
    config: Arc<CombatConfig>,
    rolls: R,
    state: CombatState,
    totals: CombatResult,
}

impl<R: RollSource> Encounter<R> {
    pub fn new(config: Arc<CombatConfig>, rolls: R) -> Self {
        Self {
            config,
            rolls,
            state: CombatState::default(),
            totals: CombatResult::default(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn state(&self) -> &CombatState {
        &self.state
    }

    /// Running totals, for callers that abort before a terminal phase
    pub fn current_result(&self) -> &CombatResult {
        &self.totals
    }

    /// Idle -> Engaged
    pub fn start(
        &mut self,
        participants: Vec<CombatParticipant>,
        initiator: ParticipantId,
        kind: CombatKind,
    ) -> Result<(), StateError> {
        if self.state.phase != Phase::Idle {
            return Err(StateError::AlreadyStarted(self.state.phase));
        }
        if participants.is_empty() {
            return Err(StateError::NoParticipants);
        }
        let mut seen = BTreeSet::new();
        for p in &participants {
            if !seen.insert(&p.id) {
                return Err(StateError::DuplicateParticipant(p.id.clone()));
            }
        }
        if !seen.contains(&initiator) {
            return Err(StateError::UnknownInitiator(initiator));
        }
        let sides: BTreeSet<_> = participants
            .iter()
            .filter(|p| p.is_active())
            .map(|p| p.side())
            .collect();
        if sides.len() < 2 {
            return Err(StateError::NoOpposition);
        }

        tracing::info!(
            "{:?} started by {} with {} participants",
            kind,
            initiator,
            participants.len()
        );
        self.state = CombatState::new(participants, initiator, kind);
        self.state.phase = Phase::Engaged;
        Ok(())
    }

    /// Engaged -> ActionPending; the action joins the history immediately
    pub fn submit(&mut self, action: CombatAction) -> Result<(), StateError> {
        match self.state.phase {
            Phase::Engaged => {}
            Phase::Idle => return Err(StateError::NotStarted),
            Phase::ActionPending | Phase::Resolving => return Err(StateError::ActionPending),
            phase @ (Phase::Concluded | Phase::Escalated) => {
                return Err(StateError::TerminalState(phase))
            }
        }
        self.state.history.push(HistoryEntry {
            action,
            outcome: EntryOutcome::Pending,
        });
        self.state.phase = Phase::ActionPending;
        Ok(())
    }

    /// ActionPending -> Resolving -> Engaged | Concluded | Escalated
    ///
    /// A resolve error is recorded on the history entry and the encounter
    /// returns to Engaged so the caller can submit something else.
    pub fn resolve(&mut self) -> Result<CombatResult, CombatError> {
        match self.state.phase {
            Phase::ActionPending => {}
            Phase::Idle => return Err(StateError::NotStarted.into()),
            Phase::Engaged | Phase::Resolving => return Err(StateError::NoPendingAction.into()),
            phase @ (Phase::Concluded | Phase::Escalated) => {
                return Err(StateError::TerminalState(phase).into())
            }
        }
        let Some(action) = self
            .state
            .history
            .last()
            .filter(|e| e.outcome == EntryOutcome::Pending)
            .map(|e| e.action.clone())
        else {
            self.state.phase = Phase::Engaged;
            return Err(StateError::NoPendingAction.into());
        };

        self.state.phase = Phase::Resolving;
        let effect = match resolver::resolve(&action, &self.state, &self.config, &mut self.rolls) {
            Ok(effect) => effect,
            Err(e) => {
                tracing::warn!("Rejected {} by {}: {}", action.kind, action.initiator, e);
                self.state.set_pending_outcome(EntryOutcome::Rejected {
                    error: e.to_string(),
                });
                self.state.phase = Phase::Engaged;
                return Err(e.into());
            }
        };

        let result = propagator::apply(&effect, &mut self.state, &self.config, &mut self.rolls);
        self.state.set_pending_outcome(EntryOutcome::Resolved {
            success: effect.success,
            critical: effect.critical,
        });
        self.totals.merge(&result);

        self.state.phase = self.next_phase(&effect);
        if self.state.phase.is_terminal() {
            tracing::info!(
                "Encounter {:?} after {} actions (noise {:.1})",
                self.state.phase,
                self.state.history.len(),
                self.state.noise
            );
            self.state.result = Some(self.totals.clone());
        }
        Ok(result)
    }

    /// Submit and resolve in one step
    pub fn act(&mut self, action: CombatAction) -> Result<CombatResult, CombatError> {
        self.submit(action)?;
        self.resolve()
    }

    /// Resolve a batch of same-tick actions: the initiator's first, then in
    /// participant order. Actions left over after a terminal phase are refused.
    pub fn resolve_round(
        &mut self,
        mut actions: Vec<CombatAction>,
    ) -> Vec<Result<CombatResult, CombatError>> {
        let order = |id: &ParticipantId| -> usize {
            if id == &self.state.initiator {
                return 0;
            }
            self.state
                .participants
                .iter()
                .position(|p| &p.id == id)
                .map_or(usize::MAX, |i| i + 1)
        };
        actions.sort_by_key(|a| order(&a.initiator));

        actions
            .into_iter()
            .map(|action| self.act(action))
            .collect()
    }

    /// Discard the encounter, keeping its final state and totals
    pub fn finish(self) -> EncounterReport {
        EncounterReport {
            kind: self.state.kind,
            phase: self.state.phase,
            participants: self.state.participants,
            history: self.state.history,
            noise: self.state.noise,
            result: self.totals,
        }
    }

    fn next_phase(&self, effect: &ResolvedEffect) -> Phase {
        if self.state.investigation_flagged {
            Phase::Escalated
        } else if effect.escaped || self.state.active_sides().len() <= 1 {
            Phase::Concluded
        } else {
            Phase::Engaged
        }
    }
}
