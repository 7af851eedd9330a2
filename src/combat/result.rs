//! Outcome records handed back to the caller

use crate::combat::events::CombatEvent;
use crate::core::types::ParticipantId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Deltas produced by one resolved action, or by a whole encounter once merged
///
/// Deltas are what was actually applied, after clamping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombatResult {
    pub success: bool,
    pub critical: bool,
    pub health_changes: BTreeMap<ParticipantId, i32>,
    pub blood_changes: BTreeMap<ParticipantId, i32>,
    pub morale_changes: BTreeMap<ParticipantId, i32>,
    /// Statuses newly applied per participant
    pub status_changes: BTreeMap<ParticipantId, Vec<String>>,
    /// subject -> other participant -> change in subject's relation
    pub relation_changes: BTreeMap<ParticipantId, BTreeMap<ParticipantId, i32>>,
    pub events: Vec<CombatEvent>,
    pub summary: String,
}

impl CombatResult {
    pub fn health_change(&self, id: &ParticipantId) -> i32 {
        self.health_changes.get(id).copied().unwrap_or(0)
    }

    pub fn blood_change(&self, id: &ParticipantId) -> i32 {
        self.blood_changes.get(id).copied().unwrap_or(0)
    }

    pub fn relation_change(&self, subject: &ParticipantId, other: &ParticipantId) -> i32 {
        self.relation_changes
            .get(subject)
            .and_then(|r| r.get(other))
            .copied()
            .unwrap_or(0)
    }

    pub(crate) fn record_health(&mut self, id: &ParticipantId, applied: i32) {
        add_delta(&mut self.health_changes, id, applied);
    }

    pub(crate) fn record_blood(&mut self, id: &ParticipantId, applied: i32) {
        add_delta(&mut self.blood_changes, id, applied);
    }

    pub(crate) fn record_morale(&mut self, id: &ParticipantId, applied: i32) {
        add_delta(&mut self.morale_changes, id, applied);
    }

    pub(crate) fn record_status(&mut self, id: &ParticipantId, tag: &str) {
        self.status_changes
            .entry(id.clone())
            .or_default()
            .push(tag.to_string());
    }

    pub(crate) fn record_relation(&mut self, subject: &ParticipantId, other: &ParticipantId, delta: i32) {
        if delta == 0 {
            return;
        }
        let entry = self
            .relation_changes
            .entry(subject.clone())
            .or_default()
            .entry(other.clone())
            .or_insert(0);
        *entry += delta;
    }

    /// Fold a later result into this one (encounter totals)
    pub fn merge(&mut self, other: &CombatResult) {
        for (id, delta) in &other.health_changes {
            add_delta(&mut self.health_changes, id, *delta);
        }
        for (id, delta) in &other.blood_changes {
            add_delta(&mut self.blood_changes, id, *delta);
        }
        for (id, delta) in &other.morale_changes {
            add_delta(&mut self.morale_changes, id, *delta);
        }
        for (id, tags) in &other.status_changes {
            let entry = self.status_changes.entry(id.clone()).or_default();
            for tag in tags {
                if !entry.contains(tag) {
                    entry.push(tag.clone());
                }
            }
        }
        for (subject, others) in &other.relation_changes {
            for (id, delta) in others {
                self.record_relation(subject, id, *delta);
            }
        }
        self.events.extend(other.events.iter().cloned());
        self.success = other.success;
        self.critical |= other.critical;
        if !other.summary.is_empty() {
            if !self.summary.is_empty() {
                self.summary.push('\n');
            }
            self.summary.push_str(&other.summary);
        }
    }
}

fn add_delta(map: &mut BTreeMap<ParticipantId, i32>, id: &ParticipantId, delta: i32) {
    if delta == 0 {
        return;
    }
    *map.entry(id.clone()).or_insert(0) += delta;
}
