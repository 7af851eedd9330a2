//! Consequence propagation
//!
//! Applies a resolved effect to the encounter: vitals, statuses, relations,
//! noise, witnesses and the narrative summary. Draw order after resolution:
//! witness roll, then the witness pick when more than one observer qualifies.

use crate::combat::constants::status;
use crate::combat::events::CombatEvent;
use crate::combat::resolver::ResolvedEffect;
use crate::combat::result::CombatResult;
use crate::combat::rolls::RollSource;
use crate::combat::state::CombatState;
use crate::core::types::ParticipantId;
use crate::rules::CombatConfig;

/// Apply an effect to the state and describe what happened
pub fn apply<R: RollSource + ?Sized>(
    effect: &ResolvedEffect,
    state: &mut CombatState,
    config: &CombatConfig,
    rolls: &mut R,
) -> CombatResult {
    let action = &effect.action;
    let summary = build_summary(effect, state, config);
    let mut result = CombatResult {
        success: effect.success,
        critical: effect.critical,
        summary,
        ..Default::default()
    };

    apply_vitals(effect, state, &mut result);

    for (id, tag) in &effect.statuses {
        if let Some(p) = state.participant_mut(id) {
            if p.add_status(tag) {
                result.record_status(id, tag);
            }
        }
    }
    if effect.escaped {
        result.events.push(CombatEvent::Escaped {
            participant: action.initiator.clone(),
        });
    }

    if let Some(item) = &effect.consumed_item {
        if let Some(p) = state.participant_mut(&action.initiator) {
            p.take_item(item);
        }
    }

    for delta in &effect.relations {
        if let Some(p) = state.participant_mut(&delta.subject) {
            p.adjust_relation(&delta.toward, delta.delta);
            result.record_relation(&delta.subject, &delta.toward, delta.delta);
        }
    }

    if effect.bite_revealed {
        if let Some(victim) = &action.target {
            result.events.push(CombatEvent::BiteRevealed {
                vampire: action.initiator.clone(),
                victim: victim.clone(),
            });
        }
    }

    accumulate_noise(effect, state, config, &mut result);
    check_witness(effect, state, config, rolls, &mut result);

    result
}

fn apply_vitals(effect: &ResolvedEffect, state: &mut CombatState, result: &mut CombatResult) {
    for (id, delta) in &effect.vitals {
        let Some(p) = state.participant_mut(id) else {
            continue;
        };
        let was_alive = p.is_alive();
        let health = p.adjust_health(delta.health);
        let blood = p.adjust_blood(delta.blood);
        let morale = p.adjust_morale(delta.morale);
        let downed = was_alive && !p.is_alive() && p.add_status(status::INCAPACITATED);

        result.record_health(id, health);
        result.record_blood(id, blood);
        result.record_morale(id, morale);
        if downed {
            tracing::info!("{} is incapacitated", id);
            result.record_status(id, status::INCAPACITATED);
            result.events.push(CombatEvent::Incapacitated {
                participant: id.clone(),
            });
        }
    }
}

fn accumulate_noise(
    effect: &ResolvedEffect,
    state: &mut CombatState,
    config: &CombatConfig,
    result: &mut CombatResult,
) {
    state.noise += config.noise_for(effect.action.kind);

    let Some(threshold) = config.investigation_threshold() else {
        return;
    };
    if !state.investigation_flagged && state.noise > threshold {
        state.investigation_flagged = true;
        tracing::info!(
            "Noise {:.1} crossed investigation threshold {:.1}",
            state.noise,
            threshold
        );
        result.events.push(CombatEvent::InvestigationTriggered {
            noise: state.noise,
            threshold,
            participants: state.participant_ids(),
        });
    }
}

fn check_witness<R: RollSource + ?Sized>(
    effect: &ResolvedEffect,
    state: &mut CombatState,
    config: &CombatConfig,
    rolls: &mut R,
    result: &mut CombatResult,
) {
    let chance = config.witness_chance.unwrap_or(0.0);
    if chance <= 0.0 {
        return;
    }
    let action = &effect.action;
    let candidates: Vec<ParticipantId> = state
        .participants
        .iter()
        .filter(|p| {
            p.is_active()
                && !p.has_status(status::AWARE)
                && p.id != action.initiator
                && Some(&p.id) != action.target.as_ref()
        })
        .map(|p| p.id.clone())
        .collect();
    if candidates.is_empty() || rolls.roll() >= chance {
        return;
    }

    let witness = if candidates.len() == 1 {
        candidates[0].clone()
    } else {
        candidates[rolls.pick(candidates.len())].clone()
    };
    tracing::debug!("{} witnessed {} by {}", witness, action.kind, action.initiator);

    if let Some(p) = state.participant_mut(&witness) {
        if p.add_status(status::AWARE) {
            result.record_status(&witness, status::AWARE);
        }
    }
    result.events.push(CombatEvent::Witnessed {
        witness,
        initiator: action.initiator.clone(),
        target: action.target.clone(),
        action: action.kind,
    });
}

fn name_of(state: &CombatState, id: &ParticipantId) -> String {
    state
        .participant(id)
        .map(|p| p.name.clone())
        .unwrap_or_else(|| id.to_string())
}

/// Outcome line plus the consequence template with resolved values filled in
fn build_summary(effect: &ResolvedEffect, state: &CombatState, config: &CombatConfig) -> String {
    let action = &effect.action;
    let mut summary = String::new();
    if effect.critical {
        summary.push_str(if effect.success {
            "Critical success! "
        } else {
            "Critical failure! "
        });
    }
    summary.push_str(if effect.success { "Success" } else { "Failure" });

    let template = effect
        .critical_text
        .as_deref()
        .filter(|t| !t.is_empty())
        .or_else(|| config.consequence(action.kind, effect.consequence_key()));

    if let Some(template) = template.filter(|t| !t.is_empty()) {
        let target = action
            .target
            .as_ref()
            .map(|t| name_of(state, t))
            .unwrap_or_default();
        let text = template
            .replace("{initiator}", &name_of(state, &action.initiator))
            .replace("{target}", &target)
            .replace("{action}", action.kind.as_str())
            .replace("{damage}", &effect.damage.to_string())
            .replace("{heal}", &effect.heal.to_string());
        summary.push_str(": ");
        summary.push_str(&text);
    }
    summary
}
