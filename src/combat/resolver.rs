//! Action resolution
//!
//! Turns an action into a `ResolvedEffect` without touching the state. Draw
//! order per action: primary roll, then the critical roll when the ruleset
//! has a critical chance.

use crate::combat::action::{ActionType, CombatAction};
use crate::combat::constants::{status, DEFAULT_CRITICAL_MULTIPLIER, DEFEND_DAMAGE_DIVISOR};
use crate::combat::modifiers::{derive_modifiers, ModifierSet};
use crate::combat::participant::CombatParticipant;
use crate::combat::rolls::RollSource;
use crate::combat::state::CombatState;
use crate::core::error::ResolveError;
use crate::core::types::ParticipantId;
use crate::rules::{AbilityTarget, CombatConfig, CriticalEffect, TargetFilter};

/// Change to one participant's vitals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VitalDelta {
    pub health: i32,
    pub blood: i32,
    pub morale: i32,
}

/// Change to how `subject` regards `toward`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationDelta {
    pub subject: ParticipantId,
    pub toward: ParticipantId,
    pub delta: i32,
}

/// Everything an action will do, computed but not yet applied
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEffect {
    pub action: CombatAction,
    pub success: bool,
    pub critical: bool,
    /// Adjusted chance the primary roll was compared against
    pub chance: f64,
    pub roll: f64,
    /// Damage dealt to the target after all scaling
    pub damage: u32,
    /// Health restored to the initiator
    pub heal: u32,
    /// Damage was halved by the target's defend
    pub mitigated: bool,
    pub vitals: Vec<(ParticipantId, VitalDelta)>,
    pub statuses: Vec<(ParticipantId, String)>,
    pub relations: Vec<RelationDelta>,
    pub consumed_item: Option<String>,
    pub escaped: bool,
    pub bite_revealed: bool,
    /// Narrative of the critical effect, if one fired
    pub critical_text: Option<String>,
}

impl ResolvedEffect {
    fn new(action: &CombatAction, success: bool, critical: bool, chance: f64, roll: f64) -> Self {
        Self {
            action: action.clone(),
            success,
            critical,
            chance,
            roll,
            damage: 0,
            heal: 0,
            mitigated: false,
            vitals: Vec::new(),
            statuses: Vec::new(),
            relations: Vec::new(),
            consumed_item: None,
            escaped: false,
            bite_revealed: false,
            critical_text: None,
        }
    }

    /// Key into `consequences[action]`
    pub fn consequence_key(&self) -> &'static str {
        if self.success {
            "success"
        } else {
            "fail"
        }
    }

    fn vital(&mut self, id: &ParticipantId) -> &mut VitalDelta {
        let index = match self.vitals.iter().position(|(p, _)| p == id) {
            Some(index) => index,
            None => {
                self.vitals.push((id.clone(), VitalDelta::default()));
                self.vitals.len() - 1
            }
        };
        &mut self.vitals[index].1
    }

    fn add_status(&mut self, id: &ParticipantId, tag: &str) {
        self.statuses.push((id.clone(), tag.to_string()));
    }

    pub fn vital_delta(&self, id: &ParticipantId) -> VitalDelta {
        self.vitals
            .iter()
            .find(|(p, _)| p == id)
            .map(|(_, d)| *d)
            .unwrap_or_default()
    }
}

/// Resolve an action against the current state
pub fn resolve<R: RollSource + ?Sized>(
    action: &CombatAction,
    state: &CombatState,
    config: &CombatConfig,
    rolls: &mut R,
) -> Result<ResolvedEffect, ResolveError> {
    let base_chance = config
        .chance_for(action.kind)
        .ok_or(ResolveError::UnknownActionType(action.kind))?;

    let initiator = state.participant(&action.initiator).ok_or_else(|| {
        ResolveError::InvalidTarget(format!("initiator {} is not in this encounter", action.initiator))
    })?;
    if !initiator.is_alive() || initiator.has_status(status::INCAPACITATED) {
        return Err(ResolveError::DeadInitiator(initiator.id.clone()));
    }
    if initiator.has_status(status::ESCAPED) {
        return Err(ResolveError::InvalidTarget(format!(
            "{} has already left the fight",
            initiator.id
        )));
    }
    if action.kind.is_vampire_ability() && !initiator.is_vampire {
        return Err(ResolveError::AbilityUnavailable {
            initiator: initiator.id.clone(),
            action: action.kind,
        });
    }

    let target = validate_target(action, state, config, initiator)?;
    let item = validate_item(action, initiator)?;

    let attacker_mods = derive_modifiers(initiator, config);
    let chance = (base_chance * config.blood_multiplier(initiator.blood) + attacker_mods.accuracy())
        .clamp(0.0, 1.0);

    let roll = rolls.roll();
    let success = roll < chance;
    let critical_chance = config.critical_chance();
    let critical = critical_chance > 0.0 && rolls.roll() < critical_chance;
    let critical_effect = if critical {
        config.critical_effect(success)
    } else {
        None
    };

    tracing::debug!(
        "{} {} -> roll {:.3} vs {:.3}: {}{}",
        action.initiator,
        action.kind,
        roll,
        chance,
        if success { "success" } else { "fail" },
        if critical { " (critical)" } else { "" }
    );

    let mut effect = ResolvedEffect::new(action, success, critical, chance, roll);
    effect.critical_text = critical_effect.map(|e| e.description.clone());

    if success {
        let multiplier = if critical {
            critical_effect
                .and_then(|e| e.damage_multiplier)
                .unwrap_or(DEFAULT_CRITICAL_MULTIPLIER)
        } else {
            1.0
        };
        apply_success(
            &mut effect,
            state,
            config,
            initiator,
            target,
            &attacker_mods,
            multiplier,
        );
        effect.consumed_item = item;

        if let Some(target) = target.filter(|_| action.kind.is_hostile()) {
            if let Some(tag) = critical_effect.and_then(|c| c.status.as_ref()) {
                effect.add_status(&target.id, tag);
            }
            effect.relations.push(RelationDelta {
                subject: target.id.clone(),
                toward: initiator.id.clone(),
                delta: config.relations.victim_toward_attacker,
            });
            effect.relations.push(RelationDelta {
                subject: initiator.id.clone(),
                toward: target.id.clone(),
                delta: config.relations.attacker_toward_victim,
            });
        }
    } else if let Some(crit) = critical_effect {
        apply_critical_failure(&mut effect, initiator, crit);
    }

    Ok(effect)
}

fn validate_target<'a>(
    action: &CombatAction,
    state: &'a CombatState,
    config: &CombatConfig,
    initiator: &CombatParticipant,
) -> Result<Option<&'a CombatParticipant>, ResolveError> {
    let Some(target_id) = &action.target else {
        if action.kind.requires_target() {
            return Err(ResolveError::InvalidTarget(format!(
                "{} requires a target",
                action.kind
            )));
        }
        if action.kind == ActionType::Dominate || action.kind == ActionType::ShadowStep {
            let needs_target = config
                .ability_rule(action.kind)
                .is_some_and(|r| r.applies_to == AbilityTarget::Target);
            if needs_target {
                return Err(ResolveError::InvalidTarget(format!(
                    "{} requires a target",
                    action.kind
                )));
            }
        }
        return Ok(None);
    };

    if action.kind == ActionType::Escape {
        return Ok(None);
    }
    if target_id == &initiator.id {
        return Err(ResolveError::InvalidTarget(format!(
            "{} cannot target itself with {}",
            initiator.id, action.kind
        )));
    }
    let target = state.participant(target_id).ok_or_else(|| {
        ResolveError::InvalidTarget(format!("{} is not in this encounter", target_id))
    })?;

    // A defend only names who is being guarded against
    if action.kind == ActionType::Defend {
        return Ok(Some(target));
    }
    if !target.is_active() {
        return Err(ResolveError::InvalidTarget(format!(
            "{} is no longer in the fight",
            target_id
        )));
    }
    if action.kind == ActionType::Bite {
        if let Some(bite) = &config.bite {
            if let Some(filter) = bite
                .allowed_targets
                .iter()
                .find(|f| !target_matches(target, **f))
            {
                return Err(ResolveError::InvalidTarget(format!(
                    "{} cannot be bitten ({:?} required)",
                    target_id, filter
                )));
            }
        }
    }
    Ok(Some(target))
}

fn target_matches(target: &CombatParticipant, filter: TargetFilter) -> bool {
    match filter {
        TargetFilter::Any => true,
        TargetFilter::Alive => target.is_alive(),
        TargetFilter::NonVampire => !target.is_vampire,
        TargetFilter::Vampire => target.is_vampire,
        TargetFilter::Npc => !target.is_player,
        TargetFilter::Player => target.is_player,
    }
}

/// Item key for use-item actions; must be carried by the initiator
fn validate_item(
    action: &CombatAction,
    initiator: &CombatParticipant,
) -> Result<Option<String>, ResolveError> {
    if action.kind != ActionType::UseItem {
        return Ok(None);
    }
    let key = action
        .param("item")
        .and_then(|v| v.as_key())
        .ok_or_else(|| ResolveError::MissingItem {
            initiator: initiator.id.clone(),
            item: "(unspecified)".to_string(),
        })?;
    if initiator.item(&key).is_none() {
        return Err(ResolveError::MissingItem {
            initiator: initiator.id.clone(),
            item: key,
        });
    }
    Ok(Some(key))
}

/// Damage dealt by `attacker` to `target` for an action type
fn compute_damage(
    kind: ActionType,
    state: &CombatState,
    config: &CombatConfig,
    attacker: &CombatParticipant,
    attacker_mods: &ModifierSet,
    target: &CombatParticipant,
    multiplier: f64,
) -> (u32, bool) {
    let target_mods = derive_modifiers(target, config);
    let raw = (f64::from(config.base_damage(kind)) + attacker_mods.damage() - target_mods.armor())
        .max(0.0);
    let scaled = (raw * target_mods.damage_taken * multiplier).round();
    let mut damage = scaled.min(f64::from(u32::MAX)) as u32;

    let mitigated = state.is_defending_against(&target.id, &attacker.id);
    if mitigated {
        damage /= DEFEND_DAMAGE_DIVISOR;
    }
    (damage, mitigated)
}

fn apply_success(
    effect: &mut ResolvedEffect,
    state: &CombatState,
    config: &CombatConfig,
    initiator: &CombatParticipant,
    target: Option<&CombatParticipant>,
    attacker_mods: &ModifierSet,
    multiplier: f64,
) {
    let kind = effect.action.kind;
    match kind {
        ActionType::Attack | ActionType::Ability => {
            if let Some(target) = target {
                let (damage, mitigated) =
                    compute_damage(kind, state, config, initiator, attacker_mods, target, multiplier);
                effect.damage = damage;
                effect.mitigated = mitigated;
                effect.vital(&target.id).health -= to_delta(damage);
            }
        }
        ActionType::Bite => {
            if let Some(target) = target {
                let (damage, mitigated) =
                    compute_damage(kind, state, config, initiator, attacker_mods, target, multiplier);
                let heal_fraction = config.bite.as_ref().map_or(0.0, |b| b.heal_fraction);
                let heal = (f64::from(damage) * heal_fraction).round() as u32;

                effect.damage = damage;
                effect.heal = heal;
                effect.mitigated = mitigated;
                let victim = effect.vital(&target.id);
                victim.health -= to_delta(damage);
                victim.blood -= to_delta(damage);
                let biter = effect.vital(&initiator.id);
                biter.health += to_delta(heal);
                biter.blood += to_delta(heal);

                if config.public_bite_reveal {
                    effect.bite_revealed = true;
                    effect.add_status(&initiator.id, status::REVEALED);
                }
            }
        }
        ActionType::Dominate | ActionType::ShadowStep => {
            if let Some(rule) = config.ability_rule(kind) {
                let recipient = match (rule.applies_to, target) {
                    (AbilityTarget::Target, Some(target)) => &target.id,
                    _ => &initiator.id,
                };
                effect.add_status(recipient, &rule.status);
                if rule.morale_delta != 0 {
                    effect.vital(recipient).morale += rule.morale_delta;
                }
            }
        }
        ActionType::Defend => {
            effect.add_status(&initiator.id, status::DEFENDING);
        }
        ActionType::UseItem => match target {
            Some(target) => {
                let (damage, mitigated) =
                    compute_damage(kind, state, config, initiator, attacker_mods, target, multiplier);
                effect.damage = damage;
                effect.mitigated = mitigated;
                effect.vital(&target.id).health -= to_delta(damage);
            }
            None => {
                let heal = (f64::from(config.base_damage(kind)) * multiplier).round() as u32;
                effect.heal = heal;
                effect.vital(&initiator.id).health += to_delta(heal);
            }
        },
        ActionType::Escape => {
            effect.escaped = true;
            effect.add_status(&initiator.id, status::ESCAPED);
        }
    }
}

fn apply_critical_failure(
    effect: &mut ResolvedEffect,
    initiator: &CombatParticipant,
    crit: &CriticalEffect,
) {
    if crit.self_damage > 0 {
        effect.vital(&initiator.id).health -= to_delta(crit.self_damage);
    }
    if let Some(tag) = &crit.status {
        effect.add_status(&initiator.id, tag);
    }
}

fn to_delta(amount: u32) -> i32 {
    i32::try_from(amount).unwrap_or(i32::MAX)
}
