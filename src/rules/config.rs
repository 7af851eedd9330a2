//! Validated combat ruleset
//!
//! Built once per ruleset by the loader and shared read-only between
//! encounters.

use crate::combat::action::ActionType;
use crate::combat::constants::{
    DEFAULT_ACTION_CHANCE, DEFAULT_ATTACKER_RELATION_DELTA, DEFAULT_DOMINATE_MORALE_DELTA,
    DEFAULT_VICTIM_RELATION_DELTA, HIGH_BLOOD_THRESHOLD, LOW_BLOOD_THRESHOLD, status,
};
use crate::core::value::ConfigValue;
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

/// Blood band of a participant, used to pick a chance multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BloodTier {
    Low,
    Medium,
    High,
}

impl BloodTier {
    pub fn for_blood(blood: u32) -> Self {
        if blood < LOW_BLOOD_THRESHOLD {
            BloodTier::Low
        } else if blood < HIGH_BLOOD_THRESHOLD {
            BloodTier::Medium
        } else {
            BloodTier::High
        }
    }
}

impl FromStr for BloodTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(BloodTier::Low),
            "medium" => Ok(BloodTier::Medium),
            "high" => Ok(BloodTier::High),
            other => Err(format!("unknown blood tier '{}'", other)),
        }
    }
}

/// Noise and investigation rules applied after every action
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AftermathRules {
    pub noise_level: BTreeMap<ActionType, f64>,
    pub investigation_threshold: Option<f64>,
}

/// What happens on a critical roll
#[derive(Debug, Clone, PartialEq)]
pub struct CriticalEffect {
    pub description: String,
    /// Damage scaling; defaults to 2.0 on success and is ignored on failure
    pub damage_multiplier: Option<f64>,
    /// Status applied to the target on success, to the initiator on failure
    pub status: Option<String>,
    /// Health lost by the initiator (critical failure only)
    pub self_damage: u32,
}

impl CriticalEffect {
    pub fn narrative(description: &str) -> Self {
        Self {
            description: description.to_string(),
            damage_multiplier: None,
            status: None,
            self_damage: 0,
        }
    }
}

/// Predicate a bite target must satisfy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFilter {
    Any,
    Alive,
    NonVampire,
    Vampire,
    Npc,
    Player,
}

impl FromStr for TargetFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "any" => Ok(TargetFilter::Any),
            "alive" => Ok(TargetFilter::Alive),
            "nonVampire" | "non_vampire" | "human" | "mortal" => Ok(TargetFilter::NonVampire),
            "vampire" => Ok(TargetFilter::Vampire),
            "npc" => Ok(TargetFilter::Npc),
            "player" => Ok(TargetFilter::Player),
            other => Err(format!("unknown bite target filter '{}'", other)),
        }
    }
}

/// Bite rules; every listed filter must hold for a valid target
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BiteRules {
    /// Share of bite damage returned to the biter, 0.0 to 1.0
    pub heal_fraction: f64,
    pub allowed_targets: Vec<TargetFilter>,
}

/// Who receives an ability's status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbilityTarget {
    Initiator,
    Target,
}

/// Status-driven effect of a vampire ability
#[derive(Debug, Clone, PartialEq)]
pub struct AbilityRule {
    pub status: String,
    pub applies_to: AbilityTarget,
    pub morale_delta: i32,
}

impl AbilityRule {
    /// Built-in behavior for abilities the ruleset does not describe
    pub fn default_for(kind: ActionType) -> Option<Self> {
        match kind {
            ActionType::Dominate => Some(Self {
                status: status::INTIMIDATED.to_string(),
                applies_to: AbilityTarget::Target,
                morale_delta: DEFAULT_DOMINATE_MORALE_DELTA,
            }),
            ActionType::ShadowStep => Some(Self {
                status: status::HIDDEN.to_string(),
                applies_to: AbilityTarget::Initiator,
                morale_delta: 0,
            }),
            _ => None,
        }
    }
}

/// Relation changes after a successful hostile action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationRules {
    pub victim_toward_attacker: i32,
    pub attacker_toward_victim: i32,
}

impl Default for RelationRules {
    fn default() -> Self {
        Self {
            victim_toward_attacker: DEFAULT_VICTIM_RELATION_DELTA,
            attacker_toward_victim: DEFAULT_ATTACKER_RELATION_DELTA,
        }
    }
}

/// The validated ruleset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CombatConfig {
    pub allowed_types: BTreeSet<ActionType>,
    pub action_chances: BTreeMap<ActionType, f64>,
    pub damage_values: BTreeMap<ActionType, u32>,
    pub consequences: BTreeMap<ActionType, BTreeMap<String, String>>,
    pub blood_modifiers: BTreeMap<BloodTier, f64>,
    pub witness_chance: Option<f64>,
    pub aftermath: Option<AftermathRules>,
    pub critical_chance: Option<f64>,
    pub critical_success: Option<CriticalEffect>,
    pub critical_fail: Option<CriticalEffect>,
    /// category -> item name -> bonus
    pub equipment_modifiers: BTreeMap<String, BTreeMap<String, i32>>,
    pub bite: Option<BiteRules>,
    pub public_bite_reveal: bool,
    /// lowercased profession -> stat -> value
    pub profession_modifiers: BTreeMap<String, BTreeMap<String, ConfigValue>>,
    pub abilities: BTreeMap<ActionType, AbilityRule>,
    pub relations: RelationRules,
}

impl CombatConfig {
    pub fn is_allowed(&self, kind: ActionType) -> bool {
        self.allowed_types.contains(&kind)
    }

    /// Base success chance; None if the ruleset does not allow the action
    pub fn chance_for(&self, kind: ActionType) -> Option<f64> {
        if !self.is_allowed(kind) {
            return None;
        }
        Some(
            self.action_chances
                .get(&kind)
                .copied()
                .unwrap_or(DEFAULT_ACTION_CHANCE),
        )
    }

    pub fn base_damage(&self, kind: ActionType) -> u32 {
        self.damage_values.get(&kind).copied().unwrap_or(0)
    }

    /// Consequence template for an action and trigger event ("success"/"fail")
    pub fn consequence(&self, kind: ActionType, event: &str) -> Option<&str> {
        self.consequences
            .get(&kind)
            .and_then(|events| events.get(event))
            .map(String::as_str)
    }

    /// Chance multiplier for the given blood level (1.0 when unconfigured)
    pub fn blood_multiplier(&self, blood: u32) -> f64 {
        self.blood_modifiers
            .get(&BloodTier::for_blood(blood))
            .copied()
            .unwrap_or(1.0)
    }

    pub fn noise_for(&self, kind: ActionType) -> f64 {
        self.aftermath
            .as_ref()
            .and_then(|a| a.noise_level.get(&kind))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn investigation_threshold(&self) -> Option<f64> {
        self.aftermath
            .as_ref()
            .and_then(|a| a.investigation_threshold)
    }

    pub fn critical_chance(&self) -> f64 {
        self.critical_chance.unwrap_or(0.0)
    }

    pub fn critical_effect(&self, success: bool) -> Option<&CriticalEffect> {
        if success {
            self.critical_success.as_ref()
        } else {
            self.critical_fail.as_ref()
        }
    }

    /// Configured ability rule, falling back to the built-in behavior
    pub fn ability_rule(&self, kind: ActionType) -> Option<AbilityRule> {
        self.abilities
            .get(&kind)
            .cloned()
            .or_else(|| AbilityRule::default_for(kind))
    }

    pub fn profession_stats(&self, profession: &str) -> Option<&BTreeMap<String, ConfigValue>> {
        self.profession_modifiers.get(&profession.to_lowercase())
    }
}
