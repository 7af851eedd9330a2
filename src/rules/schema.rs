//! Serde shapes of the rules document as it appears on disk
//!
//! Every section is optional so older documents keep loading; validation
//! into `CombatConfig` happens in the loader.

use crate::core::value::ConfigValue;
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCombatConfig {
    #[serde(default)]
    pub allowed_types: Vec<String>,
    #[serde(default)]
    pub actions: BTreeMap<String, RawActionRules>,
    #[serde(default)]
    pub action_chances: BTreeMap<String, f64>,
    #[serde(default)]
    pub damage_values: BTreeMap<String, i64>,
    #[serde(default)]
    pub consequences: BTreeMap<String, BTreeMap<String, String>>,
    pub blood_modifiers: Option<BTreeMap<String, f64>>,
    pub witness_chance: Option<f64>,
    pub aftermath: Option<RawAftermath>,
    pub critical_chance: Option<f64>,
    pub critical_effects: Option<BTreeMap<String, RawCriticalEffect>>,
    pub equipment_modifiers: Option<BTreeMap<String, BTreeMap<String, i32>>>,
    pub bite: Option<BTreeMap<String, ConfigValue>>,
    pub public_bite_reveal: Option<bool>,
    pub profession_modifiers: Option<BTreeMap<String, BTreeMap<String, ConfigValue>>>,
    pub abilities: Option<BTreeMap<String, RawAbility>>,
    pub relations: Option<RawRelations>,
}

/// Compact per-action block: `"attack": {"chance": 0.5, "damage": 10}`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawActionRules {
    pub chance: Option<f64>,
    pub damage: Option<i64>,
    #[serde(default)]
    pub consequences: BTreeMap<String, String>,
    pub noise: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAftermath {
    pub noise_level: Option<BTreeMap<String, f64>>,
    pub investigation_threshold: Option<f64>,
}

/// Either a bare narrative line or a detailed effect
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawCriticalEffect {
    Narrative(String),
    Detailed(RawCriticalDetail),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCriticalDetail {
    pub description: Option<String>,
    pub damage_multiplier: Option<f64>,
    pub status: Option<String>,
    pub self_damage: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAbility {
    pub status: Option<String>,
    pub applies_to: Option<String>,
    pub morale_delta: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRelations {
    pub victim_toward_attacker: Option<i32>,
    pub attacker_toward_victim: Option<i32>,
}
