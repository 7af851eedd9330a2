//! Equipment and profession modifiers
//!
//! Bonuses are ADDITIVE and collected into one set per participant. The only
//! multiplier is `damageTaken`, which comes from professions.

use crate::combat::participant::CombatParticipant;
use crate::rules::CombatConfig;
use std::collections::BTreeMap;

pub const STAT_DAMAGE: &str = "damage";
pub const STAT_ARMOR: &str = "armor";
pub const STAT_ACCURACY: &str = "accuracy";
pub const STAT_DAMAGE_TAKEN: &str = "damageTaken";

/// Combined bonuses for one participant
#[derive(Debug, Clone, PartialEq)]
pub struct ModifierSet {
    pub stats: BTreeMap<String, f64>,
    pub damage_taken: f64,
}

impl Default for ModifierSet {
    fn default() -> Self {
        Self {
            stats: BTreeMap::new(),
            damage_taken: 1.0,
        }
    }
}

impl ModifierSet {
    pub fn stat(&self, name: &str) -> f64 {
        self.stats.get(name).copied().unwrap_or(0.0)
    }

    /// Flat bonus to damage dealt
    pub fn damage(&self) -> f64 {
        self.stat(STAT_DAMAGE)
    }

    /// Flat reduction of damage received
    pub fn armor(&self) -> f64 {
        self.stat(STAT_ARMOR)
    }

    /// Added to the success chance
    pub fn accuracy(&self) -> f64 {
        self.stat(STAT_ACCURACY)
    }

    fn add(&mut self, stat: &str, amount: f64) {
        *self.stats.entry(stat.to_string()).or_insert(0.0) += amount;
    }
}

/// Equipment category -> stat it feeds
fn stat_for_category(category: &str) -> &str {
    match category {
        "weapon" => STAT_DAMAGE,
        "armor" => STAT_ARMOR,
        other => other,
    }
}

/// Combine equipment and profession bonuses for a participant
pub fn derive_modifiers(participant: &CombatParticipant, config: &CombatConfig) -> ModifierSet {
    let mut set = ModifierSet::default();

    for item in participant.items.iter().filter(|i| i.equipped) {
        let Some(category) = item.category.as_deref() else {
            continue;
        };
        if let Some(bonus) = config
            .equipment_modifiers
            .get(category)
            .and_then(|items| items.get(&item.name))
        {
            set.add(stat_for_category(category), f64::from(*bonus));
        }
    }

    if let Some(stats) = participant
        .profession
        .as_deref()
        .and_then(|p| config.profession_stats(p))
    {
        for (stat, value) in stats {
            let Some(amount) = value.as_f64() else {
                continue;
            };
            if stat == STAT_DAMAGE_TAKEN {
                set.damage_taken = amount;
            } else {
                set.add(stat, amount);
            }
        }
    }

    set
}
