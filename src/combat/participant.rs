//! Participant snapshot used uniformly for the player and NPCs
//!
//! World entities expose what combat needs through the `Combatant` trait.
//! The encounter owns its snapshots; callers copy deltas back afterwards.

use crate::combat::constants::status;
use crate::core::types::{ParticipantId, Side};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// An item carried into combat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    /// Equipment category ("weapon", "armor", ...); None for consumables
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_equipped")]
    pub equipped: bool,
}

fn default_equipped() -> bool {
    true
}

fn full_vital() -> u32 {
    100
}

impl InventoryItem {
    pub fn equipment(id: &str, name: &str, category: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            category: Some(category.to_string()),
            equipped: true,
        }
    }

    pub fn consumable(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            category: None,
            equipped: false,
        }
    }
}

/// Capability interface implemented by world entities outside the engine
pub trait Combatant {
    fn combat_id(&self) -> ParticipantId;
    fn display_name(&self) -> String;
    fn is_player(&self) -> bool;
    fn is_vampire(&self) -> bool;
    fn health(&self) -> u32;
    fn blood(&self) -> u32;
    fn morale(&self) -> u32;

    fn profession(&self) -> Option<String> {
        None
    }

    fn inventory(&self) -> Vec<InventoryItem> {
        Vec::new()
    }

    fn relations(&self) -> BTreeMap<ParticipantId, i32> {
        BTreeMap::new()
    }

    fn side(&self) -> Side {
        if self.is_player() {
            Side::player()
        } else {
            Side::npc()
        }
    }
}

/// A combatant's state for the duration of one encounter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatParticipant {
    pub id: ParticipantId,
    pub name: String,
    #[serde(default)]
    pub is_player: bool,
    #[serde(default)]
    pub is_vampire: bool,
    #[serde(default)]
    pub side: Option<Side>,
    #[serde(default)]
    pub profession: Option<String>,
    pub health: u32,
    #[serde(default = "full_vital")]
    pub blood: u32,
    #[serde(default = "full_vital")]
    pub morale: u32,
    #[serde(default)]
    pub items: Vec<InventoryItem>,
    #[serde(default)]
    pub statuses: BTreeSet<String>,
    #[serde(default)]
    pub relations: BTreeMap<ParticipantId, i32>,
}

impl CombatParticipant {
    pub fn new(id: &str, name: &str, health: u32) -> Self {
        Self {
            id: ParticipantId::new(id),
            name: name.to_string(),
            is_player: false,
            is_vampire: false,
            side: None,
            profession: None,
            health,
            blood: 100,
            morale: 100,
            items: Vec::new(),
            statuses: BTreeSet::new(),
            relations: BTreeMap::new(),
        }
    }

    /// Take a snapshot of a world entity
    pub fn snapshot<C: Combatant + ?Sized>(entity: &C) -> Self {
        Self {
            id: entity.combat_id(),
            name: entity.display_name(),
            is_player: entity.is_player(),
            is_vampire: entity.is_vampire(),
            side: Some(entity.side()),
            profession: entity.profession(),
            health: entity.health(),
            blood: entity.blood(),
            morale: entity.morale(),
            items: entity.inventory(),
            statuses: BTreeSet::new(),
            relations: entity.relations(),
        }
    }

    pub fn player(mut self) -> Self {
        self.is_player = true;
        self
    }

    pub fn vampire(mut self) -> Self {
        self.is_vampire = true;
        self
    }

    pub fn with_blood(mut self, blood: u32) -> Self {
        self.blood = blood;
        self
    }

    pub fn with_profession(mut self, profession: &str) -> Self {
        self.profession = Some(profession.to_string());
        self
    }

    pub fn with_item(mut self, item: InventoryItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn on_side(mut self, side: &str) -> Self {
        self.side = Some(Side(side.to_string()));
        self
    }

    /// Explicit side, or player/npc by default
    pub fn side(&self) -> Side {
        match &self.side {
            Some(side) => side.clone(),
            None if self.is_player => Side::player(),
            None => Side::npc(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn has_status(&self, tag: &str) -> bool {
        self.statuses.contains(tag)
    }

    /// Still able to act and be targeted
    pub fn is_active(&self) -> bool {
        self.is_alive() && !self.has_status(status::INCAPACITATED) && !self.has_status(status::ESCAPED)
    }

    pub fn relation_to(&self, other: &ParticipantId) -> i32 {
        self.relations.get(other).copied().unwrap_or(0)
    }

    pub fn item(&self, key: &str) -> Option<&InventoryItem> {
        self.items.iter().find(|i| i.id == key || i.name == key)
    }

    /// Add a signed delta to health, clamped at zero; returns the applied change
    pub fn adjust_health(&mut self, delta: i32) -> i32 {
        apply_clamped(&mut self.health, delta)
    }

    pub fn adjust_blood(&mut self, delta: i32) -> i32 {
        apply_clamped(&mut self.blood, delta)
    }

    pub fn adjust_morale(&mut self, delta: i32) -> i32 {
        apply_clamped(&mut self.morale, delta)
    }

    /// Returns true if the status was newly added
    pub fn add_status(&mut self, tag: &str) -> bool {
        self.statuses.insert(tag.to_string())
    }

    pub fn adjust_relation(&mut self, other: &ParticipantId, delta: i32) {
        let entry = self.relations.entry(other.clone()).or_insert(0);
        *entry = entry.saturating_add(delta);
    }

    /// Remove an item by id or name
    pub fn take_item(&mut self, key: &str) -> Option<InventoryItem> {
        let index = self.items.iter().position(|i| i.id == key || i.name == key)?;
        Some(self.items.remove(index))
    }
}

fn apply_clamped(value: &mut u32, delta: i32) -> i32 {
    let before = i64::from(*value);
    let after = (before + i64::from(delta)).clamp(0, i64::from(u32::MAX));
    *value = after as u32;
    (after - before) as i32
}
