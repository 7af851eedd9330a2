//! Combat actions submitted by participants

use crate::core::types::ParticipantId;
use crate::core::value::ConfigValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Kind of action a participant can take in combat
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionType {
    Attack,
    Defend,
    #[serde(alias = "use_item")]
    UseItem,
    Escape,
    Ability,
    // Vampire abilities
    Bite,
    Dominate,
    #[serde(alias = "shadow_step")]
    ShadowStep,
}

impl ActionType {
    /// All action types
    pub fn all() -> &'static [ActionType] {
        &[
            ActionType::Attack,
            ActionType::Defend,
            ActionType::UseItem,
            ActionType::Escape,
            ActionType::Ability,
            ActionType::Bite,
            ActionType::Dominate,
            ActionType::ShadowStep,
        ]
    }

    /// Identifier used as a key in rules documents
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Attack => "attack",
            ActionType::Defend => "defend",
            ActionType::UseItem => "useItem",
            ActionType::Escape => "escape",
            ActionType::Ability => "ability",
            ActionType::Bite => "bite",
            ActionType::Dominate => "dominate",
            ActionType::ShadowStep => "shadowStep",
        }
    }

    /// Only vampires may use these
    pub fn is_vampire_ability(&self) -> bool {
        matches!(
            self,
            ActionType::Bite | ActionType::Dominate | ActionType::ShadowStep
        )
    }

    /// Must name another participant as target. Dominate and shadow step
    /// depend on who their ability rule applies to.
    pub fn requires_target(&self) -> bool {
        matches!(
            self,
            ActionType::Attack | ActionType::Ability | ActionType::Bite
        )
    }

    /// Harms the target on success (changes relations)
    pub fn is_hostile(&self) -> bool {
        matches!(
            self,
            ActionType::Attack
                | ActionType::Ability
                | ActionType::Bite
                | ActionType::Dominate
                | ActionType::UseItem
        )
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "attack" => Ok(ActionType::Attack),
            "defend" => Ok(ActionType::Defend),
            "useItem" | "use_item" => Ok(ActionType::UseItem),
            "escape" => Ok(ActionType::Escape),
            "ability" => Ok(ActionType::Ability),
            "bite" => Ok(ActionType::Bite),
            "dominate" => Ok(ActionType::Dominate),
            "shadowStep" | "shadow_step" => Ok(ActionType::ShadowStep),
            other => Err(format!("unknown action type '{}'", other)),
        }
    }
}

/// An immutable request to act; appended to history and never changed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatAction {
    pub kind: ActionType,
    pub initiator: ParticipantId,
    #[serde(default)]
    pub target: Option<ParticipantId>,
    #[serde(default)]
    pub params: BTreeMap<String, ConfigValue>,
}

impl CombatAction {
    pub fn new(kind: ActionType, initiator: impl Into<ParticipantId>) -> Self {
        Self {
            kind,
            initiator: initiator.into(),
            target: None,
            params: BTreeMap::new(),
        }
    }

    pub fn targeting(
        kind: ActionType,
        initiator: impl Into<ParticipantId>,
        target: impl Into<ParticipantId>,
    ) -> Self {
        Self {
            target: Some(target.into()),
            ..Self::new(kind, initiator)
        }
    }

    pub fn with_param(mut self, key: &str, value: impl Into<ConfigValue>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    /// Shorthand for an attack
    pub fn attack(initiator: &str, target: &str) -> Self {
        Self::targeting(ActionType::Attack, initiator, target)
    }

    /// Defend, optionally guarding against one attacker
    pub fn defend(initiator: &str, against: Option<&str>) -> Self {
        let mut action = Self::new(ActionType::Defend, initiator);
        action.target = against.map(ParticipantId::from);
        action
    }

    pub fn param(&self, key: &str) -> Option<&ConfigValue> {
        self.params.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifiers_round_trip_through_from_str() {
        for kind in ActionType::all() {
            assert_eq!(kind.as_str().parse::<ActionType>().unwrap(), *kind);
        }
        assert!("fireball".parse::<ActionType>().is_err());
    }

    #[test]
    fn test_snake_case_aliases() {
        assert_eq!("shadow_step".parse::<ActionType>().unwrap(), ActionType::ShadowStep);
        let kind: ActionType = serde_json::from_str("\"use_item\"").unwrap();
        assert_eq!(kind, ActionType::UseItem);
    }

    #[test]
    fn test_vampire_abilities() {
        assert!(ActionType::Bite.is_vampire_ability());
        assert!(ActionType::ShadowStep.is_vampire_ability());
        assert!(!ActionType::Attack.is_vampire_ability());
    }

    #[test]
    fn test_target_requirements() {
        assert!(ActionType::Attack.requires_target());
        assert!(ActionType::Bite.requires_target());
        // decided by the ability rule
        assert!(!ActionType::Dominate.requires_target());
        assert!(!ActionType::ShadowStep.requires_target());
        assert!(!ActionType::Escape.requires_target());
    }

    #[test]
    fn test_action_deserializes_with_defaults() {
        let action: CombatAction =
            serde_json::from_str(r#"{"kind": "escape", "initiator": "player"}"#).unwrap();
        assert_eq!(action.kind, ActionType::Escape);
        assert!(action.target.is_none());
        assert!(action.params.is_empty());
    }

    #[test]
    fn test_with_param() {
        let action = CombatAction::new(ActionType::UseItem, "player").with_param("item", 4i64);
        assert_eq!(action.param("item"), Some(&ConfigValue::Int(4)));
    }
}
