//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a combat participant (player id or NPC id)
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Category of an encounter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CombatKind {
    /// A vampire stalking prey
    Hunt,
    /// Open fight between several parties
    #[default]
    Brawl,
    /// One side strikes without warning
    Ambush,
    /// Formal one-on-one fight
    Duel,
}

/// Allegiance label; an encounter concludes when one side remains
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Side(pub String);

impl Side {
    pub fn player() -> Self {
        Self("player".to_string())
    }

    pub fn npc() -> Self {
        Self("npc".to_string())
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_participant_id_serializes_as_plain_string() {
        let id = ParticipantId::new("npc-7");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"npc-7\"");
        assert_eq!(id.to_string(), "npc-7");
    }

    #[test]
    fn test_combat_kind_camel_case() {
        let kind: CombatKind = serde_json::from_str("\"ambush\"").unwrap();
        assert_eq!(kind, CombatKind::Ambush);
        assert_eq!(CombatKind::default(), CombatKind::Brawl);
    }
}
