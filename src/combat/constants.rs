//! Combat system constants - engine defaults used when a ruleset is silent

/// Success chance for allowed action types with no explicit chance
pub const DEFAULT_ACTION_CHANCE: f64 = 0.5;

// Blood tiers: below LOW is "low", below HIGH is "medium", otherwise "high"
pub const LOW_BLOOD_THRESHOLD: u32 = 30;
pub const HIGH_BLOOD_THRESHOLD: u32 = 70;

/// Damage multiplier for a critical success with no explicit multiplier
pub const DEFAULT_CRITICAL_MULTIPLIER: f64 = 2.0;

/// A successful defend divides incoming damage by this
pub const DEFEND_DAMAGE_DIVISOR: u32 = 2;

// Relation deltas applied on a successful hostile action
pub const DEFAULT_VICTIM_RELATION_DELTA: i32 = -10;
pub const DEFAULT_ATTACKER_RELATION_DELTA: i32 = -2;

/// Morale lost by the target of a successful dominate
pub const DEFAULT_DOMINATE_MORALE_DELTA: i32 = -15;

/// Status tags applied by the engine
pub mod status {
    pub const INCAPACITATED: &str = "incapacitated";
    pub const DEFENDING: &str = "defending";
    pub const ESCAPED: &str = "escaped";
    pub const INTIMIDATED: &str = "intimidated";
    pub const HIDDEN: &str = "hidden";
    pub const AWARE: &str = "aware";
    pub const REVEALED: &str = "revealed";
}
