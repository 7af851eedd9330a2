//! Combat rules loaded from JSON or TOML documents

pub mod config;
mod loader;
pub mod schema;

pub use config::{
    AbilityRule, AbilityTarget, AftermathRules, BiteRules, BloodTier, CombatConfig,
    CriticalEffect, RelationRules, TargetFilter,
};
pub use loader::{build_config, load, load_from_file, load_toml};
