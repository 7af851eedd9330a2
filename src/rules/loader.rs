//! Load combat rules from JSON or TOML documents

use crate::combat::action::ActionType;
use crate::core::error::ConfigError;
use crate::rules::config::{
    AbilityRule, AbilityTarget, AftermathRules, BiteRules, BloodTier, CombatConfig,
    CriticalEffect, RelationRules, TargetFilter,
};
use crate::core::value::ConfigValue;
use crate::rules::schema::{RawAbility, RawCombatConfig, RawCriticalEffect};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

/// Parse and validate a JSON rules document
pub fn load(raw: &str) -> Result<CombatConfig, ConfigError> {
    let doc: RawCombatConfig = serde_json::from_str(raw)
        .map_err(|e| ConfigError::Malformed(format!("invalid JSON: {}", e)))?;
    build_config(doc)
}

/// Parse and validate a TOML rules document
pub fn load_toml(raw: &str) -> Result<CombatConfig, ConfigError> {
    let doc: RawCombatConfig =
        toml::from_str(raw).map_err(|e| ConfigError::Malformed(format!("invalid TOML: {}", e)))?;
    build_config(doc)
}

/// Load a rules document from disk; `.toml` files are read as TOML, anything else as JSON
pub fn load_from_file(path: &Path) -> Result<CombatConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => load_toml(&content)?,
        _ => load(&content)?,
    };
    tracing::info!(
        "Loaded combat rules from {} ({} action types)",
        path.display(),
        config.allowed_types.len()
    );
    Ok(config)
}

/// Validate a raw document into a `CombatConfig`
pub fn build_config(doc: RawCombatConfig) -> Result<CombatConfig, ConfigError> {
    let mut config = CombatConfig::default();

    for name in doc.allowed_types.iter().chain(doc.actions.keys()) {
        let kind = parse_action(name)?;
        config.allowed_types.insert(kind);
    }
    if config.allowed_types.is_empty() {
        return Err(ConfigError::Malformed(
            "allowedTypes must list at least one action type".into(),
        ));
    }
    let allowed = config.allowed_types.clone();

    let mut noise_level = BTreeMap::new();

    // Compact per-action blocks first; the flat tables below override them
    for (name, rules) in &doc.actions {
        let kind = parse_allowed(name, &allowed, "actions")?;
        if let Some(chance) = rules.chance {
            check_chance(&format!("actions.{}.chance", name), chance)?;
            config.action_chances.insert(kind, chance);
        }
        if let Some(damage) = rules.damage {
            config
                .damage_values
                .insert(kind, check_damage(&format!("actions.{}.damage", name), damage)?);
        }
        if !rules.consequences.is_empty() {
            config.consequences.insert(kind, rules.consequences.clone());
        }
        if let Some(noise) = rules.noise {
            check_non_negative(&format!("actions.{}.noise", name), noise)?;
            noise_level.insert(kind, noise);
        }
    }

    for (name, chance) in &doc.action_chances {
        let kind = parse_allowed(name, &allowed, "actionChances")?;
        check_chance(&format!("actionChances.{}", name), *chance)?;
        config.action_chances.insert(kind, *chance);
    }

    for (name, damage) in &doc.damage_values {
        let kind = parse_allowed(name, &allowed, "damageValues")?;
        config
            .damage_values
            .insert(kind, check_damage(&format!("damageValues.{}", name), *damage)?);
    }

    for (name, events) in &doc.consequences {
        let kind = parse_allowed(name, &allowed, "consequences")?;
        config
            .consequences
            .entry(kind)
            .or_default()
            .extend(events.clone());
    }

    if let Some(mods) = &doc.blood_modifiers {
        for (tier, multiplier) in mods {
            let tier: BloodTier = tier.parse().map_err(ConfigError::Malformed)?;
            check_non_negative(&format!("bloodModifiers.{:?}", tier), *multiplier)?;
            config.blood_modifiers.insert(tier, *multiplier);
        }
    }

    if let Some(chance) = doc.witness_chance {
        check_chance("witnessChance", chance)?;
        config.witness_chance = Some(chance);
    }

    let mut investigation_threshold = None;
    if let Some(aftermath) = &doc.aftermath {
        for (name, noise) in aftermath.noise_level.iter().flatten() {
            let kind = parse_allowed(name, &allowed, "aftermath.noiseLevel")?;
            check_non_negative(&format!("aftermath.noiseLevel.{}", name), *noise)?;
            noise_level.insert(kind, *noise);
        }
        if let Some(threshold) = aftermath.investigation_threshold {
            check_non_negative("aftermath.investigationThreshold", threshold)?;
            investigation_threshold = Some(threshold);
        }
    }
    if doc.aftermath.is_some() || !noise_level.is_empty() {
        config.aftermath = Some(AftermathRules {
            noise_level,
            investigation_threshold,
        });
    }

    if let Some(chance) = doc.critical_chance {
        check_chance("criticalChance", chance)?;
        config.critical_chance = Some(chance);
    }

    for (key, effect) in doc.critical_effects.iter().flatten() {
        let effect = build_critical_effect(key, effect)?;
        match key.as_str() {
            "success" => config.critical_success = Some(effect),
            "fail" | "failure" => config.critical_fail = Some(effect),
            other => {
                return Err(ConfigError::Malformed(format!(
                    "criticalEffects key must be 'success' or 'fail', got '{}'",
                    other
                )))
            }
        }
    }

    if let Some(equipment) = doc.equipment_modifiers {
        config.equipment_modifiers = equipment;
    }

    if let Some(bite) = &doc.bite {
        config.bite = Some(build_bite_rules(bite)?);
    }
    config.public_bite_reveal = doc.public_bite_reveal.unwrap_or(false);

    for (profession, stats) in doc.profession_modifiers.iter().flatten() {
        for (stat, value) in stats {
            if let Some(v) = value.as_f64() {
                let field = format!("professionModifiers.{}.{}", profession, stat);
                if !v.is_finite() || (stat == "damageTaken" && v < 0.0) {
                    return Err(ConfigError::OutOfRange { field, value: v });
                }
            } else if stat == "damageTaken" {
                return Err(ConfigError::Malformed(format!(
                    "professionModifiers.{}.damageTaken must be numeric, got {}",
                    profession,
                    value.type_name()
                )));
            }
        }
        config
            .profession_modifiers
            .insert(profession.to_lowercase(), stats.clone());
    }

    for (name, ability) in doc.abilities.iter().flatten() {
        let kind = parse_allowed(name, &allowed, "abilities")?;
        config.abilities.insert(kind, build_ability(kind, ability)?);
    }

    if let Some(relations) = &doc.relations {
        let defaults = RelationRules::default();
        config.relations = RelationRules {
            victim_toward_attacker: relations
                .victim_toward_attacker
                .unwrap_or(defaults.victim_toward_attacker),
            attacker_toward_victim: relations
                .attacker_toward_victim
                .unwrap_or(defaults.attacker_toward_victim),
        };
    }

    Ok(config)
}

fn parse_action(name: &str) -> Result<ActionType, ConfigError> {
    name.parse().map_err(ConfigError::Malformed)
}

fn parse_allowed(
    name: &str,
    allowed: &BTreeSet<ActionType>,
    section: &str,
) -> Result<ActionType, ConfigError> {
    let kind = parse_action(name)?;
    if !allowed.contains(&kind) {
        return Err(ConfigError::Malformed(format!(
            "{} references '{}' which is not in allowedTypes",
            section, name
        )));
    }
    Ok(kind)
}

fn check_chance(field: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::OutOfRange {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

fn check_non_negative(field: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::OutOfRange {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

fn check_damage(field: &str, value: i64) -> Result<u32, ConfigError> {
    u32::try_from(value).map_err(|_| ConfigError::OutOfRange {
        field: field.to_string(),
        value: value as f64,
    })
}

fn build_critical_effect(key: &str, raw: &RawCriticalEffect) -> Result<CriticalEffect, ConfigError> {
    match raw {
        RawCriticalEffect::Narrative(text) => Ok(CriticalEffect::narrative(text)),
        RawCriticalEffect::Detailed(detail) => {
            if let Some(multiplier) = detail.damage_multiplier {
                check_non_negative(&format!("criticalEffects.{}.damageMultiplier", key), multiplier)?;
            }
            let self_damage = match detail.self_damage {
                Some(d) => check_damage(&format!("criticalEffects.{}.selfDamage", key), d)?,
                None => 0,
            };
            Ok(CriticalEffect {
                description: detail.description.clone().unwrap_or_default(),
                damage_multiplier: detail.damage_multiplier,
                status: detail.status.clone(),
                self_damage,
            })
        }
    }
}

fn build_bite_rules(
    raw: &BTreeMap<String, ConfigValue>,
) -> Result<BiteRules, ConfigError> {
    let mut rules = BiteRules::default();

    if let Some(value) = raw.get("healPercent") {
        // Integers are percentages, reals are fractions
        let fraction = match value {
            ConfigValue::Int(pct) => *pct as f64 / 100.0,
            ConfigValue::Real(frac) => *frac,
            other => {
                return Err(ConfigError::Malformed(format!(
                    "bite.healPercent must be numeric, got {}",
                    other.type_name()
                )))
            }
        };
        check_chance("bite.healPercent", fraction)?;
        rules.heal_fraction = fraction;
    }

    if let Some(value) = raw.get("allowedTargets") {
        let names = value.as_text_list().ok_or_else(|| {
            ConfigError::Malformed(format!(
                "bite.allowedTargets must be text or a list of text, got {}",
                value.type_name()
            ))
        })?;
        for name in names {
            let filter: TargetFilter = name.parse().map_err(ConfigError::Malformed)?;
            rules.allowed_targets.push(filter);
        }
    }

    Ok(rules)
}

fn build_ability(kind: ActionType, raw: &RawAbility) -> Result<AbilityRule, ConfigError> {
    let defaults = AbilityRule::default_for(kind).ok_or_else(|| {
        ConfigError::Malformed(format!(
            "abilities may only describe dominate or shadowStep, got '{}'",
            kind
        ))
    })?;

    let applies_to = match raw.applies_to.as_deref() {
        None => defaults.applies_to,
        Some("target") => AbilityTarget::Target,
        Some("initiator") | Some("self") => AbilityTarget::Initiator,
        Some(other) => {
            return Err(ConfigError::Malformed(format!(
                "abilities.{}.appliesTo must be 'target' or 'initiator', got '{}'",
                kind, other
            )))
        }
    };

    Ok(AbilityRule {
        status: raw.status.clone().unwrap_or(defaults.status),
        applies_to,
        morale_delta: raw.morale_delta.unwrap_or(defaults.morale_delta),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGINAL_SHAPE: &str = r#"{
        "allowedTypes": ["attack", "defend", "bite", "escape"],
        "actionChances": {"attack": 0.6, "bite": 0.8, "escape": 0.4},
        "damageValues": {"attack": 10, "bite": 15},
        "consequences": {"attack": {"success": "{initiator} wounds {target}", "fail": "{initiator} misses"}},
        "bloodModifiers": {"low": 0.5, "medium": 1.0, "high": 1.2},
        "witnessChance": 0.25,
        "aftermath": {"noiseLevel": {"attack": 2.0, "bite": 1.0}, "investigationThreshold": 5.0},
        "criticalChance": 0.1,
        "criticalEffects": {"success": "A crushing blow", "fail": {"description": "You trip", "status": "stunned"}},
        "equipmentModifiers": {"weapon": {"Dagger": 3}, "armor": {"Leather Vest": 2}},
        "bite": {"healPercent": 0.5, "allowedTargets": ["nonVampire", "alive"]},
        "publicBiteReveal": true,
        "professionModifiers": {"Guardman": {"armor": 2, "damageTaken": 0.8}}
    }"#;

    #[test]
    fn test_load_original_document() {
        let config = load(ORIGINAL_SHAPE).unwrap();

        assert_eq!(config.allowed_types.len(), 4);
        assert_eq!(config.chance_for(ActionType::Attack), Some(0.6));
        assert_eq!(config.chance_for(ActionType::Defend), Some(0.5));
        assert_eq!(config.base_damage(ActionType::Bite), 15);
        assert_eq!(config.blood_multiplier(10), 0.5);
        assert_eq!(config.noise_for(ActionType::Attack), 2.0);
        assert_eq!(config.investigation_threshold(), Some(5.0));
        assert_eq!(
            config.critical_effect(true).map(|e| e.description.as_str()),
            Some("A crushing blow")
        );
        assert_eq!(
            config.critical_effect(false).and_then(|e| e.status.as_deref()),
            Some("stunned")
        );
        assert!(config.public_bite_reveal);
        let bite = config.bite.as_ref().unwrap();
        assert_eq!(bite.heal_fraction, 0.5);
        assert_eq!(
            bite.allowed_targets,
            vec![TargetFilter::NonVampire, TargetFilter::Alive]
        );
        assert!(config.profession_stats("guardman").is_some());
    }

    #[test]
    fn test_compact_action_block() {
        let config = load(r#"{"actions": {"attack": {"chance": 0.5, "damage": 10}}}"#).unwrap();

        assert!(config.is_allowed(ActionType::Attack));
        assert_eq!(config.chance_for(ActionType::Attack), Some(0.5));
        assert_eq!(config.base_damage(ActionType::Attack), 10);
    }

    #[test]
    fn test_flat_tables_override_compact_blocks() {
        let config = load(
            r#"{"actions": {"attack": {"chance": 0.5}}, "actionChances": {"attack": 0.9}}"#,
        )
        .unwrap();
        assert_eq!(config.chance_for(ActionType::Attack), Some(0.9));
    }

    #[test]
    fn test_empty_allowed_types_is_malformed() {
        let err = load(r#"{"allowedTypes": []}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Malformed(_)));
    }

    #[test]
    fn test_unknown_action_identifier_is_malformed() {
        let err = load(r#"{"allowedTypes": ["attack", "fireball"]}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Malformed(msg) if msg.contains("fireball")));
    }

    #[test]
    fn test_keys_must_be_allowed() {
        let err = load(r#"{"allowedTypes": ["attack"], "damageValues": {"bite": 5}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Malformed(msg) if msg.contains("bite")));
    }

    #[test]
    fn test_chance_out_of_range() {
        let err = load(r#"{"allowedTypes": ["attack"], "actionChances": {"attack": 1.5}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { field, .. } if field == "actionChances.attack"));

        let err = load(r#"{"allowedTypes": ["attack"], "witnessChance": -0.1}"#).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { .. }));
    }

    #[test]
    fn test_negative_damage_out_of_range() {
        let err = load(r#"{"allowedTypes": ["attack"], "damageValues": {"attack": -3}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { value, .. } if value == -3.0));
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        assert!(matches!(load("{not json"), Err(ConfigError::Malformed(_))));
        assert!(matches!(
            load(r#"{"allowedTypes": "attack"}"#),
            Err(ConfigError::Malformed(_))
        ));
    }

    #[test]
    fn test_unknown_blood_tier() {
        let err = load(r#"{"allowedTypes": ["attack"], "bloodModifiers": {"extreme": 2.0}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Malformed(_)));
    }

    #[test]
    fn test_heal_percent_integer_is_percentage() {
        let config = load(r#"{"allowedTypes": ["bite"], "bite": {"healPercent": 25}}"#).unwrap();
        assert_eq!(config.bite.unwrap().heal_fraction, 0.25);

        let err = load(r#"{"allowedTypes": ["bite"], "bite": {"healPercent": 1.5}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { .. }));
    }

    #[test]
    fn test_single_text_allowed_target() {
        let config =
            load(r#"{"allowedTypes": ["bite"], "bite": {"allowedTargets": "human"}}"#).unwrap();
        assert_eq!(config.bite.unwrap().allowed_targets, vec![TargetFilter::NonVampire]);

        let err = load(r#"{"allowedTypes": ["bite"], "bite": {"allowedTargets": ["ghosts"]}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Malformed(_)));
    }

    #[test]
    fn test_ability_overrides() {
        let config = load(
            r#"{"allowedTypes": ["dominate"], "abilities": {"dominate": {"status": "enthralled", "moraleDelta": -30}}}"#,
        )
        .unwrap();
        let rule = config.ability_rule(ActionType::Dominate).unwrap();
        assert_eq!(rule.status, "enthralled");
        assert_eq!(rule.morale_delta, -30);
        assert_eq!(rule.applies_to, AbilityTarget::Target);

        let err = load(r#"{"allowedTypes": ["attack"], "abilities": {"attack": {}}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Malformed(_)));
    }

    #[test]
    fn test_abilities_must_be_allowed() {
        let err = load(r#"{"allowedTypes": ["attack"], "abilities": {"dominate": {"status": "x"}}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Malformed(msg) if msg.contains("abilities")));
    }

    #[test]
    fn test_damage_taken_must_be_numeric() {
        let err = load(
            r#"{"allowedTypes": ["attack"], "professionModifiers": {"priest": {"damageTaken": "low"}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Malformed(_)));
    }

    #[test]
    fn test_load_toml() {
        let toml_str = r#"
allowedTypes = ["attack", "escape"]
witnessChance = 0.1

[actionChances]
attack = 0.55

[damageValues]
attack = 8

[aftermath]
investigationThreshold = 3.0

[aftermath.noiseLevel]
attack = 1.5
"#;
        let config = load_toml(toml_str).unwrap();

        assert_eq!(config.chance_for(ActionType::Attack), Some(0.55));
        assert_eq!(config.base_damage(ActionType::Attack), 8);
        assert_eq!(config.noise_for(ActionType::Attack), 1.5);
        assert_eq!(config.witness_chance, Some(0.1));
    }

    #[test]
    fn test_load_bundled_rules_file() {
        let path = Path::new("data/combat_config.json");
        if path.exists() {
            let config = load_from_file(path).unwrap();
            assert!(config.is_allowed(ActionType::Attack));
            assert!(config.is_allowed(ActionType::Bite));
        }
    }
}
