//! Resolve-then-apply integration tests
//!
//! These drive the resolver and propagator directly against a hand-built
//! state, the way an encounter does for each pending action.

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use vesper_combat::combat::constants::status;
use vesper_combat::combat::propagator;
use vesper_combat::combat::{
    resolve, ActionType, CombatAction, CombatParticipant, CombatResult, CombatState,
    EntryOutcome, HistoryEntry, ScriptedRolls,
};
use vesper_combat::core::error::ResolveError;
use vesper_combat::core::{CombatKind, ParticipantId};
use vesper_combat::rules::{load, CombatConfig};

const SIMPLE_ATTACK: &str = r#"{"actions": {"attack": {"chance": 0.5, "damage": 10}}}"#;

fn id(s: &str) -> ParticipantId {
    ParticipantId::new(s)
}

fn duel() -> CombatState {
    CombatState::new(
        vec![
            CombatParticipant::new("a", "A", 100).player(),
            CombatParticipant::new("b", "B", 100),
        ],
        id("a"),
        CombatKind::Duel,
    )
}

/// Resolve and apply one action, recording it in history like an encounter would
fn step<R: vesper_combat::combat::RollSource>(
    action: CombatAction,
    state: &mut CombatState,
    config: &CombatConfig,
    rolls: &mut R,
) -> Result<CombatResult, ResolveError> {
    let effect = resolve(&action, state, config, rolls)?;
    let result = propagator::apply(&effect, state, config, rolls);
    state.history.push(HistoryEntry {
        action,
        outcome: EntryOutcome::Resolved {
            success: effect.success,
            critical: effect.critical,
        },
    });
    Ok(result)
}

#[test]
fn test_forced_success_scenario() {
    let config = load(SIMPLE_ATTACK).unwrap();
    let mut state = duel();
    let mut rolls = ScriptedRolls::new([0.0]);

    let result = step(CombatAction::attack("a", "b"), &mut state, &config, &mut rolls).unwrap();

    assert!(result.success);
    assert_eq!(state.participant(&id("b")).unwrap().health, 90);
    assert_eq!(result.health_change(&id("b")), -10);
}

#[test]
fn test_forced_failure_scenario() {
    let config = load(SIMPLE_ATTACK).unwrap();
    let mut state = duel();
    let mut rolls = ScriptedRolls::new([0.99]);

    let result = step(CombatAction::attack("a", "b"), &mut state, &config, &mut rolls).unwrap();

    assert!(!result.success);
    assert_eq!(state.participant(&id("b")).unwrap().health, 100);
    assert!(result.relation_changes.is_empty());
    assert_eq!(state.participant(&id("b")).unwrap().relation_to(&id("a")), 0);
}

#[test]
fn test_disallowed_types_never_apply() {
    let config = load(SIMPLE_ATTACK).unwrap();
    let state = duel();

    for kind in ActionType::all() {
        if *kind == ActionType::Attack {
            continue;
        }
        let action = CombatAction::targeting(*kind, "a", "b");
        let mut rolls = ScriptedRolls::new([0.0]);
        let before = state.clone();

        let err = resolve(&action, &state, &config, &mut rolls).unwrap_err();

        assert_eq!(err, ResolveError::UnknownActionType(*kind));
        assert_eq!(state, before);
        assert_eq!(rolls.remaining(), 1);
    }
}

#[test]
fn test_defend_halves_exactly() {
    let config = load(
        r#"{"actions": {"attack": {"chance": 1.0, "damage": 15}, "defend": {"chance": 1.0}}}"#,
    )
    .unwrap();

    let mut open = duel();
    let unmitigated = step(
        CombatAction::attack("a", "b"),
        &mut open,
        &config,
        &mut ScriptedRolls::constant(0.0),
    )
    .unwrap()
    .health_change(&id("b"));
    assert_eq!(unmitigated, -15);

    let mut guarded = duel();
    let mut rolls = ScriptedRolls::constant(0.0);
    step(CombatAction::defend("b", Some("a")), &mut guarded, &config, &mut rolls).unwrap();
    let mitigated = step(CombatAction::attack("a", "b"), &mut guarded, &config, &mut rolls)
        .unwrap()
        .health_change(&id("b"));

    assert_eq!(mitigated, -(15 / 2));
    assert_eq!(guarded.participant(&id("b")).unwrap().health, 93);
}

#[test]
fn test_defend_only_covers_the_next_action() {
    let config = load(
        r#"{"actions": {"attack": {"chance": 1.0, "damage": 20}, "defend": {"chance": 1.0}}}"#,
    )
    .unwrap();
    let mut state = duel();
    let mut rolls = ScriptedRolls::constant(0.0);

    step(CombatAction::defend("b", None), &mut state, &config, &mut rolls).unwrap();
    let first = step(CombatAction::attack("a", "b"), &mut state, &config, &mut rolls).unwrap();
    let second = step(CombatAction::attack("a", "b"), &mut state, &config, &mut rolls).unwrap();

    assert_eq!(first.health_change(&id("b")), -10);
    assert_eq!(second.health_change(&id("b")), -20);
}

#[test]
fn test_bite_restricted_to_mortals() {
    let config = load(
        r#"{"actions": {"bite": {"chance": 1.0, "damage": 10}}, "bite": {"allowedTargets": ["nonVampire"]}}"#,
    )
    .unwrap();
    let state = CombatState::new(
        vec![
            CombatParticipant::new("a", "A", 100).player().vampire(),
            CombatParticipant::new("b", "B", 100).vampire(),
        ],
        id("a"),
        CombatKind::Hunt,
    );
    let before = state.clone();
    let mut rolls = ScriptedRolls::new([0.0]);

    let err = resolve(
        &CombatAction::targeting(ActionType::Bite, "a", "b"),
        &state,
        &config,
        &mut rolls,
    )
    .unwrap_err();

    assert!(matches!(err, ResolveError::InvalidTarget(_)));
    assert_eq!(state, before);
    assert_eq!(rolls.remaining(), 1);
}

#[test]
fn test_bite_feeds_the_vampire() {
    let config = load(
        r#"{"actions": {"bite": {"chance": 1.0, "damage": 10}}, "bite": {"healPercent": 50}}"#,
    )
    .unwrap();
    let mut state = CombatState::new(
        vec![
            CombatParticipant::new("a", "A", 80).player().vampire().with_blood(40),
            CombatParticipant::new("b", "B", 100),
        ],
        id("a"),
        CombatKind::Hunt,
    );

    let result = step(
        CombatAction::targeting(ActionType::Bite, "a", "b"),
        &mut state,
        &config,
        &mut ScriptedRolls::constant(0.0),
    )
    .unwrap();

    assert_eq!(result.health_change(&id("b")), -10);
    assert_eq!(result.blood_change(&id("b")), -10);
    assert_eq!(result.health_change(&id("a")), 5);
    assert_eq!(result.blood_change(&id("a")), 5);
    assert_eq!(state.participant(&id("a")).unwrap().blood, 45);
}

#[test]
fn test_knockout_marks_incapacitated() {
    let config = load(r#"{"actions": {"attack": {"chance": 1.0, "damage": 250}}}"#).unwrap();
    let mut state = duel();

    let result = step(
        CombatAction::attack("a", "b"),
        &mut state,
        &config,
        &mut ScriptedRolls::constant(0.0),
    )
    .unwrap();

    let b = state.participant(&id("b")).unwrap();
    assert_eq!(b.health, 0);
    assert!(b.has_status(status::INCAPACITATED));
    assert_eq!(result.health_change(&id("b")), -100);
}

fn run_seeded(seed: u64) -> (CombatResult, CombatState) {
    let config = load(
        r#"{
            "actions": {"attack": {"chance": 0.6, "damage": 12, "noise": 1.0}},
            "witnessChance": 0.5,
            "criticalChance": 0.2,
            "criticalEffects": {"success": {"damageMultiplier": 2.0}, "fail": {"selfDamage": 3}}
        }"#,
    )
    .unwrap();
    let mut state = CombatState::new(
        vec![
            CombatParticipant::new("a", "A", 100).player(),
            CombatParticipant::new("b", "B", 100),
            CombatParticipant::new("c", "C", 100),
        ],
        id("a"),
        CombatKind::Brawl,
    );
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut total = CombatResult::default();
    for _ in 0..6 {
        let result = step(CombatAction::attack("a", "b"), &mut state, &config, &mut rng).unwrap();
        total.merge(&result);
    }
    (total, state)
}

#[test]
fn test_same_seed_same_result() {
    let (first, first_state) = run_seeded(7);
    let (second, second_state) = run_seeded(7);

    assert_eq!(first, second);
    assert_eq!(first_state, second_state);
}

fn arb_action() -> impl Strategy<Value = CombatAction> {
    let ids = prop::sample::select(vec!["a", "b", "c"]);
    (
        prop::sample::select(ActionType::all().to_vec()),
        ids.clone(),
        ids,
    )
        .prop_map(|(kind, initiator, target)| {
            CombatAction::targeting(kind, initiator, target).with_param("item", "potion")
        })
}

const EVERYTHING: &str = r#"{
    "allowedTypes": ["attack", "defend", "useItem", "escape", "ability", "bite", "dominate", "shadowStep"],
    "damageValues": {"attack": 40, "ability": 60, "bite": 30, "useItem": 25},
    "aftermath": {"noiseLevel": {"attack": 1.0, "bite": 2.0, "ability": 0.5}, "investigationThreshold": 1000.0},
    "criticalChance": 0.3,
    "criticalEffects": {"success": {"damageMultiplier": 3.0}, "fail": {"selfDamage": 50}},
    "witnessChance": 0.3,
    "bite": {"healPercent": 100}
}"#;

fn crowd() -> CombatState {
    let potion = vesper_combat::combat::InventoryItem::consumable("potion", "Potion");
    CombatState::new(
        vec![
            CombatParticipant::new("a", "A", 50).player().vampire().with_blood(20).with_item(potion.clone()),
            CombatParticipant::new("b", "B", 30).with_item(potion.clone()),
            CombatParticipant::new("c", "C", 10).vampire().with_item(potion),
        ],
        id("a"),
        CombatKind::Brawl,
    )
}

proptest! {
    #[test]
    fn prop_applied_deltas_never_overdraw(
        seed in any::<u64>(),
        actions in prop::collection::vec(arb_action(), 1..40),
    ) {
        let config = load(EVERYTHING).unwrap();
        let mut state = crowd();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        for action in actions {
            let before = state.clone();
            if let Ok(result) = step(action, &mut state, &config, &mut rng) {
                for p in &before.participants {
                    let after = state.participant(&p.id).unwrap();
                    // Deltas report exactly what happened, so nothing dips below zero
                    prop_assert_eq!(p.health as i64 + result.health_change(&p.id) as i64, after.health as i64);
                    prop_assert_eq!(p.blood as i64 + result.blood_change(&p.id) as i64, after.blood as i64);
                    prop_assert!(p.health as i64 + result.health_change(&p.id) as i64 >= 0);
                }
            } else {
                prop_assert_eq!(&state, &before);
            }
        }
    }

    #[test]
    fn prop_noise_never_decreases(
        seed in any::<u64>(),
        actions in prop::collection::vec(arb_action(), 1..40),
    ) {
        let config = load(EVERYTHING).unwrap();
        let mut state = crowd();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut last = state.noise;

        for action in actions {
            let _ = step(action, &mut state, &config, &mut rng);
            prop_assert!(state.noise >= last);
            last = state.noise;
        }
    }
}
