//! Headless encounter runner
//!
//! Loads a rules document and a scenario, plays the scenario's actions in
//! order and prints the encounter report as JSON.

use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use vesper_combat::combat::{CombatAction, CombatParticipant, Encounter};
use vesper_combat::core::error::{ConfigError, Result};
use vesper_combat::core::{CombatKind, ParticipantId};
use vesper_combat::rules::load_from_file;

#[derive(Parser, Debug)]
#[command(name = "vesper-combat")]
#[command(about = "Resolve a scripted combat encounter and print the report")]
struct Args {
    /// Rules document (JSON or TOML)
    #[arg(long, default_value = "data/combat_config.json")]
    config: PathBuf,

    /// Scenario document (JSON)
    #[arg(long)]
    scenario: PathBuf,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Pretty-print the report
    #[arg(long)]
    pretty: bool,
}

/// Participants plus the actions to play, in order
#[derive(Debug, Deserialize)]
struct Scenario {
    #[serde(default)]
    kind: CombatKind,
    initiator: ParticipantId,
    participants: Vec<CombatParticipant>,
    #[serde(default)]
    actions: Vec<CombatAction>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vesper_combat=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = Arc::new(load_from_file(&args.config)?);
    let raw = std::fs::read_to_string(&args.scenario).map_err(ConfigError::from)?;
    let scenario: Scenario = serde_json::from_str(&raw)?;

    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::info!("Seed {}", seed);

    let mut encounter = Encounter::new(config, ChaCha8Rng::seed_from_u64(seed));
    encounter.start(scenario.participants, scenario.initiator, scenario.kind)?;

    for action in scenario.actions {
        if encounter.phase().is_terminal() {
            tracing::info!("Skipping remaining actions, encounter is {:?}", encounter.phase());
            break;
        }
        match encounter.act(action) {
            Ok(result) => tracing::info!("{}", result.summary),
            // Rejections are recorded in the history and logged by the encounter
            Err(e) => tracing::debug!("Action rejected: {}", e),
        }
    }

    let report = encounter.finish();
    let json = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", json);
    Ok(())
}
