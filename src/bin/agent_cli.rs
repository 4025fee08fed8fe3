//! CLI tooling around the agent core: single decisions, multi-turn
//! traces, and seed batches over JSON scenario files.

use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use agent_wasm::api::{decide_snapshot, AgentConfig};
use agent_wasm::context::Snapshot;
use agent_wasm::model::{
    AltarState, Character, GroundItem, Level, MerchantState, Monster,
};
use agent_wasm::rng::Prng;
use agent_wasm::state::AgentState;

#[derive(Parser)]
#[command(name = "agent_cli")]
#[command(about = "CLI tools for roguelike agent decision analysis")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decide a single action for a scenario snapshot
    Decide {
        /// Path to the scenario JSON file
        scenario: PathBuf,
        /// Seed override (defaults to the scenario's configured seed)
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// Run a scenario for several turns and print the decision trace
    Trace {
        /// Path to the scenario JSON file
        scenario: PathBuf,
        /// Number of turns to run
        #[arg(short, long, default_value = "10")]
        turns: u64,
        /// Output format: 'markdown' or 'json'
        #[arg(short, long, default_value = "markdown")]
        format: String,
    },
    /// Run one decision per seed and summarize the action distribution
    Batch {
        /// Path to the scenario JSON file
        scenario: PathBuf,
        /// Number of consecutive seeds to run
        #[arg(short, long, default_value = "100")]
        count: u64,
        /// First seed
        #[arg(short, long, default_value = "0")]
        base_seed: u64,
    },
}

/// Scenario file: config plus a snapshot whose level can be written as
/// ASCII rows for readability.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScenarioFile {
    config: AgentConfig,
    level: LevelSpec,
    character: Character,
    #[serde(default)]
    monsters: Vec<Monster>,
    #[serde(default)]
    items: Vec<GroundItem>,
    #[serde(default)]
    altars: Vec<AltarState>,
    #[serde(default)]
    merchants: Vec<MerchantState>,
    #[serde(default)]
    living_unique_depths: Vec<u32>,
    #[serde(default)]
    turn: u64,
}

#[derive(Deserialize)]
#[serde(untagged, rename_all = "camelCase")]
enum LevelSpec {
    Ascii { rows: Vec<String>, depth: u32 },
    Full(Box<Level>),
}

impl ScenarioFile {
    fn into_parts(self) -> (AgentConfig, Snapshot) {
        let level = match self.level {
            LevelSpec::Ascii { rows, depth } => {
                let refs: Vec<&str> = rows.iter().map(|s| s.as_str()).collect();
                Level::from_ascii(&refs, depth)
            }
            LevelSpec::Full(level) => *level,
        };
        let snapshot = Snapshot {
            level,
            character: self.character,
            monsters: self.monsters,
            items: self.items,
            altars: self.altars,
            merchants: self.merchants,
            living_unique_depths: self.living_unique_depths,
            turn: self.turn,
        };
        (self.config, snapshot)
    }
}

fn load_scenario(path: &PathBuf) -> (AgentConfig, Snapshot) {
    let content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Failed to read scenario {:?}: {}", path, e);
        std::process::exit(1);
    });
    let file: ScenarioFile = serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Failed to parse scenario {:?}: {}", path, e);
        std::process::exit(1);
    });
    file.into_parts()
}

fn main() {
    let cli = Cli::parse();
    match cli.command {
        Commands::Decide { scenario, seed } => {
            let (config, snapshot) = load_scenario(&scenario);
            let mut state = AgentState::new();
            let mut rng = Prng::seeded(seed.unwrap_or(config.seed));
            let action = decide_snapshot(&snapshot, &config, &mut state, &mut rng);
            println!("{}", serde_json::to_string_pretty(&action).unwrap());
        }
        Commands::Trace {
            scenario,
            turns,
            format,
        } => {
            let (config, mut snapshot) = load_scenario(&scenario);
            let mut state = AgentState::new();
            let mut rng = Prng::seeded(config.seed);
            let start = snapshot.turn;
            for turn in start..start + turns {
                snapshot.turn = turn;
                decide_snapshot(&snapshot, &config, &mut state, &mut rng);
            }
            match format.as_str() {
                "json" => {
                    let events: Vec<_> = state.decision_log.iter().collect();
                    println!("{}", serde_json::to_string_pretty(&events).unwrap());
                }
                _ => {
                    println!("| turn | tier | goal | policy | action |");
                    println!("|------|------|------|--------|--------|");
                    for e in state.decision_log.iter() {
                        println!(
                            "| {} | {:?} | {:?} | {} | {} |",
                            e.turn,
                            e.tier,
                            e.goal,
                            e.policy,
                            serde_json::to_string(&e.action).unwrap()
                        );
                    }
                }
            }
        }
        Commands::Batch {
            scenario,
            count,
            base_seed,
        } => {
            let (config, snapshot) = load_scenario(&scenario);
            let run_id = uuid::Uuid::new_v4();
            let mut histogram: HashMap<String, u64> = HashMap::new();
            for i in 0..count {
                let mut state = AgentState::new();
                let mut rng = Prng::seeded(base_seed + i);
                let action = decide_snapshot(&snapshot, &config, &mut state, &mut rng);
                let key = serde_json::to_string(&action).unwrap();
                *histogram.entry(key).or_insert(0) += 1;
            }
            let mut rows: Vec<_> = histogram.into_iter().collect();
            rows.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
            println!("run {} over {} seeds from {}", run_id, count, base_seed);
            for (action, n) in rows {
                println!("{:>6}  {}", n, action);
            }
        }
    }
}
