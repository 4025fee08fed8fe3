//! Host-facing surface: the agent configuration DTO, the snapshot-based
//! convenience entry point, and the wasm bindings.

pub mod wasm;

use serde::{Deserialize, Serialize};

use crate::agent;
use crate::context::Snapshot;
use crate::model::{
    Action, BotCapabilities, BotToggles, ClassBehaviorProfile, PersonalityConfig,
    PersonalityPreset, ShapeForm, SpellTemplate,
};
use crate::rng::Prng;
use crate::state::AgentState;

/// Everything the host fixes once per run: personality, capability
/// vector, catalogs, and the seed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    pub preset: PersonalityPreset,
    #[serde(default)]
    pub custom: Option<PersonalityConfig>,
    #[serde(default)]
    pub capabilities: BotCapabilities,
    #[serde(default)]
    pub toggles: BotToggles,
    #[serde(default)]
    pub depth_gate_offset: i32,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub spells: Vec<SpellTemplate>,
    #[serde(default)]
    pub forms: Vec<ShapeForm>,
}

impl AgentConfig {
    pub fn personality(&self) -> PersonalityConfig {
        self.preset.resolve(self.custom)
    }
}

/// One tick against a whole snapshot. The explicit-parameter `decide`
/// in `agent` stays the canonical contract; this is the packaging the
/// wasm and CLI hosts actually call.
pub fn decide_snapshot(
    snapshot: &Snapshot,
    config: &AgentConfig,
    state: &mut AgentState,
    rng: &mut Prng,
) -> Action {
    let profile = ClassBehaviorProfile::for_class(snapshot.character.class);
    agent::decide(
        &snapshot.level,
        &snapshot.character,
        &snapshot.monsters,
        &snapshot.items,
        &snapshot.altars,
        &snapshot.merchants,
        &config.spells,
        &config.forms,
        &snapshot.living_unique_depths,
        config.personality(),
        profile,
        config.capabilities,
        config.toggles,
        config.depth_gate_offset,
        snapshot.turn,
        state,
        rng,
    )
}
