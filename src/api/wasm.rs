//! WebAssembly bindings. The host constructs one `AgentRunner` per bot
//! with its config, then feeds it a snapshot every tick and applies the
//! returned action. State export/import lets the host checkpoint runs.

use wasm_bindgen::prelude::*;

use crate::api::{decide_snapshot, AgentConfig};
use crate::context::Snapshot;
use crate::rng::Prng;
use crate::state::AgentState;

#[wasm_bindgen]
pub struct AgentRunner {
    config: AgentConfig,
    state: AgentState,
    rng: Prng,
}

#[wasm_bindgen]
impl AgentRunner {
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<AgentRunner, JsValue> {
        #[cfg(target_arch = "wasm32")]
        let _ = console_log::init_with_level(log::Level::Info);
        #[cfg(target_arch = "wasm32")]
        web_sys::console::debug_1(&config);

        let config: AgentConfig = serde_wasm_bindgen::from_value(config)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse config: {}", e)))?;
        let rng = Prng::seeded(config.seed);
        Ok(AgentRunner {
            config,
            state: AgentState::new(),
            rng,
        })
    }

    /// One tick: snapshot in, action out.
    pub fn decide(&mut self, snapshot: JsValue) -> Result<JsValue, JsValue> {
        let snapshot: Snapshot = serde_wasm_bindgen::from_value(snapshot)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse snapshot: {}", e)))?;
        let action = decide_snapshot(&snapshot, &self.config, &mut self.state, &mut self.rng);
        serde_wasm_bindgen::to_value(&action)
            .map_err(|e| JsValue::from_str(&format!("Failed to serialize action: {}", e)))
    }

    /// Recent decision trace, newest last.
    pub fn decision_log(&self) -> Result<JsValue, JsValue> {
        let events: Vec<_> = self.state.decision_log.iter().collect();
        serde_wasm_bindgen::to_value(&events)
            .map_err(|e| JsValue::from_str(&format!("Failed to serialize log: {}", e)))
    }

    /// Serialize the persistent state for checkpointing.
    pub fn export_state(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.state)
            .map_err(|e| JsValue::from_str(&format!("Failed to export state: {}", e)))
    }

    /// Restore a previously exported state.
    pub fn import_state(&mut self, state: &str) -> Result<(), JsValue> {
        self.state = serde_json::from_str(state)
            .map_err(|e| JsValue::from_str(&format!("Failed to import state: {}", e)))?;
        Ok(())
    }

    /// Observability hooks for the host's stall watchdog.
    pub fn turns_on_level(&self) -> u64 {
        self.state.turns_on_level
    }

    pub fn twitch_counter(&self) -> u32 {
        self.state.twitch_counter
    }
}
