//! Autonomous agent core for a turn-based roguelike. Given an immutable
//! game snapshot and per-agent configuration, `decide` returns exactly
//! one action per turn; all persistence lives in `AgentState`.
//!
//! The crate builds to both `rlib` (tests, CLI tooling) and `cdylib`
//! (the WebAssembly surface in `api::wasm` the game host embeds).

pub mod agent;
pub mod context;
pub mod danger;
pub mod dice;
pub mod events;
pub mod executor;
pub mod goals;
pub mod grid;
pub mod inventory;
pub mod model;
pub mod policies;
pub mod readiness;
pub mod rng;
pub mod state;
pub mod tiers;
pub mod validate;

pub mod api;

pub use agent::decide;
pub use context::{Context, Snapshot};
pub use danger::DangerTier;
pub use rng::Prng;
pub use state::AgentState;
