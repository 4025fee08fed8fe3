//! The tick entry point: one call, one action. Fixed phase order —
//! upkeep, danger classification, reactive tier dispatch, then goal
//! arbitration and execution — so a given snapshot, state, and seed
//! always replay to the same decision.

use crate::context::Context;
use crate::danger::{self, DangerTier};
use crate::events::DecisionEvent;
use crate::executor;
use crate::goals;
use crate::model::{
    Action, AltarState, BotCapabilities, BotToggles, Character, ClassBehaviorProfile, GroundItem,
    Level, MerchantState, Monster, PersonalityConfig, ShapeForm, SpellTemplate,
};
use crate::rng::Prng;
use crate::state::AgentState;
use crate::tiers;
use crate::validate;

/// Decide the agent's action for this turn. Snapshot parameters are
/// borrowed read-only; only `state` and `rng` carry anything forward.
#[allow(clippy::too_many_arguments)]
pub fn decide(
    level: &Level,
    character: &Character,
    monsters: &[Monster],
    items: &[GroundItem],
    altars: &[AltarState],
    merchants: &[MerchantState],
    spells: &[SpellTemplate],
    forms: &[ShapeForm],
    living_unique_depths: &[u32],
    personality: PersonalityConfig,
    profile: ClassBehaviorProfile,
    capabilities: BotCapabilities,
    toggles: BotToggles,
    depth_gate_offset: i32,
    turn: u64,
    state: &mut AgentState,
    rng: &mut Prng,
) -> Action {
    if let Err(reason) = validate::check_snapshot(level, character, monsters) {
        debug_assert!(false, "snapshot invariant violated: {}", reason);
        log::warn!("snapshot invariant violated: {}; waiting", reason);
        return Action::Wait;
    }

    let ctx = Context::new(
        level,
        character,
        monsters,
        items,
        altars,
        merchants,
        spells,
        forms,
        living_unique_depths,
        personality,
        profile,
        capabilities,
        toggles,
        depth_gate_offset,
        turn,
    );

    state.begin_turn(level, character.position, character.hp, turn);

    // The danger grid lives in the state so its buffer survives ticks;
    // it is taken out for the duration of the decision.
    let mut danger_grid = std::mem::take(&mut state.cached_danger.grid);
    danger::build_danger_grid(level, monsters, character, &mut danger_grid);
    let tier = danger::classify(character, monsters, &danger_grid, &ctx.personality);

    // A cautious retreat block on the stairs lifts once things calm down.
    if tier == DangerTier::Safe && character.hp_ratio() > 0.7 {
        state.danger_blocked_descent = false;
    }

    let (action, policy, goal_kind) =
        match tiers::handle(&ctx, state, tier, &danger_grid) {
            Some((action, policy)) => (action, policy, state.current_goal.as_ref().map(|g| g.kind)),
            None => {
                let goal = goals::arbitrate(&ctx, state, &danger_grid, tier);
                let kind = goal.kind;
                state.set_goal(goal);
                let action = executor::execute(&ctx, state, rng);
                (action, "executor", Some(kind))
            }
        };

    // Combat cancels corridor commitment.
    if tier != DangerTier::Safe || action.is_combat() {
        state.corridor_mode = false;
        state.corridor_dir = None;
    }
    if action != Action::Wait {
        let moved = matches!(action, Action::Move { .. });
        state.record_progress(turn, moved);
    }

    state.decision_log.push(DecisionEvent {
        turn,
        tier,
        goal: goal_kind,
        policy: policy.to_string(),
        action: action.clone(),
    });
    state.cached_danger.grid = danger_grid;
    state.cached_danger.stamp(turn, None, Some(character.position));

    action
}
