//! Turns the current goal into one concrete action: an arrival
//! interaction when standing on the target, otherwise one step downhill
//! on the right flow grid, with oscillation damping and corridor
//! commitment on top.

use crate::context::Context;
use crate::grid::{flow, FLOW_UNREACHABLE};
use crate::inventory::{self, ConsumableKind};
use crate::model::{Action, Direction, Goal, GoalKind, Point, TileKind};
use crate::rng::Prng;
use crate::state::AgentState;

/// Flow grids older than this are rebuilt even for an unmoved target.
const FLOW_MAX_AGE: u64 = 50;
/// Targets that cannot be pathed to are ignored for this long.
const UNREACHABLE_BLACKLIST: u64 = 200;
/// Twitching this long unlocks the random sidestep.
const TWITCH_SIDESTEP: u32 = 5;

pub fn execute(ctx: &Context, state: &mut AgentState, rng: &mut Prng) -> Action {
    let Some(goal) = state.current_goal.clone() else {
        return Action::Wait;
    };

    if let Some(action) = arrival_action(ctx, state, &goal) {
        return action;
    }
    match goal.kind {
        GoalKind::Wait | GoalKind::Recover => return Action::Wait,
        GoalKind::TownTrip => {
            if crate::danger::adjacent_count(ctx.character, ctx.monsters) == 0 {
                if let Some(portal) = inventory::find_town_portal_scroll(ctx.character) {
                    return Action::Use { item_id: portal.id };
                }
            }
            // No portal after all: fall through to walking nowhere.
            return Action::Wait;
        }
        GoalKind::Kite => {
            if let Some(action) = kite_action(ctx, state, &goal) {
                return action;
            }
        }
        _ => {}
    }

    let Some(step) = next_step(ctx, state, &goal) else {
        return no_progress(ctx, state, &goal, rng);
    };

    if goal.kind == GoalKind::Explore && state.sweep_mode && state.sweep_direction.is_none() {
        state.sweep_direction = Direction::between(ctx.character.position, step);
    }
    state.note_position(step);
    match Direction::between(ctx.character.position, step) {
        Some(direction) => Action::Move { direction },
        None => Action::Wait,
    }
}

/// Interactions that fire once the agent stands on (or beside, for
/// merchants) the goal target.
fn arrival_action(ctx: &Context, state: &mut AgentState, goal: &Goal) -> Option<Action> {
    let here = ctx.character.position;
    let target = goal.target;
    let arrived = target == Some(here);
    let beside = target.map_or(false, |t| here.is_adjacent(t) || t == here);

    match goal.kind {
        GoalKind::Descend | GoalKind::ExitTown => {
            if arrived || ctx.level.kind(here.x, here.y) == TileKind::StairsDown {
                return Some(Action::Descend);
            }
        }
        GoalKind::AscendToFarm => {
            if arrived || ctx.level.kind(here.x, here.y) == TileKind::StairsUp {
                return Some(Action::Ascend);
            }
        }
        GoalKind::UseAltar => {
            if arrived {
                return Some(Action::UseAltar);
            }
        }
        GoalKind::ReturnPortal => {
            if arrived || ctx.level.kind(here.x, here.y) == TileKind::Portal {
                return Some(Action::UseReturnPortal);
            }
        }
        GoalKind::Take => {
            if arrived {
                let id = goal
                    .target_item
                    .or_else(|| ctx.items.iter().find(|g| g.position == here).map(|g| g.item.id))?;
                return Some(Action::Pickup { item_id: id });
            }
        }
        GoalKind::VisitHealer => {
            if beside {
                state.healer_visited = true;
                return Some(Action::UseHealer);
            }
        }
        GoalKind::SellToMerchant => {
            if beside {
                return Some(sell_at(ctx, state, target?));
            }
        }
        GoalKind::BuyFromMerchant | GoalKind::VisitMerchant => {
            if beside {
                return Some(buy_at(ctx, state, target?));
            }
        }
        GoalKind::Kill | GoalKind::HuntUnique | GoalKind::Farm => {
            if let Some(id) = goal.target_monster {
                if let Some(m) = ctx.monster_by_id(id) {
                    if m.position.is_adjacent(here) {
                        return Some(Action::Attack { monster_id: id });
                    }
                }
            }
        }
        _ => {}
    }
    None
}

fn merchant_index_at(ctx: &Context, at: Point) -> Option<usize> {
    ctx.merchants.iter().position(|m| m.position == at)
}

fn sell_at(ctx: &Context, state: &mut AgentState, at: Point) -> Action {
    let Some(merchant_index) = merchant_index_at(ctx, at) else {
        return Action::Wait;
    };
    let sellable = ctx
        .character
        .inventory
        .iter()
        .position(|i| state.consumables_to_sell.contains(&i.id));
    match sellable {
        Some(inventory_index) => {
            let id = ctx.character.inventory[inventory_index].id;
            state.consumables_to_sell.remove(&id);
            Action::ShopSell {
                merchant_index,
                inventory_index,
            }
        }
        None => {
            // Nothing left to divest here; mark the stop done.
            state.shops_sold.insert(merchant_index);
            Action::Wait
        }
    }
}

fn buy_at(ctx: &Context, state: &mut AgentState, at: Point) -> Action {
    let Some(merchant_index) = merchant_index_at(ctx, at) else {
        return Action::Wait;
    };
    let needs = &state.town_needs;
    let wanted = |kind: ConsumableKind| match kind {
        ConsumableKind::Healing => needs.healing_potions > 0,
        ConsumableKind::TownPortal => needs.town_portals > 0,
        ConsumableKind::Escape => needs.escape_scrolls > 0,
        _ => false,
    };
    let stock = &ctx.merchants[merchant_index].stock;
    let pick = stock.iter().enumerate().find(|(_, item)| {
        wanted(inventory::consumable_type(item))
            && ctx.character.gold >= 50 * item.template.tier as u64
    });
    match pick {
        Some((item_index, item)) => {
            match inventory::consumable_type(item) {
                ConsumableKind::Healing => state.town_needs.healing_potions -= 1,
                ConsumableKind::TownPortal => state.town_needs.town_portals -= 1,
                ConsumableKind::Escape => state.town_needs.escape_scrolls -= 1,
                _ => {}
            }
            Action::ShopBuy {
                merchant_index,
                item_index,
            }
        }
        None => {
            state.shops_bought.insert(merchant_index);
            Action::Wait
        }
    }
}

/// Kite execution: shoot from the band, open distance inside it.
fn kite_action(ctx: &Context, state: &mut AgentState, goal: &Goal) -> Option<Action> {
    let target = goal.target_monster.and_then(|id| ctx.monster_by_id(id))?;
    let dist = ctx.character.position.chebyshev(target.position);
    let range = crate::tiers::bow_range(ctx).max(ctx.profile.engage_distance);

    if dist < crate::goals::OPTIMAL_RANGE {
        if let Some(action) = crate::tiers::kite_step(ctx) {
            if let Action::Move { direction } = action {
                state.note_position(ctx.character.position.step(direction));
            }
            return Some(action);
        }
    }
    if dist <= range {
        if crate::tiers::bow_range(ctx) > 0 {
            return Some(Action::RangedAttack {
                monster_id: target.id,
            });
        }
        if let Some(action) = crate::policies::spells::damage_spell(ctx) {
            return Some(action);
        }
    }
    None // out of range; walk the flow toward the target
}

/// One downhill step on the goal's flow grid, with the oscillation
/// penalty applied before committing.
fn next_step(ctx: &Context, state: &mut AgentState, goal: &Goal) -> Option<Point> {
    let here = ctx.character.position;

    // Corridor commitment: in a one-wide passage, keep walking it.
    if goal.kind == GoalKind::Explore {
        if let Some(step) = corridor_step(ctx, state) {
            return Some(step);
        }
    }

    let step = match goal.kind {
        GoalKind::Explore => {
            // Flow was refreshed during arbitration.
            flow::downhill_step(ctx.level, &state.cached_exploration_flow.grid, here)
        }
        _ => {
            let target = goal.target?;
            ensure_flow(ctx, state, target);
            if state.cached_flow.grid.get(here) == FLOW_UNREACHABLE {
                state.blacklist_target(target, ctx.turn + UNREACHABLE_BLACKLIST);
                if let Some(item) = goal.target_item {
                    state.blacklist_item(item, ctx.turn + UNREACHABLE_BLACKLIST);
                }
                log::debug!("target {:?} unreachable, blacklisted", target);
                state.clear_goal();
                return None;
            }
            flow::downhill_step(ctx.level, &state.cached_flow.grid, here)
        }
    }?;

    // Oscillation damping: a step into a recently repeated tile is
    // penalised by its repeat count and the neighbours reconsidered.
    if state.oscillation_count(step) > 1 {
        let grid = match goal.kind {
            GoalKind::Explore => &state.cached_exploration_flow.grid,
            _ => &state.cached_flow.grid,
        };
        let here_value = grid.get(here);
        let mut best: Option<(i32, Point)> = None;
        for n in here.neighbours() {
            if !ctx.level.is_passable_point(n) {
                continue;
            }
            let v = grid.get(n);
            if v >= here_value {
                continue;
            }
            let penalised = v as i32 + state.oscillation_count(n) as i32;
            if best.map_or(true, |(bv, _)| penalised < bv) {
                best = Some((penalised, n));
            }
        }
        if let Some((_, p)) = best {
            update_corridor(ctx, state, p);
            return Some(p);
        }
    }
    update_corridor(ctx, state, step);
    Some(step)
}

fn ensure_flow(ctx: &Context, state: &mut AgentState, target: Point) {
    let fresh = state.cached_flow.is_current_target(target)
        && ctx.turn.saturating_sub(state.cached_flow.computed_at) <= FLOW_MAX_AGE
        && state.cached_flow.grid.width == ctx.level.width
        && state.cached_flow.grid.height == ctx.level.height;
    if fresh {
        return;
    }
    let mut grid = std::mem::take(&mut state.cached_flow.grid);
    flow::flow_to_point(ctx.level, target, &mut grid);
    state.cached_flow.grid = grid;
    state.cached_flow.stamp(ctx.turn, Some(target), Some(ctx.character.position));
}

/// A cell is corridor-shaped when exactly two cardinals continue.
fn passable_cardinals(ctx: &Context, p: Point) -> usize {
    [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ]
    .iter()
    .filter(|d| ctx.level.is_passable_point(p.step(**d)))
    .count()
}

fn corridor_step(ctx: &Context, state: &mut AgentState) -> Option<Point> {
    if !state.corridor_mode {
        return None;
    }
    let here = ctx.character.position;
    if passable_cardinals(ctx, here) > 2 {
        // Branch: give control back to the flow.
        state.corridor_mode = false;
        state.corridor_dir = None;
        return None;
    }
    let dir = state.corridor_dir?;
    let next = here.step(dir);
    if ctx.level.is_passable_point(next) && ctx.monster_at(next).is_none() {
        state.note_position(next);
        return Some(next);
    }
    state.corridor_mode = false;
    state.corridor_dir = None;
    None
}

fn update_corridor(ctx: &Context, state: &mut AgentState, step: Point) {
    let here = ctx.character.position;
    if passable_cardinals(ctx, here) <= 2 && passable_cardinals(ctx, step) <= 2 {
        if let Some(dir) = Direction::between(here, step) {
            state.corridor_mode = true;
            state.corridor_dir = Some(dir);
            return;
        }
    }
    state.corridor_mode = false;
    state.corridor_dir = None;
}

/// Nothing improved: twitch, and past a threshold try a seeded random
/// sidestep to shake loose before giving up on the turn.
fn no_progress(ctx: &Context, state: &mut AgentState, goal: &Goal, rng: &mut Prng) -> Action {
    state.twitch_counter += 1;
    log::trace!(
        "no progress toward {:?} (twitch {})",
        goal.kind,
        state.twitch_counter
    );
    if state.twitch_counter > TWITCH_SIDESTEP {
        let open: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|d| {
                let p = ctx.character.position.step(*d);
                ctx.level.is_passable_point(p) && ctx.monster_at(p).is_none()
            })
            .collect();
        if let Some(direction) = rng.pick(&open).copied() {
            state.note_position(ctx.character.position.step(direction));
            return Action::Move { direction };
        }
    }
    Action::Wait
}
