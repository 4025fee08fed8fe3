//! The goal arbiter: a fixed priority ladder from FLEE down to WAIT.
//! The first rung whose conditions hold becomes the goal; an existing
//! goal of the same kind is retained so targets do not thrash.

use crate::context::Context;
use crate::danger::{self, DangerTier};
use crate::grid::safety::escape_target;
use crate::grid::{flow, Grid16};
use crate::inventory;
use crate::model::{
    Goal, GoalKind, GroundItem, Monster, Point, ShopKind, StatusKind, TileKind,
};
use crate::policies::spells::melee_average;
use crate::readiness;
use crate::state::AgentState;

/// A kite against one target is given up after this many turns.
pub const MAX_KITE_DURATION: u64 = 100;
/// Preferred shooting distance for kiting classes.
pub const OPTIMAL_RANGE: i32 = 3;
/// Seen-coverage at which a hunted level is declared empty.
const HUNT_COVERAGE: f64 = 0.8;
/// Turns a blacklisted target stays poisoned.
const BLACKLIST_TURNS: u64 = 200;
/// Suppress fresh flee goals for this long after one fires.
const FLEE_COOLDOWN: u64 = 15;

pub fn arbitrate(
    ctx: &Context,
    state: &mut AgentState,
    danger_grid: &Grid16,
    tier: DangerTier,
) -> Goal {
    let candidate = pick(ctx, state, danger_grid, tier);

    // Retention: same kind with a still-valid target keeps its record
    // (start turn included) instead of being re-issued.
    if let Some(current) = &state.current_goal {
        if current.kind == candidate.kind
            && current.target.is_some()
            && current.target == candidate.target
            && current.target != Some(ctx.character.position)
        {
            return current.clone();
        }
    }
    candidate
}

fn pick(
    ctx: &Context,
    state: &mut AgentState,
    danger_grid: &Grid16,
    tier: DangerTier,
) -> Goal {
    let turn = ctx.turn;

    if let Some(goal) = evaluate_flee(ctx, state, danger_grid) {
        return goal;
    }
    if let Some(goal) = evaluate_unique_hunt(ctx, state) {
        return goal;
    }
    if let Some(goal) = evaluate_kite(ctx, state) {
        return goal;
    }
    if let Some(goal) = evaluate_kill(ctx, state) {
        return goal;
    }
    if let Some(goal) = evaluate_take(ctx, state, danger_grid) {
        return goal;
    }
    if let Some(goal) = evaluate_dungeon_features(ctx, state) {
        return goal;
    }
    if ctx.in_town() {
        if let Some(goal) = evaluate_town_flow(ctx, state) {
            return goal;
        }
    }
    if let Some(goal) = evaluate_recover(ctx, tier) {
        return goal;
    }
    if let Some(goal) = evaluate_town_trip(ctx, state) {
        return goal;
    }
    if let Some(goal) = evaluate_farm(ctx, state) {
        return goal;
    }
    if let Some(goal) = evaluate_descend(ctx, state) {
        return goal;
    }
    if let Some(goal) = evaluate_explore(ctx, state) {
        return goal;
    }
    Goal::new(GoalKind::Wait, "nothing to do", turn)
}

// ---------------------------------------------------------------------
// 1. FLEE

fn evaluate_flee(
    ctx: &Context,
    state: &mut AgentState,
    danger_grid: &Grid16,
) -> Option<Goal> {
    if ctx.capabilities.retreat == 0 || ctx.profile.never_retreats {
        return None;
    }
    if ctx.turn < state.flee_cooldown_until {
        return None;
    }
    let c = ctx.character;
    let adjacent = danger::adjacent_count(c, ctx.monsters);
    let local = danger::local_danger(danger_grid, c.position);
    let p = &ctx.personality;

    let cause = if c.has_status(StatusKind::Paralyzed) && adjacent > 0 {
        Some("paralyzed in melee")
    } else if c.has_status(StatusKind::Poisoned)
        && inventory::find_cure_for(c, StatusKind::Poisoned).is_none()
        && state.hp_rate < 0
    {
        Some("poison draining with no cure")
    } else if c.has_status(StatusKind::Blind) && adjacent >= 2 {
        Some("blind and surrounded")
    } else if c.has_status(StatusKind::Slowed) && adjacent >= 2 {
        Some("slowed and outnumbered")
    } else if c.hp_ratio() < p.caution as f64 / 100.0 && ctx.any_monster_visible() {
        Some("hp below caution line")
    } else if adjacent >= 2 && p.aggression <= 70 {
        Some("outnumbered")
    } else if adjacent > 0 && state.hp_rate < 0 && c.hp_ratio() < 0.5 && p.aggression <= 70 {
        Some("losing this fight")
    } else if local > p.avoidance_threshold() {
        Some("high danger area")
    } else {
        None
    }?;

    if cause == "high danger area" {
        match state.current_goal.as_ref().map(|g| g.kind) {
            // Dangerous loot is not worth it: poison the item and move on.
            Some(GoalKind::Take) => {
                let target_item = state.current_goal.as_ref().and_then(|goal| goal.target_item);
                let target = state.current_goal.as_ref().and_then(|goal| goal.target);
                if let Some(item) = target_item {
                    state.blacklist_item(item, ctx.turn + BLACKLIST_TURNS);
                }
                if let Some(target) = target {
                    state.blacklist_target(target, ctx.turn + BLACKLIST_TURNS);
                }
            }
            // Descending through a hot zone is the bullrush; only the
            // deeply cautious pull back instead.
            Some(GoalKind::Descend) => {
                if p.caution >= 80 {
                    state.danger_blocked_descent = true;
                } else {
                    return None;
                }
            }
            _ => {}
        }
    }

    state.flee_cooldown_until = ctx.turn + FLEE_COOLDOWN;
    let destination = flee_destination(ctx, state, danger_grid);
    log::debug!("fleeing ({}) toward {:?}", cause, destination);
    let mut goal = Goal::new(GoalKind::Flee, cause, ctx.turn);
    goal.target = destination;
    Some(goal)
}

/// Destination ladder: safety flow while monsters press, then an
/// adjacent escape, then remembered stairs, then the calmest adjacent
/// tile; a flee with no target is a stand-your-ground.
fn flee_destination(
    ctx: &Context,
    state: &mut AgentState,
    danger_grid: &Grid16,
) -> Option<Point> {
    let c = ctx.character;
    let monster_positions: Vec<Point> = ctx
        .monsters
        .iter()
        .filter(|m| m.hp > 0)
        .map(|m| m.position)
        .collect();

    if !monster_positions.is_empty() {
        let mut grid = std::mem::take(&mut state.cached_safety_flow.grid);
        state
            .safety_buffers
            .compute(ctx.level, &monster_positions, &mut grid);
        let target = escape_target(ctx.level, &grid, c.position, &monster_positions);
        state.cached_safety_flow.grid = grid;
        state
            .cached_safety_flow
            .stamp(ctx.turn, target, Some(c.position));
        if target.is_some() {
            return target;
        }
    }

    // Walk toward remembered stairs if any.
    if let Some(stairs) = state.known_stairs_down.or(state.known_stairs_up) {
        if stairs != c.position {
            return Some(stairs);
        }
    }

    // Calmest adjacent tile as a last resort.
    c.position
        .neighbours()
        .iter()
        .filter(|n| ctx.level.is_passable_point(**n) && ctx.monster_at(**n).is_none())
        .min_by_key(|n| danger::local_danger(danger_grid, **n))
        .copied()
}

// ---------------------------------------------------------------------
// 2. HUNT_UNIQUE

fn evaluate_unique_hunt(ctx: &Context, state: &mut AgentState) -> Option<Goal> {
    if ctx.capabilities.targeting < 2 || ctx.in_town() {
        return None;
    }
    let depth = ctx.level.depth;
    let in_range = ctx
        .living_unique_depths
        .iter()
        .filter(|&&d| d >= depth && d <= depth + 5)
        .count();
    if in_range < 2 {
        return None;
    }

    if let Some(unique) = ctx
        .monsters
        .iter()
        .filter(|m| m.hp > 0 && m.is_unique())
        .min_by_key(|m| (m.position.chebyshev(ctx.character.position), m.id))
    {
        return Some(
            Goal::new(GoalKind::HuntUnique, "unique in sight", ctx.turn)
                .at(unique.position)
                .monster(unique.id),
        );
    }

    // Level swept and the unique never showed: flip the level to
    // regenerate its population.
    let coverage = state.seen_this_visit.count() as f64
        / ctx.level.cell_count().max(1) as f64;
    if coverage >= HUNT_COVERAGE {
        if let Some(up) = state.known_stairs_up {
            state.hunt_flip_count += 1;
            state.last_hunt_flip_turn = ctx.turn;
            return Some(
                Goal::new(GoalKind::AscendToFarm, "flip level to respawn unique", ctx.turn)
                    .at(up),
            );
        }
    }
    None
}

// ---------------------------------------------------------------------
// 3. KITE

fn evaluate_kite(ctx: &Context, state: &mut AgentState) -> Option<Goal> {
    if ctx.capabilities.kiting == 0 || !ctx.is_ranged() {
        return None;
    }
    let target = ctx.closest_monster()?;
    let range = crate::tiers::bow_range(ctx).max(ctx.profile.engage_distance);
    let dist = ctx.character.position.chebyshev(target.position);
    if dist > range {
        return None; // KILL decides whether to approach
    }

    // Rotate off a target that has soaked a whole kite window.
    if state.kite_target_id == Some(target.id)
        && ctx.turn.saturating_sub(state.kite_target_start_turn) > MAX_KITE_DURATION
    {
        if let Some(up) = state.known_stairs_up {
            log::debug!("kite against {} expired, flipping level", target.template.name);
            return Some(
                Goal::new(GoalKind::AscendToFarm, "kite timer expired", ctx.turn).at(up),
            );
        }
    }
    if state.kite_target_id != Some(target.id) {
        state.kite_target_id = Some(target.id);
        state.kite_target_start_turn = ctx.turn;
    }

    let reason = if dist < OPTIMAL_RANGE {
        "open distance"
    } else {
        "hold and shoot"
    };
    Some(
        Goal::new(GoalKind::Kite, reason, ctx.turn)
            .at(target.position)
            .monster(target.id),
    )
}

// ---------------------------------------------------------------------
// 4. KILL

fn winnable(ctx: &Context, monster: &Monster) -> bool {
    let c = ctx.character;
    let our_hit = melee_average(ctx).max(1.0);
    let turns_to_kill = (monster.hp as f64 / our_hit).ceil();
    let incoming = danger::threat_score(monster, c) as f64 * turns_to_kill;
    incoming < c.hp as f64
}

fn should_engage(ctx: &Context, monster: &Monster) -> bool {
    let c = ctx.character;
    let p = &ctx.personality;
    if c.hp_ratio() < 0.25 {
        return false;
    }
    if winnable(ctx, monster) {
        return true;
    }
    // High aggression presses even losing fights.
    p.aggression > 70
}

fn evaluate_kill(ctx: &Context, state: &mut AgentState) -> Option<Goal> {
    let c = ctx.character;

    // Anything already in our face gets fought.
    if let Some(m) = danger::adjacent_monsters(c, ctx.monsters).min_by_key(|m| (m.hp, m.id)) {
        return Some(
            Goal::new(GoalKind::Kill, "adjacent enemy", ctx.turn)
                .at(m.position)
                .monster(m.id),
        );
    }

    let target = ctx.closest_monster()?;
    let dist = c.position.chebyshev(target.position);
    if dist <= 4 {
        if c.hp_ratio() >= 0.25 {
            return Some(
                Goal::new(GoalKind::Kill, "close enemy", ctx.turn)
                    .at(target.position)
                    .monster(target.id),
            );
        }
        return None;
    }

    if ctx.capabilities.targeting >= 1 && should_engage(ctx, target) {
        if !state.is_target_blacklisted(target.position, ctx.turn) {
            return Some(
                Goal::new(GoalKind::Kill, "engage", ctx.turn)
                    .at(target.position)
                    .monster(target.id),
            );
        }
    }
    None
}

// ---------------------------------------------------------------------
// 5. TAKE

fn item_value(item: &GroundItem) -> i32 {
    inventory::equipment_score(&item.item) + item.item.template.tier as i32 * 5
}

fn evaluate_take(
    ctx: &Context,
    state: &mut AgentState,
    danger_grid: &Grid16,
) -> Option<Goal> {
    let c = ctx.character;
    let local = danger::local_danger(danger_grid, c.position);
    if local > ctx.personality.avoidance_threshold() {
        return None;
    }
    let radius = ctx.personality.item_detour_radius();
    let threshold = ctx.personality.pickup_threshold();

    let best = ctx
        .items
        .iter()
        .filter(|g| {
            !state.is_item_blacklisted(g.item.id, ctx.turn)
                && !state.is_target_blacklisted(g.position, ctx.turn)
                && c.position.chebyshev(g.position) <= radius
                && item_value(g) >= threshold
        })
        .min_by_key(|g| {
            (
                c.position.chebyshev(g.position),
                -item_value(g),
                g.item.id,
            )
        })?;

    Some(
        Goal::new(GoalKind::Take, "loot nearby", ctx.turn)
            .at(best.position)
            .item(best.item.id),
    )
}

// ---------------------------------------------------------------------
// 6. dungeon features

fn evaluate_dungeon_features(ctx: &Context, state: &AgentState) -> Option<Goal> {
    if ctx.in_town() {
        return None;
    }
    let c = ctx.character;
    if let Some(altar) = ctx
        .altars
        .iter()
        .filter(|a| !a.used && !state.is_target_blacklisted(a.position, ctx.turn))
        .min_by_key(|a| c.position.chebyshev(a.position))
    {
        if c.position.chebyshev(altar.position) <= 10 {
            return Some(Goal::new(GoalKind::UseAltar, "altar nearby", ctx.turn).at(altar.position));
        }
    }
    if ctx.capabilities.town >= 3 {
        if let Some((_, merchant)) = ctx
            .merchants
            .iter()
            .enumerate()
            .filter(|(i, m)| {
                m.shop != ShopKind::Temple && !state.shops_bought.contains(i)
                    && !state.is_target_blacklisted(m.position, ctx.turn)
            })
            .min_by_key(|(_, m)| c.position.chebyshev(m.position))
        {
            if c.position.chebyshev(merchant.position) <= 10 {
                return Some(
                    Goal::new(GoalKind::VisitMerchant, "wandering merchant", ctx.turn)
                        .at(merchant.position),
                );
            }
        }
    }
    None
}

// ---------------------------------------------------------------------
// 7. town flow

fn evaluate_town_flow(ctx: &Context, state: &mut AgentState) -> Option<Goal> {
    if ctx.capabilities.town == 0 {
        return None;
    }
    let c = ctx.character;

    if ctx.capabilities.town >= 3 {
        let has_divestments = !state.consumables_to_sell.is_empty()
            || inventory::find_equip_upgrade(c).is_none() && readiness::equipment_load(c) > 10;
        if has_divestments {
            if let Some((_, shop)) = ctx
                .merchants
                .iter()
                .enumerate()
                .find(|(i, m)| m.shop != ShopKind::Temple && !state.shops_sold.contains(i))
            {
                return Some(
                    Goal::new(GoalKind::SellToMerchant, "divest in town", ctx.turn)
                        .at(shop.position),
                );
            }
        }
    }

    if ctx.capabilities.town >= 2 && !state.healer_visited && c.hp < c.max_hp {
        if let Some(temple) = ctx.merchants.iter().find(|m| m.shop == ShopKind::Temple) {
            return Some(
                Goal::new(GoalKind::VisitHealer, "heal up in town", ctx.turn).at(temple.position),
            );
        }
    }

    if ctx.capabilities.town >= 3 && state.town_needs.any() {
        if let Some((_, shop)) = ctx
            .merchants
            .iter()
            .enumerate()
            .find(|(i, m)| m.shop != ShopKind::Temple && !state.shops_bought.contains(i))
        {
            return Some(
                Goal::new(GoalKind::BuyFromMerchant, "restock in town", ctx.turn)
                    .at(shop.position),
            );
        }
    }

    // Leave: back through the portal if one is open, else the stairs.
    if let Some(portal) = find_tile(ctx, TileKind::Portal) {
        return Some(Goal::new(GoalKind::ReturnPortal, "return to dungeon", ctx.turn).at(portal));
    }
    if let Some(down) = ctx.level.stairs_down {
        return Some(Goal::new(GoalKind::ExitTown, "leave town", ctx.turn).at(down));
    }
    None
}

fn find_tile(ctx: &Context, kind: TileKind) -> Option<Point> {
    for y in 0..ctx.level.height {
        for x in 0..ctx.level.width {
            if ctx.level.kind(x, y) == kind {
                return Some(Point::new(x, y));
            }
        }
    }
    None
}

// ---------------------------------------------------------------------
// 8. RECOVER

fn evaluate_recover(ctx: &Context, tier: DangerTier) -> Option<Goal> {
    let c = ctx.character;
    if tier != DangerTier::Safe || ctx.any_monster_visible() || c.hp_ratio() >= 0.5 {
        return None;
    }
    let regen_per_turn = (1 + c.level / 10) as i32;
    let est_turns = c.wound() / regen_per_turn.max(1);
    let portal_better = inventory::find_town_portal_scroll(c).is_some()
        && ctx.capabilities.town >= 2
        && est_turns > 30;
    if portal_better {
        return None; // the town trip rung handles it
    }
    Some(Goal::new(GoalKind::Recover, "rest to heal", ctx.turn))
}

// ---------------------------------------------------------------------
// 9. TOWN_TRIP

fn evaluate_town_trip(ctx: &Context, state: &mut AgentState) -> Option<Goal> {
    if ctx.capabilities.town == 0 || ctx.in_town() {
        return None;
    }
    let reason = readiness::town_portal_indicated(ctx, state)?;
    state.town_needs = readiness::compute_town_needs(ctx.character, ctx.personality.caution);
    for id in readiness::surplus_consumables(ctx.character, ctx.personality.caution) {
        state.consumables_to_sell.insert(id);
    }
    state.last_town_portal_reason = Some(reason.clone());
    log::info!("town trip indicated: {}", reason);
    let mut goal = Goal::new(GoalKind::TownTrip, &reason, ctx.turn);
    goal.target = None; // the portal scroll teleports; no walking needed
    Some(goal)
}

// ---------------------------------------------------------------------
// 10. FARM / ASCEND_TO_FARM

fn evaluate_farm(ctx: &Context, state: &mut AgentState) -> Option<Goal> {
    if !ctx.capabilities.farming || ctx.in_town() {
        return None;
    }
    let c = ctx.character;
    let gate = readiness::depth_readiness(
        c,
        ctx.level.depth + 1,
        ctx.personality.caution,
        ctx.capabilities.preparedness,
        ctx.capabilities.upgrade_tier,
        ctx.depth_gate_offset,
    );
    let level_blocked = gate.as_deref().map_or(false, |r| r.contains("level"));
    if !level_blocked && !state.farming_mode {
        return None;
    }
    if !state.farming_mode {
        state.farming_mode = true;
        state.farm_blocked_depth = Some(ctx.level.depth + 1);
        state.farm_start_turn = ctx.turn;
        state.farm_gold_target = c.gold + 500;
        log::info!("farming until fit for depth {}", ctx.level.depth + 1);
    } else if !level_blocked || c.gold >= state.farm_gold_target {
        // Fit again (or flush with gold for the shops); drop out.
        state.farming_mode = false;
        state.farm_blocked_depth = None;
        return None;
    }

    if let Some(m) = ctx.closest_monster() {
        return Some(
            Goal::new(GoalKind::Farm, "grind experience", ctx.turn)
                .at(m.position)
                .monster(m.id),
        );
    }
    // Nothing left here: flip the level to respawn it.
    let coverage =
        state.seen_this_visit.count() as f64 / ctx.level.cell_count().max(1) as f64;
    if coverage >= HUNT_COVERAGE {
        if let Some(up) = state.known_stairs_up {
            return Some(
                Goal::new(GoalKind::AscendToFarm, "respawn farm level", ctx.turn).at(up),
            );
        }
    }
    None
}

// ---------------------------------------------------------------------
// 11. DESCEND

fn evaluate_descend(ctx: &Context, state: &mut AgentState) -> Option<Goal> {
    if ctx.in_town() {
        return None;
    }
    let stairs = state.known_stairs_down?;
    if state.danger_blocked_descent {
        return None;
    }
    let gate = readiness::depth_readiness(
        ctx.character,
        ctx.level.depth + 1,
        ctx.personality.caution,
        ctx.capabilities.preparedness,
        ctx.capabilities.upgrade_tier,
        ctx.depth_gate_offset,
    );
    if let Some(reason) = gate {
        log::debug!("descent gated: {}", reason);
        return None;
    }

    let patience_exhausted =
        state.turns_on_level > ctx.personality.patience.max(1) as u64 * 10;

    // Tethered exploration: the neighbourhood of the arrival point has
    // to be seen before the stairs may be used again. Surfing shrinks
    // the tether to nothing.
    state.tethered_radius = match ctx.capabilities.surf {
        0 => 4,
        1 => 2,
        _ => 0,
    };
    if state.tethered_radius > 0 && !patience_exhausted {
        if let Some(origin) = state.tethered_origin {
            let r = state.tethered_radius as i32;
            for dy in -r..=r {
                for dx in -r..=r {
                    let p = Point::new(origin.x + dx, origin.y + dy);
                    if ctx.level.is_passable_point(p) && !state.seen_this_visit.is_seen(p) {
                        return None;
                    }
                }
            }
        }
    }

    // Sweep classes clear the whole level before diving on shallow
    // depths; surf classes dive as soon as the stairs are known.
    if ctx.capabilities.sweep >= 1
        && ctx.profile.prefers_ranged
        && ctx.level.depth < 10
        && !state.sweep_exhausted
        && !patience_exhausted
    {
        if !state.sweep_mode {
            state.sweep_mode = true;
            state.sweep_start_turn = ctx.turn;
        }
        return None;
    }

    let wants_coverage = if ctx.capabilities.surf >= 1 {
        0.0
    } else {
        ctx.personality.exploration as f64 / 100.0
    };
    if ctx.level.exploration_ratio() < wants_coverage && !patience_exhausted {
        return None;
    }
    Some(Goal::new(GoalKind::Descend, "stairs known and fit", ctx.turn).at(stairs))
}

// ---------------------------------------------------------------------
// 12. EXPLORE

fn evaluate_explore(ctx: &Context, state: &mut AgentState) -> Option<Goal> {
    // Rebuild the frontier flow when coverage moved.
    let seen = state.seen_this_visit.count();
    let explored = ctx.level.explored_count;
    if !state.cached_exploration_flow.is_current(seen, explored) {
        let mut grid = std::mem::take(&mut state.cached_exploration_flow.grid);
        let frontiers = flow::frontier_flow(ctx.level, &state.seen_this_visit, &mut grid);
        state.cached_exploration_flow.grid = grid;
        state.cached_exploration_flow.computed_at = ctx.turn;
        state.cached_exploration_flow.seen_count = seen;
        state.cached_exploration_flow.explored_count = explored;
        state.cached_exploration_flow.frontiers = frontiers as u32;
    }
    if state.cached_exploration_flow.frontiers == 0 {
        if state.sweep_mode && !state.sweep_exhausted {
            state.sweep_flip_count += 1;
            state.last_sweep_flip_turn = ctx.turn;
        }
        state.sweep_exhausted = true;
        return None;
    }
    Some(Goal::new(GoalKind::Explore, "frontier remains", ctx.turn))
}
