//! Survival consumables: status cures, emergency escapes, heals, and
//! Town Portal evaluation. First hit in the decision order wins; a
//! `None` falls through to the next policy in the tier chain.

use crate::context::Context;
use crate::danger::{self, DangerTier};
use crate::grid::Grid16;
use crate::inventory;
use crate::model::{Action, Point, StatusKind};
use crate::readiness;
use crate::state::AgentState;

/// Status cures in strict priority order; the middle entries only
/// matter while monsters are around, drain only matters once they are
/// not.
const CURE_PRIORITY: [(StatusKind, CureWhen); 7] = [
    (StatusKind::Paralyzed, CureWhen::Always),
    (StatusKind::Poisoned, CureWhen::Always),
    (StatusKind::Confused, CureWhen::Always),
    (StatusKind::Blind, CureWhen::Always),
    (StatusKind::Slowed, CureWhen::InCombat),
    (StatusKind::Terrified, CureWhen::InCombat),
    (StatusKind::Drained, CureWhen::OutOfCombat),
];

#[derive(Clone, Copy, PartialEq)]
enum CureWhen {
    Always,
    InCombat,
    OutOfCombat,
}

pub fn survival_consumable(
    ctx: &Context,
    state: &AgentState,
    danger_grid: &Grid16,
    tier: DangerTier,
) -> Option<Action> {
    let character = ctx.character;
    let in_combat = ctx.any_monster_visible();

    // 1. Cure what is crippling us.
    for (status, when) in CURE_PRIORITY {
        let applies = match when {
            CureWhen::Always => true,
            CureWhen::InCombat => in_combat,
            CureWhen::OutOfCombat => !in_combat,
        };
        if applies && character.has_status(status) {
            if let Some(cure) = inventory::find_cure_for(character, status) {
                log::debug!("curing {:?} with {}", status, cure.template.name);
                return Some(Action::Use { item_id: cure.id });
            }
        }
    }

    let immediate = danger::immediate_danger(character, ctx.monsters);
    let adjacent = danger::adjacent_count(character, ctx.monsters);
    let local = danger::local_danger(danger_grid, character.position);
    let hp_ratio = character.hp_ratio();

    // 3. A critical tier where healing cannot keep up: leave instead.
    // Phase door still has to pass its landing-zone test; blinking into
    // the same inferno helps nobody.
    if tier == DangerTier::Critical && should_escape_over_heal(ctx, immediate, adjacent) {
        if let Some(scroll) = inventory::find_full_teleport_scroll(character) {
            return Some(Action::Use { item_id: scroll.id });
        }
        if phase_door_is_safe(ctx, danger_grid) {
            if let Some(scroll) = inventory::find_phase_door_scroll(character) {
                return Some(Action::Use { item_id: scroll.id });
            }
        }
    }

    // 4. Heal, unless the class would rather cast its own heal.
    let heal_needed = (immediate > 0 && hp_ratio <= 0.6) || hp_ratio <= 0.35;
    if heal_needed && !prefers_heal_spell(ctx) {
        let min_tier = minimum_heal_tier(ctx, hp_ratio);
        if let Some(potion) = inventory::find_healing_potion(character, min_tier) {
            return Some(Action::Use { item_id: potion.id });
        }
    }

    // 5. Quiet moment with town access: is a portal trip indicated?
    if adjacent == 0 && ctx.capabilities.town >= 1 && !ctx.in_town() {
        if readiness::town_portal_indicated(ctx, state).is_some() {
            if let Some(portal) = inventory::find_town_portal_scroll(character) {
                return Some(Action::Use { item_id: portal.id });
            }
        }
    }

    // 6. General escape pressure.
    if should_escape(ctx, immediate, adjacent, local, hp_ratio) {
        if let Some(scroll) = inventory::find_full_teleport_scroll(character) {
            return Some(Action::Use { item_id: scroll.id });
        }
        if phase_door_is_safe(ctx, danger_grid) {
            if let Some(scroll) = inventory::find_phase_door_scroll(character) {
                return Some(Action::Use { item_id: scroll.id });
            }
        }
        if adjacent == 0 {
            if let Some(portal) = inventory::find_town_portal_scroll(character) {
                return Some(Action::Use { item_id: portal.id });
            }
            if !character.has_status(StatusKind::Hasted) {
                if let Some(potion) = inventory::find_speed_potion(character) {
                    return Some(Action::Use { item_id: potion.id });
                }
            }
        }
    }

    // 7. Hard-stuck: burn an escape to break the deadlock.
    if state.twitch_counter > 30 {
        if let Some(scroll) = inventory::find_any_escape_scroll(character) {
            log::debug!("twitch counter {} forcing an escape", state.twitch_counter);
            return Some(Action::Use { item_id: scroll.id });
        }
    }

    // 8. Out-of-combat top-up.
    if !in_combat && hp_ratio < 0.4 {
        if let Some(potion) = inventory::find_healing_potion(character, 1) {
            return Some(Action::Use { item_id: potion.id });
        }
    }

    None
}

/// Healing loses to escaping when surrounded, when one more hit roughly
/// halves us, or when there is nothing to heal with anyway.
fn should_escape_over_heal(ctx: &Context, immediate: i32, adjacent: usize) -> bool {
    adjacent >= 2
        || immediate * 2 >= ctx.character.hp
        || inventory::find_healing_potion(ctx.character, 1).is_none()
}

/// `heals_priority` classes sit on their potions while they still have
/// the mana to cast.
fn prefers_heal_spell(ctx: &Context) -> bool {
    ctx.profile.heals_priority
        && inventory::find_castable(ctx.character, ctx.spells, ctx.turn, |s| s.is_heal()).is_some()
}

fn minimum_heal_tier(ctx: &Context, hp_ratio: f64) -> u8 {
    if ctx.victory_boss().is_some() {
        4
    } else if hp_ratio < 0.25 {
        2
    } else {
        1
    }
}

fn should_escape(
    ctx: &Context,
    immediate: i32,
    adjacent: usize,
    local: i32,
    hp_ratio: f64,
) -> bool {
    if ctx.profile.never_retreats {
        return false;
    }
    adjacent >= 3
        || (hp_ratio < 0.25 && immediate > 0)
        || (hp_ratio < 0.5 && local > ctx.personality.avoidance_threshold())
}

/// Sample the 10-tile neighbourhood a phase door could land in. The
/// scroll is worth reading only when enough of those tiles are calm, or
/// when the average is clearly calmer than standing still.
pub fn phase_door_is_safe(ctx: &Context, danger_grid: &Grid16) -> bool {
    let here = ctx.character.position;
    let threshold = ctx.personality.avoidance_threshold();
    let mut sampled = 0u32;
    let mut safe = 0u32;
    let mut total_danger = 0i64;
    for dy in -10..=10 {
        for dx in -10..=10 {
            let p = Point::new(here.x + dx, here.y + dy);
            if p == here || !ctx.level.is_passable_point(p) {
                continue;
            }
            if ctx.monster_at(p).is_some() {
                continue;
            }
            let d = danger::local_danger(danger_grid, p);
            sampled += 1;
            total_danger += d as i64;
            if d * 2 < threshold {
                safe += 1;
            }
        }
    }
    if sampled == 0 {
        return false;
    }
    let here_danger = danger::local_danger(danger_grid, here) as i64;
    let avg = total_danger / sampled as i64;
    safe * 4 >= sampled || avg * 2 < here_danger
}
