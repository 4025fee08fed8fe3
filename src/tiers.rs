//! The reactive half of the agent: given the danger tier, chain the
//! policies in the order that tier demands and take the first action
//! that fires. Movement-level goals only get a say when every chain
//! here declines.

use crate::context::Context;
use crate::danger::{self, DangerTier};
use crate::grid::Grid16;
use crate::inventory;
use crate::model::{Action, Class, Direction, EquipSlot, SpellEffect};
use crate::policies::{buffs, spells, survival, utility};
use crate::state::AgentState;

/// Mana ratio under which melee classes start drinking.
const MANA_POTION_RATIO: f64 = 0.15;
/// Phase door is skipped when known stairs are this close.
const STAIRS_EXCEPTION_DIST: i32 = 3;

/// Dispatch on the immediate tier. Returns the chosen action and the
/// label of the policy that produced it, for the decision log.
pub fn handle(
    ctx: &Context,
    state: &AgentState,
    tier: DangerTier,
    danger_grid: &Grid16,
) -> Option<(Action, &'static str)> {
    match tier {
        DangerTier::Critical => critical(ctx, state, danger_grid),
        DangerTier::Danger => {
            if ctx.is_ranged() {
                danger_ranged(ctx, state, danger_grid)
            } else {
                danger_melee(ctx, state, danger_grid)
            }
        }
        DangerTier::Caution => caution(ctx, state, danger_grid),
        DangerTier::Safe => safe(ctx, state, danger_grid),
    }
}

fn critical(
    ctx: &Context,
    state: &AgentState,
    danger_grid: &Grid16,
) -> Option<(Action, &'static str)> {
    if let Some(a) = spells::escape_spell(ctx, danger_grid) {
        return Some((a, "escapeSpell"));
    }
    if let Some(a) = survival::survival_consumable(ctx, state, danger_grid, DangerTier::Critical) {
        return Some((a, "survival"));
    }
    let immediate = danger::immediate_danger(ctx.character, ctx.monsters);
    if let Some(a) = spells::heal_spell(ctx, immediate) {
        return Some((a, "healSpell"));
    }
    if ctx.is_ranged() {
        let reposition = if danger::adjacent_count(ctx.character, ctx.monsters) > 0 {
            kite_step(ctx)
        } else {
            ranged_attack(ctx)
        };
        if let Some(a) = reposition {
            return Some((a, "rangedReposition"));
        }
    }
    if let Some(a) = druid_shapeshift(ctx) {
        return Some((a, "shapeshift"));
    }
    // Desperate melee beats standing still.
    if let Some(a) = melee_attack(ctx) {
        return Some((a, "melee"));
    }
    None
}

fn danger_ranged(
    ctx: &Context,
    state: &AgentState,
    danger_grid: &Grid16,
) -> Option<(Action, &'static str)> {
    if let Some(a) = spells::dimension_door_kite(ctx) {
        return Some((a, "dimensionDoor"));
    }
    if phase_door_allowed(ctx, state) && survival::phase_door_is_safe(ctx, danger_grid) {
        if danger::adjacent_count(ctx.character, ctx.monsters) > 0 {
            if let Some(scroll) = inventory::find_phase_door_scroll(ctx.character) {
                return Some((Action::Use { item_id: scroll.id }, "phaseDoor"));
            }
        }
    }
    if let Some(a) = spells::smart_debuff(ctx) {
        return Some((a, "smartDebuff"));
    }
    // Only open distance when inside the preferred band; at range we
    // hold the line and shoot.
    let too_close = ctx
        .closest_monster()
        .map_or(false, |m| {
            ctx.character.position.chebyshev(m.position) < crate::goals::OPTIMAL_RANGE
        });
    if too_close {
        if let Some(a) = kite_step(ctx) {
            return Some((a, "kiteStep"));
        }
    }
    if let Some(a) = spells::damage_spell(ctx) {
        return Some((a, "damageSpell"));
    }
    let immediate = danger::immediate_danger(ctx.character, ctx.monsters);
    if let Some(a) = spells::heal_spell(ctx, immediate) {
        return Some((a, "healSpell"));
    }
    if let Some(a) = survival::survival_consumable(ctx, state, danger_grid, DangerTier::Danger) {
        return Some((a, "survival"));
    }
    if let Some(a) = spells::summon_spell(ctx) {
        return Some((a, "summon"));
    }
    if let Some(a) = druid_shapeshift(ctx) {
        return Some((a, "shapeshift"));
    }
    if let Some(a) = ranged_attack(ctx).or_else(|| melee_attack(ctx)) {
        return Some((a, "attack"));
    }
    if let Some(a) = spells::escape_spell(ctx, danger_grid) {
        return Some((a, "escapeSpell"));
    }
    None
}

fn danger_melee(
    ctx: &Context,
    state: &AgentState,
    danger_grid: &Grid16,
) -> Option<(Action, &'static str)> {
    let immediate = danger::immediate_danger(ctx.character, ctx.monsters);

    // Damage before heal while the tank still has a buffer.
    if ctx.character.hp_ratio() > 0.5 {
        if let Some(a) = spells::damage_spell(ctx) {
            return Some((a, "damageSpell"));
        }
    }
    if let Some(a) = spells::heal_spell(ctx, immediate) {
        return Some((a, "healSpell"));
    }
    if let Some(a) = spells::damage_spell(ctx) {
        return Some((a, "damageSpell"));
    }
    if ctx.character.max_mana > 0 && ctx.character.mana_ratio() < MANA_POTION_RATIO {
        if let Some(potion) = inventory::find_mana_potion(ctx.character) {
            return Some((Action::Use { item_id: potion.id }, "manaPotion"));
        }
    }
    if let Some(a) = survival::survival_consumable(ctx, state, danger_grid, DangerTier::Danger) {
        return Some((a, "survival"));
    }
    if let Some(a) = spells::summon_spell(ctx) {
        return Some((a, "summon"));
    }
    if let Some(a) = druid_shapeshift(ctx) {
        return Some((a, "shapeshift"));
    }
    if ctx.character.class == Class::Rogue {
        if let Some(a) = spells::shadow_step(ctx) {
            return Some((a, "shadowStep"));
        }
    }
    if let Some(a) = melee_attack(ctx) {
        return Some((a, "melee"));
    }
    if let Some(a) = spells::escape_spell(ctx, danger_grid) {
        return Some((a, "escapeSpell"));
    }
    None
}

fn caution(
    ctx: &Context,
    _state: &AgentState,
    danger_grid: &Grid16,
) -> Option<(Action, &'static str)> {
    if let Some(a) = buffs::pre_combat(ctx) {
        return Some((a, "preCombatBuff"));
    }
    if ctx.is_ranged() {
        if let Some(a) = spells::smart_debuff(ctx)
            .or_else(|| spells::debuff_spell(ctx))
            .or_else(|| spells::damage_spell(ctx))
        {
            return Some((a, "casterOpener"));
        }
    }
    if let Some(a) = druid_shapeshift(ctx) {
        return Some((a, "shapeshift"));
    }
    if ctx.character.class == Class::Rogue {
        if let Some(a) = spells::shadow_step(ctx) {
            return Some((a, "shadowStep"));
        }
    }
    if let Some(a) = melee_attack(ctx) {
        return Some((a, "melee"));
    }
    if ctx.character.hp_ratio() < 0.7 {
        let immediate = danger::immediate_danger(ctx.character, ctx.monsters);
        if let Some(a) = spells::heal_spell(ctx, immediate) {
            return Some((a, "healSpell"));
        }
    }
    if let Some(a) = spells::damage_spell(ctx).or_else(|| spells::debuff_spell(ctx)) {
        return Some((a, "spell"));
    }
    let local = danger::local_danger(danger_grid, ctx.character.position);
    if let Some(a) = buffs::combat(ctx, local) {
        return Some((a, "combatBuff"));
    }
    None
}

fn safe(
    ctx: &Context,
    state: &AgentState,
    danger_grid: &Grid16,
) -> Option<(Action, &'static str)> {
    if let Some(a) = spells::summon_spell(ctx) {
        return Some((a, "summonUpkeep"));
    }
    if let Some(a) = light_orb(ctx) {
        return Some((a, "lightOrb"));
    }
    if let Some(a) = pickup_underfoot(ctx, state, danger_grid) {
        return Some((a, "pickup"));
    }
    if let Some(item) = inventory::find_equip_upgrade(ctx.character) {
        return Some((Action::Equip { item_id: item.id }, "equipUpgrade"));
    }
    if !ctx.any_monster_visible() {
        if ctx.character.hp_ratio() < 0.6 {
            if let Some(a) = spells::heal_spell(ctx, 0) {
                return Some((a, "recoverSpell"));
            }
        }
        if ctx.character.hp_ratio() < 0.4 {
            if let Some(potion) = inventory::find_healing_potion(ctx.character, 1) {
                return Some((Action::Use { item_id: potion.id }, "recoverPotion"));
            }
        }
    }
    if let Some(a) = druid_shapeshift(ctx) {
        return Some((a, "shapeshift"));
    }
    if let Some(a) = buffs::pre_combat(ctx) {
        return Some((a, "preCombatBuff"));
    }
    if ctx.any_monster_visible() {
        if let Some(a) = spells::damage_spell(ctx).or_else(|| spells::debuff_spell(ctx)) {
            return Some((a, "spell"));
        }
        if let Some(a) = ranged_attack(ctx) {
            return Some((a, "rangedAttack"));
        }
    }
    let local = danger::local_danger(danger_grid, ctx.character.position);
    if let Some(a) = utility::utility_consumable(ctx, local) {
        return Some((a, "utility"));
    }
    if let Some(a) = utility::stuck_escalation(ctx, state) {
        return Some((a, "stuckEscalation"));
    }
    None
}

// ---------------------------------------------------------------------
// shared attack and movement primitives

/// Weakest adjacent monster first so kills land.
pub fn melee_attack(ctx: &Context) -> Option<Action> {
    danger::adjacent_monsters(ctx.character, ctx.monsters)
        .min_by_key(|m| (m.hp, m.id))
        .map(|m| Action::Attack { monster_id: m.id })
}

pub fn bow_range(ctx: &Context) -> i32 {
    ctx.character
        .equipped(EquipSlot::Bow)
        .map_or(0, |b| b.template.range)
}

pub fn ranged_attack(ctx: &Context) -> Option<Action> {
    let range = bow_range(ctx);
    if range == 0 {
        return None;
    }
    let target = ctx.closest_monster()?;
    if ctx.character.position.chebyshev(target.position) > range {
        return None;
    }
    Some(Action::RangedAttack {
        monster_id: target.id,
    })
}

/// One step that strictly increases the distance to the nearest
/// monster; cardinal directions win ties.
pub fn kite_step(ctx: &Context) -> Option<Action> {
    let c = ctx.character;
    let min_dist = |p: crate::model::Point| {
        ctx.monsters
            .iter()
            .filter(|m| m.hp > 0)
            .map(|m| m.position.chebyshev(p))
            .min()
            .unwrap_or(i32::MAX)
    };
    let current = min_dist(c.position);
    let mut best: Option<(i32, Direction)> = None;
    for dir in Direction::ALL {
        let p = c.position.step(dir);
        if !ctx.level.is_passable_point(p) || ctx.monster_at(p).is_some() {
            continue;
        }
        let d = min_dist(p);
        if d <= current {
            continue;
        }
        if best.map_or(true, |(bd, _)| d > bd) {
            best = Some((d, dir));
        }
    }
    best.map(|(_, dir)| Action::Move { direction: dir })
}

/// Phase door is withheld right next to known stairs; descending beats
/// teleporting blind.
fn phase_door_allowed(ctx: &Context, state: &AgentState) -> bool {
    match state.known_stairs_down {
        Some(stairs) => ctx.character.position.chebyshev(stairs) > STAIRS_EXCEPTION_DIST,
        None => true,
    }
}

/// Druid form management. Form 0 is the caster baseline; wounded druids
/// drop back to it when they still have a heal to cast.
fn druid_shapeshift(ctx: &Context) -> Option<Action> {
    let c = ctx.character;
    if c.class != Class::Druid || ctx.forms.is_empty() {
        return None;
    }
    let best = ctx
        .forms
        .iter()
        .filter(|f| f.min_level <= c.level && f.id != 0)
        .max_by_key(|f| (f.min_level, f.id))?;

    let can_heal =
        inventory::find_castable(c, ctx.spells, ctx.turn, |s| s.is_heal()).is_some();
    if c.hp_ratio() < 0.4 && c.shapeshift_form.is_some() && can_heal {
        return Some(Action::Shapeshift { form_id: 0 });
    }
    if c.hp_ratio() >= 0.4 && c.shapeshift_form != Some(best.id) {
        return Some(Action::Shapeshift { form_id: best.id });
    }
    None
}

fn light_orb(ctx: &Context) -> Option<Action> {
    if !ctx.profile.prefers_ranged {
        return None;
    }
    let lit = ctx
        .character
        .equipment
        .values()
        .any(|i| i.template.light_radius > 0);
    if lit {
        return None;
    }
    let spell = inventory::find_castable(ctx.character, ctx.spells, ctx.turn, |s| {
        matches!(s.effect, SpellEffect::Light)
    })?;
    Some(Action::Cast {
        spell_id: spell.id,
        target: None,
    })
}

fn pickup_underfoot(
    ctx: &Context,
    state: &AgentState,
    danger_grid: &Grid16,
) -> Option<Action> {
    let here = ctx.character.position;
    let item = ctx.items.iter().find(|g| g.position == here)?;
    if state.is_item_blacklisted(item.item.id, ctx.turn) {
        return None;
    }
    let local = danger::local_danger(danger_grid, here);
    if local >= ctx.personality.avoidance_threshold() {
        return None;
    }
    Some(Action::Pickup {
        item_id: item.item.id,
    })
}
