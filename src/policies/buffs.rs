//! Buff consumables, split the way fights actually go: a preparation
//! pass while the enemy is still at range, and a maintenance pass once
//! blows are being traded. Both gate on `tactics >= 2`.

use crate::context::Context;
use crate::danger;
use crate::inventory;
use crate::model::{Action, BuffKind, Monster, StatusKind};

/// Threat at which an ordinary monster justifies burning buffs.
const PREP_THREAT: i32 = 100;
/// Depth from which protection from evil joins the prep stack.
const PROTECTION_DEPTH: u32 = 15;

/// Pre-combat preparation: monsters visible, none adjacent yet.
pub fn pre_combat(ctx: &Context) -> Option<Action> {
    if ctx.capabilities.tactics < 2 {
        return None;
    }
    if !ctx.any_monster_visible() || danger::adjacent_count(ctx.character, ctx.monsters) > 0 {
        return None;
    }

    // The victory boss gets the full stack, no questions asked.
    if ctx.victory_boss().is_some() {
        return full_stack(ctx);
    }

    let worth_it = ctx.monsters.iter().any(|m| {
        m.hp > 0
            && (m.is_boss() || m.is_unique() || danger::threat_score(m, ctx.character) >= PREP_THREAT)
    });
    if !worth_it {
        return None;
    }

    let boss_fight = ctx.monsters.iter().any(|m| m.is_boss() || m.is_unique());
    if (ctx.character.has_bow() || boss_fight) && !ctx.character.has_status(StatusKind::Hasted) {
        if let Some(potion) = inventory::find_speed_potion(ctx.character) {
            return Some(Action::Use { item_id: potion.id });
        }
    }
    if !ctx.character.has_status(StatusKind::Blessed) {
        if let Some(scroll) = inventory::find_blessing_scroll(ctx.character) {
            return Some(Action::Use { item_id: scroll.id });
        }
    }
    if ctx.level.depth >= PROTECTION_DEPTH
        && !ctx.character.has_status(StatusKind::ProtectionEvil)
    {
        if let Some(scroll) = inventory::find_protection_scroll(ctx.character) {
            return Some(Action::Use { item_id: scroll.id });
        }
    }
    None
}

/// Speed, fury, blessing, protection, in that order, skipping whatever
/// is already running.
fn full_stack(ctx: &Context) -> Option<Action> {
    let c = ctx.character;
    if !c.has_status(StatusKind::Hasted) {
        if let Some(potion) = inventory::find_speed_potion(c) {
            return Some(Action::Use { item_id: potion.id });
        }
    }
    if !c.has_status(StatusKind::Berserk) && !c.has_status(StatusKind::Heroism) {
        if let Some(potion) = inventory::find_buff_potion(c, BuffKind::Berserk)
            .or_else(|| inventory::find_buff_potion(c, BuffKind::Heroism))
        {
            return Some(Action::Use { item_id: potion.id });
        }
    }
    if !c.has_status(StatusKind::Blessed) {
        if let Some(scroll) = inventory::find_blessing_scroll(c) {
            return Some(Action::Use { item_id: scroll.id });
        }
    }
    if !c.has_status(StatusKind::ProtectionEvil) {
        if let Some(scroll) = inventory::find_protection_scroll(c) {
            return Some(Action::Use { item_id: scroll.id });
        }
    }
    None
}

/// Mid-fight maintenance.
pub fn combat(ctx: &Context, local_danger: i32) -> Option<Action> {
    if ctx.capabilities.tactics < 2 {
        return None;
    }
    let c = ctx.character;

    // Never let the victory-boss fight run unbuffed.
    if ctx.victory_boss().is_some() {
        if let Some(action) = full_stack(ctx) {
            return Some(action);
        }
    }

    if local_danger > 50
        && !c.has_status(StatusKind::Berserk)
        && !c.has_status(StatusKind::Heroism)
    {
        if let Some(potion) = inventory::find_buff_potion(c, BuffKind::Heroism)
            .or_else(|| inventory::find_buff_potion(c, BuffKind::Berserk))
        {
            return Some(Action::Use { item_id: potion.id });
        }
    }

    // Elemental resistance against what is actually clawing at us.
    for monster in adjacent(ctx) {
        for element in [
            crate::model::Element::Fire,
            crate::model::Element::Cold,
            crate::model::Element::Lightning,
            crate::model::Element::Acid,
            crate::model::Element::Poison,
        ] {
            if monster.has_elemental_attack(element) && !c.has_resistance(element) {
                if let Some(potion) = inventory::find_resistance_potion(c, element) {
                    return Some(Action::Use { item_id: potion.id });
                }
            }
        }
    }
    None
}

fn adjacent<'a>(ctx: &'a Context) -> impl Iterator<Item = &'a Monster> + 'a {
    danger::adjacent_monsters(ctx.character, ctx.monsters)
}
