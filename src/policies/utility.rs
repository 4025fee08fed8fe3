//! Quiet-time consumables and the stuck-exploration escalation ladder.

use crate::context::Context;
use crate::inventory;
use crate::model::{Action, EquipSlot, PersonalityPreset, StatusKind};
use crate::state::AgentState;

/// Enchanting stops being worth scrolls at this bonus.
const ENCHANT_CAP: i32 = 5;
/// Local danger above which utility work is postponed.
const CALM_THRESHOLD: i32 = 20;

pub fn utility_consumable(ctx: &Context, local_danger: i32) -> Option<Action> {
    if ctx.any_monster_visible() || local_danger > CALM_THRESHOLD {
        return None;
    }
    let c = ctx.character;

    if let Some(weapon) = c.equipped(EquipSlot::Weapon) {
        if weapon.enchantment < ENCHANT_CAP {
            if let Some(scroll) = inventory::find_enchant_weapon_scroll(c) {
                return Some(Action::Use { item_id: scroll.id });
            }
        }
    }
    if let Some(armor) = c.equipped(EquipSlot::Armor) {
        if armor.enchantment < ENCHANT_CAP {
            if let Some(scroll) = inventory::find_enchant_armor_scroll(c) {
                return Some(Action::Use { item_id: scroll.id });
            }
        }
    }

    if ctx.level.exploration_ratio() < 0.3 {
        if let Some(scroll) = inventory::find_magic_mapping_scroll(c) {
            return Some(Action::Use { item_id: scroll.id });
        }
    }

    // Speedrunners keep the haste rolling while covering ground.
    if ctx.personality.preset_shape() == PersonalityPreset::Speedrunner
        && !c.has_status(StatusKind::Hasted)
    {
        if let Some(potion) = inventory::find_speed_potion(c) {
            return Some(Action::Use { item_id: potion.id });
        }
    }
    None
}

/// Escalating responses to a level that will not give up its stairs.
pub fn stuck_escalation(ctx: &Context, state: &AgentState) -> Option<Action> {
    let turns = state.turns_on_level;
    let c = ctx.character;

    if turns >= 300 && state.known_stairs_down.is_none() {
        if let Some(scroll) = inventory::find_detect_stairs_scroll(c) {
            log::debug!("{} turns without stairs, reading detection", turns);
            return Some(Action::Use { item_id: scroll.id });
        }
    }
    if turns >= 500 && ctx.level.exploration_ratio() < 0.6 {
        if let Some(scroll) = inventory::find_magic_mapping_scroll(c) {
            return Some(Action::Use { item_id: scroll.id });
        }
    }
    if turns >= 700 {
        if let Some(scroll) = inventory::find_teleport_level_scroll(c) {
            log::debug!("{} turns on level, bailing via teleport level", turns);
            return Some(Action::Use { item_id: scroll.id });
        }
    }
    None
}
