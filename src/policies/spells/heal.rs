//! Healing spell selection with graduated HP/danger thresholds.

use crate::context::Context;
use crate::inventory;
use crate::model::{Action, SpellEffect, SpellTemplate};

fn heal_amount(spell: &SpellTemplate, char_level: u32) -> i32 {
    match spell.effect {
        SpellEffect::Heal { base, per_level } => base + per_level * char_level as i32,
        _ => 0,
    }
}

/// Cast a heal if the situation warrants one. `incoming_danger` is the
/// immediate threat estimate; against heavy incoming damage, token
/// heals that restore less than a third of it are not worth the turn.
pub fn heal_spell(ctx: &Context, incoming_danger: i32) -> Option<Action> {
    let c = ctx.character;
    let hp_ratio = c.hp_ratio();

    // Dedicated healers top up earlier; everyone panics at the same point.
    let threshold = if ctx.profile.heals_priority { 0.65 } else { 0.5 };
    let emergency = incoming_danger > 0 && c.hp - incoming_danger < c.max_hp / 4;
    if hp_ratio >= threshold && !emergency {
        return None;
    }

    let mut candidates: Vec<&SpellTemplate> =
        inventory::castable_spells(c, ctx.spells, ctx.turn)
            .filter(|s| s.is_heal())
            .collect();
    if incoming_danger >= 30 {
        candidates.retain(|s| heal_amount(s, c.level) * 3 >= incoming_danger);
    }
    if candidates.is_empty() {
        return None;
    }

    let wound = c.wound();
    let chosen = if wound < 30 {
        // Smallest heal that still covers the wound, else the biggest.
        candidates
            .iter()
            .filter(|s| heal_amount(s, c.level) >= wound)
            .min_by_key(|s| heal_amount(s, c.level))
            .copied()
            .or_else(|| {
                candidates
                    .iter()
                    .max_by_key(|s| heal_amount(s, c.level))
                    .copied()
            })
    } else {
        candidates
            .iter()
            .max_by_key(|s| heal_amount(s, c.level))
            .copied()
    }?;

    Some(Action::Cast {
        spell_id: chosen.id,
        target: None,
    })
}
