//! Permanent-pet upkeep: keep the pack at strength, re-summon wounded
//! pets while mana allows.

use crate::context::Context;
use crate::inventory;
use crate::model::{Action, SpellEffect};

/// Pets below half health get replaced (re-summoning heals them).
const PET_HEAL_RATIO: f64 = 0.5;
/// Mana floor for re-summoning rather than first-summoning.
const RESUMMON_MANA_RATIO: f64 = 0.3;

pub fn summon_spell(ctx: &Context) -> Option<Action> {
    let c = ctx.character;
    for spell in inventory::castable_spells(c, ctx.spells, ctx.turn) {
        let SpellEffect::Summon { kind, limit } = &spell.effect else {
            continue;
        };
        let (kind, limit) = (*kind, *limit);
        let owned = c.pets.iter().filter(|p| p.kind == kind).count();
        if owned < limit as usize {
            return Some(Action::Cast {
                spell_id: spell.id,
                target: None,
            });
        }
        let wounded = c.pets.iter().any(|p| {
            p.kind == kind && p.max_hp > 0 && (p.hp as f64 / p.max_hp as f64) < PET_HEAL_RATIO
        });
        if wounded && c.mana_ratio() >= RESUMMON_MANA_RATIO {
            return Some(Action::Cast {
                spell_id: spell.id,
                target: None,
            });
        }
    }
    None
}
