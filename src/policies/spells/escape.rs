//! Escape casting: teleport out of fights that are already lost.

use crate::context::Context;
use crate::danger;
use crate::grid::Grid16;
use crate::inventory;
use crate::model::{Action, SpellEffect};

pub fn escape_spell(ctx: &Context, danger_grid: &Grid16) -> Option<Action> {
    let c = ctx.character;
    let immediate = danger::immediate_danger(c, ctx.monsters);
    let adjacent = danger::adjacent_count(c, ctx.monsters);
    let local = danger::local_danger(danger_grid, c.position);
    let hp_ratio = c.hp_ratio();

    let desperate = hp_ratio < 0.15 && immediate > 0;
    let swarmed = adjacent >= 3;
    let bleeding_out = hp_ratio < 0.3 && local > 150;
    if !desperate && !swarmed && !bleeding_out {
        return None;
    }

    let want_full = swarmed || hp_ratio < 0.15;
    let pick = |full: bool| {
        inventory::find_castable(c, ctx.spells, ctx.turn, |s| {
            matches!(s.effect, SpellEffect::Escape { full: f } if f == full)
        })
    };
    let spell = if want_full {
        pick(true).or_else(|| pick(false))
    } else {
        pick(false).or_else(|| pick(true))
    }?;

    log::debug!("escape cast {} (adjacent {}, hp {:.0}%)", spell.name, adjacent, hp_ratio * 100.0);
    Some(Action::Cast {
        spell_id: spell.id,
        target: None,
    })
}
