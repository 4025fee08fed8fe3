//! Slow-spell targeting. Plain debuffing picks the scariest mover;
//! smart debuffing (`tactics >= 3`) only spends mana where a slow
//! actually changes the fight.

use crate::context::Context;
use crate::danger;
use crate::dice;
use crate::inventory;
use crate::model::{
    Action, CastTarget, Monster, MonsterCondition, SpellEffect, SpellTemplate, NORMAL_SPEED,
};

/// Slows with this many turns left are not worth refreshing.
const SLOW_REFRESH_TURNS: u32 = 4;
/// Mana kept in reserve for an escape cast under smart debuffing.
const ESCAPE_RESERVE: i32 = 20;

fn slow_spell<'a>(ctx: &'a Context) -> Option<&'a SpellTemplate> {
    inventory::find_castable(ctx.character, ctx.spells, ctx.turn, |s| {
        matches!(s.effect, SpellEffect::Slow)
    })
}

fn best_spell_damage(ctx: &Context) -> f64 {
    inventory::castable_spells(ctx.character, ctx.spells, ctx.turn)
        .filter_map(|s| match &s.effect {
            SpellEffect::Damage { dice: d, .. } => Some(dice::average(d)),
            _ => None,
        })
        .fold(0.0, f64::max)
}

fn eligible(monster: &Monster) -> bool {
    monster.hp > 0 && monster.condition_turns(MonsterCondition::Slowed) < SLOW_REFRESH_TURNS
}

pub fn debuff_spell(ctx: &Context) -> Option<Action> {
    if ctx.capabilities.tactics < 1 {
        return None;
    }
    let spell = slow_spell(ctx)?;
    let in_range =
        |m: &&Monster| ctx.character.position.chebyshev(m.position) <= spell.range.max(1);

    // Fast or hasted monsters first.
    let fast = ctx
        .monsters
        .iter()
        .filter(|m| {
            eligible(m)
                && (m.effective_speed() > NORMAL_SPEED
                    || m.has_condition(MonsterCondition::Hasted))
        })
        .filter(in_range)
        .max_by_key(|m| (m.effective_speed(), m.max_hp, m.id));
    let target = match fast {
        Some(m) => m,
        None => ctx
            .monsters
            .iter()
            .filter(|m| eligible(m))
            .filter(in_range)
            .max_by_key(|m| (m.max_hp, m.id))?,
    };

    Some(Action::Cast {
        spell_id: spell.id,
        target: Some(CastTarget::Monster(target.id)),
    })
}

/// Threat-filtered slow: the target must hit hard enough to matter,
/// be too tough to simply kill, and the cast must leave escape mana.
pub fn smart_debuff(ctx: &Context) -> Option<Action> {
    if ctx.capabilities.tactics < 3 {
        return None;
    }
    let spell = slow_spell(ctx)?;
    if ctx.character.mana - spell.mana_cost < ESCAPE_RESERVE {
        return None;
    }
    let best_damage = best_spell_damage(ctx);
    let c = ctx.character;

    let target = ctx
        .monsters
        .iter()
        .filter(|m| {
            eligible(m)
                && c.position.chebyshev(m.position) <= spell.range.max(1)
                && danger::threat_score(m, c) * 4 >= c.hp
                && m.hp as f64 > best_damage * 2.0
        })
        .max_by_key(|m| (danger::threat_score(m, c), m.id))?;

    Some(Action::Cast {
        spell_id: spell.id,
        target: Some(CastTarget::Monster(target.id)),
    })
}
