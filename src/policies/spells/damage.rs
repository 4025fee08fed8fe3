//! Attack spell selection: AOE when it pays, lifedrain when hurt,
//! otherwise the most mana-efficient bolt.

use crate::context::Context;
use crate::dice;
use crate::inventory;
use crate::model::{Action, CastTarget, EquipSlot, Monster, SpellEffect, SpellTemplate};

fn spell_damage(spell: &SpellTemplate) -> f64 {
    match &spell.effect {
        SpellEffect::Damage { dice: d, .. } => dice::average(d),
        _ => 0.0,
    }
}

fn spell_fields(spell: &SpellTemplate) -> Option<(u8, bool)> {
    match spell.effect {
        SpellEffect::Damage {
            aoe_radius,
            lifedrain,
            ..
        } => Some((aoe_radius, lifedrain)),
        _ => None,
    }
}

/// Expected melee output, the bar an adjacent-target spell must clear.
pub fn melee_average(ctx: &Context) -> f64 {
    let c = ctx.character;
    let weapon = c.equipped(EquipSlot::Weapon);
    let base = weapon
        .and_then(|w| w.template.damage.as_deref())
        .map_or(2.0, dice::average);
    let bonus = weapon.map_or(0, |w| w.template.to_damage + w.enchantment);
    base + bonus as f64
}

fn in_range(ctx: &Context, spell: &SpellTemplate, monster: &Monster) -> bool {
    let dist = ctx.character.position.chebyshev(monster.position);
    dist <= spell.range.max(1)
}

pub fn damage_spell(ctx: &Context) -> Option<Action> {
    let c = ctx.character;
    let spells: Vec<&SpellTemplate> = inventory::castable_spells(c, ctx.spells, ctx.turn)
        .filter(|s| s.is_damage())
        .collect();
    if spells.is_empty() || ctx.monsters.is_empty() {
        return None;
    }
    let melee = melee_average(ctx);

    // AOE first: worth it from two victims up.
    let mut best_aoe: Option<(usize, &SpellTemplate, &Monster)> = None;
    for spell in &spells {
        let Some((radius, _)) = spell_fields(spell) else {
            continue;
        };
        if radius == 0 {
            continue;
        }
        for center in ctx.monsters.iter().filter(|m| m.hp > 0) {
            if !in_range(ctx, spell, center) {
                continue;
            }
            let hits = ctx
                .monsters
                .iter()
                .filter(|m| m.hp > 0 && m.position.chebyshev(center.position) <= radius as i32)
                .count();
            if hits >= 2 {
                let better = match best_aoe {
                    Some((best_hits, _, _)) => hits > best_hits,
                    None => true,
                };
                if better {
                    best_aoe = Some((hits, *spell, center));
                }
            }
        }
    }
    if let Some((hits, spell, center)) = best_aoe {
        log::debug!("aoe {} catches {} targets", spell.name, hits);
        return Some(Action::Cast {
            spell_id: spell.id,
            target: Some(CastTarget::Monster(center.id)),
        });
    }

    let target = ctx.closest_monster()?;
    let adjacent = target.position.is_adjacent(c.position);

    // Lifedrain while wounded.
    let drain_threshold = if ctx.is_ranged() { 0.8 } else { 0.7 };
    if c.hp_ratio() < drain_threshold {
        if let Some(spell) = spells
            .iter()
            .find(|s| spell_fields(s).map_or(false, |(_, drain)| drain) && in_range(ctx, s, target))
        {
            if !adjacent || spell_damage(spell) >= melee * 2.0 {
                return Some(Action::Cast {
                    spell_id: spell.id,
                    target: Some(CastTarget::Monster(target.id)),
                });
            }
        }
    }

    // Most mana-efficient single-target spell that reaches.
    let chosen = spells
        .iter()
        .filter(|s| in_range(ctx, s, target))
        .max_by(|a, b| {
            let ea = spell_damage(a) / a.mana_cost.max(1) as f64;
            let eb = spell_damage(b) / b.mana_cost.max(1) as f64;
            ea.partial_cmp(&eb).unwrap_or(std::cmp::Ordering::Equal)
        })?;

    // Spells against an adjacent enemy must clearly outdamage a swing.
    if adjacent && spell_damage(chosen) < melee * 2.0 {
        return None;
    }

    Some(Action::Cast {
        spell_id: chosen.id,
        target: Some(CastTarget::Monster(target.id)),
    })
}
