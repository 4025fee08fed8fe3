//! Teleport-style repositioning: rogue shadow step onto priority
//! targets, and the dimension-door kite for high-grade caster kiting.

use crate::context::Context;
use crate::danger;
use crate::inventory;
use crate::model::{Action, CastTarget, Class, Monster, Point, SpellEffect, StatusKind};

/// Threat that makes a non-boss worth a shadow step.
const STEP_THREAT: i32 = 100;
/// Preferred casting band after a dimension-door hop.
const KITE_BAND: (i32, i32) = (3, 5);
/// How far the kite searches for a landing tile.
const KITE_RADIUS: i32 = 8;

/// Rogue-only: blink next to a juicy, not-yet-adjacent target to open
/// with a sneak attack.
pub fn shadow_step(ctx: &Context) -> Option<Action> {
    let c = ctx.character;
    if c.class != Class::Rogue
        || c.hp_ratio() < 0.4
        || c.has_status(StatusKind::SneakAttack)
    {
        return None;
    }
    let spell = inventory::find_castable(c, ctx.spells, ctx.turn, |s| {
        matches!(s.effect, SpellEffect::ShadowStep)
    })?;

    let target = ctx
        .monsters
        .iter()
        .filter(|m| {
            m.hp > 0
                && !m.position.is_adjacent(c.position)
                && c.position.chebyshev(m.position) <= spell.range.max(1)
                && (m.is_boss() || m.is_unique() || danger::threat_score(m, c) >= STEP_THREAT)
        })
        .max_by_key(|m| (danger::threat_score(m, c), m.id))?;

    Some(Action::Cast {
        spell_id: spell.id,
        target: Some(CastTarget::Monster(target.id)),
    })
}

/// Straight-line visibility between two cells; walls block. Standard
/// Bresenham walk, endpoints excluded.
fn line_of_sight(level: &crate::model::Level, from: Point, to: Point) -> bool {
    let (mut x, mut y) = (from.x, from.y);
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        if (x, y) == (to.x, to.y) {
            return true;
        }
        if (x, y) != (from.x, from.y) && !level.is_passable(x, y) {
            return false;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Dimension-door kite for `kiting >= 3` casters: hop into the cone
/// opposite the nearest threat, landing where the threat sits back in
/// the ideal casting band.
pub fn dimension_door_kite(ctx: &Context) -> Option<Action> {
    if ctx.capabilities.kiting < 3 || !ctx.profile.prefers_ranged {
        return None;
    }
    let c = ctx.character;
    let threat = ctx.closest_monster()?;
    if c.position.chebyshev(threat.position) > 2 {
        return None;
    }
    // Only worth the hop if something can be cast afterwards.
    inventory::find_castable(c, ctx.spells, ctx.turn, |s| s.is_damage())?;
    let spell = inventory::find_castable(c, ctx.spells, ctx.turn, |s| {
        matches!(s.effect, SpellEffect::DimensionDoor)
    })?;

    let dest = kite_destination(ctx, threat)?;
    Some(Action::Cast {
        spell_id: spell.id,
        target: Some(CastTarget::Position(dest)),
    })
}

fn kite_destination(ctx: &Context, threat: &Monster) -> Option<Point> {
    let c = ctx.character;
    let away = (
        (c.position.x - threat.position.x).signum(),
        (c.position.y - threat.position.y).signum(),
    );
    let mut best: Option<(i32, Point)> = None;
    for dy in -KITE_RADIUS..=KITE_RADIUS {
        for dx in -KITE_RADIUS..=KITE_RADIUS {
            let p = Point::new(c.position.x + dx, c.position.y + dy);
            if p == c.position || !ctx.level.is_passable_point(p) {
                continue;
            }
            // Stay in the half-plane away from the threat.
            if (dx * away.0 + dy * away.1) <= 0 {
                continue;
            }
            if !ctx.level.is_visible(p) || ctx.monster_at(p).is_some() {
                continue;
            }
            if !line_of_sight(ctx.level, c.position, p) {
                continue;
            }
            let band = threat.position.chebyshev(p);
            let in_band = band >= KITE_BAND.0 && band <= KITE_BAND.1;
            let score = c.position.chebyshev(p) + if in_band { 10 } else { 0 };
            let better = match best {
                Some((bs, _)) => score > bs,
                None => true,
            };
            if better {
                best = Some((score, p));
            }
        }
    }
    best.map(|(_, p)| p)
}
