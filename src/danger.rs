//! Threat scoring and the four-tier danger classification that drives
//! the reactive half of the agent.

use serde::{Deserialize, Serialize};

use crate::grid::Grid16;
use crate::model::{Character, Level, Monster, PersonalityConfig, Point};

/// Monster influence radius in tiles.
pub const DANGER_RADIUS: i32 = 5;
/// Threat decay per tile beyond melee range.
const FALLOFF: f64 = 0.7;

/// Percentage-based armor mitigation. The exact formula is host-owned;
/// this stand-in lives in one place so a host-supplied version can
/// replace it wholesale.
pub fn damage_after_armor(raw: f64, armor: i32) -> f64 {
    let armor = armor.max(0) as f64;
    let reduction = (armor / (armor + 40.0)).min(0.75);
    raw * (1.0 - reduction)
}

/// Threat one monster projects onto the character at melee range.
pub fn threat_score(monster: &Monster, character: &Character) -> i32 {
    let raw = monster.average_damage();
    damage_after_armor(raw, character.armor_value()).round() as i32
}

/// Accumulate per-tile threat from every visible, living, awake monster
/// into `out`. Full score out to distance 1, decaying per tile to the
/// influence radius.
pub fn build_danger_grid(
    level: &Level,
    monsters: &[Monster],
    character: &Character,
    out: &mut Grid16,
) {
    out.reset_for(level, 0);
    for monster in monsters {
        if monster.hp <= 0 || !monster.awake {
            continue;
        }
        let score = threat_score(monster, character);
        if score <= 0 {
            continue;
        }
        let m = monster.position;
        for dy in -DANGER_RADIUS..=DANGER_RADIUS {
            for dx in -DANGER_RADIUS..=DANGER_RADIUS {
                let p = Point::new(m.x + dx, m.y + dy);
                if !level.in_bounds(p.x, p.y) {
                    continue;
                }
                let dist = m.chebyshev(p);
                let scaled = if dist <= 1 {
                    score as f64
                } else {
                    score as f64 * FALLOFF.powi(dist - 1)
                };
                out.add_clamped(p, scaled.round() as i32);
            }
        }
    }
}

/// Summed threat at a single tile.
pub fn local_danger(grid: &Grid16, p: Point) -> i32 {
    let v = grid.get(p);
    if v == crate::grid::FLOW_UNREACHABLE {
        0
    } else {
        v as i32
    }
}

/// Threat from monsters standing next to the character.
pub fn immediate_danger(character: &Character, monsters: &[Monster]) -> i32 {
    monsters
        .iter()
        .filter(|m| m.hp > 0 && m.awake && m.position.is_adjacent(character.position))
        .map(|m| threat_score(m, character))
        .sum()
}

pub fn adjacent_monsters<'a>(
    character: &Character,
    monsters: &'a [Monster],
) -> impl Iterator<Item = &'a Monster> + 'a {
    let pos = character.position;
    monsters
        .iter()
        .filter(move |m| m.hp > 0 && m.position.is_adjacent(pos))
}

pub fn adjacent_count(character: &Character, monsters: &[Monster]) -> usize {
    adjacent_monsters(character, monsters).count()
}

/// Ordered from calm to emergency; classification never moves toward
/// `Safe` as incoming damage grows or HP shrinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DangerTier {
    Safe,
    Caution,
    Danger,
    Critical,
}

/// Classify the character's situation. `grid` must be the danger grid
/// for this tick.
pub fn classify(
    character: &Character,
    monsters: &[Monster],
    grid: &Grid16,
    personality: &PersonalityConfig,
) -> DangerTier {
    let adjacent_threat = immediate_danger(character, monsters);
    let adjacent = adjacent_count(character, monsters);
    let hp_ratio = character.hp_ratio();

    // One hit could kill, HP is already in the red, or we cannot act at
    // all while something wails on us.
    if hp_ratio <= 0.25
        || (adjacent_threat > 0 && adjacent_threat >= character.hp)
        || (adjacent_threat > 0 && character.has_status(crate::model::StatusKind::Paralyzed))
    {
        return DangerTier::Critical;
    }
    if (hp_ratio <= 0.5 && adjacent_threat as f64 >= 0.7 * character.hp as f64) || adjacent >= 3 {
        return DangerTier::Danger;
    }
    let any_visible = monsters.iter().any(|m| m.hp > 0);
    if (hp_ratio <= 0.75 && any_visible)
        || local_danger(grid, character.position) > personality.avoidance_threshold()
    {
        return DangerTier::Caution;
    }
    DangerTier::Safe
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        AttackMethod, Level, MonsterAttack, MonsterTemplate, PersonalityPreset, NORMAL_SPEED,
    };
    use crate::model::{Character, Class, Race, Stats};
    use std::collections::HashMap;

    fn character(hp: i32, max_hp: i32, at: Point) -> Character {
        Character {
            position: at,
            depth: 1,
            hp,
            max_hp,
            mana: 0,
            max_mana: 0,
            stats: Stats {
                strength: 10,
                intellect: 10,
                wisdom: 10,
                dexterity: 10,
                constitution: 10,
            },
            level: 5,
            experience: 0,
            gold: 0,
            inventory: Vec::new(),
            equipment: HashMap::new(),
            status_effects: Vec::new(),
            temp_resistances: Vec::new(),
            known_spells: Vec::new(),
            spell_cooldowns: HashMap::new(),
            shapeshift_form: None,
            pets: Vec::new(),
            race: Race::Human,
            class: Class::Warrior,
        }
    }

    fn monster(damage: &str, at: Point) -> Monster {
        Monster {
            id: 1,
            template: MonsterTemplate {
                name: "orc".into(),
                attacks: vec![MonsterAttack {
                    method: AttackMethod::Hit,
                    damage: damage.into(),
                    effect: None,
                }],
                spells: Vec::new(),
                spell_frequency: 0,
                resistances: Vec::new(),
                immunities: Vec::new(),
                min_depth: 1,
                speed: NORMAL_SPEED,
                flags: Vec::new(),
            },
            hp: 20,
            max_hp: 20,
            position: at,
            energy: 0,
            awake: true,
            debuffs: Vec::new(),
            buffs: Vec::new(),
        }
    }

    #[test]
    fn falloff_decays_with_distance() {
        let level = Level::from_ascii(&["..........."], 1);
        let c = character(50, 50, Point::new(10, 0));
        let m = monster("4d6", Point::new(0, 0));
        let mut grid = Grid16::empty();
        build_danger_grid(&level, &[m], &c, &mut grid);
        let at0 = local_danger(&grid, Point::new(0, 0));
        let at1 = local_danger(&grid, Point::new(1, 0));
        let at3 = local_danger(&grid, Point::new(3, 0));
        assert_eq!(at0, at1);
        assert!(at1 > at3);
        assert_eq!(local_danger(&grid, Point::new(9, 0)), 0); // beyond radius
    }

    #[test]
    fn one_hit_kill_is_critical() {
        let level = Level::from_ascii(&["..."], 1);
        let c = character(10, 40, Point::new(0, 0));
        let m = monster("6d6", Point::new(1, 0)); // avg 21 vs 10 hp
        let mut grid = Grid16::empty();
        build_danger_grid(&level, &[m.clone()], &c, &mut grid);
        let p = PersonalityPreset::Cautious.resolve(None);
        assert_eq!(classify(&c, &[m], &grid, &p), DangerTier::Critical);
    }

    #[test]
    fn tier_never_relaxes_as_damage_grows() {
        let level = Level::from_ascii(&["...."], 1);
        let c = character(30, 60, Point::new(0, 0));
        let p = PersonalityPreset::Aggressive.resolve(None);
        let mut previous = DangerTier::Safe;
        for dice in ["1d2", "1d6", "3d6", "6d6", "12d6"] {
            let m = monster(dice, Point::new(1, 0));
            let mut grid = Grid16::empty();
            build_danger_grid(&level, &[m.clone()], &c, &mut grid);
            let tier = classify(&c, &[m], &grid, &p);
            assert!(tier >= previous, "{} relaxed the tier", dice);
            previous = tier;
        }
    }

    #[test]
    fn surrounded_is_danger_even_at_high_hp() {
        let level = Level::from_ascii(&["...", "...", "..."], 1);
        let c = character(60, 60, Point::new(1, 1));
        let ms = vec![
            monster("1d4", Point::new(0, 1)),
            monster("1d4", Point::new(2, 1)),
            monster("1d4", Point::new(1, 0)),
        ];
        let mut grid = Grid16::empty();
        build_danger_grid(&level, &ms, &c, &mut grid);
        let p = PersonalityPreset::Aggressive.resolve(None);
        assert_eq!(classify(&c, &ms, &grid, &p), DangerTier::Danger);
    }
}
