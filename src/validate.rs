//! Snapshot sanity checks. Hosts are trusted in release (a violation
//! degrades the tick to `Wait`); debug builds fail loudly instead.

use std::collections::HashSet;

use crate::model::{Character, Level, Monster};

pub fn check_snapshot(
    level: &Level,
    character: &Character,
    monsters: &[Monster],
) -> Result<(), String> {
    if character.hp <= 0 {
        return Err("character is dead; decide() must not be called".to_string());
    }
    if character.hp > character.max_hp {
        return Err(format!(
            "hp {} exceeds max {}",
            character.hp, character.max_hp
        ));
    }
    if level.passable.len() != level.cell_count() {
        return Err(format!(
            "passable bitmap length {} does not match {}x{}",
            level.passable.len(),
            level.width,
            level.height
        ));
    }
    for y in 0..level.height {
        for x in 0..level.width {
            let expected = level.kind(x, y).is_passable();
            let actual = level.passable[level.idx(x, y)] == 1;
            if expected != actual {
                return Err(format!(
                    "passable bitmap disagrees with tile kind at ({}, {})",
                    x, y
                ));
            }
        }
    }
    if !level.in_bounds(character.position.x, character.position.y) {
        return Err("character is out of bounds".to_string());
    }
    for m in monsters {
        if m.hp <= 0 {
            return Err(format!("dead monster {} in snapshot", m.id));
        }
    }
    let mut ids = HashSet::new();
    for item in &character.inventory {
        if !ids.insert(item.id) {
            return Err(format!("duplicate inventory item id {}", item.id));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Class, Level, Point, Race, Stats};
    use std::collections::HashMap;

    fn character() -> Character {
        Character {
            position: Point::new(1, 0),
            depth: 1,
            hp: 10,
            max_hp: 10,
            mana: 0,
            max_mana: 0,
            stats: Stats {
                strength: 10,
                intellect: 10,
                wisdom: 10,
                dexterity: 10,
                constitution: 10,
            },
            level: 1,
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

    #[test]
    fn dead_character_is_rejected() {
        let level = Level::from_ascii(&["..."], 1);
        let mut c = character();
        c.hp = 0;
        assert!(check_snapshot(&level, &c, &[]).is_err());
    }

    #[test]
    fn corrupted_bitmap_is_caught() {
        let mut level = Level::from_ascii(&["..."], 1);
        level.passable[0] = 0;
        assert!(check_snapshot(&level, &character(), &[]).is_err());
    }

    #[test]
    fn clean_snapshot_passes() {
        let level = Level::from_ascii(&["..."], 1);
        assert!(check_snapshot(&level, &character(), &[]).is_ok());
    }
}
