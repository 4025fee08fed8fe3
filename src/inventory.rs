//! Pure queries over the character snapshot: inventory, equipment, and
//! castable spells. Nothing here mutates state, and every function
//! returns the first match in inventory insertion order.
//!
//! This module is the only place in the crate allowed to match on item
//! display names, and only for the scroll whitelist below; every other
//! selection runs on structured template fields.

use crate::dice;
use crate::model::{
    BuffKind, Character, Element, Item, ItemKind, SpellTemplate, StatusKind,
};

/// The scroll-name whitelist. The host's scroll catalog predates its
/// structured effect fields, so these specific scrolls are recognised
/// by substring; everything else is structural.
pub mod scroll_names {
    pub const PHASE_DOOR: &str = "phase door";
    pub const TELEPORTATION: &str = "teleportation";
    pub const TELEPORT_LEVEL: &str = "teleport level";
    pub const TOWN_PORTAL: &str = "town portal";
    pub const BLESSING: &str = "blessing";
    pub const PROTECTION_FROM_EVIL: &str = "protection from evil";
    pub const MAGIC_MAPPING: &str = "magic mapping";
    pub const DETECT_STAIRS: &str = "detect stairs";
    pub const ENCHANT_WEAPON: &str = "enchant weapon";
    pub const ENCHANT_ARMOR: &str = "enchant armor";
}

fn scroll_name_contains(item: &Item, needle: &str) -> bool {
    item.template.kind == ItemKind::Scroll
        && item.template.name.to_lowercase().contains(needle)
}

fn first_scroll<'a>(character: &'a Character, needle: &str) -> Option<&'a Item> {
    character
        .inventory
        .iter()
        .find(|i| scroll_name_contains(i, needle))
}

/// Lowest-tier healing potion at or above `min_tier`, in inventory
/// order within a tier.
pub fn find_healing_potion(character: &Character, min_tier: u8) -> Option<&Item> {
    let mut best: Option<&Item> = None;
    for item in &character.inventory {
        if !item.is_healing_potion() || item.template.tier < min_tier {
            continue;
        }
        match best {
            Some(b) if b.template.tier <= item.template.tier => {}
            _ => best = Some(item),
        }
    }
    best
}

pub fn find_speed_potion(character: &Character) -> Option<&Item> {
    character.inventory.iter().find(|i| {
        i.template.kind == ItemKind::Potion
            && i.template.buff.map_or(false, |b| b.kind == BuffKind::Speed)
    })
}

pub fn find_buff_potion(character: &Character, kind: BuffKind) -> Option<&Item> {
    character.inventory.iter().find(|i| {
        i.template.kind == ItemKind::Potion && i.template.buff.map_or(false, |b| b.kind == kind)
    })
}

pub fn find_resistance_potion(character: &Character, element: Element) -> Option<&Item> {
    character.inventory.iter().find(|i| {
        i.template.kind == ItemKind::Potion
            && (i.template.grants_resistance == Some(element)
                || i.template
                    .buff
                    .map_or(false, |b| b.kind == BuffKind::Resist(element)))
    })
}

pub fn find_mana_potion(character: &Character) -> Option<&Item> {
    character
        .inventory
        .iter()
        .find(|i| i.template.kind == ItemKind::Potion && i.template.restores_mana)
}

/// A consumable that cures the given status: explicit cure entry,
/// cure-all, or (for poison) a resistance grant.
pub fn find_cure_for(character: &Character, status: StatusKind) -> Option<&Item> {
    character.inventory.iter().find(|i| {
        let t = &i.template;
        if !matches!(t.kind, ItemKind::Potion | ItemKind::Scroll) {
            return false;
        }
        t.cures.contains(&status)
            || t.cures_all
            || (status == StatusKind::Poisoned && t.grants_resistance == Some(Element::Poison))
    })
}

/// Full teleport: "teleportation" but neither "phase door" nor
/// "teleport level".
pub fn find_full_teleport_scroll(character: &Character) -> Option<&Item> {
    character.inventory.iter().find(|i| {
        scroll_name_contains(i, scroll_names::TELEPORTATION)
            && !scroll_name_contains(i, scroll_names::PHASE_DOOR)
            && !scroll_name_contains(i, scroll_names::TELEPORT_LEVEL)
    })
}

pub fn find_phase_door_scroll(character: &Character) -> Option<&Item> {
    first_scroll(character, scroll_names::PHASE_DOOR)
}

pub fn find_teleport_level_scroll(character: &Character) -> Option<&Item> {
    first_scroll(character, scroll_names::TELEPORT_LEVEL)
}

pub fn find_town_portal_scroll(character: &Character) -> Option<&Item> {
    first_scroll(character, scroll_names::TOWN_PORTAL)
}

pub fn find_blessing_scroll(character: &Character) -> Option<&Item> {
    first_scroll(character, scroll_names::BLESSING)
}

pub fn find_protection_scroll(character: &Character) -> Option<&Item> {
    first_scroll(character, scroll_names::PROTECTION_FROM_EVIL)
}

pub fn find_magic_mapping_scroll(character: &Character) -> Option<&Item> {
    first_scroll(character, scroll_names::MAGIC_MAPPING)
}

pub fn find_detect_stairs_scroll(character: &Character) -> Option<&Item> {
    first_scroll(character, scroll_names::DETECT_STAIRS)
}

pub fn find_enchant_weapon_scroll(character: &Character) -> Option<&Item> {
    first_scroll(character, scroll_names::ENCHANT_WEAPON)
}

pub fn find_enchant_armor_scroll(character: &Character) -> Option<&Item> {
    first_scroll(character, scroll_names::ENCHANT_ARMOR)
}

/// Any consumable that relocates the agent, full teleports first.
pub fn find_any_escape_scroll(character: &Character) -> Option<&Item> {
    find_full_teleport_scroll(character).or_else(|| find_phase_door_scroll(character))
}

/// Category of a consumable for divestment and readiness accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumableKind {
    Healing,
    Escape,
    TownPortal,
    Buff,
    Mana,
    Utility,
    None,
}

pub fn consumable_type(item: &Item) -> ConsumableKind {
    let t = &item.template;
    match t.kind {
        ItemKind::Potion => {
            if t.heal_base.is_some() || t.heal_per_level.is_some() {
                ConsumableKind::Healing
            } else if t.restores_mana {
                ConsumableKind::Mana
            } else if t.buff.is_some() || t.grants_resistance.is_some() || !t.cures.is_empty() {
                ConsumableKind::Buff
            } else {
                ConsumableKind::Utility
            }
        }
        ItemKind::Scroll => {
            let name = t.name.to_lowercase();
            if name.contains(scroll_names::TOWN_PORTAL) {
                ConsumableKind::TownPortal
            } else if name.contains(scroll_names::PHASE_DOOR)
                || (name.contains(scroll_names::TELEPORTATION)
                    && !name.contains(scroll_names::TELEPORT_LEVEL))
            {
                ConsumableKind::Escape
            } else if name.contains(scroll_names::BLESSING)
                || name.contains(scroll_names::PROTECTION_FROM_EVIL)
            {
                ConsumableKind::Buff
            } else {
                ConsumableKind::Utility
            }
        }
        _ => ConsumableKind::None,
    }
}

pub fn count_healing_potions(character: &Character) -> usize {
    character
        .inventory
        .iter()
        .filter(|i| consumable_type(i) == ConsumableKind::Healing)
        .count()
}

pub fn count_escape_scrolls(character: &Character) -> usize {
    character
        .inventory
        .iter()
        .filter(|i| consumable_type(i) == ConsumableKind::Escape)
        .count()
}

pub fn count_town_portals(character: &Character) -> usize {
    character
        .inventory
        .iter()
        .filter(|i| consumable_type(i) == ConsumableKind::TownPortal)
        .count()
}

pub fn count_buff_potions(character: &Character) -> usize {
    character
        .inventory
        .iter()
        .filter(|i| i.template.kind == ItemKind::Potion && i.template.buff.is_some())
        .count()
}

pub fn count_mana_potions(character: &Character) -> usize {
    character
        .inventory
        .iter()
        .filter(|i| consumable_type(i) == ConsumableKind::Mana)
        .count()
}

/// Spells the character could legally cast this turn: known, affordable,
/// off cooldown, level met, and the race can cast at all.
pub fn castable_spells<'a>(
    character: &'a Character,
    table: &'a [SpellTemplate],
    turn: u64,
) -> impl Iterator<Item = &'a SpellTemplate> + 'a {
    let castable = character.can_cast_at_all();
    table.iter().filter(move |s| {
        castable
            && character.known_spells.contains(&s.id)
            && character.mana >= s.mana_cost
            && character.level >= s.min_level
            && character.spell_ready(s.id, turn)
    })
}

pub fn find_castable<'a, F>(
    character: &'a Character,
    table: &'a [SpellTemplate],
    turn: u64,
    pred: F,
) -> Option<&'a SpellTemplate>
where
    F: Fn(&SpellTemplate) -> bool,
{
    castable_spells(character, table, turn).find(|s| pred(s))
}

/// Rough goodness score for comparing equipment of the same slot.
pub fn equipment_score(item: &Item) -> i32 {
    let t = &item.template;
    let dice_avg = t.damage.as_deref().map_or(0.0, dice::average);
    t.armor + t.to_hit + t.to_damage + item.enchantment + dice_avg.round() as i32
        + t.spell_power
        + t.light_radius
}

/// First inventory item that would be a strict upgrade in its slot.
pub fn find_equip_upgrade(character: &Character) -> Option<&Item> {
    character.inventory.iter().find(|i| {
        let Some(slot) = i.template.slot else {
            return false;
        };
        match character.equipped(slot) {
            Some(current) => equipment_score(i) > equipment_score(current),
            None => true,
        }
    })
}

/// Bare-bones item constructors shared by the unit tests across the
/// crate. Integration tests have their own richer builders.
#[cfg(test)]
pub(crate) mod tests_support {
    use super::*;
    use crate::model::ItemTemplate;

    pub fn potion(id: u32, name: &str, tier: u8, heal: Option<i32>) -> Item {
        Item {
            id,
            template: ItemTemplate {
                name: name.into(),
                kind: ItemKind::Potion,
                slot: None,
                tier,
                min_depth: 0,
                damage: None,
                range: 0,
                heal_base: heal,
                heal_per_level: None,
                cures: Vec::new(),
                cures_all: false,
                grants_resistance: None,
                buff: None,
                restores_mana: false,
                spell_power: 0,
                light_radius: 0,
                armor: 0,
                to_hit: 0,
                to_damage: 0,
                abilities: Vec::new(),
            },
            enchantment: 0,
            artifact: None,
        }
    }

    pub fn healing_potion(id: u32, tier: u8) -> Item {
        potion(id, "Potion of Healing", tier, Some(10 * tier as i32))
    }

    pub fn scroll(id: u32, name: &str) -> Item {
        let mut item = potion(id, name, 1, None);
        item.template.kind = ItemKind::Scroll;
        item
    }
}

#[cfg(test)]
mod tests {
    use super::tests_support::{potion, scroll};
    use super::*;
    use crate::model::{Class, ItemBuff, SpellEffect};
    use crate::model::{Point, Race, Stats};
    use std::collections::HashMap;

    fn character_with(inventory: Vec<Item>) -> Character {
        Character {
            position: Point::new(0, 0),
            depth: 1,
            hp: 10,
            max_hp: 10,
            mana: 10,
            max_mana: 10,
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
            inventory,
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
    fn healing_potion_prefers_lowest_adequate_tier() {
        let c = character_with(vec![
            potion(1, "Potion of Healing", 2, Some(30)),
            potion(2, "Potion of Cure Light Wounds", 1, Some(10)),
            potion(3, "Potion of Healing", 2, Some(30)),
        ]);
        assert_eq!(find_healing_potion(&c, 1).unwrap().id, 2);
        assert_eq!(find_healing_potion(&c, 2).unwrap().id, 1);
        assert!(find_healing_potion(&c, 3).is_none());
    }

    #[test]
    fn insertion_order_wins_within_a_tier() {
        let c = character_with(vec![
            potion(7, "Potion of Cure Light Wounds", 1, Some(10)),
            potion(8, "Potion of Cure Light Wounds", 1, Some(10)),
        ]);
        assert_eq!(find_healing_potion(&c, 1).unwrap().id, 7);
    }

    #[test]
    fn teleportation_excludes_phase_door_and_teleport_level() {
        let c = character_with(vec![
            scroll(1, "Scroll of Phase Door"),
            scroll(2, "Scroll of Teleport Level"),
            scroll(3, "Scroll of Teleportation"),
        ]);
        assert_eq!(find_full_teleport_scroll(&c).unwrap().id, 3);
        assert_eq!(find_phase_door_scroll(&c).unwrap().id, 1);
        assert_eq!(find_teleport_level_scroll(&c).unwrap().id, 2);
        assert_eq!(find_any_escape_scroll(&c).unwrap().id, 3);
    }

    #[test]
    fn consumable_classification() {
        let heal = potion(1, "Potion of Healing", 2, Some(30));
        let tp = scroll(2, "Scroll of Town Portal");
        let phase = scroll(3, "Scroll of Phase Door");
        let mapping = scroll(4, "Scroll of Magic Mapping");
        let mut speed = potion(5, "Potion of Speed", 1, None);
        speed.template.buff = Some(ItemBuff {
            kind: BuffKind::Speed,
            turns: 20,
            power: 10,
        });
        assert_eq!(consumable_type(&heal), ConsumableKind::Healing);
        assert_eq!(consumable_type(&tp), ConsumableKind::TownPortal);
        assert_eq!(consumable_type(&phase), ConsumableKind::Escape);
        assert_eq!(consumable_type(&mapping), ConsumableKind::Utility);
        assert_eq!(consumable_type(&speed), ConsumableKind::Buff);
    }

    #[test]
    fn golem_has_no_castable_spells() {
        let table = vec![SpellTemplate {
            id: 1,
            name: "Minor Heal".into(),
            mana_cost: 3,
            cooldown: 0,
            range: 0,
            min_level: 1,
            effect: SpellEffect::Heal {
                base: 10,
                per_level: 1,
            },
        }];
        let mut c = character_with(Vec::new());
        c.known_spells.push(1);
        assert!(find_castable(&c, &table, 0, |s| s.is_heal()).is_some());
        c.race = Race::Golem;
        assert!(find_castable(&c, &table, 0, |s| s.is_heal()).is_none());
    }
}
