//! Character snapshot: the agent's own body as the host reports it each
//! tick. Everything here is read-only to the core.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::item::{Item, ItemKind};
use super::types::{FormId, ItemId, Point, SpellId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EquipSlot {
    Weapon,
    Bow,
    Armor,
    Shield,
    Helm,
    Gloves,
    Boots,
    RingLeft,
    RingRight,
    Amulet,
    Light,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Element {
    Fire,
    Cold,
    Lightning,
    Acid,
    Poison,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatusKind {
    Paralyzed,
    Poisoned,
    Confused,
    Blind,
    Slowed,
    Terrified,
    Drained,
    Hasted,
    Blessed,
    Heroism,
    Berserk,
    ProtectionEvil,
    SneakAttack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEffect {
    pub kind: StatusKind,
    pub turns_remaining: u32,
    #[serde(default)]
    pub value: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub strength: i32,
    pub intellect: i32,
    pub wisdom: i32,
    pub dexterity: i32,
    pub constitution: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Race {
    Human,
    Elf,
    Dwarf,
    Gnome,
    Golem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Class {
    Warrior,
    Berserker,
    Blackguard,
    Paladin,
    Priest,
    Druid,
    Ranger,
    Rogue,
    Mage,
    Archmage,
    Necromancer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SummonKind {
    Wolf,
    Skeleton,
}

/// A permanent pet the character controls (ranger wolf, necromancer
/// skeletons). The host reports their health so the summon policy can
/// decide when to re-summon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub kind: SummonKind,
    pub hp: i32,
    pub max_hp: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub position: Point,
    pub depth: u32,
    pub hp: i32,
    pub max_hp: i32,
    pub mana: i32,
    pub max_mana: i32,
    pub stats: Stats,
    pub level: u32,
    pub experience: u64,
    pub gold: u64,
    /// Ordered; query functions return the first match in this order.
    pub inventory: Vec<Item>,
    pub equipment: HashMap<EquipSlot, Item>,
    #[serde(default)]
    pub status_effects: Vec<StatusEffect>,
    #[serde(default)]
    pub temp_resistances: Vec<Element>,
    #[serde(default)]
    pub known_spells: Vec<SpellId>,
    /// Spell id -> first turn at which the spell is castable again.
    #[serde(default)]
    pub spell_cooldowns: HashMap<SpellId, u64>,
    #[serde(default)]
    pub shapeshift_form: Option<FormId>,
    #[serde(default)]
    pub pets: Vec<Pet>,
    pub race: Race,
    pub class: Class,
}

impl Character {
    pub fn hp_ratio(&self) -> f64 {
        if self.max_hp <= 0 {
            return 0.0;
        }
        self.hp as f64 / self.max_hp as f64
    }

    pub fn mana_ratio(&self) -> f64 {
        if self.max_mana <= 0 {
            return 0.0;
        }
        self.mana as f64 / self.max_mana as f64
    }

    pub fn has_status(&self, kind: StatusKind) -> bool {
        self.status_effects.iter().any(|s| s.kind == kind)
    }

    pub fn status(&self, kind: StatusKind) -> Option<&StatusEffect> {
        self.status_effects.iter().find(|s| s.kind == kind)
    }

    pub fn has_resistance(&self, element: Element) -> bool {
        self.temp_resistances.contains(&element)
            || self
                .equipment
                .values()
                .any(|i| i.template.grants_resistance == Some(element))
    }

    pub fn find_item(&self, id: ItemId) -> Option<&Item> {
        self.inventory.iter().find(|i| i.id == id)
    }

    pub fn equipped(&self, slot: EquipSlot) -> Option<&Item> {
        self.equipment.get(&slot)
    }

    pub fn has_bow(&self) -> bool {
        self.equipped(EquipSlot::Bow)
            .map_or(false, |i| i.template.kind == ItemKind::Bow)
    }

    /// Summed armor from equipment, enchantments included. Fed to the
    /// damage-after-armor estimate in the danger model.
    pub fn armor_value(&self) -> i32 {
        self.equipment
            .values()
            .map(|i| i.template.armor + i.enchantment)
            .sum()
    }

    /// Race/cooldown/mana gate for casting. Spell knowledge and per-spell
    /// legality live in the query library.
    pub fn can_cast_at_all(&self) -> bool {
        self.race != Race::Golem && self.max_mana > 0
    }

    pub fn spell_ready(&self, spell: SpellId, turn: u64) -> bool {
        match self.spell_cooldowns.get(&spell) {
            Some(&ready_at) => turn >= ready_at,
            None => true,
        }
    }

    pub fn wound(&self) -> i32 {
        (self.max_hp - self.hp).max(0)
    }
}
