//! Item snapshot types. Selection logic never matches on display names
//! except through the scroll whitelist in `inventory`; everything else is
//! driven by the structured template fields here.

use serde::{Deserialize, Serialize};

use super::character::{Element, EquipSlot, StatusKind};
use super::types::{ItemId, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemKind {
    Weapon,
    Staff,
    Bow,
    Armor,
    Shield,
    Helm,
    Gloves,
    Boots,
    Ring,
    Amulet,
    Light,
    Potion,
    Scroll,
    Gold,
}

/// Timed self-buff granted by a consumable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BuffKind {
    Speed,
    Heroism,
    Berserk,
    Blessing,
    ProtectionEvil,
    Resist(Element),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemBuff {
    pub kind: BuffKind,
    pub turns: u32,
    #[serde(default)]
    pub power: i32,
}

/// Passive abilities carried by equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemAbility {
    FreeAction,
    SeeInvisible,
    Regeneration,
    Telepathy,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemTemplate {
    pub name: String,
    pub kind: ItemKind,
    #[serde(default)]
    pub slot: Option<EquipSlot>,
    /// 1..=4, higher is stronger within a kind.
    #[serde(default = "default_tier")]
    pub tier: u8,
    #[serde(default)]
    pub min_depth: u32,
    /// Dice notation, weapons and bows only.
    #[serde(default)]
    pub damage: Option<String>,
    /// Shot range in tiles, bows only.
    #[serde(default)]
    pub range: i32,
    #[serde(default)]
    pub heal_base: Option<i32>,
    #[serde(default)]
    pub heal_per_level: Option<i32>,
    #[serde(default)]
    pub cures: Vec<StatusKind>,
    #[serde(default)]
    pub cures_all: bool,
    #[serde(default)]
    pub grants_resistance: Option<Element>,
    #[serde(default)]
    pub buff: Option<ItemBuff>,
    #[serde(default)]
    pub restores_mana: bool,
    #[serde(default)]
    pub spell_power: i32,
    #[serde(default)]
    pub light_radius: i32,
    #[serde(default)]
    pub armor: i32,
    #[serde(default)]
    pub to_hit: i32,
    #[serde(default)]
    pub to_damage: i32,
    #[serde(default)]
    pub abilities: Vec<ItemAbility>,
}

fn default_tier() -> u8 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub template: ItemTemplate,
    #[serde(default)]
    pub enchantment: i32,
    #[serde(default)]
    pub artifact: Option<String>,
}

impl Item {
    pub fn is_healing_potion(&self) -> bool {
        self.template.kind == ItemKind::Potion
            && (self.template.heal_base.is_some() || self.template.heal_per_level.is_some())
    }

    /// Expected HP restored at the given character level.
    pub fn heal_amount(&self, char_level: u32) -> i32 {
        let base = self.template.heal_base.unwrap_or(0);
        let per = self.template.heal_per_level.unwrap_or(0);
        base + per * char_level as i32
    }
}

/// An item lying on the dungeon floor, visible to the agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundItem {
    pub item: Item,
    pub position: Point,
}
