//! Spell and shapeshift-form catalog entries, consumed as read-only
//! tables. The effect payload is a tagged union; policies match on it
//! exhaustively instead of sniffing names.

use serde::{Deserialize, Serialize};

use super::character::{Element, SummonKind};
use super::item::ItemBuff;
use super::types::{FormId, SpellId};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SpellEffect {
    #[serde(rename_all = "camelCase")]
    Damage {
        dice: String,
        /// 0 = single target.
        #[serde(default)]
        aoe_radius: u8,
        #[serde(default)]
        lifedrain: bool,
        #[serde(default)]
        element: Option<Element>,
    },
    #[serde(rename_all = "camelCase")]
    Heal {
        base: i32,
        #[serde(default)]
        per_level: i32,
    },
    Buff {
        buff: ItemBuff,
    },
    Slow,
    #[serde(rename_all = "camelCase")]
    Escape {
        /// Full teleport rather than a short phase door.
        full: bool,
    },
    #[serde(rename_all = "camelCase")]
    Summon {
        kind: SummonKind,
        limit: u8,
    },
    ShadowStep,
    DimensionDoor,
    Light,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpellTemplate {
    pub id: SpellId,
    pub name: String,
    pub mana_cost: i32,
    #[serde(default)]
    pub cooldown: u32,
    /// Maximum cast range in tiles; 0 = self only.
    #[serde(default)]
    pub range: i32,
    #[serde(default)]
    pub min_level: u32,
    pub effect: SpellEffect,
}

impl SpellTemplate {
    pub fn is_damage(&self) -> bool {
        matches!(self.effect, SpellEffect::Damage { .. })
    }

    pub fn is_heal(&self) -> bool {
        matches!(self.effect, SpellEffect::Heal { .. })
    }
}

/// Druid shapeshift form. Higher tiers unlock at higher levels; the
/// caster form (no entry) is the baseline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShapeForm {
    pub id: FormId,
    pub name: String,
    pub min_level: u32,
    pub melee_damage: String,
    #[serde(default)]
    pub armor: i32,
}
