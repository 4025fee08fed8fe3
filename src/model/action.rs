//! The action union handed back to the host, one per tick. Tagged the
//! same way the host's own discriminated unions are tagged so the JSON
//! crosses the boundary without adaptation.

use serde::{Deserialize, Serialize};

use super::character::EquipSlot;
use super::types::{Direction, FormId, ItemId, MonsterId, Point, SpellId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CastTarget {
    Monster(MonsterId),
    Position(Point),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    #[serde(rename_all = "camelCase")]
    Move { direction: Direction },
    #[serde(rename_all = "camelCase")]
    Attack { monster_id: MonsterId },
    #[serde(rename_all = "camelCase")]
    RangedAttack { monster_id: MonsterId },
    #[serde(rename_all = "camelCase")]
    Pickup { item_id: ItemId },
    #[serde(rename_all = "camelCase")]
    Drop { item_id: ItemId },
    #[serde(rename_all = "camelCase")]
    Equip { item_id: ItemId },
    #[serde(rename_all = "camelCase")]
    Unequip { slot: EquipSlot },
    #[serde(rename_all = "camelCase")]
    Use { item_id: ItemId },
    Descend,
    Ascend,
    Wait,
    UseFountain,
    UseAltar,
    #[serde(rename_all = "camelCase")]
    ShopBuy {
        merchant_index: usize,
        item_index: usize,
    },
    #[serde(rename_all = "camelCase")]
    ShopSell {
        merchant_index: usize,
        inventory_index: usize,
    },
    #[serde(rename_all = "camelCase")]
    Cast {
        spell_id: SpellId,
        #[serde(default)]
        target: Option<CastTarget>,
    },
    UseReturnPortal,
    UseHealer,
    #[serde(rename_all = "camelCase")]
    Steal { monster_id: MonsterId },
    #[serde(rename_all = "camelCase")]
    Shapeshift { form_id: FormId },
    #[serde(rename_all = "camelCase")]
    Activate {
        item_id: ItemId,
        #[serde(default)]
        target_id: Option<MonsterId>,
    },
    #[serde(rename_all = "camelCase")]
    RacialAbility {
        #[serde(default)]
        target_id: Option<MonsterId>,
    },
}

impl Action {
    /// Whether this action counts as engaging in combat; the executor
    /// uses it to reset corridor-follow mode.
    pub fn is_combat(&self) -> bool {
        matches!(
            self,
            Action::Attack { .. }
                | Action::RangedAttack { .. }
                | Action::Steal { .. }
                | Action::Cast {
                    target: Some(CastTarget::Monster(_)),
                    ..
                }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_json_uses_host_tagging() {
        let a = Action::Cast {
            spell_id: 4,
            target: Some(CastTarget::Position(Point::new(3, 7))),
        };
        let json = serde_json::to_string(&a).unwrap();
        assert!(json.contains("\"type\":\"cast\""), "{}", json);
        let back: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(a, back);
    }

    #[test]
    fn wait_is_a_bare_tag() {
        assert_eq!(
            serde_json::to_string(&Action::Wait).unwrap(),
            "{\"type\":\"wait\"}"
        );
    }
}
