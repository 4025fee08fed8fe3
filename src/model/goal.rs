use serde::{Deserialize, Serialize};

use super::types::{ItemId, MonsterId, Point};

/// Strategic intent chosen by the arbiter. The executor turns the
/// current goal into movement; the tier handler can pre-empt it with a
/// reactive action at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GoalKind {
    Kill,
    Take,
    Descend,
    Flee,
    Explore,
    Recover,
    Wait,
    Kite,
    HuntUnique,
    UseAltar,
    VisitMerchant,
    SellToMerchant,
    VisitHealer,
    BuyFromMerchant,
    ReturnPortal,
    ExitTown,
    Farm,
    AscendToFarm,
    TownTrip,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub kind: GoalKind,
    #[serde(default)]
    pub target: Option<Point>,
    #[serde(default)]
    pub target_monster: Option<MonsterId>,
    #[serde(default)]
    pub target_item: Option<ItemId>,
    pub reason: String,
    pub start_turn: u64,
}

impl Goal {
    pub fn new(kind: GoalKind, reason: &str, turn: u64) -> Goal {
        Goal {
            kind,
            target: None,
            target_monster: None,
            target_item: None,
            reason: reason.to_string(),
            start_turn: turn,
        }
    }

    pub fn at(mut self, target: Point) -> Goal {
        self.target = Some(target);
        self
    }

    pub fn monster(mut self, id: MonsterId) -> Goal {
        self.target_monster = Some(id);
        self
    }

    pub fn item(mut self, id: ItemId) -> Goal {
        self.target_item = Some(id);
        self
    }
}
