//! The per-tick view handed to every policy: borrowed snapshot slices
//! plus the resolved configuration. Building a `Context` is cheap; it
//! owns nothing.

use serde::{Deserialize, Serialize};

use crate::model::{
    effective_personality, AltarState, BotCapabilities, BotToggles, Character,
    ClassBehaviorProfile, GroundItem, Level, MerchantState, Monster, PersonalityConfig,
    ShapeForm, SpellTemplate,
};

/// One tick's worth of game state as the host reports it. The wasm and
/// CLI surfaces deserialize this whole; the engine only ever borrows
/// from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub level: Level,
    pub character: Character,
    #[serde(default)]
    pub monsters: Vec<Monster>,
    #[serde(default)]
    pub items: Vec<GroundItem>,
    #[serde(default)]
    pub altars: Vec<AltarState>,
    #[serde(default)]
    pub merchants: Vec<MerchantState>,
    /// Depths of uniques still alive in the run; feeds unique hunting.
    #[serde(default)]
    pub living_unique_depths: Vec<u32>,
    pub turn: u64,
}

pub struct Context<'a> {
    pub level: &'a Level,
    pub character: &'a Character,
    /// Living monsters inside the agent's FOV, nothing else.
    pub monsters: &'a [Monster],
    pub items: &'a [GroundItem],
    pub altars: &'a [AltarState],
    pub merchants: &'a [MerchantState],
    pub spells: &'a [SpellTemplate],
    pub forms: &'a [ShapeForm],
    pub living_unique_depths: &'a [u32],
    /// Base sliders with class modifiers already applied.
    pub personality: PersonalityConfig,
    pub profile: ClassBehaviorProfile,
    /// Capability vector with runtime toggles already applied.
    pub capabilities: BotCapabilities,
    pub depth_gate_offset: i32,
    pub turn: u64,
}

impl<'a> Context<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        level: &'a Level,
        character: &'a Character,
        monsters: &'a [Monster],
        items: &'a [GroundItem],
        altars: &'a [AltarState],
        merchants: &'a [MerchantState],
        spells: &'a [SpellTemplate],
        forms: &'a [ShapeForm],
        living_unique_depths: &'a [u32],
        base_personality: PersonalityConfig,
        profile: ClassBehaviorProfile,
        capabilities: BotCapabilities,
        toggles: BotToggles,
        depth_gate_offset: i32,
        turn: u64,
    ) -> Context<'a> {
        Context {
            level,
            character,
            monsters,
            items,
            altars,
            merchants,
            spells,
            forms,
            living_unique_depths,
            personality: effective_personality(base_personality, &profile),
            profile,
            capabilities: capabilities.effective(toggles),
            depth_gate_offset,
            turn,
        }
    }

    pub fn in_town(&self) -> bool {
        self.level.depth == 0
    }

    pub fn any_monster_visible(&self) -> bool {
        self.monsters.iter().any(|m| m.hp > 0)
    }

    pub fn victory_boss(&self) -> Option<&'a Monster> {
        self.monsters.iter().find(|m| m.is_victory_boss())
    }

    pub fn closest_monster(&self) -> Option<&'a Monster> {
        self.monsters
            .iter()
            .filter(|m| m.hp > 0)
            .min_by_key(|m| {
                (
                    m.position.chebyshev(self.character.position),
                    m.id, // deterministic tie-break
                )
            })
    }

    pub fn monster_by_id(&self, id: crate::model::MonsterId) -> Option<&'a Monster> {
        self.monsters.iter().find(|m| m.id == id)
    }

    pub fn monster_at(&self, p: crate::model::Point) -> Option<&'a Monster> {
        self.monsters.iter().find(|m| m.hp > 0 && m.position == p)
    }

    pub fn is_ranged(&self) -> bool {
        self.profile.prefers_ranged || self.character.has_bow()
    }
}
