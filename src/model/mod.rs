pub mod action;
pub mod character;
pub mod config;
pub mod goal;
pub mod item;
pub mod level;
pub mod monster;
pub mod spell;
pub mod types;

pub use action::{Action, CastTarget};
pub use character::{
    Character, Class, Element, EquipSlot, Pet, Race, Stats, StatusEffect, StatusKind, SummonKind,
};
pub use config::{
    effective_personality, min_level_for_depth, BotCapabilities, BotToggles, ClassBehaviorProfile,
    ClassTier, PersonalityConfig, PersonalityPreset,
};
pub use goal::{Goal, GoalKind};
pub use item::{BuffKind, GroundItem, Item, ItemAbility, ItemBuff, ItemKind, ItemTemplate};
pub use level::{AltarState, Level, MerchantState, ShopKind, Tile, TileKind};
pub use monster::{
    AttackEffect, AttackMethod, Monster, MonsterAttack, MonsterBuff, MonsterCondition, MonsterFlag,
    MonsterSpell, MonsterTemplate, NORMAL_SPEED,
};
pub use spell::{ShapeForm, SpellEffect, SpellTemplate};
pub use types::{Direction, FormId, ItemId, MonsterId, Point, SpellId};
