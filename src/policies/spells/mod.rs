//! Spell policies, one file per school. Each returns `Option<Action>`
//! and is free of side effects; the tier handler owns sequencing.

pub mod damage;
pub mod debuff;
pub mod escape;
pub mod heal;
pub mod mobility;
pub mod summon;

pub use damage::{damage_spell, melee_average};
pub use debuff::{debuff_spell, smart_debuff};
pub use escape::escape_spell;
pub use heal::heal_spell;
pub use mobility::{dimension_door_kite, shadow_step};
pub use summon::summon_spell;
