//! Per-agent configuration: personality sliders, class behavior
//! profiles, the graded capability vector, and runtime toggles.

use serde::{Deserialize, Serialize};

use super::character::Class;

/// Five sliders in `[0, 100]`. See the behavior table in the README for
/// what each one modulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalityConfig {
    pub aggression: i32,
    pub greed: i32,
    pub caution: i32,
    pub exploration: i32,
    pub patience: i32,
}

impl PersonalityConfig {
    pub fn clamped(self) -> PersonalityConfig {
        PersonalityConfig {
            aggression: self.aggression.clamp(0, 100),
            greed: self.greed.clamp(0, 100),
            caution: self.caution.clamp(0, 100),
            exploration: self.exploration.clamp(0, 100),
            patience: self.patience.clamp(0, 100),
        }
    }

    /// Danger above which a tile is worth fleeing.
    pub fn avoidance_threshold(&self) -> i32 {
        100 + self.aggression
    }

    /// How far off the path an item pulls the agent.
    pub fn item_detour_radius(&self) -> i32 {
        self.greed / 10 + 3
    }

    /// Minimum estimated value for a pickup to be worth a detour.
    pub fn pickup_threshold(&self) -> i32 {
        (15 - self.greed / 10).max(5)
    }

    /// Inventory-weight tolerance before a town trip looks attractive.
    pub fn encumbrance_tolerance(&self) -> f64 {
        match self.preset_shape() {
            PersonalityPreset::Cautious => 0.9,
            PersonalityPreset::Speedrunner => 0.8,
            PersonalityPreset::Greedy => 1.2,
            PersonalityPreset::Aggressive => 1.1,
            PersonalityPreset::Custom => 1.0,
        }
    }

    /// Which preset these sliders most resemble. Exact matches only;
    /// anything else is custom.
    pub fn preset_shape(&self) -> PersonalityPreset {
        for preset in [
            PersonalityPreset::Cautious,
            PersonalityPreset::Aggressive,
            PersonalityPreset::Greedy,
            PersonalityPreset::Speedrunner,
        ] {
            if preset.sliders() == Some(*self) {
                return preset;
            }
        }
        PersonalityPreset::Custom
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PersonalityPreset {
    Cautious,
    Aggressive,
    Greedy,
    Speedrunner,
    Custom,
}

impl PersonalityPreset {
    pub fn sliders(self) -> Option<PersonalityConfig> {
        match self {
            PersonalityPreset::Cautious => Some(PersonalityConfig {
                aggression: 20,
                greed: 30,
                caution: 90,
                exploration: 60,
                patience: 70,
            }),
            PersonalityPreset::Aggressive => Some(PersonalityConfig {
                aggression: 80,
                greed: 40,
                caution: 20,
                exploration: 40,
                patience: 30,
            }),
            PersonalityPreset::Greedy => Some(PersonalityConfig {
                aggression: 40,
                greed: 90,
                caution: 40,
                exploration: 60,
                patience: 60,
            }),
            PersonalityPreset::Speedrunner => Some(PersonalityConfig {
                aggression: 60,
                greed: 10,
                caution: 20,
                exploration: 20,
                patience: 5,
            }),
            PersonalityPreset::Custom => None,
        }
    }

    pub fn resolve(self, custom: Option<PersonalityConfig>) -> PersonalityConfig {
        match self.sliders() {
            Some(p) => p,
            None => custom
                .unwrap_or(PersonalityConfig {
                    aggression: 50,
                    greed: 50,
                    caution: 50,
                    exploration: 50,
                    patience: 50,
                })
                .clamped(),
        }
    }
}

/// How a class biases the shared decision machinery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassBehaviorProfile {
    pub prefers_ranged: bool,
    pub prefers_melee: bool,
    /// Heal spells before heal potions while mana lasts.
    pub heals_priority: bool,
    pub never_retreats: bool,
    pub aggression_mod: i32,
    pub caution_mod: i32,
    pub engage_distance: i32,
}

impl ClassBehaviorProfile {
    pub fn for_class(class: Class) -> ClassBehaviorProfile {
        match class {
            Class::Warrior | Class::Blackguard => ClassBehaviorProfile {
                prefers_ranged: false,
                prefers_melee: true,
                heals_priority: false,
                never_retreats: false,
                aggression_mod: 15,
                caution_mod: -10,
                engage_distance: 1,
            },
            Class::Berserker => ClassBehaviorProfile {
                prefers_ranged: false,
                prefers_melee: true,
                heals_priority: false,
                never_retreats: true,
                aggression_mod: 30,
                caution_mod: -25,
                engage_distance: 1,
            },
            Class::Paladin => ClassBehaviorProfile {
                prefers_ranged: false,
                prefers_melee: true,
                heals_priority: true,
                never_retreats: false,
                aggression_mod: 10,
                caution_mod: 0,
                engage_distance: 1,
            },
            Class::Priest | Class::Druid => ClassBehaviorProfile {
                prefers_ranged: false,
                prefers_melee: false,
                heals_priority: true,
                never_retreats: false,
                aggression_mod: -10,
                caution_mod: 15,
                engage_distance: 2,
            },
            Class::Ranger => ClassBehaviorProfile {
                prefers_ranged: true,
                prefers_melee: false,
                heals_priority: false,
                never_retreats: false,
                aggression_mod: 0,
                caution_mod: 5,
                engage_distance: 5,
            },
            Class::Rogue => ClassBehaviorProfile {
                prefers_ranged: false,
                prefers_melee: true,
                heals_priority: false,
                never_retreats: false,
                aggression_mod: 5,
                caution_mod: 10,
                engage_distance: 1,
            },
            Class::Mage | Class::Archmage | Class::Necromancer => ClassBehaviorProfile {
                prefers_ranged: true,
                prefers_melee: false,
                heals_priority: false,
                never_retreats: false,
                aggression_mod: -15,
                caution_mod: 25,
                engage_distance: 4,
            },
        }
    }
}

/// Base sliders plus class modifiers, clamped back into range.
pub fn effective_personality(
    base: PersonalityConfig,
    profile: &ClassBehaviorProfile,
) -> PersonalityConfig {
    PersonalityConfig {
        aggression: base.aggression + profile.aggression_mod,
        caution: base.caution + profile.caution_mod,
        ..base
    }
    .clamped()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClassTier {
    Tank,
    Medium,
    Squishy,
}

impl ClassTier {
    pub fn of(class: Class) -> ClassTier {
        match class {
            Class::Warrior | Class::Berserker | Class::Blackguard => ClassTier::Tank,
            Class::Mage | Class::Archmage | Class::Necromancer => ClassTier::Squishy,
            _ => ClassTier::Medium,
        }
    }
}

/// Squishy-class level offsets indexed by meta-progression upgrade tier.
const SQUISHY_OFFSETS: [i32; 5] = [5, 4, 3, 1, 0];

/// Minimum character level considered safe for a depth, by class tier
/// and meta-progression. Clamped to `[1, 50]`.
pub fn min_level_for_depth(class: Class, depth: u32, upgrade_tier: u8) -> u32 {
    let depth = depth as i32;
    let level = match ClassTier::of(class) {
        ClassTier::Tank => depth - 4,
        ClassTier::Medium => depth,
        ClassTier::Squishy => {
            let idx = (upgrade_tier as usize).min(SQUISHY_OFFSETS.len() - 1);
            depth + SQUISHY_OFFSETS[idx]
        }
    };
    level.clamp(1, 50) as u32
}

/// Graded capability vector. Zero disables a behavior family entirely;
/// higher grades unlock the richer variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BotCapabilities {
    pub farming: bool,
    pub tactics: u8,
    pub town: u8,
    pub preparedness: u8,
    pub sweep: u8,
    pub surf: u8,
    pub kiting: u8,
    pub targeting: u8,
    pub retreat: u8,
    /// Meta-progression tier feeding the squishy depth-gate offsets.
    pub upgrade_tier: u8,
}

impl Default for BotCapabilities {
    fn default() -> BotCapabilities {
        BotCapabilities {
            farming: false,
            tactics: 0,
            town: 0,
            preparedness: 0,
            sweep: 0,
            surf: 0,
            kiting: 0,
            targeting: 0,
            retreat: 0,
            upgrade_tier: 0,
        }
    }
}

/// Runtime kill-switches for unlocked boolean capabilities. Everything
/// defaults to enabled; a toggle can only take a capability away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BotToggles {
    pub farming: bool,
    pub town: bool,
    pub sweep: bool,
    pub surf: bool,
    pub kiting: bool,
}

impl Default for BotToggles {
    fn default() -> BotToggles {
        BotToggles {
            farming: true,
            town: true,
            sweep: true,
            surf: true,
            kiting: true,
        }
    }
}

impl BotCapabilities {
    /// Capabilities with runtime toggles applied.
    pub fn effective(mut self, toggles: BotToggles) -> BotCapabilities {
        if !toggles.farming {
            self.farming = false;
        }
        if !toggles.town {
            self.town = 0;
        }
        if !toggles.sweep {
            self.sweep = 0;
        }
        if !toggles.surf {
            self.surf = 0;
        }
        if !toggles.kiting {
            self.kiting = 0;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_resolve_and_custom_falls_back() {
        let p = PersonalityPreset::Cautious.resolve(None);
        assert_eq!(p.caution, 90);
        let c = PersonalityPreset::Custom.resolve(Some(PersonalityConfig {
            aggression: 140,
            greed: -5,
            caution: 50,
            exploration: 50,
            patience: 50,
        }));
        assert_eq!(c.aggression, 100);
        assert_eq!(c.greed, 0);
    }

    #[test]
    fn class_mods_clamp() {
        let base = PersonalityPreset::Aggressive.resolve(None);
        let profile = ClassBehaviorProfile::for_class(Class::Berserker);
        let eff = effective_personality(base, &profile);
        assert_eq!(eff.aggression, 100); // 80 + 30, clamped
        assert_eq!(eff.caution, 0); // 20 - 25, clamped
    }

    #[test]
    fn depth_gate_by_class_tier() {
        assert_eq!(min_level_for_depth(Class::Warrior, 10, 0), 6);
        assert_eq!(min_level_for_depth(Class::Priest, 10, 0), 10);
        assert_eq!(min_level_for_depth(Class::Mage, 8, 2), 11);
        assert_eq!(min_level_for_depth(Class::Mage, 8, 4), 8);
        assert_eq!(min_level_for_depth(Class::Warrior, 3, 0), 1);
        assert_eq!(min_level_for_depth(Class::Mage, 50, 0), 50);
    }

    #[test]
    fn toggles_only_remove() {
        let caps = BotCapabilities {
            farming: true,
            town: 3,
            kiting: 2,
            ..Default::default()
        };
        let toggles = BotToggles {
            town: false,
            ..Default::default()
        };
        let eff = caps.effective(toggles);
        assert!(eff.farming);
        assert_eq!(eff.town, 0);
        assert_eq!(eff.kiting, 2);
    }
}
