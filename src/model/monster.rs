//! Monster snapshot types. Threat estimation works off the dice-average
//! of template attacks; the danger model owns the armor scaling.

use serde::{Deserialize, Serialize};

use crate::dice;

use super::character::{Element, StatusKind};
use super::types::{MonsterId, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttackMethod {
    Hit,
    Bite,
    Claw,
    Sting,
    Touch,
    Gaze,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttackEffect {
    Elemental(Element),
    Inflicts(StatusKind),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonsterAttack {
    pub method: AttackMethod,
    /// Dice notation, e.g. `2d6+1`.
    pub damage: String,
    #[serde(default)]
    pub effect: Option<AttackEffect>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MonsterSpell {
    Bolt(Element),
    Heal,
    Haste,
    Summon,
    Blink,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MonsterFlag {
    Unique,
    Boss,
    /// The named unique whose death ends the run.
    Victory,
    NeverFlee,
    Invisible,
    Regenerates,
}

/// Normal speed; a haste effect adds 10, a slow subtracts 10.
pub const NORMAL_SPEED: i32 = 110;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonsterTemplate {
    pub name: String,
    pub attacks: Vec<MonsterAttack>,
    #[serde(default)]
    pub spells: Vec<MonsterSpell>,
    /// 1-in-N chance per turn of casting; 0 = never.
    #[serde(default)]
    pub spell_frequency: u8,
    #[serde(default)]
    pub resistances: Vec<Element>,
    #[serde(default)]
    pub immunities: Vec<Element>,
    #[serde(default)]
    pub min_depth: u32,
    #[serde(default = "default_speed")]
    pub speed: i32,
    #[serde(default)]
    pub flags: Vec<MonsterFlag>,
}

fn default_speed() -> i32 {
    NORMAL_SPEED
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MonsterCondition {
    Slowed,
    Hasted,
    Confused,
    Terrified,
    Rooted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonsterBuff {
    pub kind: MonsterCondition,
    pub turns_remaining: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Monster {
    pub id: MonsterId,
    pub template: MonsterTemplate,
    pub hp: i32,
    pub max_hp: i32,
    pub position: Point,
    #[serde(default)]
    pub energy: i32,
    #[serde(default = "default_awake")]
    pub awake: bool,
    #[serde(default)]
    pub debuffs: Vec<MonsterBuff>,
    #[serde(default)]
    pub buffs: Vec<MonsterBuff>,
}

fn default_awake() -> bool {
    true
}

impl Monster {
    pub fn has_flag(&self, flag: MonsterFlag) -> bool {
        self.template.flags.contains(&flag)
    }

    pub fn is_unique(&self) -> bool {
        self.has_flag(MonsterFlag::Unique)
    }

    pub fn is_boss(&self) -> bool {
        self.has_flag(MonsterFlag::Boss)
    }

    pub fn is_victory_boss(&self) -> bool {
        self.has_flag(MonsterFlag::Victory)
    }

    /// Average damage of one full attack routine, before armor.
    pub fn average_damage(&self) -> f64 {
        self.template
            .attacks
            .iter()
            .map(|a| dice::average(&a.damage))
            .sum()
    }

    pub fn has_condition(&self, kind: MonsterCondition) -> bool {
        self.debuffs
            .iter()
            .chain(self.buffs.iter())
            .any(|b| b.kind == kind)
    }

    pub fn condition_turns(&self, kind: MonsterCondition) -> u32 {
        self.debuffs
            .iter()
            .chain(self.buffs.iter())
            .filter(|b| b.kind == kind)
            .map(|b| b.turns_remaining)
            .max()
            .unwrap_or(0)
    }

    pub fn effective_speed(&self) -> i32 {
        let mut speed = self.template.speed;
        if self.has_condition(MonsterCondition::Hasted) {
            speed += 10;
        }
        if self.has_condition(MonsterCondition::Slowed) {
            speed -= 10;
        }
        speed
    }

    pub fn has_elemental_attack(&self, element: Element) -> bool {
        self.template
            .attacks
            .iter()
            .any(|a| a.effect == Some(AttackEffect::Elemental(element)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monster(attacks: &[&str]) -> Monster {
        Monster {
            id: 1,
            template: MonsterTemplate {
                name: "test orc".into(),
                attacks: attacks
                    .iter()
                    .map(|d| MonsterAttack {
                        method: AttackMethod::Hit,
                        damage: (*d).into(),
                        effect: None,
                    })
                    .collect(),
                spells: Vec::new(),
                spell_frequency: 0,
                resistances: Vec::new(),
                immunities: Vec::new(),
                min_depth: 1,
                speed: NORMAL_SPEED,
                flags: Vec::new(),
            },
            hp: 10,
            max_hp: 10,
            position: Point::new(0, 0),
            energy: 0,
            awake: true,
            debuffs: Vec::new(),
            buffs: Vec::new(),
        }
    }

    #[test]
    fn attack_routine_averages_sum() {
        let m = monster(&["1d6", "2d4+1"]);
        // 3.5 + 6.0
        assert!((m.average_damage() - 9.5).abs() < 1e-9);
    }

    #[test]
    fn haste_and_slow_shift_speed() {
        let mut m = monster(&["1d4"]);
        assert_eq!(m.effective_speed(), NORMAL_SPEED);
        m.buffs.push(MonsterBuff {
            kind: MonsterCondition::Hasted,
            turns_remaining: 5,
        });
        assert_eq!(m.effective_speed(), NORMAL_SPEED + 10);
        m.debuffs.push(MonsterBuff {
            kind: MonsterCondition::Slowed,
            turns_remaining: 5,
        });
        assert_eq!(m.effective_speed(), NORMAL_SPEED);
    }
}
