//! Shared fixture builders for the integration suites.
#![allow(dead_code)]

use std::collections::HashMap;

use agent_wasm::api::AgentConfig;
use agent_wasm::context::Snapshot;
use agent_wasm::model::*;

pub fn level(rows: &[&str], depth: u32) -> Level {
    Level::from_ascii(rows, depth)
}

pub fn stats() -> Stats {
    Stats {
        strength: 12,
        intellect: 12,
        wisdom: 12,
        dexterity: 12,
        constitution: 12,
    }
}

pub struct CharacterBuilder {
    character: Character,
}

impl CharacterBuilder {
    pub fn new(class: Class) -> CharacterBuilder {
        CharacterBuilder {
            character: Character {
                position: Point::new(1, 1),
                depth: 1,
                hp: 50,
                max_hp: 50,
                mana: 20,
                max_mana: 20,
                stats: stats(),
                level: 5,
                experience: 0,
                gold: 500,
                inventory: Vec::new(),
                equipment: HashMap::new(),
                status_effects: Vec::new(),
                temp_resistances: Vec::new(),
                known_spells: Vec::new(),
                spell_cooldowns: HashMap::new(),
                shapeshift_form: None,
                pets: Vec::new(),
                race: Race::Human,
                class,
            },
        }
    }

    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.character.position = Point::new(x, y);
        self
    }

    pub fn hp(mut self, hp: i32, max_hp: i32) -> Self {
        self.character.hp = hp;
        self.character.max_hp = max_hp;
        self
    }

    pub fn mana(mut self, mana: i32, max_mana: i32) -> Self {
        self.character.mana = mana;
        self.character.max_mana = max_mana;
        self
    }

    pub fn level(mut self, level: u32) -> Self {
        self.character.level = level;
        self
    }

    pub fn depth(mut self, depth: u32) -> Self {
        self.character.depth = depth;
        self
    }

    pub fn carrying(mut self, item: Item) -> Self {
        self.character.inventory.push(item);
        self
    }

    pub fn wearing(mut self, slot: EquipSlot, item: Item) -> Self {
        self.character.equipment.insert(slot, item);
        self
    }

    pub fn status(mut self, kind: StatusKind, turns: u32) -> Self {
        self.character.status_effects.push(StatusEffect {
            kind,
            turns_remaining: turns,
            value: 0,
        });
        self
    }

    pub fn knowing(mut self, spell: SpellId) -> Self {
        self.character.known_spells.push(spell);
        self
    }

    pub fn build(self) -> Character {
        self.character
    }
}

fn template(name: &str, kind: ItemKind) -> ItemTemplate {
    ItemTemplate {
        name: name.to_string(),
        kind,
        slot: None,
        tier: 1,
        min_depth: 0,
        damage: None,
        range: 0,
        heal_base: None,
        heal_per_level: None,
        cures: Vec::new(),
        cures_all: false,
        grants_resistance: None,
        buff: None,
        restores_mana: false,
        spell_power: 0,
        light_radius: 0,
        armor: 0,
        to_hit: 0,
        to_damage: 0,
        abilities: Vec::new(),
    }
}

fn item(id: ItemId, template: ItemTemplate) -> Item {
    Item {
        id,
        template,
        enchantment: 0,
        artifact: None,
    }
}

pub fn healing_potion(id: ItemId, tier: u8) -> Item {
    let mut t = template("Potion of Healing", ItemKind::Potion);
    t.tier = tier;
    t.heal_base = Some(15 * tier as i32);
    item(id, t)
}

pub fn free_action_potion(id: ItemId) -> Item {
    let mut t = template("Potion of Free Action", ItemKind::Potion);
    t.cures = vec![StatusKind::Paralyzed];
    item(id, t)
}

pub fn speed_potion(id: ItemId) -> Item {
    let mut t = template("Potion of Speed", ItemKind::Potion);
    t.buff = Some(ItemBuff {
        kind: BuffKind::Speed,
        turns: 20,
        power: 10,
    });
    item(id, t)
}

pub fn berserk_potion(id: ItemId) -> Item {
    let mut t = template("Potion of Berserk Strength", ItemKind::Potion);
    t.buff = Some(ItemBuff {
        kind: BuffKind::Berserk,
        turns: 25,
        power: 5,
    });
    item(id, t)
}

pub fn scroll(id: ItemId, name: &str) -> Item {
    item(id, template(name, ItemKind::Scroll))
}

pub fn bow(id: ItemId, range: i32) -> Item {
    let mut t = template("Long Bow", ItemKind::Bow);
    t.slot = Some(EquipSlot::Bow);
    t.damage = Some("2d6".to_string());
    t.range = range;
    item(id, t)
}

pub fn sword(id: ItemId) -> Item {
    let mut t = template("Long Sword", ItemKind::Weapon);
    t.slot = Some(EquipSlot::Weapon);
    t.damage = Some("2d5".to_string());
    item(id, t)
}

/// Slotless trinket that can never be an equip upgrade; used to fill
/// inventories for encumbrance fixtures.
pub fn junk_ring(id: ItemId) -> Item {
    item(id, template("Cracked Pebble Ring", ItemKind::Ring))
}

pub struct MonsterBuilder {
    monster: Monster,
}

impl MonsterBuilder {
    pub fn new(id: MonsterId, name: &str, damage: &str, x: i32, y: i32) -> MonsterBuilder {
        MonsterBuilder {
            monster: Monster {
                id,
                template: MonsterTemplate {
                    name: name.to_string(),
                    attacks: vec![MonsterAttack {
                        method: AttackMethod::Hit,
                        damage: damage.to_string(),
                        effect: None,
                    }],
                    spells: Vec::new(),
                    spell_frequency: 0,
                    resistances: Vec::new(),
                    immunities: Vec::new(),
                    min_depth: 1,
                    speed: NORMAL_SPEED,
                    flags: Vec::new(),
                },
                hp: 30,
                max_hp: 30,
                position: Point::new(x, y),
                energy: 0,
                awake: true,
                debuffs: Vec::new(),
                buffs: Vec::new(),
            },
        }
    }

    pub fn hp(mut self, hp: i32, max_hp: i32) -> Self {
        self.monster.hp = hp;
        self.monster.max_hp = max_hp;
        self
    }

    pub fn flag(mut self, flag: MonsterFlag) -> Self {
        self.monster.template.flags.push(flag);
        self
    }

    pub fn build(self) -> Monster {
        self.monster
    }
}

pub fn monster(id: MonsterId, damage: &str, x: i32, y: i32) -> Monster {
    MonsterBuilder::new(id, "orc", damage, x, y).build()
}

pub fn heal_spell(id: SpellId, base: i32) -> SpellTemplate {
    SpellTemplate {
        id,
        name: "Cure Wounds".to_string(),
        mana_cost: 4,
        cooldown: 0,
        range: 0,
        min_level: 1,
        effect: SpellEffect::Heal { base, per_level: 1 },
    }
}

pub fn bolt_spell(id: SpellId, dice: &str, range: i32) -> SpellTemplate {
    SpellTemplate {
        id,
        name: "Magic Bolt".to_string(),
        mana_cost: 3,
        cooldown: 0,
        range,
        min_level: 1,
        effect: SpellEffect::Damage {
            dice: dice.to_string(),
            aoe_radius: 0,
            lifedrain: false,
            element: None,
        },
    }
}

pub fn escape_spell(id: SpellId, full: bool) -> SpellTemplate {
    SpellTemplate {
        id,
        name: if full { "Teleport Self" } else { "Blink" }.to_string(),
        mana_cost: 5,
        cooldown: 0,
        range: 0,
        min_level: 1,
        effect: SpellEffect::Escape { full },
    }
}

pub fn config() -> AgentConfig {
    AgentConfig {
        preset: PersonalityPreset::Custom,
        custom: Some(PersonalityConfig {
            aggression: 50,
            greed: 50,
            caution: 50,
            exploration: 50,
            patience: 50,
        }),
        capabilities: BotCapabilities {
            farming: false,
            tactics: 2,
            town: 2,
            preparedness: 1,
            sweep: 0,
            surf: 1,
            kiting: 1,
            targeting: 1,
            retreat: 1,
            upgrade_tier: 0,
        },
        toggles: BotToggles::default(),
        depth_gate_offset: 0,
        seed: 7,
        spells: Vec::new(),
        forms: Vec::new(),
    }
}

pub fn snapshot(level: Level, character: Character, monsters: Vec<Monster>) -> Snapshot {
    Snapshot {
        level,
        character,
        monsters,
        items: Vec::new(),
        altars: Vec::new(),
        merchants: Vec::new(),
        living_unique_depths: Vec::new(),
        turn: 1,
    }
}
