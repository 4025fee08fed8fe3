//! Snapshot pins for the host-facing JSON shapes. The wire format is
//! shared with a TypeScript host, so these lock the casing and tagging.

mod common;

use agent_wasm::api::decide_snapshot;
use agent_wasm::model::*;
use agent_wasm::state::AgentState;
use agent_wasm::Prng;
use common::*;

#[test]
fn idle_agent_waits() {
    let map = level(&["#####", "#...#", "#####"], 1);
    let character = CharacterBuilder::new(Class::Warrior).at(1, 1).build();
    let snap = snapshot(map, character, Vec::new());

    let mut state = AgentState::new();
    let mut rng = Prng::seeded(1);
    let action = decide_snapshot(&snap, &config(), &mut state, &mut rng);
    insta::assert_json_snapshot!(action, @r###"
    {
      "type": "wait"
    }
    "###);
}

#[test]
fn consumable_action_wire_shape() {
    let map = level(&["#####", "#...#", "#####"], 1);
    let character = CharacterBuilder::new(Class::Warrior)
        .at(1, 1)
        .hp(30, 50)
        .status(StatusKind::Paralyzed, 2)
        .carrying(free_action_potion(1))
        .build();
    let monsters = vec![monster(10, "1d6", 2, 1)];
    let snap = snapshot(map, character, monsters);

    let mut state = AgentState::new();
    let mut rng = Prng::seeded(1);
    let action = decide_snapshot(&snap, &config(), &mut state, &mut rng);
    insta::assert_json_snapshot!(action, @r###"
    {
      "type": "use",
      "itemId": 1
    }
    "###);
}

#[test]
fn cast_action_wire_shape() {
    let action = Action::Cast {
        spell_id: 4,
        target: Some(CastTarget::Position(Point::new(3, 7))),
    };
    insta::assert_json_snapshot!(action, @r###"
    {
      "type": "cast",
      "spellId": 4,
      "target": {
        "position": {
          "x": 3,
          "y": 7
        }
      }
    }
    "###);
}

#[test]
fn decision_event_wire_shape() {
    let map = level(&["#####", "#...#", "#####"], 1);
    let character = CharacterBuilder::new(Class::Warrior).at(1, 1).build();
    let snap = snapshot(map, character, Vec::new());

    let mut state = AgentState::new();
    let mut rng = Prng::seeded(1);
    decide_snapshot(&snap, &config(), &mut state, &mut rng);
    let last = state.decision_log.last().expect("one event logged");
    insta::assert_json_snapshot!(last, @r###"
    {
      "turn": 1,
      "tier": "safe",
      "goal": "wait",
      "policy": "executor",
      "action": {
        "type": "wait"
      }
    }
    "###);
}
