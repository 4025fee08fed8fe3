//! Long-lived agent state: everything that survives between ticks.
//! The whole record serializes, so a host can checkpoint a bot and
//! resume it with identical behavior; only scratch buffers are skipped
//! and rebuilt on demand.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::events::DecisionLog;
use crate::grid::safety::SafetyFlow;
use crate::grid::{Grid16, SeenGrid};
use crate::model::{Direction, Goal, ItemId, Level, MonsterId, Point};

/// Positions remembered for anti-oscillation.
pub const STEP_HISTORY_LENGTH: usize = 25;
/// HP deltas averaged into `hp_rate`.
pub const HP_HISTORY_LENGTH: usize = 5;
/// Hard cap on carried equipment-sized items before a town trip.
pub const EQUIPMENT_INVENTORY_LIMIT: usize = 20;

/// A flow grid stamped with what it was computed from. Stale stamps
/// mean rebuild; the buffer itself is always reused.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowCache {
    pub grid: Grid16,
    pub computed_at: u64,
    #[serde(default)]
    pub target: Option<Point>,
    #[serde(default)]
    pub origin: Option<Point>,
}

impl FlowCache {
    /// Valid for the same target; the caller layers its own age limit.
    pub fn is_current_target(&self, target: Point) -> bool {
        self.computed_at != 0 && self.target == Some(target)
    }

    pub fn stamp(&mut self, turn: u64, target: Option<Point>, origin: Option<Point>) {
        self.computed_at = turn;
        self.target = target;
        self.origin = origin;
    }
}

/// Exploration/sweep flow cache keyed on coverage rather than a target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExploreCache {
    pub grid: Grid16,
    pub computed_at: u64,
    pub seen_count: u32,
    pub explored_count: u32,
    pub frontiers: u32,
}

impl ExploreCache {
    pub fn is_current(&self, seen_count: u32, explored_count: u32) -> bool {
        self.computed_at != 0
            && self.seen_count == seen_count
            && self.explored_count == explored_count
            && self.frontiers > 0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TownNeeds {
    pub town_portals: u32,
    pub healing_potions: u32,
    pub escape_scrolls: u32,
}

impl TownNeeds {
    pub fn any(&self) -> bool {
        self.town_portals > 0 || self.healing_potions > 0 || self.escape_scrolls > 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentState {
    // -- movement history -------------------------------------------------
    pub recent_positions: VecDeque<Point>,
    pub twitch_counter: u32,
    pub last_progress_turn: u64,

    // -- goal -------------------------------------------------------------
    pub current_goal: Option<Goal>,
    /// Mirror of `current_goal.target`; kept in sync by `set_goal`.
    pub goal_target: Option<Point>,
    pub flee_cooldown_until: u64,

    // -- level bookkeeping ------------------------------------------------
    /// Last turn upkeep ran; repeated calls within a turn are no-ops so
    /// re-deciding an unchanged tick cannot skew the histories.
    pub upkeep_turn: Option<u64>,
    pub current_depth: Option<u32>,
    /// Depth before the last level change; detects stair yo-yoing.
    pub previous_depth: Option<u32>,
    pub level_enter_turn: u64,
    pub turns_on_level: u64,
    pub known_stairs_down: Option<Point>,
    pub known_stairs_up: Option<Point>,
    pub seen_this_visit: SeenGrid,

    // -- caches -----------------------------------------------------------
    pub cached_flow: FlowCache,
    pub cached_danger: FlowCache,
    pub cached_safety_flow: FlowCache,
    pub cached_exploration_flow: ExploreCache,
    pub cached_sweep_flow: ExploreCache,
    #[serde(skip)]
    pub safety_buffers: SafetyFlow,

    // -- town -------------------------------------------------------------
    pub is_in_town: bool,
    pub town_entry_turn: u64,
    pub healer_visited: bool,
    pub shops_sold: HashSet<usize>,
    pub shops_bought: HashSet<usize>,
    pub town_needs: TownNeeds,
    pub last_town_portal_reason: Option<String>,
    pub consumables_to_sell: HashSet<ItemId>,

    // -- corridor following -----------------------------------------------
    pub corridor_mode: bool,
    pub corridor_dir: Option<Direction>,

    // -- blacklists -------------------------------------------------------
    /// Unreachable goal points with their expiry turns.
    pub blacklisted_targets: Vec<(Point, u64)>,
    pub blacklisted_items: HashMap<ItemId, u64>,

    // -- farming ----------------------------------------------------------
    pub farming_mode: bool,
    pub farm_blocked_depth: Option<u32>,
    pub farm_gold_target: u64,
    pub farm_start_turn: u64,

    // -- tethered exploration ---------------------------------------------
    pub tethered_origin: Option<Point>,
    /// One of {0, 2, 4}.
    pub tethered_radius: u8,
    pub tethered_flip_count: u32,
    pub last_flip_turn: u64,

    // -- sweep ------------------------------------------------------------
    pub sweep_mode: bool,
    pub sweep_direction: Option<Direction>,
    pub sweep_start_turn: u64,
    pub sweep_exhausted: bool,
    pub sweep_flip_count: u32,
    pub last_sweep_flip_turn: u64,

    // -- unique hunting ---------------------------------------------------
    pub hunt_flip_count: u32,
    pub last_hunt_flip_turn: u64,

    // -- hp tracking ------------------------------------------------------
    pub previous_hp: i32,
    pub hp_history: VecDeque<i32>,
    /// Signed average per-turn HP delta over the history window.
    pub hp_rate: i32,

    // -- kiting -----------------------------------------------------------
    pub kite_target_id: Option<MonsterId>,
    pub kite_target_start_turn: u64,

    // -- cautious retreat -------------------------------------------------
    pub danger_blocked_descent: bool,

    // -- trace ------------------------------------------------------------
    pub decision_log: DecisionLog,
}

impl Default for AgentState {
    fn default() -> AgentState {
        AgentState {
            recent_positions: VecDeque::with_capacity(STEP_HISTORY_LENGTH),
            twitch_counter: 0,
            last_progress_turn: 0,
            current_goal: None,
            goal_target: None,
            flee_cooldown_until: 0,
            upkeep_turn: None,
            current_depth: None,
            previous_depth: None,
            level_enter_turn: 0,
            turns_on_level: 0,
            known_stairs_down: None,
            known_stairs_up: None,
            seen_this_visit: SeenGrid::empty(),
            cached_flow: FlowCache::default(),
            cached_danger: FlowCache::default(),
            cached_safety_flow: FlowCache::default(),
            cached_exploration_flow: ExploreCache::default(),
            cached_sweep_flow: ExploreCache::default(),
            safety_buffers: SafetyFlow::default(),
            is_in_town: false,
            town_entry_turn: 0,
            healer_visited: false,
            shops_sold: HashSet::new(),
            shops_bought: HashSet::new(),
            town_needs: TownNeeds::default(),
            last_town_portal_reason: None,
            consumables_to_sell: HashSet::new(),
            corridor_mode: false,
            corridor_dir: None,
            blacklisted_targets: Vec::new(),
            blacklisted_items: HashMap::new(),
            farming_mode: false,
            farm_blocked_depth: None,
            farm_gold_target: 0,
            farm_start_turn: 0,
            tethered_origin: None,
            tethered_radius: 0,
            tethered_flip_count: 0,
            last_flip_turn: 0,
            sweep_mode: false,
            sweep_direction: None,
            sweep_start_turn: 0,
            sweep_exhausted: false,
            sweep_flip_count: 0,
            last_sweep_flip_turn: 0,
            hunt_flip_count: 0,
            last_hunt_flip_turn: 0,
            previous_hp: 0,
            hp_history: VecDeque::with_capacity(HP_HISTORY_LENGTH),
            hp_rate: 0,
            kite_target_id: None,
            kite_target_start_turn: 0,
            danger_blocked_descent: false,
            decision_log: DecisionLog::default(),
        }
    }
}

impl AgentState {
    pub fn new() -> AgentState {
        AgentState::default()
    }

    /// Per-tick upkeep before any decision runs: level-change detection,
    /// seen-grid accumulation, stair memory, HP history, blacklist expiry.
    pub fn begin_turn(&mut self, level: &Level, position: Point, hp: i32, turn: u64) {
        if self.upkeep_turn == Some(turn) && self.current_depth == Some(level.depth) {
            return;
        }
        self.upkeep_turn = Some(turn);
        if self.current_depth != Some(level.depth) {
            self.on_level_change(level, turn);
            self.tethered_origin = Some(position);
        }
        self.turns_on_level = turn.saturating_sub(self.level_enter_turn);

        // Fold this tick's FOV into the per-visit seen grid.
        for y in 0..level.height {
            for x in 0..level.width {
                let p = Point::new(x, y);
                if level.is_visible(p) {
                    self.seen_this_visit.mark(p);
                }
            }
        }

        // Remember stairs once they have been seen.
        if self.known_stairs_down.is_none() {
            if let Some(stairs) = level.stairs_down {
                if level.is_explored(stairs.x, stairs.y) {
                    self.known_stairs_down = Some(stairs);
                }
            }
        }
        if self.known_stairs_up.is_none() {
            if let Some(stairs) = level.stairs_up {
                if level.is_explored(stairs.x, stairs.y) {
                    self.known_stairs_up = Some(stairs);
                }
            }
        }

        // HP history and rate.
        if self.previous_hp != 0 || !self.hp_history.is_empty() {
            let delta = hp - self.previous_hp;
            if self.hp_history.len() == HP_HISTORY_LENGTH {
                self.hp_history.pop_front();
            }
            self.hp_history.push_back(delta);
            let sum: i32 = self.hp_history.iter().sum();
            self.hp_rate = sum / self.hp_history.len() as i32;
        }
        self.previous_hp = hp;

        self.note_position(position);

        self.blacklisted_targets.retain(|(_, expiry)| *expiry > turn);
        self.blacklisted_items.retain(|_, expiry| *expiry > turn);
    }

    fn on_level_change(&mut self, level: &Level, turn: u64) {
        log::info!(
            "entering depth {} at turn {} (was {:?})",
            level.depth,
            turn,
            self.current_depth
        );
        // Returning straight to the depth we just left counts as a flip.
        if self.previous_depth == Some(level.depth) {
            self.tethered_flip_count += 1;
            self.last_flip_turn = turn;
        }
        self.previous_depth = self.current_depth;
        self.current_depth = Some(level.depth);
        self.level_enter_turn = turn;
        self.turns_on_level = 0;
        self.known_stairs_down = None;
        self.known_stairs_up = None;
        self.seen_this_visit.reset_for(level);
        self.current_goal = None;
        self.goal_target = None;
        self.corridor_mode = false;
        self.corridor_dir = None;
        self.sweep_mode = false;
        self.sweep_direction = None;
        self.sweep_exhausted = false;
        self.tethered_origin = None;
        self.kite_target_id = None;
        self.blacklisted_targets.clear();
        self.recent_positions.clear();
        self.twitch_counter = 0;
        self.danger_blocked_descent = false;

        // Cache stamps go stale by construction.
        self.cached_flow = FlowCache::default();
        self.cached_safety_flow = FlowCache::default();
        self.cached_exploration_flow = ExploreCache::default();
        self.cached_sweep_flow = ExploreCache::default();

        let entering_town = level.depth == 0;
        if entering_town && !self.is_in_town {
            self.town_entry_turn = turn;
            self.healer_visited = false;
            self.shops_sold.clear();
            self.shops_bought.clear();
        }
        self.is_in_town = entering_town;
    }

    pub fn note_position(&mut self, p: Point) {
        if self.recent_positions.back() == Some(&p) {
            return;
        }
        if self.recent_positions.len() == STEP_HISTORY_LENGTH {
            self.recent_positions.pop_front();
        }
        self.recent_positions.push_back(p);
    }

    /// How many times `p` appears in the step history; feeds the
    /// executor's oscillation penalty.
    pub fn oscillation_count(&self, p: Point) -> usize {
        self.recent_positions.iter().filter(|&&q| q == p).count()
    }

    /// Called whenever a dispatched action is accepted. Movement resets
    /// the twitch counter; anything else only refreshes the progress turn.
    pub fn record_progress(&mut self, turn: u64, position_changed: bool) {
        self.last_progress_turn = turn;
        if position_changed {
            self.twitch_counter = 0;
        }
    }

    pub fn set_goal(&mut self, goal: Goal) {
        self.goal_target = goal.target;
        self.current_goal = Some(goal);
    }

    pub fn clear_goal(&mut self) {
        self.current_goal = None;
        self.goal_target = None;
    }

    pub fn blacklist_target(&mut self, p: Point, until: u64) {
        if let Some(entry) = self.blacklisted_targets.iter_mut().find(|(q, _)| *q == p) {
            entry.1 = entry.1.max(until);
        } else {
            self.blacklisted_targets.push((p, until));
        }
    }

    pub fn is_target_blacklisted(&self, p: Point, turn: u64) -> bool {
        self.blacklisted_targets
            .iter()
            .any(|(q, expiry)| *q == p && *expiry > turn)
    }

    pub fn blacklist_item(&mut self, id: ItemId, until: u64) {
        let entry = self.blacklisted_items.entry(id).or_insert(0);
        *entry = (*entry).max(until);
    }

    pub fn is_item_blacklisted(&self, id: ItemId, turn: u64) -> bool {
        self.blacklisted_items
            .get(&id)
            .map_or(false, |&expiry| expiry > turn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Level;

    #[test]
    fn level_change_resets_visit_state_not_run_state() {
        let l1 = Level::from_ascii(&["...."], 1);
        let l2 = Level::from_ascii(&["....."], 2);
        let mut state = AgentState::new();
        state.begin_turn(&l1, Point::new(0, 0), 20, 10);
        state.farm_gold_target = 500;
        state.blacklist_target(Point::new(3, 0), 100);
        assert_eq!(state.current_depth, Some(1));
        assert!(state.seen_this_visit.count() > 0);

        state.begin_turn(&l2, Point::new(0, 0), 20, 11);
        assert_eq!(state.current_depth, Some(2));
        assert_eq!(state.level_enter_turn, 11);
        assert!(state.blacklisted_targets.is_empty());
        // Run-scoped fields persist.
        assert_eq!(state.farm_gold_target, 500);
    }

    #[test]
    fn seen_grid_resets_per_visit() {
        let level = Level::from_ascii(&["....."], 3);
        let mut state = AgentState::new();
        state.begin_turn(&level, Point::new(0, 0), 10, 1);
        let seen_before = state.seen_this_visit.count();
        assert!(seen_before > 0);

        // Same depth again after a detour through depth 2.
        let other = Level::from_ascii(&["..."], 2);
        state.begin_turn(&other, Point::new(0, 0), 10, 2);
        state.begin_turn(&level, Point::new(0, 0), 10, 3);
        assert_eq!(state.seen_this_visit.count(), seen_before);
        assert_eq!(state.level_enter_turn, 3);
    }

    #[test]
    fn hp_rate_tracks_recent_deltas() {
        let level = Level::from_ascii(&["..."], 1);
        let mut state = AgentState::new();
        state.begin_turn(&level, Point::new(0, 0), 50, 1);
        for (turn, hp) in [(2, 45), (3, 40), (4, 35)] {
            state.begin_turn(&level, Point::new(0, 0), hp, turn);
        }
        assert!(state.hp_rate < 0);
        assert!(state.hp_history.len() <= HP_HISTORY_LENGTH);
    }

    #[test]
    fn oscillation_counts_duplicates() {
        let mut state = AgentState::new();
        let a = Point::new(1, 1);
        let b = Point::new(2, 1);
        for _ in 0..3 {
            state.note_position(a);
            state.note_position(b);
        }
        assert_eq!(state.oscillation_count(a), 3);
        assert_eq!(state.oscillation_count(Point::new(9, 9)), 0);
    }

    #[test]
    fn goal_target_mirror_stays_in_sync() {
        let mut state = AgentState::new();
        let goal = crate::model::Goal::new(crate::model::GoalKind::Explore, "frontier", 5)
            .at(Point::new(4, 4));
        state.set_goal(goal);
        assert_eq!(state.goal_target, Some(Point::new(4, 4)));
        assert_eq!(
            state.current_goal.as_ref().unwrap().target,
            state.goal_target
        );
    }
}
