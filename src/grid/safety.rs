//! Escape-route flow: BFS distance from every monster, over-inverted,
//! then smoothed with a Dijkstra pass seeded at the global safety
//! maxima. The over-inversion (×1.2 of the step cost) is what makes a
//! cornered agent sprint past a monster toward a distant open room
//! instead of backing into the nearest dead end.

use crate::model::{Level, Point};

use super::flow::bfs_flow;
use super::{Grid16, FLOW_UNREACHABLE, MAX_BFS_DIST};

/// Dijkstra step cost between adjacent cells.
pub const SAFETY_STEP_COST: i16 = 5;
/// Per-BFS-step inversion multiplier: `5 * -1.2 = -6`.
pub const SAFETY_INVERT_MULT: i16 = -6;
/// Cells within this much of the global minimum seed the rescan.
pub const SAFETY_ANCHOR_THRESHOLD: i16 = 15;
/// Downhill walk cap when picking an escape target.
pub const MAX_ESCAPE_LOOKAHEAD: usize = 10;

/// Pre-allocated min-heap keyed on cost with insertion-order
/// tie-breaking. Stale entries are skipped on pop by comparing against
/// the current best grid.
#[derive(Debug, Clone, Default)]
struct CostHeap {
    entries: Vec<(i32, u32, u32)>, // (cost, seq, cell index)
    seq: u32,
}

impl CostHeap {
    fn clear(&mut self) {
        self.entries.clear();
        self.seq = 0;
    }

    fn push(&mut self, cost: i32, idx: u32) {
        self.entries.push((cost, self.seq, idx));
        self.seq += 1;
        let mut i = self.entries.len() - 1;
        while i > 0 {
            let parent = (i - 1) / 2;
            if self.entries[parent] <= self.entries[i] {
                break;
            }
            self.entries.swap(parent, i);
            i = parent;
        }
    }

    fn pop(&mut self) -> Option<(i32, u32)> {
        if self.entries.is_empty() {
            return None;
        }
        let last = self.entries.len() - 1;
        self.entries.swap(0, last);
        let (cost, _, idx) = self.entries.pop()?;
        let mut i = 0;
        loop {
            let (l, r) = (2 * i + 1, 2 * i + 2);
            let mut smallest = i;
            if l < self.entries.len() && self.entries[l] < self.entries[smallest] {
                smallest = l;
            }
            if r < self.entries.len() && self.entries[r] < self.entries[smallest] {
                smallest = r;
            }
            if smallest == i {
                break;
            }
            self.entries.swap(i, smallest);
            i = smallest;
        }
        Some((cost, idx))
    }
}

/// Reusable buffers for the safety computation. One per agent, owned by
/// its state; nothing here is shared.
#[derive(Debug, Clone)]
pub struct SafetyFlow {
    monster_dist: Grid16,
    heap: CostHeap,
}

impl Default for SafetyFlow {
    fn default() -> SafetyFlow {
        SafetyFlow {
            monster_dist: Grid16::empty(),
            heap: CostHeap::default(),
        }
    }
}

impl SafetyFlow {
    /// Build the safety gradient into `out`. Lower values are safer.
    /// Cells unreachable from any monster keep the sentinel and are
    /// never chosen as escape targets.
    pub fn compute(&mut self, level: &Level, monsters: &[Point], out: &mut Grid16) {
        bfs_flow(level, monsters, MAX_BFS_DIST, &mut self.monster_dist);
        out.reset_for(level, FLOW_UNREACHABLE);

        // Over-invert the monster distance and find the global minimum.
        let mut global_min = i16::MAX;
        for i in 0..self.monster_dist.len() {
            let d = self.monster_dist.cells()[i];
            if d == FLOW_UNREACHABLE {
                continue;
            }
            let inv = d * SAFETY_INVERT_MULT;
            if inv < global_min {
                global_min = inv;
            }
        }
        if global_min == i16::MAX {
            return; // no reachable cell, caller falls through
        }

        // Anchor cells seed the rescan at their inverted value.
        self.heap.clear();
        for y in 0..level.height {
            for x in 0..level.width {
                let p = Point::new(x, y);
                let d = self.monster_dist.get(p);
                if d == FLOW_UNREACHABLE {
                    continue;
                }
                let inv = d * SAFETY_INVERT_MULT;
                if inv <= global_min + SAFETY_ANCHOR_THRESHOLD {
                    out.set(p, inv);
                    self.heap.push(inv as i32, level.idx(x, y) as u32);
                }
            }
        }

        // Dijkstra outward from the anchors, step cost 5.
        while let Some((cost, idx)) = self.heap.pop() {
            let x = idx as i32 % level.width;
            let y = idx as i32 / level.width;
            let p = Point::new(x, y);
            if (out.get(p) as i32) < cost {
                continue; // stale entry
            }
            for n in p.neighbours() {
                if !level.is_passable_point(n) {
                    continue;
                }
                if self.monster_dist.get(n) == FLOW_UNREACHABLE {
                    continue;
                }
                let next = cost + SAFETY_STEP_COST as i32;
                if next < out.get(n) as i32 {
                    out.set(n, next as i16);
                    self.heap.push(next, level.idx(n.x, n.y) as u32);
                }
            }
        }
    }
}

/// Roll downhill from `from` for up to `MAX_ESCAPE_LOOKAHEAD` strictly
/// improving steps, skipping monster-occupied and already-visited
/// cells. Returns the final cell, or `None` when no step improved.
pub fn escape_target(
    level: &Level,
    safety: &Grid16,
    from: Point,
    occupied: &[Point],
) -> Option<Point> {
    let mut visited = [from; MAX_ESCAPE_LOOKAHEAD + 1];
    let mut visited_len = 1;
    let mut here = from;
    for _ in 0..MAX_ESCAPE_LOOKAHEAD {
        let current = safety.get(here);
        let mut best: Option<(i16, Point)> = None;
        for n in here.neighbours() {
            if !level.is_passable_point(n) {
                continue;
            }
            if occupied.contains(&n) || visited[..visited_len].contains(&n) {
                continue;
            }
            let v = safety.get(n);
            if v >= current || v == FLOW_UNREACHABLE {
                continue;
            }
            match best {
                Some((bv, _)) if bv <= v => {}
                _ => best = Some((v, n)),
            }
        }
        match best {
            Some((_, next)) => {
                visited[visited_len] = next;
                visited_len += 1;
                here = next;
            }
            None => break,
        }
    }
    if here == from {
        None
    } else {
        Some(here)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Level;

    #[test]
    fn gradient_descends_away_from_monster() {
        let level = Level::from_ascii(&["........."], 1);
        let monster = Point::new(0, 0);
        let mut flow = SafetyFlow::default();
        let mut out = Grid16::empty();
        flow.compute(&level, &[monster], &mut out);
        // The far end is the anchor; values rise back toward the monster.
        assert!(out.get(Point::new(8, 0)) < out.get(Point::new(4, 0)));
        assert!(out.get(Point::new(4, 0)) < out.get(Point::new(1, 0)));
    }

    #[test]
    fn escape_target_improves_safety() {
        let level = Level::from_ascii(&["........."], 1);
        let monster = Point::new(0, 0);
        let mut flow = SafetyFlow::default();
        let mut out = Grid16::empty();
        flow.compute(&level, &[monster], &mut out);
        let from = Point::new(2, 0);
        let target = escape_target(&level, &out, from, &[monster]).expect("escape exists");
        assert!(out.get(target) < out.get(from));
    }

    #[test]
    fn dead_end_funnel_escapes_past_the_mouth() {
        // Agent boxed into a 3-tile dead end; a large room lies past the
        // corridor mouth where two monsters stand. The over-inversion
        // must anchor deep in the room, so the greedy walk heads toward
        // the mouth and slips around the monsters instead of backing
        // into the corner.
        let level = Level::from_ascii(
            &[
                "######################",
                "####.................#",
                "#....................#",
                "####.................#",
                "####.................#",
                "######################",
            ],
            1,
        );
        let monsters = [Point::new(4, 2), Point::new(5, 2)];
        let mut flow = SafetyFlow::default();
        let mut out = Grid16::empty();
        flow.compute(&level, &monsters, &mut out);
        let agent = Point::new(2, 2);
        // The dead-end corner must not be an attractor: deep room beats it.
        assert!(out.get(Point::new(18, 2)) < out.get(Point::new(1, 2)));
        let target = escape_target(&level, &out, agent, &monsters).expect("escape exists");
        assert!(out.get(target) < out.get(agent));
        assert!(
            target.x > agent.x,
            "escape should head past the mouth, got {:?}",
            target
        );
    }
}
