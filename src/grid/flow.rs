//! Breadth-first flow fields. A flow grid holds the 8-way step distance
//! from a goal set; the agent moves by rolling strictly downhill.

use crate::model::{Level, Point};

use super::{BfsQueue, Grid16, SeenGrid, FLOW_UNREACHABLE};

/// Multi-source BFS over the passable bitmap. Sources are seeded in
/// input order and neighbours expand in the fixed 8-way order, so the
/// result is fully deterministic. Cells farther than `max_dist` stay
/// unreachable.
pub fn bfs_flow(level: &Level, sources: &[Point], max_dist: i16, out: &mut Grid16) {
    out.reset_for(level, FLOW_UNREACHABLE);
    let mut queue = BfsQueue::with_capacity(level.cell_count());
    for src in sources {
        if !level.is_passable_point(*src) {
            continue;
        }
        if out.get(*src) != FLOW_UNREACHABLE {
            continue; // duplicate source
        }
        out.set(*src, 0);
        queue.push(level.idx(src.x, src.y) as u32);
    }
    run_bfs(level, &mut queue, max_dist, out);
}

/// Continuation of a BFS whose sources are already seeded in `out`.
fn run_bfs(level: &Level, queue: &mut BfsQueue, max_dist: i16, out: &mut Grid16) {
    while let Some(idx) = queue.pop() {
        let x = idx as i32 % level.width;
        let y = idx as i32 / level.width;
        let here = out.get(Point::new(x, y));
        if here >= max_dist {
            continue;
        }
        for n in Point::new(x, y).neighbours() {
            if !level.is_passable_point(n) {
                continue;
            }
            if out.get(n) != FLOW_UNREACHABLE {
                continue;
            }
            out.set(n, here + 1);
            queue.push(level.idx(n.x, n.y) as u32);
        }
    }
}

/// Flow toward a single target point.
pub fn flow_to_point(level: &Level, target: Point, out: &mut Grid16) {
    bfs_flow(level, &[target], super::NAV_MAX_DIST, out);
}

/// Exploration flow: multi-goal BFS from every frontier tile, where a
/// frontier is a passable tile not yet seen this visit that touches a
/// seen passable tile. Returns the frontier count (used as a cache
/// invalidation key). Zero frontiers means the visit has covered
/// everything reachable.
pub fn frontier_flow(level: &Level, seen: &SeenGrid, out: &mut Grid16) -> usize {
    out.reset_for(level, FLOW_UNREACHABLE);
    let mut queue = BfsQueue::with_capacity(level.cell_count());
    let mut frontiers = 0;
    for y in 0..level.height {
        for x in 0..level.width {
            let p = Point::new(x, y);
            if !level.is_passable_point(p) || seen.is_seen(p) {
                continue;
            }
            let touches_seen = p
                .neighbours()
                .iter()
                .any(|n| level.is_passable_point(*n) && seen.is_seen(*n));
            if touches_seen {
                out.set(p, 0);
                queue.push(level.idx(x, y) as u32);
                frontiers += 1;
            }
        }
    }
    run_bfs(level, &mut queue, super::NAV_MAX_DIST, out);
    frontiers
}

/// Plain flood fill from a seed; returns the number of reachable
/// passable cells. `out` doubles as the visited set.
pub fn flood_count(level: &Level, seed: Point, out: &mut Grid16) -> u32 {
    bfs_flow(level, &[seed], super::NAV_MAX_DIST, out);
    out.cells()
        .iter()
        .filter(|&&c| c != FLOW_UNREACHABLE)
        .count() as u32
}

/// Strictly-downhill neighbour of `from`, cardinal-first tie-break.
/// `None` when no neighbour improves on the current cell, which the
/// executor reports as no-progress.
pub fn downhill_step(level: &Level, grid: &Grid16, from: Point) -> Option<Point> {
    let here = grid.get(from);
    let mut best: Option<(i16, Point)> = None;
    for n in from.neighbours() {
        if !level.is_passable_point(n) {
            continue;
        }
        let v = grid.get(n);
        if v >= here {
            continue;
        }
        match best {
            Some((bv, _)) if bv <= v => {}
            _ => best = Some((v, n)),
        }
    }
    best.map(|(_, p)| p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Level;

    #[test]
    fn single_source_distances() {
        let level = Level::from_ascii(
            &[
                "#####", //
                "#...#", //
                "#.#.#", //
                "#...#", //
                "#####",
            ],
            1,
        );
        let mut out = Grid16::empty();
        flow_to_point(&level, Point::new(1, 1), &mut out);
        assert_eq!(out.get(Point::new(1, 1)), 0);
        assert_eq!(out.get(Point::new(3, 1)), 2);
        // around the pillar: two steps along the top row, one down
        assert_eq!(out.get(Point::new(3, 3)), 3);
        assert_eq!(out.get(Point::new(2, 2)), FLOW_UNREACHABLE);
    }

    #[test]
    fn multi_source_takes_nearest() {
        let level = Level::from_ascii(&["......."], 1);
        let mut out = Grid16::empty();
        bfs_flow(
            &level,
            &[Point::new(0, 0), Point::new(6, 0)],
            50,
            &mut out,
        );
        assert_eq!(out.get(Point::new(1, 0)), 1);
        assert_eq!(out.get(Point::new(5, 0)), 1);
        assert_eq!(out.get(Point::new(3, 0)), 3);
    }

    #[test]
    fn max_dist_truncates() {
        let level = Level::from_ascii(&[".........."], 1);
        let mut out = Grid16::empty();
        bfs_flow(&level, &[Point::new(0, 0)], 3, &mut out);
        assert_eq!(out.get(Point::new(3, 0)), 3);
        assert_eq!(out.get(Point::new(4, 0)), FLOW_UNREACHABLE);
    }

    #[test]
    fn downhill_prefers_cardinals_on_ties() {
        let level = Level::from_ascii(&["...", "...", "..."], 1);
        let mut out = Grid16::empty();
        flow_to_point(&level, Point::new(1, 0), &mut out);
        // From (1,2): N neighbour (1,1) and both upper diagonals all have
        // distance 1; the cardinal wins.
        assert_eq!(
            downhill_step(&level, &out, Point::new(1, 2)),
            Some(Point::new(1, 1))
        );
    }

    #[test]
    fn frontier_flow_finds_unseen_border() {
        let level = Level::from_ascii(&["....."], 1);
        let mut seen = SeenGrid::empty();
        seen.reset_for(&level);
        seen.mark(Point::new(0, 0));
        seen.mark(Point::new(1, 0));
        let mut out = Grid16::empty();
        let frontiers = frontier_flow(&level, &seen, &mut out);
        assert_eq!(frontiers, 1); // (2,0) touches seen (1,0)
        assert_eq!(out.get(Point::new(2, 0)), 0);
        assert_eq!(out.get(Point::new(0, 0)), 2);
    }
}
