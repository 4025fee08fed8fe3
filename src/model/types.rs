use serde::{Deserialize, Serialize};

/// Stable per-run identifier for a monster instance.
pub type MonsterId = u32;
/// Stable per-run identifier for an item instance.
pub type ItemId = u32;
/// Identifier into the spell catalog.
pub type SpellId = u16;
/// Identifier into the shapeshift form catalog.
pub type FormId = u16;

/// Integer grid coordinate. The dungeon is a discrete grid; no floating
/// point coordinates ever enter the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Point {
        Point { x, y }
    }

    /// Chebyshev distance: `max(|dx|, |dy|)`. One step of 8-way movement
    /// covers one unit of this metric.
    pub fn chebyshev(&self, other: Point) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    pub fn manhattan(&self, other: Point) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Adjacent means within one king move, excluding the point itself.
    pub fn is_adjacent(&self, other: Point) -> bool {
        *self != other && self.chebyshev(other) <= 1
    }

    pub fn step(&self, dir: Direction) -> Point {
        let (dx, dy) = dir.delta();
        Point::new(self.x + dx, self.y + dy)
    }

    /// The 8 neighbours in the fixed evaluation order used everywhere in
    /// the core (cardinals before diagonals).
    pub fn neighbours(&self) -> [Point; 8] {
        let mut out = [*self; 8];
        for (i, dir) in Direction::ALL.iter().enumerate() {
            out[i] = self.step(*dir);
        }
        out
    }
}

/// 8-way movement direction. `ALL` lists the variants in the tie-break
/// order the executor relies on: cardinals first, then diagonals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::SouthEast,
        Direction::SouthWest,
    ];

    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
            Direction::NorthEast => (1, -1),
            Direction::NorthWest => (-1, -1),
            Direction::SouthEast => (1, 1),
            Direction::SouthWest => (-1, 1),
        }
    }

    /// Direction of a single king step from `from` to `to`, if they are
    /// exactly one step apart.
    pub fn between(from: Point, to: Point) -> Option<Direction> {
        let (dx, dy) = (to.x - from.x, to.y - from.y);
        Direction::ALL
            .iter()
            .copied()
            .find(|d| d.delta() == (dx, dy))
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::NorthEast => Direction::SouthWest,
            Direction::NorthWest => Direction::SouthEast,
            Direction::SouthEast => Direction::NorthWest,
            Direction::SouthWest => Direction::NorthEast,
        }
    }
}
