//! Read-only level snapshot: tile grid, passability and exploration
//! bitmaps, stair locations, and the town features (altars, merchants)
//! the goal arbiter cares about.

use serde::{Deserialize, Serialize};

use super::item::Item;
use super::types::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TileKind {
    Wall,
    Floor,
    DoorOpen,
    DoorClosed,
    StairsUp,
    StairsDown,
    Fountain,
    Altar,
    TownRoad,
    Portal,
}

impl TileKind {
    /// The single source of truth for walkability. `Level::passable` must
    /// agree with this for every cell.
    pub fn is_passable(self) -> bool {
        !matches!(self, TileKind::Wall)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tile {
    pub kind: TileKind,
    pub visible: bool,
    pub explored: bool,
}

/// Immutable dungeon level snapshot. Depth 0 is the town.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    pub width: i32,
    pub height: i32,
    pub depth: u32,
    pub tiles: Vec<Tile>,
    pub stairs_up: Option<Point>,
    pub stairs_down: Option<Point>,
    /// 1 = walkable, indexed `y * width + x`. Kept consistent with
    /// `TileKind::is_passable` by the host; `validate` checks it in debug.
    pub passable: Vec<u8>,
    /// Persistent across level visits, unlike the per-visit seen grid.
    pub explored: Vec<u8>,
    pub explored_count: u32,
    pub explored_passable_count: u32,
}

impl Level {
    pub fn idx(&self, x: i32, y: i32) -> usize {
        (y * self.width + x) as usize
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    /// Tile kind at a coordinate; out-of-bounds reads as wall.
    pub fn kind(&self, x: i32, y: i32) -> TileKind {
        if !self.in_bounds(x, y) {
            return TileKind::Wall;
        }
        self.tiles[self.idx(x, y)].kind
    }

    pub fn is_passable(&self, x: i32, y: i32) -> bool {
        self.in_bounds(x, y) && self.passable[self.idx(x, y)] == 1
    }

    pub fn is_passable_point(&self, p: Point) -> bool {
        self.is_passable(p.x, p.y)
    }

    pub fn is_explored(&self, x: i32, y: i32) -> bool {
        self.in_bounds(x, y) && self.explored[self.idx(x, y)] == 1
    }

    pub fn is_visible(&self, p: Point) -> bool {
        self.in_bounds(p.x, p.y) && self.tiles[self.idx(p.x, p.y)].visible
    }

    pub fn cell_count(&self) -> usize {
        (self.width * self.height) as usize
    }

    /// Fraction of passable tiles already explored, in [0, 1].
    pub fn exploration_ratio(&self) -> f64 {
        let total = self
            .passable
            .iter()
            .filter(|&&p| p == 1)
            .count()
            .max(1);
        self.explored_passable_count as f64 / total as f64
    }

    /// Recompute the passability/exploration bitmaps and counts from the
    /// tile grid. Hosts build levels however they like; scenario files and
    /// tests go through this.
    pub fn recount(&mut self) {
        self.passable = self
            .tiles
            .iter()
            .map(|t| t.kind.is_passable() as u8)
            .collect();
        self.explored = self.tiles.iter().map(|t| t.explored as u8).collect();
        self.explored_count = self.tiles.iter().filter(|t| t.explored).count() as u32;
        self.explored_passable_count = self
            .tiles
            .iter()
            .filter(|t| t.explored && t.kind.is_passable())
            .count() as u32;
    }

    /// Build a level from ASCII rows. Legend: `#` wall, `.` floor, `+`
    /// closed door, `'` open door, `<` `>` stairs, `F` fountain, `A`
    /// altar, `=` town road, `O` portal. Every tile starts explored and
    /// visible, which is what scenario files and tests want.
    pub fn from_ascii(rows: &[&str], depth: u32) -> Level {
        let height = rows.len() as i32;
        let width = rows.first().map_or(0, |r| r.chars().count()) as i32;
        let mut tiles = Vec::with_capacity((width * height) as usize);
        let mut stairs_up = None;
        let mut stairs_down = None;
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let kind = match ch {
                    '#' => TileKind::Wall,
                    '.' => TileKind::Floor,
                    '+' => TileKind::DoorClosed,
                    '\'' => TileKind::DoorOpen,
                    '<' => TileKind::StairsUp,
                    '>' => TileKind::StairsDown,
                    'F' => TileKind::Fountain,
                    'A' => TileKind::Altar,
                    '=' => TileKind::TownRoad,
                    'O' => TileKind::Portal,
                    _ => TileKind::Floor,
                };
                if kind == TileKind::StairsUp {
                    stairs_up = Some(Point::new(x as i32, y as i32));
                }
                if kind == TileKind::StairsDown {
                    stairs_down = Some(Point::new(x as i32, y as i32));
                }
                tiles.push(Tile {
                    kind,
                    visible: true,
                    explored: true,
                });
            }
        }
        let mut level = Level {
            width,
            height,
            depth,
            tiles,
            stairs_up,
            stairs_down,
            passable: Vec::new(),
            explored: Vec::new(),
            explored_count: 0,
            explored_passable_count: 0,
        };
        level.recount();
        level
    }
}

/// A dungeon altar the agent may pray at once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AltarState {
    pub position: Point,
    pub used: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShopKind {
    General,
    Alchemist,
    Armoury,
    Weaponsmith,
    MagicShop,
    BlackMarket,
    /// The healer. Not a store; visiting it restores HP and cures.
    Temple,
}

/// A merchant, in town or (rarely) wandering the dungeon.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantState {
    pub position: Point,
    pub shop: ShopKind,
    pub stock: Vec<Item>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_round_trip_finds_stairs_and_counts() {
        let level = Level::from_ascii(
            &[
                "#####", //
                "#.>.#", //
                "#.<.#", //
                "#####",
            ],
            3,
        );
        assert_eq!(level.width, 5);
        assert_eq!(level.height, 4);
        assert_eq!(level.stairs_down, Some(Point::new(2, 1)));
        assert_eq!(level.stairs_up, Some(Point::new(2, 2)));
        assert!(level.is_passable(1, 1));
        assert!(!level.is_passable(0, 0));
        assert!(!level.is_passable(-1, 2));
        assert_eq!(level.explored_passable_count, 6);
    }

    #[test]
    fn passable_bitmap_matches_tile_kinds() {
        let level = Level::from_ascii(&["#+'<>FA=O.#"], 1);
        for x in 0..level.width {
            assert_eq!(
                level.is_passable(x, 0),
                level.kind(x, 0).is_passable(),
                "bitmap and tile kind disagree at x={}",
                x
            );
        }
    }
}
