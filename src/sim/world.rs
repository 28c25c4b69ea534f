//! Tile grid the actors collide against
//!
//! Maps are plain text: the row count, the column count, then one line per row
//! of whitespace-separated tile ids. Tiles are laid out bottom-aligned in the
//! viewport, so the last map row sits on the bottom edge of the screen.

use std::num::ParseIntError;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::actor::Direction;
use super::geometry::Aabb;
use crate::consts::BLANK_TILE;
use crate::settings::Settings;

/// Level shipped with the binary
pub const DEMO_LEVEL: &str = include_str!("../../levels/demo.map");

/// Errors raised while loading a map
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("map is missing its {0} line")]
    MissingHeader(&'static str),
    #[error("line {line}: invalid tile number {text:?}")]
    BadNumber {
        line: usize,
        text: String,
        #[source]
        source: ParseIntError,
    },
    #[error("map declares {expected} rows but has {found}")]
    MissingRows { expected: usize, found: usize },
    #[error("row {row} has {found} tiles, expected {expected}")]
    RowLength {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("map has no rows or no columns")]
    Empty,
    #[error("map has no player start tile")]
    MissingPlayer,
}

/// Raw tile ids as read from a map file, indexed `[row][col]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelLayout {
    pub rows: usize,
    pub cols: usize,
    pub ids: Vec<Vec<u32>>,
}

impl LevelLayout {
    /// Parse the text map format
    pub fn parse(text: &str) -> Result<Self, LevelError> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim()))
            .filter(|(_, l)| !l.is_empty());

        let rows = parse_header(lines.next(), "row count")?;
        let cols = parse_header(lines.next(), "column count")?;
        if rows == 0 || cols == 0 {
            return Err(LevelError::Empty);
        }

        let mut ids = Vec::with_capacity(rows);
        for row in 0..rows {
            let Some((line, text)) = lines.next() else {
                return Err(LevelError::MissingRows {
                    expected: rows,
                    found: row,
                });
            };
            let tiles = text
                .split_whitespace()
                .map(|t| parse_number(line, t))
                .collect::<Result<Vec<u32>, _>>()?;
            if tiles.len() != cols {
                return Err(LevelError::RowLength {
                    row,
                    expected: cols,
                    found: tiles.len(),
                });
            }
            ids.push(tiles);
        }

        Ok(Self { rows, cols, ids })
    }
}

fn parse_header(line: Option<(usize, &str)>, what: &'static str) -> Result<usize, LevelError> {
    let (line, text) = line.ok_or(LevelError::MissingHeader(what))?;
    parse_number(line, text).map(|n| n as usize)
}

fn parse_number(line: usize, text: &str) -> Result<u32, LevelError> {
    text.parse().map_err(|source| LevelError::BadNumber {
        line,
        text: text.to_string(),
        source,
    })
}

/// A single map tile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub bounds: Aabb,
    pub id: u32,
}

/// Where actors start. Positions are the bottom-left corner of the marker cell,
/// so actors of any height can be stood on the cell floor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoints {
    pub player: Option<Vec2>,
    pub enemies: Vec<Vec2>,
}

/// The tile grid plus the viewport it scrolls through
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileMap {
    /// Viewport width
    width: f32,
    /// Viewport height
    height: f32,
    pub decoration_threshold: u32,
    pub winning_tiles: Vec<u32>,
    pub tiles: Vec<Tile>,
    /// Screen x of the map's left edge (goes negative as the map scrolls left)
    pub map_x: f32,
    pub map_width: f32,
}

impl TileMap {
    /// Empty map with the given viewport
    pub fn new(width: f32, height: f32, decoration_threshold: u32) -> Self {
        Self {
            width,
            height,
            decoration_threshold,
            winning_tiles: Vec::new(),
            tiles: Vec::new(),
            map_x: 0.0,
            map_width: width,
        }
    }

    /// Lay out a parsed map. Marker tiles become spawn points and are replaced
    /// by blank tiles.
    pub fn from_layout(layout: &LevelLayout, settings: &Settings) -> (Self, SpawnPoints) {
        let size = settings.tile_size;
        let mut map = Self::new(
            settings.viewport_width,
            settings.viewport_height,
            settings.decoration_threshold,
        );
        map.winning_tiles = settings.winning_tiles.clone();
        map.map_width = layout.cols as f32 * size;

        let mut spawns = SpawnPoints::default();
        for (row, ids) in layout.ids.iter().enumerate() {
            let y = settings.viewport_height - (layout.rows - row) as f32 * size;
            for (col, &id) in ids.iter().enumerate() {
                let x = col as f32 * size;
                let floor = Vec2::new(x, y + size);
                let id = if id == settings.player_tile {
                    spawns.player = Some(floor);
                    BLANK_TILE
                } else if id == settings.enemy_tile {
                    spawns.enemies.push(floor);
                    BLANK_TILE
                } else {
                    id
                };
                map.tiles.push(Tile {
                    bounds: Aabb::new(x, y, size, size),
                    id,
                });
            }
        }

        (map, spawns)
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn is_decoration(&self, tile: &Tile) -> bool {
        tile.id < self.decoration_threshold
    }

    pub fn is_winning(&self, tile: &Tile) -> bool {
        self.winning_tiles.contains(&tile.id)
    }

    /// Tiles that take part in collision
    pub fn solid_tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter().filter(|t| !self.is_decoration(t))
    }

    /// How far the map can still scroll to reveal more level in `direction`
    pub fn scroll_room(&self, direction: Direction) -> f32 {
        match direction {
            Direction::Left => (-self.map_x).max(0.0),
            Direction::Right => (self.map_x + self.map_width - self.width).max(0.0),
        }
    }

    /// Scroll the map for an actor travelling in `direction`. The tiles move
    /// the opposite way; the applied offset is returned so that other
    /// world-anchored entities can follow.
    pub fn shift(&mut self, direction: Direction, amount: f32) -> Vec2 {
        let delta = Vec2::new(-direction.sign() * amount, 0.0);
        self.map_x += delta.x;
        for tile in &mut self.tiles {
            tile.bounds.translate(delta);
        }
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = "3\n4\n0 0 0 0\n0 25 26 15\n14 14 14 14\n";

    #[test]
    fn test_parse_small_map() {
        let layout = LevelLayout::parse(SMALL).unwrap();
        assert_eq!(layout.rows, 3);
        assert_eq!(layout.cols, 4);
        assert_eq!(layout.ids[2], vec![14, 14, 14, 14]);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            LevelLayout::parse(""),
            Err(LevelError::MissingHeader("row count"))
        ));
        assert!(matches!(
            LevelLayout::parse("2\n2\n0 0\n"),
            Err(LevelError::MissingRows {
                expected: 2,
                found: 1
            })
        ));
        assert!(matches!(
            LevelLayout::parse("1\n3\n0 0\n"),
            Err(LevelError::RowLength { row: 0, .. })
        ));
        assert!(matches!(
            LevelLayout::parse("1\n2\n0 x\n"),
            Err(LevelError::BadNumber { line: 3, .. })
        ));
        assert!(matches!(LevelLayout::parse("0\n2\n"), Err(LevelError::Empty)));
    }

    #[test]
    fn test_layout_is_bottom_aligned() {
        let settings = Settings::default();
        let layout = LevelLayout::parse(SMALL).unwrap();
        let (map, spawns) = TileMap::from_layout(&layout, &settings);

        assert_eq!(map.tiles.len(), 12);
        let last = map.tiles.last().unwrap();
        assert_eq!(last.bounds.bottom(), settings.viewport_height);
        assert_eq!(map.map_width, 4.0 * settings.tile_size);

        let player = spawns.player.unwrap();
        assert_eq!(player.x, settings.tile_size);
        assert_eq!(player.y, settings.viewport_height - settings.tile_size);
        assert_eq!(spawns.enemies.len(), 1);

        // Markers are blanked out
        assert!(map.tiles.iter().all(|t| t.id != 25 && t.id != 26));
    }

    #[test]
    fn test_solid_tiles_skip_decoration() {
        let settings = Settings::default();
        let layout = LevelLayout::parse(SMALL).unwrap();
        let (map, _) = TileMap::from_layout(&layout, &settings);
        // Four ground tiles plus the door
        assert_eq!(map.solid_tiles().count(), 5);
        assert_eq!(map.solid_tiles().filter(|t| map.is_winning(t)).count(), 1);
    }

    #[test]
    fn test_scroll_room_and_shift() {
        let mut map = TileMap::new(100.0, 100.0, 1);
        map.map_width = 250.0;
        map.tiles.push(Tile {
            bounds: Aabb::new(0.0, 50.0, 50.0, 50.0),
            id: 5,
        });

        assert_eq!(map.scroll_room(Direction::Left), 0.0);
        assert_eq!(map.scroll_room(Direction::Right), 150.0);

        let delta = map.shift(Direction::Right, 2.0);
        assert_eq!(delta, Vec2::new(-2.0, 0.0));
        assert_eq!(map.map_x, -2.0);
        assert_eq!(map.tiles[0].bounds.left(), -2.0);
        assert_eq!(map.scroll_room(Direction::Left), 2.0);
        assert_eq!(map.scroll_room(Direction::Right), 148.0);
    }

    #[test]
    fn test_demo_level_parses() {
        let layout = LevelLayout::parse(DEMO_LEVEL).unwrap();
        let (_, spawns) = TileMap::from_layout(&layout, &Settings::default());
        assert!(spawns.player.is_some());
        assert_eq!(spawns.enemies.len(), 2);
    }
}
