//! Room Templates
//!
//! Hand-authored 10x10 layouts plus the spawn data the run sequencer places
//! into each room. Templates are plain data: the core reads spawn lists and
//! portal positions, the presentation layer reads tiles and theme colours.
//!
//! Spawn coordinates are expected to land on floor tiles; nothing here
//! validates that.

use serde::{Serialize, Deserialize};

use crate::core::rng::DeterministicRng;
use crate::core::vec2::Vec2;
use crate::game::element::Element;

/// World units per tile.
pub const TILE_SIZE: f32 = 32.0;

// =============================================================================
// TILES
// =============================================================================

/// Tile kind. Discriminants match the authored grid values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Tile {
    /// Walkable ground
    Floor = 0,
    /// Solid wall
    Wall = 1,
    /// Hole in the floor
    Pit = 2,
    /// Knee-high blocker
    LowObstacle = 3,
}

impl Tile {
    /// Decode an authored grid value. Unknown values read as walls.
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Tile::Floor,
            2 => Tile::Pit,
            3 => Tile::LowObstacle,
            _ => Tile::Wall,
        }
    }

    /// Only floor is walkable.
    #[inline]
    pub fn is_walkable(self) -> bool {
        self == Tile::Floor
    }
}

/// Row-major tile grid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGrid {
    rows: Vec<Vec<Tile>>,
}

impl TileGrid {
    /// Build from authored integer rows.
    pub fn from_rows<const W: usize>(rows: &[[u8; W]]) -> Self {
        Self {
            rows: rows
                .iter()
                .map(|row| row.iter().map(|v| Tile::from_u8(*v)).collect())
                .collect(),
        }
    }

    /// (width, height) in tiles.
    pub fn dimensions(&self) -> (usize, usize) {
        let height = self.rows.len();
        let width = self.rows.first().map_or(0, |r| r.len());
        (width, height)
    }

    /// Tile at a column/row, `None` outside the grid.
    pub fn tile_at(&self, col: usize, row: usize) -> Option<Tile> {
        self.rows.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Whether a world position lies on a floor tile.
    pub fn is_walkable(&self, position: Vec2) -> bool {
        if position.x < 0.0 || position.y < 0.0 {
            return false;
        }
        let col = (position.x / TILE_SIZE) as usize;
        let row = (position.y / TILE_SIZE) as usize;
        self.tile_at(col, row).is_some_and(Tile::is_walkable)
    }

    /// Rows for rendering.
    pub fn rows(&self) -> &[Vec<Tile>] {
        &self.rows
    }
}

// =============================================================================
// THEMES
// =============================================================================

/// Visual/elemental theme of a room.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomTheme {
    /// Volcanic
    Fire,
    /// Flooded
    Water,
    /// Cavern
    Earth,
    /// Sky
    Air,
    /// Ruins (rest rooms)
    Neutral,
}

/// Presentation data for a theme (RGB colours as 0xRRGGBB).
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThemeStyle {
    pub name: &'static str,
    pub floor_color: u32,
    pub wall_color: u32,
    pub pit_color: u32,
    pub obstacle_color: u32,
    pub ambient_tint: Option<u32>,
    pub dominant_element: Element,
}

impl RoomTheme {
    /// Themes drawn for normal and boss rooms.
    pub const ELEMENTAL: [RoomTheme; 4] =
        [RoomTheme::Fire, RoomTheme::Water, RoomTheme::Earth, RoomTheme::Air];

    /// Element whose totems and enemies dominate the room.
    pub fn dominant_element(self) -> Element {
        self.style().dominant_element
    }

    /// Colours and display name.
    pub fn style(self) -> ThemeStyle {
        match self {
            RoomTheme::Fire => ThemeStyle {
                name: "Volcanic Chamber",
                floor_color: 0x8b4513,
                wall_color: 0x3a1f0f,
                pit_color: 0xff4400,
                obstacle_color: 0x654321,
                ambient_tint: Some(0xff6622),
                dominant_element: Element::Fire,
            },
            RoomTheme::Water => ThemeStyle {
                name: "Aquatic Depths",
                floor_color: 0x4a7c8f,
                wall_color: 0x1f3a4f,
                pit_color: 0x0a1f3a,
                obstacle_color: 0x5a8ca0,
                ambient_tint: Some(0x4488cc),
                dominant_element: Element::Water,
            },
            RoomTheme::Earth => ThemeStyle {
                name: "Stone Cavern",
                floor_color: 0x7a8566,
                wall_color: 0x3f4735,
                pit_color: 0x2a2f20,
                obstacle_color: 0x6b7558,
                ambient_tint: Some(0x88aa77),
                dominant_element: Element::Earth,
            },
            RoomTheme::Air => ThemeStyle {
                name: "Sky Sanctum",
                floor_color: 0xc0d9e8,
                wall_color: 0x6b8394,
                pit_color: 0x87ceeb,
                obstacle_color: 0xa0b5c5,
                ambient_tint: Some(0xaaddff),
                dominant_element: Element::Air,
            },
            // Neutral falls back to fire for anything element-driven
            RoomTheme::Neutral => ThemeStyle {
                name: "Ancient Ruins",
                floor_color: 0x88aa88,
                wall_color: 0x444444,
                pit_color: 0x0b213a,
                obstacle_color: 0xb58c4a,
                ambient_tint: None,
                dominant_element: Element::Fire,
            },
        }
    }
}

/// Pick a random elemental theme.
pub fn random_theme(rng: &mut DeterministicRng) -> RoomTheme {
    rng.choose(&RoomTheme::ELEMENTAL).copied().unwrap_or(RoomTheme::Neutral)
}

// =============================================================================
// TEMPLATES
// =============================================================================

/// Room category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    /// Totems and enemies
    Normal,
    /// Safe zone
    Rest,
    /// Final room
    Boss,
}

/// Totem placement.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TotemSpawn {
    pub position: Vec2,
    pub element: Element,
}

/// Enemy placement. `health: None` uses the enemy default.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub position: Vec2,
    pub element: Element,
    pub health: Option<u32>,
}

/// Static description of one room.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoomTemplate {
    /// Category
    pub room_type: RoomType,
    /// Layout
    pub tiles: TileGrid,
    /// Totems placed on load
    pub totem_spawns: Vec<TotemSpawn>,
    /// Enemies placed on load
    pub enemy_spawns: Vec<EnemySpawn>,
    /// Where the portal appears once cleared
    pub exit_portal: Vec2,
    /// Player spawn point
    pub player_start: Vec2,
    /// Theme, if any
    pub theme: Option<RoomTheme>,
}

fn totem(x: f32, y: f32, element: Element) -> TotemSpawn {
    TotemSpawn { position: Vec2::new(x, y), element }
}

fn enemy(x: f32, y: f32, element: Element, health: u32) -> EnemySpawn {
    EnemySpawn { position: Vec2::new(x, y), element, health: Some(health) }
}

const PORTAL: Vec2 = Vec2::new(160.0, 270.0);

/// Open arena with a central pit.
pub fn open_arena(theme: RoomTheme) -> RoomTemplate {
    let main = theme.dominant_element();
    let other = main.contrast();
    RoomTemplate {
        room_type: RoomType::Normal,
        tiles: TileGrid::from_rows(&[
            [1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 0, 3, 3, 0, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 2, 2, 2, 2, 0, 0, 1],
            [1, 0, 0, 2, 2, 2, 2, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 3, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
        ]),
        totem_spawns: vec![
            totem(96.0, 96.0, main),
            totem(224.0, 96.0, main),
            totem(96.0, 224.0, other),
            totem(224.0, 224.0, other),
        ],
        enemy_spawns: vec![
            enemy(80.0, 120.0, main, 30),
            enemy(240.0, 120.0, main, 30),
            enemy(160.0, 200.0, main, 35),
        ],
        exit_portal: PORTAL,
        player_start: Vec2::new(160.0, 50.0),
        theme: Some(theme),
    }
}

/// Room with four 2x2 pillars.
pub fn pillar_room(theme: RoomTheme) -> RoomTemplate {
    let main = theme.dominant_element();
    let other = main.contrast();
    RoomTemplate {
        room_type: RoomType::Normal,
        tiles: TileGrid::from_rows(&[
            [1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 1, 1, 0, 0, 1, 1, 0, 1],
            [1, 0, 1, 1, 0, 0, 1, 1, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 1, 1, 0, 0, 1, 1, 0, 1],
            [1, 0, 1, 1, 0, 0, 1, 1, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
        ]),
        totem_spawns: vec![
            totem(64.0, 160.0, main),
            totem(256.0, 160.0, main),
            totem(160.0, 80.0, other),
            totem(160.0, 240.0, other),
        ],
        enemy_spawns: vec![
            enemy(112.0, 80.0, main, 30),
            enemy(208.0, 80.0, main, 30),
            enemy(64.0, 240.0, main, 32),
            enemy(256.0, 240.0, main, 32),
        ],
        exit_portal: PORTAL,
        player_start: Vec2::new(160.0, 50.0),
        theme: Some(theme),
    }
}

/// Winding corridors.
pub fn maze_room(theme: RoomTheme) -> RoomTemplate {
    let main = theme.dominant_element();
    let other = main.contrast();
    RoomTemplate {
        room_type: RoomType::Normal,
        tiles: TileGrid::from_rows(&[
            [1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
            [1, 0, 0, 0, 1, 0, 0, 0, 0, 1],
            [1, 0, 1, 0, 1, 0, 1, 1, 0, 1],
            [1, 0, 1, 0, 0, 0, 0, 1, 0, 1],
            [1, 0, 1, 1, 1, 1, 0, 1, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 1, 0, 1],
            [1, 1, 1, 0, 1, 1, 1, 1, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
        ]),
        totem_spawns: vec![
            totem(64.0, 64.0, main),
            totem(256.0, 64.0, main),
            totem(64.0, 240.0, other),
            totem(256.0, 240.0, other),
        ],
        enemy_spawns: vec![
            enemy(96.0, 96.0, main, 28),
            enemy(224.0, 160.0, main, 30),
        ],
        exit_portal: PORTAL,
        player_start: Vec2::new(64.0, 50.0),
        theme: Some(theme),
    }
}

/// Safe room: no totems, no enemies.
pub fn rest_room() -> RoomTemplate {
    RoomTemplate {
        room_type: RoomType::Rest,
        tiles: TileGrid::from_rows(&[
            [1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 1, 1, 1, 1, 0, 0, 1],
            [1, 0, 0, 1, 0, 0, 1, 0, 0, 1],
            [1, 0, 0, 1, 0, 0, 1, 0, 0, 1],
            [1, 0, 0, 1, 1, 1, 1, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
        ]),
        totem_spawns: Vec::new(),
        enemy_spawns: Vec::new(),
        exit_portal: PORTAL,
        player_start: Vec2::new(160.0, 50.0),
        theme: Some(RoomTheme::Neutral),
    }
}

/// Final arena: six totems, a boss and two guards.
pub fn boss_room(theme: RoomTheme) -> RoomTemplate {
    let main = theme.dominant_element();
    let other = main.contrast();
    RoomTemplate {
        room_type: RoomType::Boss,
        tiles: TileGrid::from_rows(&[
            [1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 0, 1, 1, 0, 0, 0, 1],
            [1, 0, 0, 0, 1, 1, 0, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
        ]),
        totem_spawns: vec![
            totem(80.0, 80.0, main),
            totem(240.0, 80.0, main),
            totem(80.0, 240.0, other),
            totem(240.0, 240.0, other),
            totem(160.0, 100.0, main),
            // Even count per element so the room can be fully matched
            totem(160.0, 220.0, main),
        ],
        enemy_spawns: vec![
            enemy(160.0, 160.0, main, 80),
            enemy(100.0, 140.0, main, 40),
            enemy(220.0, 140.0, main, 40),
        ],
        exit_portal: PORTAL,
        player_start: Vec2::new(160.0, 50.0),
        theme: Some(theme),
    }
}

/// Every normal layout in the given theme.
pub fn normal_rooms(theme: RoomTheme) -> Vec<RoomTemplate> {
    vec![open_arena(theme), pillar_room(theme), maze_room(theme)]
}

/// A random normal layout in a random elemental theme.
pub fn random_normal_room(rng: &mut DeterministicRng) -> RoomTemplate {
    let theme = random_theme(rng);
    match rng.next_int(3) {
        0 => open_arena(theme),
        1 => pillar_room(theme),
        _ => maze_room(theme),
    }
}

/// Make sure a room has at least one matchable pair.
///
/// With two or more spawns and no element appearing twice, the second spawn
/// takes the first spawn's element. Rooms with fewer than two spawns are
/// returned unchanged.
pub fn ensure_totem_pair(mut room: RoomTemplate) -> RoomTemplate {
    if room.totem_spawns.len() < 2 {
        return room;
    }

    let mut counts = [0usize; Element::COUNT];
    for spawn in &room.totem_spawns {
        counts[spawn.element.index()] += 1;
    }

    if counts.iter().all(|c| *c < 2) {
        room.totem_spawns[1].element = room.totem_spawns[0].element;
    }
    room
}
