use crate::level::{ClauseFields, ClauseReader, LevelWriter};
use crate::math::Vector;
use std::collections::HashMap;
use std::rc::Rc;

/// Side length of one tile in world units.
pub const TILE_SIZE: f32 = 32.0;

/// Draw-order layers for tile layers.
pub const LAYER_BACKGROUND_TILES: i32 = -100;
pub const LAYER_TILES: i32 = 0;
pub const LAYER_FOREGROUND_TILES: i32 = 100;

/// Descriptor for one tile type.
///
/// `attributes` is a bitset of the `Tile::*` flags below. `data` is a
/// per-type payload: remaining coin charges for bricks, the reward
/// code for full boxes. `next_tile` is the id this tile downgrades to
/// when it is emptied, broken or grabbed.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub id: u32,
    pub attributes: u32,
    pub data: i32,
    pub next_tile: Option<u32>,
}

impl Tile {
    /// Blocks movement; part of the collision geometry.
    pub const SOLID: u32 = 1 << 0;
    /// Breakable brick (see `Sector::try_break_brick`).
    pub const BRICK: u32 = 1 << 1;
    /// Collectible coin tile.
    pub const COIN: u32 = 1 << 2;
    /// Reward box with a payload in `data`.
    pub const FULLBOX: u32 = 1 << 3;

    /// The empty tile every unknown id resolves to.
    pub const EMPTY: Tile = Tile {
        id: 0,
        attributes: 0,
        data: 0,
        next_tile: None,
    };

    pub fn has_attribute(&self, flag: u32) -> bool {
        self.attributes & flag != 0
    }
}

/// Registry of tile descriptors, shared by every tile layer of a
/// sector via `Rc`.
#[derive(Debug, Default)]
pub struct TileSet {
    tiles: HashMap<u32, Tile>,
}

impl TileSet {
    pub fn new() -> Self {
        TileSet {
            tiles: HashMap::new(),
        }
    }

    pub fn insert(&mut self, tile: Tile) {
        self.tiles.insert(tile.id, tile);
    }

    /// Look up a tile descriptor. Unknown ids resolve to the empty
    /// tile so callers never have to handle a missing descriptor.
    pub fn get(&self, id: u32) -> &Tile {
        self.tiles.get(&id).unwrap_or(&Tile::EMPTY)
    }
}

/// A rectangular grid of tile ids.
///
/// At most one layer per sector is flagged solid; that layer is the
/// collision geometry the tile-interaction helpers operate on through
/// `get_tile_at` / `change_at`.
pub struct TileMap {
    tiles: Vec<u32>,
    width: usize,
    height: usize,
    solid: bool,
    layer: i32,
    tileset: Rc<TileSet>,
}

impl TileMap {
    pub fn new(
        width: usize,
        height: usize,
        tiles: Vec<u32>,
        layer: i32,
        solid: bool,
        tileset: Rc<TileSet>,
    ) -> Option<Self> {
        if tiles.len() != width * height {
            tracing::warn!(
                width,
                height,
                tiles = tiles.len(),
                "tile layer data does not match its dimensions"
            );
            return None;
        }
        Some(TileMap {
            tiles,
            width,
            height,
            solid,
            layer,
            tileset,
        })
    }

    /// Build a tile layer from a `tilemap` clause.
    ///
    /// Returns `None` (with a diagnostic) when the clause is malformed;
    /// the loader skips such clauses and keeps going.
    pub fn parse(reader: &ClauseReader<'_>, tileset: Rc<TileSet>) -> Option<Self> {
        let width = reader.read_int("width")? as usize;
        let height = reader.read_int("height")? as usize;
        let solid = reader.read_bool("solid").unwrap_or(false);
        let layer = reader.read_int("layer").unwrap_or(LAYER_TILES as i64) as i32;
        let tiles = reader.read_int_vec("tiles")?;
        TileMap::new(width, height, tiles, layer, solid, tileset)
    }

    pub fn is_solid(&self) -> bool {
        self.solid
    }

    pub fn layer(&self) -> i32 {
        self.layer
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Tile descriptor at a world position. Positions outside the grid
    /// resolve to the empty tile.
    pub fn get_tile_at(&self, pos: Vector) -> &Tile {
        match self.cell_index(pos) {
            Some(i) => self.tileset.get(self.tiles[i]),
            None => &Tile::EMPTY,
        }
    }

    /// Replace the tile at a world position with another id.
    pub fn change_at(&mut self, pos: Vector, new_id: u32) {
        if let Some(i) = self.cell_index(pos) {
            self.tiles[i] = new_id;
        }
    }

    fn cell_index(&self, pos: Vector) -> Option<usize> {
        if pos.x < 0.0 || pos.y < 0.0 {
            return None;
        }
        let tx = (pos.x / TILE_SIZE) as usize;
        let ty = (pos.y / TILE_SIZE) as usize;
        if tx >= self.width || ty >= self.height {
            return None;
        }
        Some(ty * self.width + tx)
    }

    pub fn write(&self, writer: &mut LevelWriter) {
        writer.write_clause(
            "tilemap",
            ClauseFields::new()
                .int("width", self.width as i64)
                .int("height", self.height as i64)
                .bool("solid", self.solid)
                .int("layer", self.layer as i64)
                .int_vec("tiles", &self.tiles),
        );
    }
}
