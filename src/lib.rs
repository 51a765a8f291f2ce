//! Sector core for a 2D side-scrolling platformer.
//!
//! A *sector* is one simulated area of a level: an insertion-ordered
//! registry of game objects, a set of tile layers (exactly one of
//! which is the solid collision geometry), the player's carry-over
//! status and the music selection. This crate provides:
//!
//! - loading sectors from the current ordered-clause level schema and
//!   the legacy flat schema, and writing them back out ([`Sector::parse`],
//!   [`Sector::parse_legacy`], [`Sector::write`]);
//! - the per-frame simulation sequence: bounds check, update pass,
//!   type-pair collision resolution, reclaim ([`Sector::advance`]);
//! - tile interaction: breakable bricks with a shared charge counter,
//!   reward boxes, coins, and bumping objects through tiles;
//! - collaborator traits for the embedding game's renderer
//!   ([`DrawingContext`]) and audio backend ([`MusicPlayer`]).
//!
//! Rendering, input and kind-specific AI stay in the embedding game;
//! the types here carry exactly the state the simulation needs.

mod audio;
mod background;
mod camera;
mod collision;
mod effects;
mod enemy;
mod level;
mod math;
mod object;
mod particles;
mod platforms;
mod player;
mod powerup;
mod projectile;
mod registry;
mod render;
mod sector;
mod status;
mod tile;

pub use audio::{MusicHandle, MusicKind, MusicPlayer, fast_variant};
pub use background::{Background, Color};
pub use camera::{Camera, SCREEN_HEIGHT, SCREEN_WIDTH};
pub use effects::{BouncyBrick, BouncyCoin, BrickDebris, FloatingScore};
pub use enemy::{Enemy, EnemyKind};
pub use level::{
    Clause, ClauseFields, ClauseReader, LevelSerializable, LevelWriter, LoadError, clauses,
};
pub use math::{Rectangle, Vector, rect_collision, rect_collision_offset};
pub use object::{
    CollisionKind, Contact, ContactKind, Direction, DyingState, GameObject, Object, ObjectKind,
    TrackedKind,
};
pub use particles::{CloudParticles, SnowParticles};
pub use platforms::{FlyingPlatform, Trampoline};
pub use player::{Player, PlayerSize, ShotPower};
pub use powerup::{PowerUp, PowerUpKind};
pub use projectile::{Projectile, ProjectileKind};
pub use registry::{ObjectId, ObjectRegistry};
pub use render::DrawingContext;
pub use sector::{Sector, SpawnPoint};
pub use status::{BonusKind, PlayerStatus, SCORE_BRICK, SCORE_COIN, SCORE_SQUISH};
pub use tile::{
    LAYER_BACKGROUND_TILES, LAYER_FOREGROUND_TILES, LAYER_TILES, TILE_SIZE, Tile, TileMap, TileSet,
};
