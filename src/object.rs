//! Object model for the sector
//!
//! Every simulated thing in a sector is an `Object`. The enum carries
//! an explicit kind per variant, so index bookkeeping in the registry
//! and dispatch in the collision resolver are total `match`es checked
//! at compile time - there is no runtime type inspection anywhere.
//!
//! # Capability traits
//!
//! - `GameObject`: per-frame update plus the validity flag the
//!   end-of-frame reclaim pass reads.
//! - `LevelSerializable` (in `level`): objects that persist themselves
//!   into the level description.
//!
//! Deep entity behavior (player physics, enemy AI, particle motion)
//! deliberately stays minimal here; this crate defines the contract
//! those behaviors plug into.

use crate::background::Background;
use crate::camera::Camera;
use crate::effects::{BouncyBrick, BouncyCoin, BrickDebris, FloatingScore};
use crate::enemy::Enemy;
use crate::level::{LevelSerializable, LevelWriter};
use crate::math::Rectangle;
use crate::particles::{CloudParticles, SnowParticles};
use crate::platforms::{FlyingPlatform, Trampoline};
use crate::player::Player;
use crate::powerup::PowerUp;
use crate::projectile::Projectile;
use crate::render::DrawingContext;
use crate::sector::Sector;
use crate::tile::TileMap;

/// Horizontal facing, used for movement and for orienting rewards
/// away from the impact side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Death progression shared by the player and enemies. Dying objects
/// are skipped by most collision passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DyingState {
    #[default]
    Not,
    /// Flattened by a squish; lingers briefly, then despawns.
    Squished,
    /// Knocked out; falls off the screen.
    Falling,
}

/// How a collision was classified by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionKind {
    Normal,
    /// The player landed on top of the receiver.
    Squish,
    /// The receiver was hit through the tile it stands on.
    Bump,
}

/// What kind of thing the other party of a collision is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    Player,
    Enemy,
    Projectile,
    PowerUp,
    Trampoline,
    FlyingPlatform,
}

/// Snapshot of the other party handed to a collision callback.
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    pub kind: ContactKind,
    pub base: Rectangle,
}

/// Concrete kind of an object. Total function of the `Object` variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Player,
    Camera,
    Background,
    TileLayer,
    Enemy,
    Projectile,
    PowerUp,
    Trampoline,
    FlyingPlatform,
    SnowParticles,
    CloudParticles,
    FloatingScore,
    BouncyCoin,
    BouncyBrick,
    BrickDebris,
}

/// The kinds the registry keeps collision indices for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackedKind {
    Projectile,
    Enemy,
    PowerUp,
    Trampoline,
    FlyingPlatform,
}

impl ObjectKind {
    /// Which collision index (if any) objects of this kind live in.
    /// An object belongs to at most one index.
    pub fn tracked(self) -> Option<TrackedKind> {
        match self {
            ObjectKind::Projectile => Some(TrackedKind::Projectile),
            ObjectKind::Enemy => Some(TrackedKind::Enemy),
            ObjectKind::PowerUp => Some(TrackedKind::PowerUp),
            ObjectKind::Trampoline => Some(TrackedKind::Trampoline),
            ObjectKind::FlyingPlatform => Some(TrackedKind::FlyingPlatform),
            ObjectKind::Player
            | ObjectKind::Camera
            | ObjectKind::Background
            | ObjectKind::TileLayer
            | ObjectKind::SnowParticles
            | ObjectKind::CloudParticles
            | ObjectKind::FloatingScore
            | ObjectKind::BouncyCoin
            | ObjectKind::BouncyBrick
            | ObjectKind::BrickDebris => None,
        }
    }
}

/// Per-frame update contract every object fulfils.
pub trait GameObject {
    /// Advance by `elapsed` seconds. `sector` is available for
    /// spawning, scoring and tile interaction; the receiver is checked
    /// out of the registry for the duration of the call.
    fn update(&mut self, sector: &mut Sector, elapsed: f32);

    /// False once the object should be reclaimed at frame end.
    fn is_valid(&self) -> bool {
        true
    }
}

/// A live object in the sector. Owned exclusively by the registry
/// from registration until reclaim.
pub enum Object {
    Player(Player),
    Camera(Camera),
    Background(Background),
    TileLayer(TileMap),
    Enemy(Enemy),
    Projectile(Projectile),
    PowerUp(PowerUp),
    Trampoline(Trampoline),
    FlyingPlatform(FlyingPlatform),
    SnowParticles(SnowParticles),
    CloudParticles(CloudParticles),
    FloatingScore(FloatingScore),
    BouncyCoin(BouncyCoin),
    BouncyBrick(BouncyBrick),
    BrickDebris(BrickDebris),
}

impl Object {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Object::Player(_) => ObjectKind::Player,
            Object::Camera(_) => ObjectKind::Camera,
            Object::Background(_) => ObjectKind::Background,
            Object::TileLayer(_) => ObjectKind::TileLayer,
            Object::Enemy(_) => ObjectKind::Enemy,
            Object::Projectile(_) => ObjectKind::Projectile,
            Object::PowerUp(_) => ObjectKind::PowerUp,
            Object::Trampoline(_) => ObjectKind::Trampoline,
            Object::FlyingPlatform(_) => ObjectKind::FlyingPlatform,
            Object::SnowParticles(_) => ObjectKind::SnowParticles,
            Object::CloudParticles(_) => ObjectKind::CloudParticles,
            Object::FloatingScore(_) => ObjectKind::FloatingScore,
            Object::BouncyCoin(_) => ObjectKind::BouncyCoin,
            Object::BouncyBrick(_) => ObjectKind::BouncyBrick,
            Object::BrickDebris(_) => ObjectKind::BrickDebris,
        }
    }

    pub fn tracked_kind(&self) -> Option<TrackedKind> {
        self.kind().tracked()
    }

    pub fn is_valid(&self) -> bool {
        match self {
            Object::Player(o) => o.is_valid(),
            Object::Camera(o) => o.is_valid(),
            Object::Background(o) => o.is_valid(),
            Object::TileLayer(_) => true,
            Object::Enemy(o) => o.is_valid(),
            Object::Projectile(o) => o.is_valid(),
            Object::PowerUp(o) => o.is_valid(),
            Object::Trampoline(o) => o.is_valid(),
            Object::FlyingPlatform(o) => o.is_valid(),
            Object::SnowParticles(o) => o.is_valid(),
            Object::CloudParticles(o) => o.is_valid(),
            Object::FloatingScore(o) => o.is_valid(),
            Object::BouncyCoin(o) => o.is_valid(),
            Object::BouncyBrick(o) => o.is_valid(),
            Object::BrickDebris(o) => o.is_valid(),
        }
    }

    /// Current bounding rectangle, for objects that have one.
    pub fn bounds(&self) -> Option<Rectangle> {
        match self {
            Object::Player(o) => Some(o.base),
            Object::Enemy(o) => Some(o.base),
            Object::Projectile(o) => Some(o.base),
            Object::PowerUp(o) => Some(o.base),
            Object::Trampoline(o) => Some(o.base),
            Object::FlyingPlatform(o) => Some(o.base),
            _ => None,
        }
    }

    pub(crate) fn update(&mut self, sector: &mut Sector, elapsed: f32) {
        match self {
            Object::Player(o) => o.update(sector, elapsed),
            Object::Camera(o) => o.update(sector, elapsed),
            Object::Background(o) => o.update(sector, elapsed),
            Object::TileLayer(_) => {}
            Object::Enemy(o) => o.update(sector, elapsed),
            Object::Projectile(o) => o.update(sector, elapsed),
            Object::PowerUp(o) => o.update(sector, elapsed),
            Object::Trampoline(o) => o.update(sector, elapsed),
            Object::FlyingPlatform(o) => o.update(sector, elapsed),
            Object::SnowParticles(o) => o.update(sector, elapsed),
            Object::CloudParticles(o) => o.update(sector, elapsed),
            Object::FloatingScore(o) => o.update(sector, elapsed),
            Object::BouncyCoin(o) => o.update(sector, elapsed),
            Object::BouncyBrick(o) => o.update(sector, elapsed),
            Object::BrickDebris(o) => o.update(sector, elapsed),
        }
    }

    /// Route a collision callback to the receiver. Kinds without a
    /// collision response ignore the call.
    pub(crate) fn collision(&mut self, sector: &mut Sector, contact: &Contact, kind: CollisionKind) {
        match self {
            Object::Player(o) => o.collision(sector, contact, kind),
            Object::Enemy(o) => o.collision(sector, contact, kind),
            Object::Projectile(o) => o.collision(contact, kind),
            Object::PowerUp(o) => o.collision(sector, contact, kind),
            Object::Trampoline(o) => o.collision(contact, kind),
            Object::FlyingPlatform(o) => o.collision(contact, kind),
            _ => {}
        }
    }

    /// Draw inside the camera scope the sector has already applied.
    /// Sprite output lives in the embedding game's renderer; the core
    /// only guarantees draw order and the transform scope.
    pub(crate) fn draw(&self, _context: &mut dyn DrawingContext) {}

    /// Emit this object's level clause if it is serializable.
    pub(crate) fn write_level(&self, writer: &mut LevelWriter) {
        match self {
            Object::Camera(o) => o.write(writer),
            Object::Background(o) => o.write(writer),
            Object::TileLayer(o) => o.write(writer),
            Object::Enemy(o) => o.write(writer),
            Object::Trampoline(o) => o.write(writer),
            Object::FlyingPlatform(o) => o.write(writer),
            _ => {}
        }
    }
}
