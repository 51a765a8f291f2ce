//! Ride-on objects: trampolines and flying platforms.
//!
//! Both are tracked kinds with their own collision pass. Trampolines
//! react to ascent and descent; flying platforms only carry a player
//! landing on top - there is no behavior for contact from below.

use crate::level::{ClauseFields, ClauseReader, LevelSerializable, LevelWriter};
use crate::math::{Rectangle, Vector};
use crate::object::{CollisionKind, Contact, ContactKind, GameObject};
use crate::sector::Sector;

/// How long the trampoline stays visually compressed after a landing.
const COMPRESS_SECONDS: f32 = 0.3;

pub struct Trampoline {
    pub base: Rectangle,
    pub previous_base: Rectangle,
    compressed_remaining: f32,
}

impl Trampoline {
    pub fn new(x: f32, y: f32) -> Self {
        let base = Rectangle::new(x, y, 32.0, 32.0);
        Trampoline {
            base,
            previous_base: base,
            compressed_remaining: 0.0,
        }
    }

    pub fn parse(reader: &ClauseReader<'_>) -> Self {
        Trampoline::new(
            reader.read_float("x").unwrap_or(0.0),
            reader.read_float("y").unwrap_or(0.0),
        )
    }

    pub fn is_compressed(&self) -> bool {
        self.compressed_remaining > 0.0
    }

    pub(crate) fn collision(&mut self, contact: &Contact, kind: CollisionKind) {
        if contact.kind == ContactKind::Player {
            match kind {
                // Landing compresses the spring; the bounce itself is
                // applied through the player's own callback.
                CollisionKind::Squish | CollisionKind::Normal => {
                    self.compressed_remaining = COMPRESS_SECONDS;
                }
                CollisionKind::Bump => {}
            }
        }
    }
}

impl GameObject for Trampoline {
    fn update(&mut self, _sector: &mut Sector, elapsed: f32) {
        self.previous_base = self.base;
        if self.compressed_remaining > 0.0 {
            self.compressed_remaining = (self.compressed_remaining - elapsed).max(0.0);
        }
    }
}

impl LevelSerializable for Trampoline {
    fn write(&self, writer: &mut LevelWriter) {
        writer.write_clause(
            "trampoline",
            ClauseFields::new()
                .float("x", self.base.x)
                .float("y", self.base.y),
        );
    }
}

/// A platform patrolling horizontally around its anchor point.
pub struct FlyingPlatform {
    pub base: Rectangle,
    pub previous_base: Rectangle,
    anchor: Vector,
    range: f32,
    phase: f32,
}

impl FlyingPlatform {
    pub fn new(x: f32, y: f32, range: f32) -> Self {
        let base = Rectangle::new(x, y, 96.0, 16.0);
        FlyingPlatform {
            base,
            previous_base: base,
            anchor: Vector::new(x, y),
            range,
            phase: 0.0,
        }
    }

    pub fn parse(reader: &ClauseReader<'_>) -> Self {
        FlyingPlatform::new(
            reader.read_float("x").unwrap_or(0.0),
            reader.read_float("y").unwrap_or(0.0),
            reader.read_float("range").unwrap_or(96.0),
        )
    }

    pub(crate) fn collision(&mut self, contact: &Contact, kind: CollisionKind) {
        // Only a landing does anything; ascending contact has no
        // defined response for platforms.
        let _ = (contact, kind);
    }
}

impl GameObject for FlyingPlatform {
    fn update(&mut self, _sector: &mut Sector, elapsed: f32) {
        self.previous_base = self.base;
        self.phase += elapsed;
        self.base.x = self.anchor.x + self.phase.sin() * self.range;
    }
}

impl LevelSerializable for FlyingPlatform {
    fn write(&self, writer: &mut LevelWriter) {
        writer.write_clause(
            "flying-platform",
            ClauseFields::new()
                .float("x", self.anchor.x)
                .float("y", self.anchor.y)
                .float("range", self.range),
        );
    }
}
