//! Short-lived reward and debris objects spawned by collision
//! outcomes and tile interactions. All of them invalidate themselves
//! once their animation runs out and are reclaimed at frame end.

use crate::math::Vector;
use crate::object::GameObject;
use crate::sector::Sector;

/// A score number rising from where it was earned.
pub struct FloatingScore {
    pub pos: Vector,
    pub value: u32,
    remaining: f32,
    alive: bool,
}

impl FloatingScore {
    pub fn new(pos: Vector, value: u32) -> Self {
        FloatingScore {
            pos,
            value,
            remaining: 1.0,
            alive: true,
        }
    }
}

impl GameObject for FloatingScore {
    fn update(&mut self, _sector: &mut Sector, elapsed: f32) {
        self.pos.y -= 60.0 * elapsed;
        self.remaining -= elapsed;
        if self.remaining <= 0.0 {
            self.alive = false;
        }
    }

    fn is_valid(&self) -> bool {
        self.alive
    }
}

/// The coin sprite hopping out of a brick or box.
pub struct BouncyCoin {
    pub pos: Vector,
    velocity_y: f32,
    origin_y: f32,
    alive: bool,
}

impl BouncyCoin {
    pub fn new(pos: Vector) -> Self {
        BouncyCoin {
            pos,
            velocity_y: -200.0,
            origin_y: pos.y,
            alive: true,
        }
    }
}

impl GameObject for BouncyCoin {
    fn update(&mut self, sector: &mut Sector, elapsed: f32) {
        self.velocity_y += sector.gravity() * 100.0 * elapsed;
        self.pos.y += self.velocity_y * elapsed;
        // One full arc, then gone.
        if self.velocity_y > 0.0 && self.pos.y >= self.origin_y {
            self.alive = false;
        }
    }

    fn is_valid(&self) -> bool {
        self.alive
    }
}

/// A brick nudged from below: shifts up briefly, then settles back.
pub struct BouncyBrick {
    pub pos: Vector,
    pub offset: f32,
    remaining: f32,
    alive: bool,
}

impl BouncyBrick {
    pub fn new(pos: Vector) -> Self {
        BouncyBrick {
            pos,
            offset: 0.0,
            remaining: 0.3,
            alive: true,
        }
    }
}

impl GameObject for BouncyBrick {
    fn update(&mut self, _sector: &mut Sector, elapsed: f32) {
        self.remaining -= elapsed;
        // Half the time rising, half settling back.
        self.offset = if self.remaining > 0.15 {
            self.offset - 40.0 * elapsed
        } else {
            self.offset + 40.0 * elapsed
        };
        if self.remaining <= 0.0 {
            self.alive = false;
        }
    }

    fn is_valid(&self) -> bool {
        self.alive
    }
}

/// One quarter of a smashed brick, scattering under gravity.
pub struct BrickDebris {
    pub pos: Vector,
    pub velocity: Vector,
    /// Tile id of the brick it broke from, so the renderer can pick
    /// the matching fragment sprite.
    pub tile_id: u32,
    remaining: f32,
    alive: bool,
}

impl BrickDebris {
    pub fn new(pos: Vector, movement: Vector, tile_id: u32) -> Self {
        BrickDebris {
            pos,
            // Scatter velocities come in tile units per tick.
            velocity: Vector::new(movement.x * 100.0, movement.y * 100.0),
            tile_id,
            remaining: 1.5,
            alive: true,
        }
    }
}

impl GameObject for BrickDebris {
    fn update(&mut self, sector: &mut Sector, elapsed: f32) {
        self.velocity.y += sector.gravity() * 100.0 * elapsed;
        self.pos.x += self.velocity.x * elapsed;
        self.pos.y += self.velocity.y * elapsed;
        self.remaining -= elapsed;
        if self.remaining <= 0.0 {
            self.alive = false;
        }
    }

    fn is_valid(&self) -> bool {
        self.alive
    }
}
