use crate::math::{Rectangle, Vector};
use crate::object::{CollisionKind, Contact, ContactKind, Direction, GameObject};
use crate::sector::Sector;

/// Base horizontal speed on top of the firing player's momentum.
const SHOT_SPEED: f32 = 600.0;
/// Shots expire on their own after this long.
const LIFETIME_SECONDS: f32 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileKind {
    Fire,
    Ice,
}

/// A shot fired by the player. Resolves against at most one enemy per
/// frame and despawns on the first hit.
pub struct Projectile {
    pub kind: ProjectileKind,
    pub base: Rectangle,
    pub previous_base: Rectangle,
    pub velocity: Vector,
    remaining: f32,
    alive: bool,
}

impl Projectile {
    pub fn new(kind: ProjectileKind, pos: Vector, xm: f32, direction: Direction) -> Self {
        let base = Rectangle::new(pos.x, pos.y, 4.0, 4.0);
        let vx = match direction {
            Direction::Right => SHOT_SPEED + xm,
            Direction::Left => -SHOT_SPEED + xm,
        };
        Projectile {
            kind,
            base,
            previous_base: base,
            velocity: Vector::new(vx, 0.0),
            remaining: LIFETIME_SECONDS,
            alive: true,
        }
    }

    pub(crate) fn collision(&mut self, contact: &Contact, _kind: CollisionKind) {
        if contact.kind == ContactKind::Enemy {
            self.alive = false;
        }
    }
}

impl GameObject for Projectile {
    fn update(&mut self, sector: &mut Sector, elapsed: f32) {
        self.previous_base = self.base;

        // Fire shots arc with gravity, ice shots fly straight.
        if self.kind == ProjectileKind::Fire {
            self.velocity.y += sector.gravity() * 50.0 * elapsed;
        }
        self.base.x += self.velocity.x * elapsed;
        self.base.y += self.velocity.y * elapsed;

        self.remaining -= elapsed;
        if self.remaining <= 0.0 {
            self.alive = false;
        }
    }

    fn is_valid(&self) -> bool {
        self.alive
    }
}
