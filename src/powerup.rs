use crate::math::{Rectangle, Vector};
use crate::object::{CollisionKind, Contact, ContactKind, Direction, GameObject};
use crate::player::ShotPower;
use crate::sector::Sector;

/// Collectible power-up kinds, matching the reward-box payload codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerUpKind {
    /// Grows a small player.
    Growth,
    /// Grants the fire shot (and grows).
    FireFlower,
    /// Grants the ice shot (and grows).
    IceFlower,
    /// Temporary invincibility.
    Star,
    /// One extra life.
    ExtraLife,
}

/// How long the star keeps the player invincible.
const STAR_SECONDS: f32 = 10.0;
/// Drift speed of a released power-up.
const DRIFT_SPEED: f32 = 60.0;

/// A collectible drifting out of an emptied reward box.
pub struct PowerUp {
    pub kind: PowerUpKind,
    pub base: Rectangle,
    pub previous_base: Rectangle,
    pub velocity: Vector,
    pub direction: Direction,
    alive: bool,
}

impl PowerUp {
    pub fn new(kind: PowerUpKind, pos: Vector, direction: Direction) -> Self {
        let base = Rectangle::new(pos.x, pos.y, 32.0, 32.0);
        let vx = match direction {
            Direction::Left => -DRIFT_SPEED,
            Direction::Right => DRIFT_SPEED,
        };
        PowerUp {
            kind,
            base,
            previous_base: base,
            velocity: Vector::new(vx, 0.0),
            direction,
            alive: true,
        }
    }

    /// Apply the reward to the player and despawn. A bump from below
    /// just knocks the collectible into the air instead.
    pub(crate) fn collision(&mut self, sector: &mut Sector, contact: &Contact, kind: CollisionKind) {
        if contact.kind != ContactKind::Player {
            return;
        }
        match kind {
            CollisionKind::Bump => {
                self.velocity.y = -400.0;
            }
            _ => {
                self.apply(sector);
                self.alive = false;
            }
        }
    }

    fn apply(&self, sector: &mut Sector) {
        match self.kind {
            PowerUpKind::Growth => {
                if let Some(player) = sector.player_mut() {
                    player.grow();
                }
            }
            PowerUpKind::FireFlower => {
                if let Some(player) = sector.player_mut() {
                    player.grow();
                    player.power = ShotPower::Fire;
                }
            }
            PowerUpKind::IceFlower => {
                if let Some(player) = sector.player_mut() {
                    player.grow();
                    player.power = ShotPower::Ice;
                }
            }
            PowerUpKind::Star => {
                if let Some(player) = sector.player_mut() {
                    player.set_invincible(STAR_SECONDS);
                }
            }
            PowerUpKind::ExtraLife => {
                sector.status.lives += 1;
            }
        }
    }
}

impl GameObject for PowerUp {
    fn update(&mut self, sector: &mut Sector, elapsed: f32) {
        self.previous_base = self.base;

        self.velocity.y += sector.gravity() * 50.0 * elapsed;
        self.base.x += self.velocity.x * elapsed;
        self.base.y += self.velocity.y * elapsed;

        if self.base.y > sector.bottom_edge() + self.base.height {
            self.alive = false;
        }
    }

    fn is_valid(&self) -> bool {
        self.alive
    }
}
