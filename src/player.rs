use crate::math::{Rectangle, Vector};
use crate::object::{CollisionKind, Contact, ContactKind, Direction, DyingState, GameObject};
use crate::sector::Sector;

/// How hard a trampoline launches the player, in world units/second.
const TRAMPOLINE_BOUNCE: f32 = -520.0;
/// Upward kick when the player squishes an enemy.
const SQUISH_BOUNCE: f32 = -300.0;
/// Invincibility window after losing the grown size.
const HURT_INVINCIBLE_SECONDS: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerSize {
    Small,
    Big,
}

/// Which projectile the player can fire, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotPower {
    None,
    Fire,
    Ice,
}

/// The player contract type.
///
/// Real input handling and movement physics belong to the embedding
/// game; this type carries exactly the state the sector core needs:
/// the two bounding rectangles the collision tie-break reads, size and
/// power tier, dying state and the invincibility timer.
pub struct Player {
    pub base: Rectangle,
    pub previous_base: Rectangle,
    pub velocity: Vector,
    pub size: PlayerSize,
    pub power: ShotPower,
    pub dying: DyingState,
    pub direction: Direction,
    pub on_ground: bool,
    invincible_remaining: f32,
}

impl Player {
    pub fn new() -> Self {
        let base = Rectangle::new(0.0, 0.0, 32.0, 32.0);
        Player {
            base,
            previous_base: base,
            velocity: Vector::zero(),
            size: PlayerSize::Small,
            power: ShotPower::None,
            dying: DyingState::Not,
            direction: Direction::Right,
            on_ground: false,
            invincible_remaining: 0.0,
        }
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible_remaining > 0.0
    }

    pub fn set_invincible(&mut self, seconds: f32) {
        self.invincible_remaining = self.invincible_remaining.max(seconds);
    }

    /// Teleport to a spawn position. Both rectangles move so the next
    /// frame does not see a bogus descent.
    pub fn move_to(&mut self, pos: Vector) {
        self.base.x = pos.x;
        self.base.y = pos.y;
        self.previous_base = self.base;
    }

    /// Switch to the grown size, keeping the feet planted.
    pub fn grow(&mut self) {
        if self.size == PlayerSize::Small {
            self.size = PlayerSize::Big;
            self.base.y -= 32.0;
            self.base.height = 64.0;
        }
    }

    /// Take a hit: grown players shrink and get a short grace window,
    /// small players die.
    pub fn hurt(&mut self) {
        if self.is_invincible() || self.dying != DyingState::Not {
            return;
        }
        match self.size {
            PlayerSize::Big => {
                self.size = PlayerSize::Small;
                self.power = ShotPower::None;
                self.base.y += 32.0;
                self.base.height = 32.0;
                self.set_invincible(HURT_INVINCIBLE_SECONDS);
            }
            PlayerSize::Small => self.kill(),
        }
    }

    pub fn kill(&mut self) {
        if self.dying == DyingState::Not {
            self.dying = DyingState::Falling;
            self.velocity = Vector::new(0.0, -400.0);
        }
    }

    /// Upward kick after stomping something.
    pub fn bounce(&mut self) {
        self.velocity.y = SQUISH_BOUNCE;
        self.on_ground = false;
    }

    /// Clamp against the camera's left edge and die below the sector
    /// bottom. Runs first in every frame, before the update pass.
    pub fn check_bounds(&mut self, camera_translation: Vector, sector_bottom: f32) {
        if self.base.x < camera_translation.x {
            self.base.x = camera_translation.x;
        }
        if self.base.y > sector_bottom + self.base.height {
            self.kill();
        }
    }

    pub(crate) fn collision(&mut self, _sector: &mut Sector, contact: &Contact, kind: CollisionKind) {
        match contact.kind {
            ContactKind::Enemy => {
                if kind == CollisionKind::Normal {
                    self.hurt();
                }
            }
            ContactKind::Trampoline => {
                self.velocity.y = TRAMPOLINE_BOUNCE;
                self.on_ground = false;
            }
            ContactKind::FlyingPlatform => {
                // Landed on the platform: stand on its top edge.
                self.base.y = contact.base.y - self.base.height;
                self.velocity.y = 0.0;
                self.on_ground = true;
            }
            _ => {}
        }
    }
}

impl Default for Player {
    fn default() -> Self {
        Player::new()
    }
}

impl GameObject for Player {
    fn update(&mut self, sector: &mut Sector, elapsed: f32) {
        self.previous_base = self.base;

        self.velocity.y += sector.gravity() * 100.0 * elapsed;
        self.base.x += self.velocity.x * elapsed;
        self.base.y += self.velocity.y * elapsed;

        if self.invincible_remaining > 0.0 {
            self.invincible_remaining = (self.invincible_remaining - elapsed).max(0.0);
        }
    }

    // The player is never reclaimed; death is handled by the game
    // loop, not the registry.
    fn is_valid(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grow_keeps_feet_planted() {
        let mut player = Player::new();
        player.move_to(Vector::new(100.0, 200.0));

        player.grow();

        assert_eq!(player.size, PlayerSize::Big);
        assert_eq!(player.base.height, 64.0);
        assert_eq!(player.base.bottom(), 232.0);
    }

    #[test]
    fn test_hurt_while_big_shrinks_and_grants_grace() {
        let mut player = Player::new();
        player.grow();
        player.power = ShotPower::Fire;

        player.hurt();

        assert_eq!(player.size, PlayerSize::Small);
        assert_eq!(player.power, ShotPower::None);
        assert!(player.is_invincible());
        assert_eq!(player.dying, DyingState::Not);
    }

    #[test]
    fn test_hurt_while_small_kills() {
        let mut player = Player::new();
        player.hurt();
        assert_eq!(player.dying, DyingState::Falling);
    }

    #[test]
    fn test_hurt_while_invincible_is_ignored() {
        let mut player = Player::new();
        player.set_invincible(1.0);
        player.hurt();
        assert_eq!(player.dying, DyingState::Not);
    }

    #[test]
    fn test_check_bounds_clamps_to_camera_left_edge() {
        let mut player = Player::new();
        player.move_to(Vector::new(10.0, 0.0));

        player.check_bounds(Vector::new(50.0, 0.0), 480.0);

        assert_eq!(player.base.x, 50.0);
    }

    #[test]
    fn test_check_bounds_kills_below_sector_bottom() {
        let mut player = Player::new();
        player.move_to(Vector::new(0.0, 600.0));

        player.check_bounds(Vector::zero(), 480.0);

        assert_eq!(player.dying, DyingState::Falling);
    }
}
