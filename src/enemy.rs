use crate::level::{ClauseFields, ClauseReader, LevelSerializable, LevelWriter};
use crate::math::{Rectangle, Vector};
use crate::object::{CollisionKind, Contact, ContactKind, Direction, DyingState, GameObject};
use crate::sector::Sector;
use crate::status::SCORE_SQUISH;

/// How long a squished enemy lingers before it is reclaimed.
const SQUISH_SECONDS: f32 = 2.0;
/// Default patrol speed in world units/second.
const WALK_SPEED: f32 = 80.0;

/// The enemy roster. Each kind maps to one level-description keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyKind {
    Crawler,
    Jumper,
    Bomber,
    Stalactite,
    Fish,
    Spiky,
    Floater,
}

impl EnemyKind {
    /// Resolve a level-description keyword to an enemy kind. Unknown
    /// keywords return `None`, which makes the loader skip the clause.
    pub fn from_keyword(token: &str) -> Option<EnemyKind> {
        match token {
            "crawler" => Some(EnemyKind::Crawler),
            "jumper" => Some(EnemyKind::Jumper),
            "bomber" => Some(EnemyKind::Bomber),
            "stalactite" => Some(EnemyKind::Stalactite),
            "fish" => Some(EnemyKind::Fish),
            "spiky" => Some(EnemyKind::Spiky),
            "floater" => Some(EnemyKind::Floater),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            EnemyKind::Crawler => "crawler",
            EnemyKind::Jumper => "jumper",
            EnemyKind::Bomber => "bomber",
            EnemyKind::Stalactite => "stalactite",
            EnemyKind::Fish => "fish",
            EnemyKind::Spiky => "spiky",
            EnemyKind::Floater => "floater",
        }
    }
}

/// An enemy contract type: position, patrol direction and the dying
/// progression the collision resolver keys on. Kind-specific AI lives
/// in the embedding game.
pub struct Enemy {
    pub kind: EnemyKind,
    pub base: Rectangle,
    pub previous_base: Rectangle,
    pub velocity: Vector,
    pub dying: DyingState,
    pub direction: Direction,
    squish_remaining: f32,
    alive: bool,
}

impl Enemy {
    pub fn new(kind: EnemyKind, x: f32, y: f32) -> Self {
        let base = Rectangle::new(x, y, 32.0, 32.0);
        Enemy {
            kind,
            base,
            previous_base: base,
            velocity: Vector::new(-WALK_SPEED, 0.0),
            dying: DyingState::Not,
            direction: Direction::Left,
            squish_remaining: 0.0,
            alive: true,
        }
    }

    pub fn parse(kind: EnemyKind, reader: &ClauseReader<'_>) -> Self {
        let x = reader.read_float("x").unwrap_or(0.0);
        let y = reader.read_float("y").unwrap_or(0.0);
        Enemy::new(kind, x, y)
    }

    fn turn_around(&mut self) {
        self.direction = self.direction.opposite();
        self.velocity.x = -self.velocity.x;
    }

    /// Flatten in place; reclaimed once the squish timer runs out.
    fn squish(&mut self, sector: &mut Sector) {
        self.dying = DyingState::Squished;
        self.squish_remaining = SQUISH_SECONDS;
        self.base.height = 16.0;
        self.base.y += 16.0;
        sector.add_score(self.base.position(), SCORE_SQUISH);
        if let Some(player) = sector.player_mut() {
            player.bounce();
        }
    }

    /// Knock out of the sector; falls until it leaves the screen.
    fn kill_fall(&mut self, sector: &mut Sector) {
        self.dying = DyingState::Falling;
        self.velocity = Vector::new(0.0, -350.0);
        sector.add_score(self.base.position(), SCORE_SQUISH);
    }

    pub(crate) fn collision(&mut self, sector: &mut Sector, contact: &Contact, kind: CollisionKind) {
        if self.dying != DyingState::Not {
            return;
        }
        match (contact.kind, kind) {
            (ContactKind::Player, CollisionKind::Squish) => self.squish(sector),
            (ContactKind::Player, CollisionKind::Bump) => self.kill_fall(sector),
            // A damaging contact hurts the player through its own
            // callback; the enemy itself is unaffected.
            (ContactKind::Player, CollisionKind::Normal) => {}
            (ContactKind::Enemy, _) => self.turn_around(),
            (ContactKind::Projectile, _) => self.kill_fall(sector),
            _ => {}
        }
    }
}

impl GameObject for Enemy {
    fn update(&mut self, sector: &mut Sector, elapsed: f32) {
        self.previous_base = self.base;

        match self.dying {
            DyingState::Not => {
                self.base.x += self.velocity.x * elapsed;
            }
            DyingState::Squished => {
                self.squish_remaining -= elapsed;
                if self.squish_remaining <= 0.0 {
                    self.alive = false;
                }
            }
            DyingState::Falling => {
                self.velocity.y += sector.gravity() * 100.0 * elapsed;
                self.base.y += self.velocity.y * elapsed;
                if self.base.y > sector.bottom_edge() + self.base.height {
                    self.alive = false;
                }
            }
        }
    }

    fn is_valid(&self) -> bool {
        self.alive
    }
}

impl LevelSerializable for Enemy {
    fn write(&self, writer: &mut LevelWriter) {
        writer.write_clause(
            self.kind.keyword(),
            ClauseFields::new()
                .float("x", self.base.x)
                .float("y", self.base.y),
        );
    }
}
