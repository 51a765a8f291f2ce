use serde::{Deserialize, Serialize};

/// Score awarded for collecting a coin (from a tile or a brick charge).
pub const SCORE_COIN: u32 = 25;
/// Score awarded for smashing a chargeless brick.
pub const SCORE_BRICK: u32 = 10;
/// Score awarded for squishing an enemy.
pub const SCORE_SQUISH: u32 = 50;

/// Power-up tier carried between sectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BonusKind {
    #[default]
    None,
    /// Player was grown when the previous sector ended.
    Growth,
    /// Player held a flower power when the previous sector ended.
    Flower,
}

/// Player progress that survives across sector transitions.
///
/// The sector owns this while it is active; collision outcomes and
/// tile interactions mutate it, and `Sector::activate` reads the bonus
/// tier back to re-apply power-ups. Move it into the next sector when
/// this one is torn down.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerStatus {
    pub score: u32,
    pub coins: u32,
    pub lives: u32,
    pub bonus: BonusKind,
}

impl Default for PlayerStatus {
    fn default() -> Self {
        PlayerStatus {
            score: 0,
            coins: 0,
            lives: 4,
            bonus: BonusKind::None,
        }
    }
}
