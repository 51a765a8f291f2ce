use crate::level::{ClauseFields, ClauseReader, LevelSerializable, LevelWriter};
use crate::math::Vector;
use crate::object::GameObject;
use crate::sector::Sector;

/// Visible area the camera frames, in world units.
pub const SCREEN_WIDTH: f32 = 800.0;
pub const SCREEN_HEIGHT: f32 = 600.0;

/// The sector camera. At most one per sector; the loader synthesizes
/// a default one when the level description has none.
pub struct Camera {
    pub translation: Vector,
    follow: bool,
}

impl Camera {
    pub fn new() -> Self {
        Camera {
            translation: Vector::zero(),
            follow: true,
        }
    }

    pub fn parse(reader: &ClauseReader<'_>) -> Self {
        let mut camera = Camera::new();
        if let Some(mode) = reader.read_string("mode") {
            camera.follow = mode != "fixed";
        }
        camera
    }

    /// Snap the view onto a position (the player at activation).
    /// Never scrolls left of the sector start.
    pub fn reset(&mut self, focus: Vector) {
        self.translation.x = (focus.x - SCREEN_WIDTH / 2.0).max(0.0);
        self.translation.y = (focus.y - SCREEN_HEIGHT / 2.0).max(0.0);
    }

}

impl Default for Camera {
    fn default() -> Self {
        Camera::new()
    }
}

impl GameObject for Camera {
    fn update(&mut self, sector: &mut Sector, _elapsed: f32) {
        if !self.follow {
            return;
        }
        // Trail the player horizontally; vertical framing is left to
        // the embedding game.
        if let Some(player) = sector.player() {
            self.translation.x = (player.base.x - SCREEN_WIDTH / 2.0).max(0.0);
        }
    }
}

impl LevelSerializable for Camera {
    fn write(&self, writer: &mut LevelWriter) {
        let mode = if self.follow { "follow" } else { "fixed" };
        writer.write_clause("camera", ClauseFields::new().string("mode", mode));
    }
}
