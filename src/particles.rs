//! Ambient particle systems (snow and clouds).
//!
//! Purely decorative: they never collide and are never serialized
//! back out, matching the level formats which only record that a
//! system exists.

use crate::camera::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::math::Vector;
use crate::object::GameObject;
use crate::sector::Sector;
use rand::Rng;

const SNOW_COUNT: usize = 80;
const CLOUD_COUNT: usize = 12;

fn scatter(count: usize) -> Vec<Vector> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| {
            Vector::new(
                rng.gen_range(0.0..SCREEN_WIDTH),
                rng.gen_range(0.0..SCREEN_HEIGHT),
            )
        })
        .collect()
}

fn wrap(value: f32, limit: f32) -> f32 {
    if value > limit {
        value - limit
    } else if value < 0.0 {
        value + limit
    } else {
        value
    }
}

pub struct SnowParticles {
    flakes: Vec<Vector>,
}

impl SnowParticles {
    pub fn new() -> Self {
        SnowParticles {
            flakes: scatter(SNOW_COUNT),
        }
    }

    pub fn particles(&self) -> &[Vector] {
        &self.flakes
    }
}

impl Default for SnowParticles {
    fn default() -> Self {
        SnowParticles::new()
    }
}

impl GameObject for SnowParticles {
    fn update(&mut self, _sector: &mut Sector, elapsed: f32) {
        for flake in &mut self.flakes {
            flake.y = wrap(flake.y + 40.0 * elapsed, SCREEN_HEIGHT);
            flake.x = wrap(flake.x + 12.0 * elapsed, SCREEN_WIDTH);
        }
    }
}

pub struct CloudParticles {
    clouds: Vec<Vector>,
}

impl CloudParticles {
    pub fn new() -> Self {
        CloudParticles {
            clouds: scatter(CLOUD_COUNT),
        }
    }

    pub fn particles(&self) -> &[Vector] {
        &self.clouds
    }
}

impl Default for CloudParticles {
    fn default() -> Self {
        CloudParticles::new()
    }
}

impl GameObject for CloudParticles {
    fn update(&mut self, _sector: &mut Sector, elapsed: f32) {
        for cloud in &mut self.clouds {
            cloud.x = wrap(cloud.x + 20.0 * elapsed, SCREEN_WIDTH);
        }
    }
}
