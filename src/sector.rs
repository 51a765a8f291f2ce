//! The sector: one simulated area of a level
//!
//! A sector owns the object registry, the player's carry-over status,
//! the spawn points and the music selection, and drives the frame
//! sequence: bounds check, update pass, collision resolution, reclaim.
//! It also hosts the tile-interaction helpers that bricks, boxes and
//! coins are handled through.
//!
//! Loading supports two level schemas (see `level`): the current
//! ordered-clause form and the legacy flat form. Writing always emits
//! the current form.

use crate::audio::{MusicHandle, MusicKind, MusicPlayer, fast_variant};
use crate::background::{Background, Color};
use crate::camera::Camera;
use crate::collision;
use crate::effects::{BouncyBrick, BouncyCoin, BrickDebris, FloatingScore};
use crate::enemy::{Enemy, EnemyKind};
use crate::level::{self, ClauseReader, LevelWriter, LoadError};
use crate::math::Vector;
use crate::object::{
    CollisionKind, Contact, ContactKind, Direction, GameObject, Object, TrackedKind,
};
use crate::particles::{CloudParticles, SnowParticles};
use crate::platforms::{FlyingPlatform, Trampoline};
use crate::player::{Player, PlayerSize, ShotPower};
use crate::powerup::{PowerUp, PowerUpKind};
use crate::projectile::{Projectile, ProjectileKind};
use crate::registry::{ObjectId, ObjectRegistry};
use crate::render::DrawingContext;
use crate::status::{PlayerStatus, SCORE_BRICK, SCORE_COIN};
use crate::tile::{
    LAYER_BACKGROUND_TILES, LAYER_FOREGROUND_TILES, LAYER_TILES, TILE_SIZE, Tile, TileMap, TileSet,
};
use serde_json::Value;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Fallback bottom edge for sectors whose solid layer has no height.
const DEFAULT_BOTTOM: f32 = 480.0;
/// Live shots allowed at once, per kind.
const MAX_FIRE_SHOTS: usize = 2;
const MAX_ICE_SHOTS: usize = 1;
/// Coin charges a counting brick dispenses before it downgrades.
const BRICK_CHARGES: i32 = 5;

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);
static CURRENT: AtomicU64 = AtomicU64::new(0);

/// A named position the player can enter the sector at.
#[derive(Debug, Clone)]
pub struct SpawnPoint {
    pub name: String,
    pub pos: Vector,
}

/// One simulated area: objects, tiles, status, music.
pub struct Sector {
    token: u64,
    pub name: String,
    gravity: f32,
    song_title: String,
    level_song: Option<MusicHandle>,
    level_song_fast: Option<MusicHandle>,
    bonus_song: Option<MusicHandle>,
    current_music: MusicKind,
    pub(crate) registry: ObjectRegistry,
    pub(crate) player_id: ObjectId,
    camera_id: Option<ObjectId>,
    background_id: Option<ObjectId>,
    solids_id: Option<ObjectId>,
    spawn_points: Vec<SpawnPoint>,
    /// Carry-over progress; move it into the next sector on transition.
    pub status: PlayerStatus,
    brick_counter_armed: bool,
    brick_charges: i32,
}

impl Sector {
    fn empty(name: &str) -> Self {
        let mut registry = ObjectRegistry::new();
        let player_id = registry.register(Object::Player(Player::new()));
        Sector {
            token: NEXT_TOKEN.fetch_add(1, Ordering::Relaxed),
            name: name.to_owned(),
            gravity: 10.0,
            song_title: String::new(),
            level_song: None,
            level_song_fast: None,
            bonus_song: None,
            current_music: MusicKind::Level,
            registry,
            player_id,
            camera_id: None,
            background_id: None,
            solids_id: None,
            spawn_points: Vec::new(),
            status: PlayerStatus::default(),
            brick_counter_armed: false,
            brick_charges: 0,
        }
    }

    /// Load a sector from a current-schema document. Clause order
    /// becomes registration order; the sector becomes the process-wide
    /// current one before any object is built, and the `music` clause
    /// resolves its tracks through the backend on the spot.
    /// Recoverable problems are logged and skipped; a missing solid
    /// tile layer is fatal.
    pub fn parse(
        document: &Value,
        tileset: Rc<TileSet>,
        music: &mut dyn MusicPlayer,
    ) -> Result<Sector, LoadError> {
        let mut sector = Sector::empty("main");
        sector.make_current();

        for clause in level::clauses(document)? {
            let reader = clause.reader();
            match clause.token {
                "name" => {
                    if let Some(name) = clause.as_str() {
                        sector.name = name.to_owned();
                    }
                }
                "gravity" => {
                    if let Some(gravity) = clause.value.as_f64() {
                        sector.gravity = gravity as f32;
                    }
                }
                "music" => {
                    if let Some(title) = clause.as_str() {
                        sector.song_title = title.to_owned();
                        sector.load_music(music);
                    }
                }
                "camera" => {
                    if sector.camera_id.is_some() {
                        tracing::warn!("sector contains more than one camera; keeping the first");
                    } else {
                        let camera = Camera::parse(&reader);
                        sector.camera_id = Some(sector.registry.register(Object::Camera(camera)));
                    }
                }
                "background" => {
                    let background = Background::parse(&reader);
                    let id = sector.registry.register(Object::Background(background));
                    sector.background_id.get_or_insert(id);
                }
                "playerspawn" => {
                    // TODO: keep named spawn points from new-format
                    // levels; only the legacy path stores them.
                    let _ = (reader.read_float("x"), reader.read_float("y"));
                }
                "tilemap" => {
                    if let Some(map) = TileMap::parse(&reader, Rc::clone(&tileset)) {
                        let solid = map.is_solid();
                        if solid && sector.solids_id.is_some() {
                            tracing::warn!(
                                "sector contains more than one solid tile layer; keeping the first"
                            );
                        }
                        let id = sector.registry.register(Object::TileLayer(map));
                        if solid && sector.solids_id.is_none() {
                            sector.solids_id = Some(id);
                        }
                    }
                }
                "trampoline" => {
                    let trampoline = Trampoline::parse(&reader);
                    sector.registry.register(Object::Trampoline(trampoline));
                }
                "flying-platform" => {
                    let platform = FlyingPlatform::parse(&reader);
                    sector.registry.register(Object::FlyingPlatform(platform));
                }
                "particles-snow" => {
                    sector
                        .registry
                        .register(Object::SnowParticles(SnowParticles::new()));
                }
                "particles-clouds" => {
                    sector
                        .registry
                        .register(Object::CloudParticles(CloudParticles::new()));
                }
                token => match EnemyKind::from_keyword(token) {
                    Some(kind) => {
                        let enemy = Enemy::parse(kind, &reader);
                        sector.registry.register(Object::Enemy(enemy));
                    }
                    None => tracing::warn!(token, "unknown clause in sector description"),
                },
            }
        }

        if sector.camera_id.is_none() {
            tracing::warn!("sector does not contain a camera; using a default one");
            sector.camera_id = Some(sector.registry.register(Object::Camera(Camera::new())));
        }
        if sector.solids_id.is_none() {
            return Err(LoadError::MissingSolidLayer);
        }
        Ok(sector)
    }

    /// Load a sector from a legacy flat document. The legacy format
    /// has fixed keys for the three tile layers and a nested `objects`
    /// clause list; it always yields a `main` spawn point and a
    /// default camera.
    pub fn parse_legacy(
        document: &Value,
        tileset: Rc<TileSet>,
        music: &mut dyn MusicPlayer,
    ) -> Result<Sector, LoadError> {
        if !document.is_object() {
            return Err(LoadError::MalformedDocument("expected a flat object"));
        }
        let reader = ClauseReader::new(document);
        let mut sector = Sector::empty("main");
        sector.make_current();

        sector.gravity = reader.read_float("gravity").unwrap_or(10.0);
        sector.song_title = reader.read_string("music").unwrap_or_default();
        sector.load_music(music);

        let mut background = Background::new();
        match reader.read_string("background") {
            Some(image) if !image.is_empty() => {
                background.set_image(image, reader.read_float("bkgd_speed").unwrap_or(0.5));
            }
            _ => {
                background.set_gradient(
                    legacy_color(&reader, "top"),
                    legacy_color(&reader, "bottom"),
                );
            }
        }
        sector.background_id = Some(sector.registry.register(Object::Background(background)));

        match reader.read_string("particle_system").as_deref() {
            Some("snow") => {
                sector
                    .registry
                    .register(Object::SnowParticles(SnowParticles::new()));
            }
            Some("clouds") => {
                sector
                    .registry
                    .register(Object::CloudParticles(CloudParticles::new()));
            }
            Some("") | None => {}
            Some(other) => tracing::warn!(other, "unknown particle system"),
        }

        let width = reader.read_int("width").unwrap_or(0) as usize;
        let height = reader.read_int("height").unwrap_or(15) as usize;

        // The interactive layer registers first, then the decorative
        // layers; registration order is draw and write order.
        let solid_tiles = reader
            .read_int_vec("interactive-tm")
            .or_else(|| reader.read_int_vec("tilemap"));
        let solids = solid_tiles.and_then(|tiles| {
            TileMap::new(width, height, tiles, LAYER_TILES, true, Rc::clone(&tileset))
        });
        match solids {
            Some(map) => {
                sector.solids_id = Some(sector.registry.register(Object::TileLayer(map)));
            }
            None => return Err(LoadError::MissingSolidLayer),
        }

        if let Some(tiles) = reader.read_int_vec("background-tm") {
            if let Some(map) = TileMap::new(
                width,
                height,
                tiles,
                LAYER_BACKGROUND_TILES,
                false,
                Rc::clone(&tileset),
            ) {
                sector.registry.register(Object::TileLayer(map));
            }
        }

        if let Some(tiles) = reader.read_int_vec("foreground-tm") {
            if let Some(map) = TileMap::new(
                width,
                height,
                tiles,
                LAYER_FOREGROUND_TILES,
                false,
                Rc::clone(&tileset),
            ) {
                sector.registry.register(Object::TileLayer(map));
            }
        }

        for clause in reader.read_clauses("objects") {
            let object_reader = clause.reader();
            match clause.token {
                "trampoline" => {
                    let trampoline = Trampoline::parse(&object_reader);
                    sector.registry.register(Object::Trampoline(trampoline));
                }
                "flying-platform" => {
                    let platform = FlyingPlatform::parse(&object_reader);
                    sector.registry.register(Object::FlyingPlatform(platform));
                }
                token => match EnemyKind::from_keyword(token) {
                    Some(kind) => {
                        let enemy = Enemy::parse(kind, &object_reader);
                        sector.registry.register(Object::Enemy(enemy));
                    }
                    None => tracing::warn!(token, "unknown object in legacy level"),
                },
            }
        }

        sector.spawn_points.push(SpawnPoint {
            name: "main".to_owned(),
            pos: Vector::new(100.0, 170.0),
        });
        sector.camera_id = Some(sector.registry.register(Object::Camera(Camera::new())));
        Ok(sector)
    }

    /// Emit a current-schema document describing this sector.
    pub fn write(&self) -> Value {
        let mut writer = LevelWriter::new();
        writer.write_string("name", &self.name);
        writer.write_float("gravity", self.gravity);
        if !self.song_title.is_empty() {
            writer.write_string("music", &self.song_title);
        }
        for (_, object) in self.registry.iter() {
            object.write_level(&mut writer);
        }
        writer.into_value()
    }

    // --- current-sector tracking ---------------------------------

    /// Mark this sector as the process-wide current one.
    pub fn make_current(&self) {
        CURRENT.store(self.token, Ordering::SeqCst);
    }

    pub fn is_current(&self) -> bool {
        CURRENT.load(Ordering::SeqCst) == self.token
    }

    // --- activation and the frame sequence -----------------------

    /// Enter the sector: mark it current, move the player to the named
    /// spawn point, re-apply the carried bonus tier and snap the
    /// camera. An unknown spawn name leaves the player where it is.
    pub fn activate(&mut self, spawn_name: &str) {
        self.make_current();

        let spawn = self
            .spawn_points
            .iter()
            .find(|s| s.name == spawn_name)
            .map(|s| s.pos);
        if spawn.is_none() {
            tracing::warn!(spawn_name, "spawn point not found");
        }

        let bonus = self.status.bonus;
        if let Some(player) = self.player_mut() {
            if let Some(pos) = spawn {
                player.move_to(pos);
            }
            match bonus {
                crate::status::BonusKind::Flower => {
                    player.grow();
                    player.power = ShotPower::Fire;
                }
                crate::status::BonusKind::Growth => player.grow(),
                crate::status::BonusKind::None => {}
            }
        }

        let focus = self.player().map(|p| p.base.position());
        if let (Some(focus), Some(camera)) = (focus, self.camera_mut()) {
            camera.reset(focus);
        }
    }

    /// Advance the simulation by `elapsed` seconds: player bounds
    /// check, update pass in registration order, collision resolution,
    /// reclaim. Objects registered during the update pass are updated
    /// in the same frame.
    pub fn advance(&mut self, elapsed: f32) {
        let translation = self.camera_translation();
        let bottom = self.bottom_edge();
        if let Some(player) = self.player_mut() {
            player.check_bounds(translation, bottom);
        }

        let mut position = 0;
        while position < self.registry.slot_count() {
            if let Some((id, mut object)) = self.registry.checkout_at(position) {
                // Objects already flagged for reclaim sit out the rest
                // of the frame.
                if object.is_valid() {
                    object.update(self, elapsed);
                }
                self.registry.restore(id, object);
            }
            position += 1;
        }

        collision::handle_collisions(self);
        self.registry.reclaim_invalid();
    }

    /// Draw every valid object in registration order, inside one
    /// camera-translated transform scope.
    pub fn draw(&self, context: &mut dyn DrawingContext) {
        context.push_transform();
        context.set_translation(self.camera_translation());
        for (_, object) in self.registry.iter() {
            if object.is_valid() {
                object.draw(context);
            }
        }
        context.pop_transform();
    }

    // --- accessors ------------------------------------------------

    pub fn gravity(&self) -> f32 {
        self.gravity
    }

    /// World y of the sector's lower edge, derived from the solid
    /// layer's height.
    pub fn bottom_edge(&self) -> f32 {
        self.solids()
            .map(|map| map.height() as f32 * TILE_SIZE)
            .unwrap_or(DEFAULT_BOTTOM)
    }

    /// `None` only while the player is checked out for dispatch.
    pub fn player(&self) -> Option<&Player> {
        match self.registry.get(self.player_id)? {
            Object::Player(player) => Some(player),
            _ => None,
        }
    }

    pub fn player_mut(&mut self) -> Option<&mut Player> {
        match self.registry.get_mut(self.player_id)? {
            Object::Player(player) => Some(player),
            _ => None,
        }
    }

    fn camera_mut(&mut self) -> Option<&mut Camera> {
        match self.registry.get_mut(self.camera_id?)? {
            Object::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    pub fn camera_translation(&self) -> Vector {
        let view = self.camera_id.and_then(|id| match self.registry.get(id)? {
            Object::Camera(camera) => Some(camera.translation),
            _ => None,
        });
        view.unwrap_or_default()
    }

    pub fn solids(&self) -> Option<&TileMap> {
        match self.registry.get(self.solids_id?)? {
            Object::TileLayer(map) => Some(map),
            _ => None,
        }
    }

    fn solids_mut(&mut self) -> Option<&mut TileMap> {
        match self.registry.get_mut(self.solids_id?)? {
            Object::TileLayer(map) => Some(map),
            _ => None,
        }
    }

    pub fn spawn_points(&self) -> &[SpawnPoint] {
        &self.spawn_points
    }

    // --- spawning -------------------------------------------------

    pub fn add_object(&mut self, object: Object) -> ObjectId {
        self.registry.register(object)
    }

    /// Award points and float the number where they were earned.
    pub fn add_score(&mut self, pos: Vector, value: u32) {
        self.status.score += value;
        self.registry
            .register(Object::FloatingScore(FloatingScore::new(pos, value)));
    }

    pub fn add_bouncy_coin(&mut self, pos: Vector) {
        self.registry
            .register(Object::BouncyCoin(BouncyCoin::new(pos)));
    }

    pub fn add_bouncy_brick(&mut self, pos: Vector) {
        self.registry
            .register(Object::BouncyBrick(BouncyBrick::new(pos)));
    }

    /// Scatter the four quarters of a smashed brick.
    pub fn add_broken_brick(&mut self, pos: Vector, tile_id: u32) {
        let quarters = [
            (Vector::new(0.0, 0.0), Vector::new(-1.0, -4.0)),
            (Vector::new(0.0, 16.0), Vector::new(-1.5, -3.0)),
            (Vector::new(16.0, 0.0), Vector::new(1.0, -4.0)),
            (Vector::new(16.0, 16.0), Vector::new(1.5, -3.0)),
        ];
        for (offset, movement) in quarters {
            self.registry.register(Object::BrickDebris(BrickDebris::new(
                pos + offset,
                movement,
                tile_id,
            )));
        }
    }

    pub fn add_enemy(&mut self, enemy: Enemy) -> ObjectId {
        self.registry.register(Object::Enemy(enemy))
    }

    pub fn add_power_up(&mut self, power_up: PowerUp) -> ObjectId {
        self.registry.register(Object::PowerUp(power_up))
    }

    /// Fire a shot for the player. Returns `None` when the per-kind
    /// cap is already reached.
    ///
    /// # Panics
    ///
    /// Requesting a shot with `ShotPower::None` is a programming
    /// error: callers must check the player's power first.
    pub fn add_projectile(
        &mut self,
        power: ShotPower,
        pos: Vector,
        xm: f32,
        direction: Direction,
    ) -> Option<ObjectId> {
        let (kind, cap) = match power {
            ShotPower::Fire => (ProjectileKind::Fire, MAX_FIRE_SHOTS),
            ShotPower::Ice => (ProjectileKind::Ice, MAX_ICE_SHOTS),
            ShotPower::None => panic!("projectile requested without a shot power"),
        };

        let live = self
            .registry
            .index(TrackedKind::Projectile)
            .iter()
            .filter(|&&id| match self.registry.get(id) {
                Some(Object::Projectile(shot)) => shot.kind == kind && shot.is_valid(),
                _ => false,
            })
            .count();
        if live >= cap {
            return None;
        }

        let shot = Projectile::new(kind, pos, xm, direction);
        Some(self.registry.register(Object::Projectile(shot)))
    }

    // --- tile interaction -----------------------------------------

    /// Hit a brick from below. Counting bricks dispense a coin per hit
    /// from the sector-wide charge counter and downgrade when it runs
    /// out; plain bricks shatter under a grown player. A small player
    /// on a plain brick only nudges it.
    pub fn try_break_brick(&mut self, pos: Vector, small_player: bool) -> bool {
        let Some(tile) = self.solid_tile_at(pos) else {
            return false;
        };
        if !tile.has_attribute(Tile::BRICK) {
            return false;
        }
        let aligned = aligned_tile_pos(pos);

        if tile.data > 0 {
            self.add_bouncy_coin(aligned);
            if !self.brick_counter_armed {
                self.brick_counter_armed = true;
                self.brick_charges = BRICK_CHARGES;
            }
            self.brick_charges -= 1;
            if self.brick_charges <= 0 {
                self.brick_counter_armed = false;
                self.change_solid_at(pos, tile.next_tile.unwrap_or(0));
            }
            self.status.score += SCORE_COIN;
            self.status.coins += 1;
            return true;
        }

        if !small_player {
            self.change_solid_at(pos, tile.next_tile.unwrap_or(0));
            self.add_broken_brick(aligned, tile.id);
            self.status.score += SCORE_BRICK;
            return true;
        }

        self.add_bouncy_brick(aligned);
        false
    }

    /// Hit a reward box from below. The payload comes out oriented
    /// away from the impact side, and the box downgrades to its
    /// emptied tile.
    pub fn try_empty_box(&mut self, pos: Vector, impact_side: Direction) -> bool {
        let Some(tile) = self.solid_tile_at(pos) else {
            return false;
        };
        if !tile.has_attribute(Tile::FULLBOX) {
            return false;
        }

        let spawn_direction = impact_side.opposite();
        let aligned = aligned_tile_pos(pos);
        let reward_pos = Vector::new(aligned.x, aligned.y - TILE_SIZE);
        let small = self
            .player()
            .map(|p| p.size == PlayerSize::Small)
            .unwrap_or(true);

        match tile.data {
            1 => {
                self.add_bouncy_coin(reward_pos);
                self.status.score += SCORE_COIN;
                self.status.coins += 1;
            }
            2 => {
                let kind = if small {
                    PowerUpKind::Growth
                } else {
                    PowerUpKind::FireFlower
                };
                self.add_power_up(PowerUp::new(kind, reward_pos, spawn_direction));
            }
            5 => {
                let kind = if small {
                    PowerUpKind::Growth
                } else {
                    PowerUpKind::IceFlower
                };
                self.add_power_up(PowerUp::new(kind, reward_pos, spawn_direction));
            }
            3 => {
                self.add_power_up(PowerUp::new(PowerUpKind::Star, reward_pos, spawn_direction));
            }
            4 => {
                self.add_power_up(PowerUp::new(
                    PowerUpKind::ExtraLife,
                    reward_pos,
                    spawn_direction,
                ));
            }
            other => tracing::warn!(other, "reward box with unknown payload"),
        }

        self.change_solid_at(pos, tile.next_tile.unwrap_or(0));
        true
    }

    /// Collect a coin tile. With `bounce` set, a coin sprite hops out
    /// of the grabbed cell (a bump through the tile); a direct grab
    /// collects silently.
    pub fn try_grab_coin(&mut self, pos: Vector, bounce: bool) -> bool {
        let Some(tile) = self.solid_tile_at(pos) else {
            return false;
        };
        if !tile.has_attribute(Tile::COIN) {
            return false;
        }
        if bounce {
            self.add_bouncy_coin(aligned_tile_pos(pos));
        }
        self.change_solid_at(pos, tile.next_tile.unwrap_or(0));
        self.status.score += SCORE_COIN;
        self.status.coins += 1;
        true
    }

    /// Bump everything standing on a tile hit from below: enemies and
    /// grounded (full-height) power-ups inside a one-tile horizontal
    /// and half-tile vertical window get a `Bump` collision attributed
    /// to the player.
    pub fn try_bump_from_below(&mut self, pos: Vector) {
        let player_base = self.player().map(|p| p.base).unwrap_or_default();
        let contact = Contact {
            kind: ContactKind::Player,
            base: player_base,
        };

        let enemies: Vec<ObjectId> = self.registry.index(TrackedKind::Enemy).to_vec();
        for id in enemies {
            let in_window = match self.registry.get(id) {
                Some(Object::Enemy(enemy)) => bump_window(enemy.base.position(), pos),
                _ => false,
            };
            if in_window {
                self.dispatch_bump(id, &contact);
            }
        }

        let power_ups: Vec<ObjectId> = self.registry.index(TrackedKind::PowerUp).to_vec();
        for id in power_ups {
            let in_window = match self.registry.get(id) {
                Some(Object::PowerUp(power_up)) => {
                    power_up.base.height == TILE_SIZE && bump_window(power_up.base.position(), pos)
                }
                _ => false,
            };
            if in_window {
                self.dispatch_bump(id, &contact);
            }
        }
    }

    fn dispatch_bump(&mut self, id: ObjectId, contact: &Contact) {
        if let Some(mut object) = self.registry.checkout(id) {
            object.collision(self, contact, CollisionKind::Bump);
            self.registry.restore(id, object);
        }
    }

    fn solid_tile_at(&self, pos: Vector) -> Option<Tile> {
        Some(self.solids()?.get_tile_at(pos).clone())
    }

    fn change_solid_at(&mut self, pos: Vector, new_id: u32) {
        if let Some(solids) = self.solids_mut() {
            solids.change_at(pos, new_id);
        }
    }

    // --- music ----------------------------------------------------

    /// Resolve the sector's music through the backend. The hurry-up
    /// variant is derived by filename convention; when no such track
    /// exists the normal one doubles for it.
    pub fn load_music(&mut self, player: &mut dyn MusicPlayer) {
        if self.song_title.is_empty() {
            return;
        }
        let path = format!("music/{}", self.song_title);
        let normal = player.load_music(&path);
        self.level_song = Some(normal);

        let fast_path = fast_variant(&path);
        self.level_song_fast = Some(if player.exists_music(&fast_path) {
            player.load_music(&fast_path)
        } else {
            normal
        });
    }

    pub fn set_bonus_music(&mut self, handle: MusicHandle) {
        self.bonus_song = Some(handle);
    }

    /// Switch to a track by mode. Modes without a resolved track fall
    /// silent rather than erroring.
    pub fn play_music(&mut self, kind: MusicKind, player: &mut dyn MusicPlayer) {
        self.current_music = kind;
        let handle = match kind {
            MusicKind::Level => self.level_song,
            MusicKind::HurryUp => self.level_song_fast,
            MusicKind::Bonus => self.bonus_song,
            MusicKind::Halt => None,
        };
        match handle {
            Some(handle) => player.play_music(handle),
            None => player.halt_music(),
        }
    }

    pub fn music_kind(&self) -> MusicKind {
        self.current_music
    }
}

impl Drop for Sector {
    fn drop(&mut self) {
        // Clear the current-sector mark only if it still points here.
        let _ = CURRENT.compare_exchange(self.token, 0, Ordering::SeqCst, Ordering::SeqCst);
    }
}

fn legacy_color(reader: &ClauseReader<'_>, edge: &str) -> Color {
    Color::new(
        reader.read_int(&format!("bkgd_red_{edge}")).unwrap_or(0) as u8,
        reader.read_int(&format!("bkgd_green_{edge}")).unwrap_or(0) as u8,
        reader.read_int(&format!("bkgd_blue_{edge}")).unwrap_or(128) as u8,
    )
}

/// Snap a hit position to its tile's top-left corner. The +1 nudge
/// keeps hits exactly on a cell boundary inside the intended cell.
fn aligned_tile_pos(pos: Vector) -> Vector {
    Vector::new(
        ((pos.x + 1.0) / TILE_SIZE).floor() * TILE_SIZE,
        (pos.y / TILE_SIZE).floor() * TILE_SIZE,
    )
}

/// One tile sideways, half a tile vertically.
fn bump_window(object_pos: Vector, hit_pos: Vector) -> bool {
    object_pos.x >= hit_pos.x - TILE_SIZE
        && object_pos.x <= hit_pos.x + TILE_SIZE
        && object_pos.y >= hit_pos.y - TILE_SIZE / 2.0
        && object_pos.y <= hit_pos.y + TILE_SIZE / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Rectangle;
    use crate::object::{DyingState, ObjectKind};
    use crate::status::{BonusKind, SCORE_SQUISH};
    use serde_json::json;
    use std::sync::{Mutex, MutexGuard, PoisonError};

    // Loading marks the sector as the process-wide current one, so
    // every test that builds a sector serializes on this lock to keep
    // the mark assertions stable.
    static CURRENT_LOCK: Mutex<()> = Mutex::new(());

    fn lock_current() -> MutexGuard<'static, ()> {
        CURRENT_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
    }

    struct NullMusic;

    impl MusicPlayer for NullMusic {
        fn load_music(&mut self, _path: &str) -> MusicHandle {
            MusicHandle(0)
        }
        fn exists_music(&self, _path: &str) -> bool {
            false
        }
        fn play_music(&mut self, _handle: MusicHandle) {}
        fn halt_music(&mut self) {}
    }

    fn test_tileset() -> Rc<TileSet> {
        let mut set = TileSet::new();
        // 1: plain ground
        set.insert(Tile {
            id: 1,
            attributes: Tile::SOLID,
            data: 0,
            next_tile: None,
        });
        // 2: plain brick
        set.insert(Tile {
            id: 2,
            attributes: Tile::SOLID | Tile::BRICK,
            data: 0,
            next_tile: Some(0),
        });
        // 3: counting brick
        set.insert(Tile {
            id: 3,
            attributes: Tile::SOLID | Tile::BRICK,
            data: 1,
            next_tile: Some(1),
        });
        // 4: coin
        set.insert(Tile {
            id: 4,
            attributes: Tile::COIN,
            data: 0,
            next_tile: Some(0),
        });
        // 5: reward box (flower payload), 6: emptied box
        set.insert(Tile {
            id: 5,
            attributes: Tile::SOLID | Tile::FULLBOX,
            data: 2,
            next_tile: Some(6),
        });
        set.insert(Tile {
            id: 6,
            attributes: Tile::SOLID,
            data: 0,
            next_tile: None,
        });
        Rc::new(set)
    }

    fn solid_row(id: u32) -> Vec<u32> {
        // 4x2 grid: top row carries the interesting tile, bottom row
        // is ground.
        vec![0, id, 0, 0, 1, 1, 1, 1]
    }

    fn level_doc(tile: u32) -> Value {
        json!([
            {"name": "icefield"},
            {"gravity": 10.0},
            {"music": "chipdisko.mod"},
            {"camera": {"mode": "follow"}},
            {"background": {"red_top": 0, "green_top": 0, "blue_top": 128}},
            {"tilemap": {"width": 4, "height": 2, "solid": true, "layer": 0, "tiles": solid_row(tile)}},
            {"crawler": {"x": 96.0, "y": 0.0}},
        ])
    }

    // Same sector without the crawler, for tests that stage their own
    // contacts.
    fn level_doc_bare(tile: u32) -> Value {
        json!([
            {"name": "icefield"},
            {"gravity": 10.0},
            {"camera": {"mode": "follow"}},
            {"tilemap": {"width": 4, "height": 2, "solid": true, "layer": 0, "tiles": solid_row(tile)}},
        ])
    }

    fn legacy_doc() -> Value {
        json!({
            "gravity": 10.0,
            "music": "fortress.mod",
            "particle_system": "snow",
            "width": 4,
            "height": 2,
            "interactive-tm": solid_row(1),
            "objects": [
                {"crawler": {"x": 96.0, "y": 0.0}},
                {"trampoline": {"x": 64.0, "y": 32.0}},
            ],
        })
    }

    fn load(tile: u32) -> Sector {
        Sector::parse(&level_doc(tile), test_tileset(), &mut NullMusic).unwrap()
    }

    fn load_bare(tile: u32) -> Sector {
        Sector::parse(&level_doc_bare(tile), test_tileset(), &mut NullMusic).unwrap()
    }

    #[test]
    fn test_parse_without_solid_layer_is_fatal() {
        let _guard = lock_current();
        let doc = json!([
            {"name": "icefield"},
            {"camera": {"mode": "follow"}},
        ]);
        assert!(matches!(
            Sector::parse(&doc, test_tileset(), &mut NullMusic),
            Err(LoadError::MissingSolidLayer)
        ));
    }

    #[test]
    fn test_parse_registers_clauses_in_document_order() {
        let _guard = lock_current();
        let sector = load(1);
        let kinds: Vec<_> = sector.registry.iter().map(|(_, o)| o.kind()).collect();
        assert_eq!(
            kinds,
            [
                ObjectKind::Player,
                ObjectKind::Camera,
                ObjectKind::Background,
                ObjectKind::TileLayer,
                ObjectKind::Enemy,
            ]
        );
    }

    #[test]
    fn test_duplicate_camera_keeps_the_first() {
        let _guard = lock_current();
        let doc = json!([
            {"camera": {"mode": "follow"}},
            {"camera": {"mode": "fixed"}},
            {"tilemap": {"width": 4, "height": 2, "solid": true, "layer": 0, "tiles": solid_row(1)}},
        ]);
        let sector = Sector::parse(&doc, test_tileset(), &mut NullMusic).unwrap();
        let cameras = sector
            .registry
            .iter()
            .filter(|(_, o)| o.kind() == ObjectKind::Camera)
            .count();
        assert_eq!(cameras, 1);
    }

    #[test]
    fn test_missing_camera_is_synthesized() {
        let _guard = lock_current();
        let doc = json!([
            {"tilemap": {"width": 4, "height": 2, "solid": true, "layer": 0, "tiles": solid_row(1)}},
        ]);
        let sector = Sector::parse(&doc, test_tileset(), &mut NullMusic).unwrap();
        assert!(sector.camera_id.is_some());
    }

    #[test]
    fn test_loading_marks_the_sector_current() {
        let _guard = lock_current();
        let first = load(1);
        assert!(first.is_current());

        // Both load paths hand the mark over before building objects.
        let second = Sector::parse_legacy(&legacy_doc(), test_tileset(), &mut NullMusic).unwrap();
        assert!(second.is_current());
        assert!(!first.is_current());
    }

    #[test]
    fn test_counting_brick_dispenses_five_coins_then_downgrades() {
        let _guard = lock_current();
        let mut sector = load(3);
        let hit = Vector::new(33.0, 1.0); // inside the brick cell

        for hits in 1..=4 {
            assert!(sector.try_break_brick(hit, true));
            assert_eq!(sector.status.coins, hits);
            assert_eq!(sector.solids().unwrap().get_tile_at(hit).id, 3);
        }

        assert!(sector.try_break_brick(hit, true));
        assert_eq!(sector.status.coins, 5);
        assert_eq!(sector.status.score, 5 * SCORE_COIN);
        // Fifth charge spends the counter and downgrades the tile.
        assert_eq!(sector.solids().unwrap().get_tile_at(hit).id, 1);
    }

    #[test]
    fn test_grown_player_shatters_plain_brick() {
        let _guard = lock_current();
        let mut sector = load(2);
        let hit = Vector::new(33.0, 1.0);

        assert!(sector.try_break_brick(hit, false));

        assert_eq!(sector.solids().unwrap().get_tile_at(hit).id, 0);
        assert_eq!(sector.status.score, SCORE_BRICK);
        let debris = sector
            .registry
            .iter()
            .filter(|(_, o)| o.kind() == ObjectKind::BrickDebris)
            .count();
        assert_eq!(debris, 4);
    }

    #[test]
    fn test_small_player_only_nudges_plain_brick() {
        let _guard = lock_current();
        let mut sector = load(2);
        let hit = Vector::new(33.0, 1.0);

        assert!(!sector.try_break_brick(hit, true));

        assert_eq!(sector.solids().unwrap().get_tile_at(hit).id, 2);
        let nudges = sector
            .registry
            .iter()
            .filter(|(_, o)| o.kind() == ObjectKind::BouncyBrick)
            .count();
        assert_eq!(nudges, 1);
    }

    #[test]
    fn test_reward_box_pays_out_by_player_size() {
        let _guard = lock_current();
        let mut sector = load(5);
        let hit = Vector::new(33.0, 1.0);

        assert!(sector.try_empty_box(hit, Direction::Left));

        assert_eq!(sector.solids().unwrap().get_tile_at(hit).id, 6);
        let spawned = sector.registry.iter().find_map(|(_, o)| match o {
            Object::PowerUp(p) => Some((p.kind, p.direction, p.base.position())),
            _ => None,
        });
        let (kind, direction, pos) = spawned.unwrap();
        // Small player gets growth instead of the flower, drifting
        // away from the impact side, one tile above the box.
        assert_eq!(kind, PowerUpKind::Growth);
        assert_eq!(direction, Direction::Right);
        assert_eq!(pos, Vector::new(32.0, -32.0));

        // Hitting the emptied box again does nothing.
        assert!(!sector.try_empty_box(hit, Direction::Left));
    }

    #[test]
    fn test_grown_player_gets_the_flower() {
        let _guard = lock_current();
        let mut sector = load(5);
        if let Some(player) = sector.player_mut() {
            player.grow();
        }

        assert!(sector.try_empty_box(Vector::new(33.0, 1.0), Direction::Right));

        let kind = sector.registry.iter().find_map(|(_, o)| match o {
            Object::PowerUp(p) => Some(p.kind),
            _ => None,
        });
        assert_eq!(kind, Some(PowerUpKind::FireFlower));
    }

    #[test]
    fn test_grab_coin_collects_and_clears_the_tile() {
        let _guard = lock_current();
        let mut sector = load(4);
        let hit = Vector::new(33.0, 1.0);

        assert!(sector.try_grab_coin(hit, false));

        assert_eq!(sector.status.coins, 1);
        assert_eq!(sector.status.score, SCORE_COIN);
        assert_eq!(sector.solids().unwrap().get_tile_at(hit).id, 0);
        assert!(!sector.try_grab_coin(hit, false));
        // A silent grab leaves no visual behind.
        let bouncing = sector
            .registry
            .iter()
            .filter(|(_, o)| o.kind() == ObjectKind::BouncyCoin)
            .count();
        assert_eq!(bouncing, 0);
    }

    #[test]
    fn test_bumped_coin_grab_spawns_a_bouncy_coin() {
        let _guard = lock_current();
        let mut sector = load(4);
        let hit = Vector::new(33.0, 1.0);

        assert!(sector.try_grab_coin(hit, true));

        assert_eq!(sector.status.coins, 1);
        assert_eq!(sector.solids().unwrap().get_tile_at(hit).id, 0);
        let bouncing = sector
            .registry
            .iter()
            .filter(|(_, o)| o.kind() == ObjectKind::BouncyCoin)
            .count();
        assert_eq!(bouncing, 1);
    }

    #[test]
    fn test_bump_from_below_hits_only_the_window() {
        let _guard = lock_current();
        let mut sector = load(1);
        let near = sector.add_enemy(Enemy::new(EnemyKind::Crawler, 40.0, 10.0));
        let far = sector.add_enemy(Enemy::new(EnemyKind::Crawler, 200.0, 10.0));

        sector.try_bump_from_below(Vector::new(32.0, 0.0));

        let dying_of = |sector: &Sector, id| match sector.registry.get(id) {
            Some(Object::Enemy(e)) => e.dying,
            _ => DyingState::Not,
        };
        assert_eq!(dying_of(&sector, near), DyingState::Falling);
        assert_eq!(dying_of(&sector, far), DyingState::Not);
    }

    #[test]
    fn test_projectile_caps_per_kind() {
        let _guard = lock_current();
        let mut sector = load(1);

        assert!(
            sector
                .add_projectile(ShotPower::Fire, Vector::zero(), 0.0, Direction::Right)
                .is_some()
        );
        assert!(
            sector
                .add_projectile(ShotPower::Fire, Vector::zero(), 0.0, Direction::Right)
                .is_some()
        );
        assert!(
            sector
                .add_projectile(ShotPower::Fire, Vector::zero(), 0.0, Direction::Right)
                .is_none()
        );

        assert!(
            sector
                .add_projectile(ShotPower::Ice, Vector::zero(), 0.0, Direction::Left)
                .is_some()
        );
        assert!(
            sector
                .add_projectile(ShotPower::Ice, Vector::zero(), 0.0, Direction::Left)
                .is_none()
        );
    }

    #[test]
    #[should_panic(expected = "without a shot power")]
    fn test_projectile_without_power_panics() {
        let _guard = lock_current();
        let mut sector = load(1);
        sector.add_projectile(ShotPower::None, Vector::zero(), 0.0, Direction::Right);
    }

    #[test]
    fn test_descending_player_squishes_enemy() {
        let _guard = lock_current();
        let mut sector = load_bare(1);
        // Enemy resting on the ground row; player just above it,
        // overlapping, having moved down last frame.
        let enemy = sector.add_enemy(Enemy::new(EnemyKind::Crawler, 100.0, 10.0));
        if let Some(player) = sector.player_mut() {
            player.move_to(Vector::new(100.0, -18.0));
            player.velocity = Vector::new(0.0, 50.0);
        }

        sector.advance(0.01);

        match sector.registry.get(enemy) {
            Some(Object::Enemy(e)) => assert_eq!(e.dying, DyingState::Squished),
            other => panic!("enemy missing: {:?}", other.map(|o| o.kind())),
        }
        assert_eq!(sector.status.score, SCORE_SQUISH);
        // The squish bounced the player back up.
        assert!(sector.player().unwrap().velocity.y < 0.0);
    }

    #[test]
    fn test_sideways_contact_hurts_small_player() {
        let _guard = lock_current();
        let mut sector = load_bare(1);
        sector.add_enemy(Enemy::new(EnemyKind::Crawler, 100.0, 10.0));
        if let Some(player) = sector.player_mut() {
            player.move_to(Vector::new(80.0, 10.0));
        }

        sector.advance(0.001);

        assert_eq!(sector.player().unwrap().dying, DyingState::Falling);
    }

    #[test]
    fn test_falling_or_level_contact_springs_the_player() {
        let _guard = lock_current();
        let mut sector = load_bare(1);
        let trampoline = sector.add_object(Object::Trampoline(Trampoline::new(100.0, 10.0)));
        // Overlapping from the side, not descending steeply: previous
        // bottom edge is already below the trampoline's midpoint.
        if let Some(player) = sector.player_mut() {
            player.move_to(Vector::new(100.0, 20.0));
        }

        sector.advance(0.001);

        assert!(sector.player().unwrap().velocity.y < -400.0);
        match sector.registry.get(trampoline) {
            Some(Object::Trampoline(t)) => assert!(t.is_compressed()),
            _ => panic!("trampoline missing"),
        }
    }

    #[test]
    fn test_steep_landing_only_compresses_the_trampoline() {
        let _guard = lock_current();
        let mut sector = load_bare(1);
        let trampoline = sector.add_object(Object::Trampoline(Trampoline::new(100.0, 10.0)));
        if let Some(player) = sector.player_mut() {
            player.move_to(Vector::new(100.0, -18.0));
            player.velocity = Vector::new(0.0, 50.0);
        }

        sector.advance(0.01);

        // The spring compresses; the launch comes later, not from this
        // contact.
        match sector.registry.get(trampoline) {
            Some(Object::Trampoline(t)) => assert!(t.is_compressed()),
            _ => panic!("trampoline missing"),
        }
        assert!(sector.player().unwrap().velocity.y > 0.0);
    }

    #[test]
    fn test_ascending_contact_with_trampoline_does_nothing() {
        let _guard = lock_current();
        let mut sector = load_bare(1);
        let trampoline = sector.add_object(Object::Trampoline(Trampoline::new(100.0, 10.0)));
        if let Some(player) = sector.player_mut() {
            player.move_to(Vector::new(100.0, 20.0));
            player.velocity = Vector::new(0.0, -200.0);
        }

        sector.advance(0.001);

        match sector.registry.get(trampoline) {
            Some(Object::Trampoline(t)) => assert!(!t.is_compressed()),
            _ => panic!("trampoline missing"),
        }
        // Still rising under its own motion, not relaunched.
        assert!(sector.player().unwrap().velocity.y > -300.0);
    }

    #[test]
    fn test_invalidated_shot_sits_out_the_frame() {
        let _guard = lock_current();
        let mut sector = load_bare(1);
        let enemy = sector.add_enemy(Enemy::new(EnemyKind::Crawler, 200.0, 10.0));
        let shot = sector
            .add_projectile(ShotPower::Ice, Vector::new(210.0, 20.0), 0.0, Direction::Right)
            .unwrap();

        // A shot that already hit something is dead even though it is
        // still overlapping the next enemy.
        if let Some(Object::Projectile(p)) = sector.registry.get_mut(shot) {
            let contact = Contact {
                kind: ContactKind::Enemy,
                base: Rectangle::new(0.0, 0.0, 32.0, 32.0),
            };
            p.collision(&contact, CollisionKind::Normal);
        }

        sector.advance(0.001);

        match sector.registry.get(enemy) {
            Some(Object::Enemy(e)) => assert_eq!(e.dying, DyingState::Not),
            _ => panic!("enemy missing"),
        }
        assert!(sector.registry.get(shot).is_none());
    }

    #[test]
    fn test_advance_reclaims_expired_objects() {
        let _guard = lock_current();
        let mut sector = load(1);
        sector.add_projectile(ShotPower::Ice, Vector::zero(), 0.0, Direction::Right);

        sector.advance(2.0); // Past the shot lifetime

        assert!(sector.registry.index(TrackedKind::Projectile).is_empty());
    }

    #[test]
    fn test_write_round_trips_through_parse() {
        let _guard = lock_current();
        let sector = load(3);

        let doc = sector.write();
        let reloaded = Sector::parse(&doc, test_tileset(), &mut NullMusic).unwrap();

        assert_eq!(reloaded.name, "icefield");
        assert_eq!(reloaded.gravity(), 10.0);
        assert_eq!(reloaded.song_title, "chipdisko.mod");
        assert_eq!(
            reloaded.solids().unwrap().get_tile_at(Vector::new(33.0, 1.0)).id,
            3
        );
        let enemies = reloaded.registry.index(TrackedKind::Enemy).len();
        assert_eq!(enemies, 1);
    }

    #[test]
    fn test_legacy_parse_retains_the_main_spawn() {
        let _guard = lock_current();
        let mut sector =
            Sector::parse_legacy(&legacy_doc(), test_tileset(), &mut NullMusic).unwrap();

        assert_eq!(sector.spawn_points().len(), 1);
        sector.activate("main");
        assert_eq!(
            sector.player().unwrap().base.position(),
            Vector::new(100.0, 170.0)
        );
        assert_eq!(sector.registry.index(TrackedKind::Enemy).len(), 1);
        assert_eq!(sector.registry.index(TrackedKind::Trampoline).len(), 1);
    }

    #[test]
    fn test_legacy_layers_register_interactive_first() {
        let _guard = lock_current();
        let doc = json!({
            "width": 4,
            "height": 2,
            "interactive-tm": solid_row(1),
            "background-tm": vec![0u32; 8],
            "foreground-tm": vec![0u32; 8],
        });
        let sector = Sector::parse_legacy(&doc, test_tileset(), &mut NullMusic).unwrap();

        let layers: Vec<i32> = sector
            .registry
            .iter()
            .filter_map(|(_, o)| match o {
                Object::TileLayer(map) => Some(map.layer()),
                _ => None,
            })
            .collect();
        assert_eq!(
            layers,
            [LAYER_TILES, LAYER_BACKGROUND_TILES, LAYER_FOREGROUND_TILES]
        );
    }

    #[test]
    fn test_activate_reapplies_carried_bonus() {
        let _guard = lock_current();
        let mut sector = load(1);
        sector.status.bonus = BonusKind::Flower;

        sector.activate("anywhere");

        let player = sector.player().unwrap();
        assert_eq!(player.size, PlayerSize::Big);
        assert_eq!(player.power, ShotPower::Fire);
    }

    #[test]
    fn test_current_sector_mark_follows_activation_and_drop() {
        let _guard = lock_current();
        let mut first = load(1);
        first.activate("main");
        assert!(first.is_current());

        let mut second = load(1);
        second.activate("main");
        assert!(!first.is_current());
        assert!(second.is_current());

        drop(second);
        assert_eq!(CURRENT.load(Ordering::SeqCst), 0);
    }

    struct FakeMusic {
        loaded: Vec<String>,
        played: Vec<MusicHandle>,
        halted: bool,
        has_fast: bool,
    }

    impl FakeMusic {
        fn new(has_fast: bool) -> Self {
            FakeMusic {
                loaded: Vec::new(),
                played: Vec::new(),
                halted: false,
                has_fast,
            }
        }
    }

    impl MusicPlayer for FakeMusic {
        fn load_music(&mut self, path: &str) -> MusicHandle {
            self.loaded.push(path.to_owned());
            MusicHandle(self.loaded.len() as u32)
        }
        fn exists_music(&self, path: &str) -> bool {
            self.has_fast && path.contains("-fast")
        }
        fn play_music(&mut self, handle: MusicHandle) {
            self.played.push(handle);
        }
        fn halt_music(&mut self) {
            self.halted = true;
        }
    }

    #[test]
    fn test_music_resolves_at_load_time() {
        let _guard = lock_current();
        let mut backend = FakeMusic::new(true);
        let mut sector = Sector::parse(&level_doc(1), test_tileset(), &mut backend).unwrap();

        // The music clause resolved both tracks during the parse.
        assert_eq!(
            backend.loaded,
            ["music/chipdisko.mod", "music/chipdisko-fast.mod"]
        );

        sector.play_music(MusicKind::HurryUp, &mut backend);
        assert_eq!(backend.played, [MusicHandle(2)]);
        assert_eq!(sector.music_kind(), MusicKind::HurryUp);
    }

    #[test]
    fn test_missing_fast_track_falls_back_to_the_normal_one() {
        let _guard = lock_current();
        let mut backend = FakeMusic::new(false);
        let mut sector = Sector::parse(&level_doc(1), test_tileset(), &mut backend).unwrap();

        assert_eq!(backend.loaded, ["music/chipdisko.mod"]);

        sector.play_music(MusicKind::HurryUp, &mut backend);
        assert_eq!(backend.played, [MusicHandle(1)]);

        sector.play_music(MusicKind::Halt, &mut backend);
        assert!(backend.halted);
    }

    struct RecordingContext {
        calls: Vec<String>,
    }

    impl DrawingContext for RecordingContext {
        fn push_transform(&mut self) {
            self.calls.push("push".to_owned());
        }
        fn pop_transform(&mut self) {
            self.calls.push("pop".to_owned());
        }
        fn set_translation(&mut self, translation: Vector) {
            self.calls.push(format!("translate {}", translation.x));
        }
    }

    #[test]
    fn test_draw_wraps_objects_in_one_transform_scope() {
        let _guard = lock_current();
        let sector = load(1);
        let mut context = RecordingContext { calls: Vec::new() };

        sector.draw(&mut context);

        assert_eq!(context.calls.first().map(String::as_str), Some("push"));
        assert_eq!(
            context.calls.get(1).map(String::as_str),
            Some("translate 0")
        );
        assert_eq!(context.calls.last().map(String::as_str), Some("pop"));
    }
}
