//! Game state and core simulation types
//!
//! Entities are a tagged union over a shared [`Body`]. The [`GameState`]
//! owns every entity, the score, the level counter and the live asteroid
//! population, and collects [`GameEvent`]s for the host.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::effects::{Effects, Spawn};
use super::motion::Body;
use super::tick::TickInput;
use crate::audio::{Music, SoundEffect};
use crate::consts::*;
use crate::settings::Config;
use crate::{heading_vector, normalize_degrees};

/// Current phase of the game controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Created, first level not spawned yet
    Starting,
    /// Active gameplay
    Playing,
    /// Game over banner is up
    Ending,
}

/// Stable entity handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Asteroid size tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AsteroidSize {
    Small = 1,
    Middle = 2,
    Large = 3,
}

impl AsteroidSize {
    /// Numeric tier (1..=3)
    #[inline]
    pub fn tier(self) -> u32 {
        self as u32
    }

    /// Tier of the fragments this asteroid breaks into
    pub fn smaller(self) -> Option<Self> {
        match self {
            AsteroidSize::Large => Some(AsteroidSize::Middle),
            AsteroidSize::Middle => Some(AsteroidSize::Small),
            AsteroidSize::Small => None,
        }
    }

    /// Points for destroying this tier: `floor(base / tier)`
    pub fn points(self, base: u64) -> u64 {
        base / self.tier() as u64
    }

    pub fn half_extent(self) -> f32 {
        match self {
            AsteroidSize::Small => ASTEROID_SMALL_HALF_EXTENT,
            AsteroidSize::Middle => ASTEROID_MIDDLE_HALF_EXTENT,
            AsteroidSize::Large => ASTEROID_LARGE_HALF_EXTENT,
        }
    }

    pub fn image(self) -> &'static str {
        match self {
            AsteroidSize::Small => "astr_sml.png",
            AsteroidSize::Middle => "astr_mdl.png",
            AsteroidSize::Large => "astr_lrg.png",
        }
    }
}

/// Drifting rock
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Asteroid {
    pub size: AsteroidSize,
}

impl Asteroid {
    /// Random drift: each axis gets `speed * U[0,1) / tier` with a random sign
    pub fn random_velocity(size: AsteroidSize, speed: f32, rng: &mut impl Rng) -> Vec2 {
        let tier = size.tier() as f32;
        let mut axis = || {
            let sign = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
            sign * speed * rng.random::<f32>() / tier
        };
        let dx = axis();
        let dy = axis();
        Vec2::new(dx, dy)
    }

    /// Destruction protocol: leave the population, score, split, explode
    pub fn on_destroyed(&self, body: &Body, config: &Config) -> Effects {
        let mut effects = Effects::explode();
        effects.asteroids_lost = 1;
        effects.score = self.size.points(config.asteroid.points);
        if let Some(child) = self.size.smaller() {
            for _ in 0..config.asteroid.spawn {
                effects.spawns.push(Spawn::Asteroid {
                    size: child,
                    pos: body.pos,
                });
            }
        }
        effects
    }
}

/// The player's ship
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ship {
    /// Ticks until the next missile may be fired
    pub missile_wait: u32,
}

impl Ship {
    pub fn new() -> Self {
        Self { missile_wait: 0 }
    }

    /// Count the cooldown down by one tick
    pub fn cool_down(&mut self) {
        if self.missile_wait > 0 {
            self.missile_wait -= 1;
        }
    }

    /// Fire if the cooldown has run out; returns whether a shot was taken
    pub fn try_fire(&mut self, delay: u32) -> bool {
        if self.missile_wait != 0 {
            return false;
        }
        self.missile_wait = delay;
        true
    }

    /// Resolve this tick's controls.
    ///
    /// Velocity is clamped first, then keys are read in a fixed order. Keys
    /// are independent: any combination may act in the same tick.
    pub fn control(&mut self, body: &mut Body, input: &TickInput, config: &Config) -> Effects {
        let tuning = &config.ship;
        let mut effects = Effects::default();

        body.clamp_velocity(tuning.velocity_max);

        if input.nudge_up {
            body.pos.y -= tuning.nudge_step;
        }
        if input.nudge_down {
            body.pos.y += tuning.nudge_step;
        }
        if input.nudge_left {
            body.pos.x -= tuning.nudge_step;
        }
        if input.nudge_right {
            body.pos.x += tuning.nudge_step;
        }
        if input.rotate_right {
            body.angle = normalize_degrees(body.angle + tuning.rot_step);
        }
        if input.rotate_left {
            body.angle = normalize_degrees(body.angle - tuning.rot_step);
        }
        if input.thrust {
            effects.sounds.push(SoundEffect::Thrust);
            body.vel = heading_vector(body.angle) * tuning.mov_step;
        }
        if input.face_up {
            body.angle = 0.0;
        }
        if input.face_down {
            body.angle = 180.0;
        }
        if input.quit {
            effects.end_game = true;
            effects.quit = true;
        }

        self.cool_down();
        if input.fire && self.try_fire(tuning.msl_delay) {
            effects.spawns.push(Spawn::Missile {
                origin: body.pos,
                angle: body.angle,
            });
        }

        effects
    }
}

impl Default for Ship {
    fn default() -> Self {
        Self::new()
    }
}

/// A missile in flight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Missile {
    /// Ticks left before it fizzles
    pub lifetime: u32,
}

impl Missile {
    /// Body for a missile launched from `origin` along `angle`
    pub fn launch_body(origin: Vec2, angle: f32, config: &Config) -> Body {
        let heading = heading_vector(angle);
        let pos = origin + heading * config.missile.buffer;
        let vel = heading * config.missile.vel_factor;
        let mut body = Body::new(pos, vel, Vec2::from(MISSILE_HALF_EXTENT));
        body.angle = angle;
        body
    }

    /// Count one tick of flight. Returns true once the lifetime is spent.
    pub fn age(&mut self) -> bool {
        self.lifetime = self.lifetime.saturating_sub(1);
        self.lifetime == 0
    }
}

/// Entity variants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    Asteroid(Asteroid),
    Ship(Ship),
    Missile(Missile),
}

impl EntityKind {
    /// Ships and missiles test for overlaps; asteroids are only ever hit
    pub fn initiates_collisions(&self) -> bool {
        !matches!(self, EntityKind::Asteroid(_))
    }

    /// Effects of being destroyed by contact
    pub fn on_destroyed(&self, body: &Body, config: &Config) -> Effects {
        match self {
            EntityKind::Asteroid(asteroid) => asteroid.on_destroyed(body, config),
            EntityKind::Ship(_) => {
                // Game over must be raised before the ship disappears
                let mut effects = Effects::explode();
                effects.end_game = true;
                effects
            }
            EntityKind::Missile(_) => Effects::explode(),
        }
    }

    pub fn image(&self) -> &'static str {
        match self {
            EntityKind::Asteroid(a) => a.size.image(),
            EntityKind::Ship(_) => "ship2.png",
            EntityKind::Missile(_) => "msl.png",
        }
    }
}

/// A simulated entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub body: Body,
    pub kind: EntityKind,
    /// Marked this tick; pruned once the tick finishes
    pub destroyed: bool,
}

impl Entity {
    pub fn is_asteroid(&self) -> bool {
        matches!(self.kind, EntityKind::Asteroid(_))
    }

    pub fn is_missile(&self) -> bool {
        matches!(self.kind, EntityKind::Missile(_))
    }
}

/// Explosion animation frames, in order
pub const EXPLOSION_IMAGES: [&str; 4] = ["expl1.png", "expl2.png", "expl3.png", "expl4.png"];

/// Non-collidable explosion animation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Explosion {
    pub pos: Vec2,
    pub ticks_left: u32,
}

impl Explosion {
    /// Animation frame to show, given the repeat interval
    pub fn frame(&self, total_ticks: u32, repeat_interval: u32) -> usize {
        let elapsed = total_ticks.saturating_sub(self.ticks_left);
        (elapsed / repeat_interval.max(1)) as usize
    }
}

/// One image for the host to draw this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub image: &'static str,
    pub pos: Vec2,
    /// Rotation in degrees
    pub angle: f32,
}

/// What happens when an on-screen message expires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OnExpire {
    Nothing,
    /// Ask the host to leave its main loop
    Quit,
}

/// Transient centred text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub pos: Vec2,
    /// Font size
    pub size: u32,
    pub ticks_left: u32,
    pub on_expire: OnExpire,
}

/// Events for the host's audio and display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Sound(SoundEffect),
    Music(Music),
    Explosion { pos: Vec2 },
    AsteroidDestroyed { size: AsteroidSize, points: u64 },
    LevelStarted { level: u32 },
    GameOver { score: u64, level: u32 },
    /// Host should leave its main loop
    Quit,
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub config: Config,
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    /// Levels started so far
    pub level: u32,
    pub score: u64,
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Live entities (sorted by id)
    pub entities: Vec<Entity>,
    pub explosions: Vec<Explosion>,
    pub messages: Vec<Message>,
    ship_id: Option<EntityId>,
    /// Live asteroid population
    asteroid_count: u32,
    quit_requested: bool,
    #[serde(skip)]
    events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a game with the ship at screen centre; no asteroids yet
    pub fn new(config: Config, seed: u64) -> Self {
        let mut state = Self {
            config,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            level: 0,
            score: 0,
            phase: GamePhase::Starting,
            time_ticks: 0,
            entities: Vec::new(),
            explosions: Vec::new(),
            messages: Vec::new(),
            ship_id: None,
            asteroid_count: 0,
            quit_requested: false,
            events: Vec::new(),
            next_id: 1,
        };

        let centre = state.screen_centre();
        let id = state.next_entity_id();
        state.entities.push(Entity {
            id,
            body: Body::new(centre, Vec2::ZERO, Vec2::from(SHIP_HALF_EXTENT)),
            kind: EntityKind::Ship(Ship::new()),
            destroyed: false,
        });
        state.ship_id = Some(id);

        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn screen_centre(&self) -> Vec2 {
        Vec2::new(self.config.screen.width / 2.0, self.config.screen.height / 2.0)
    }

    pub fn entity_index(&self, id: EntityId) -> Option<usize> {
        self.entities.binary_search_by_key(&id, |e| e.id).ok()
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entity_index(id).map(|i| &self.entities[i])
    }

    /// The ship, unless it has been destroyed
    pub fn ship(&self) -> Option<&Entity> {
        self.ship_id
            .and_then(|id| self.entity(id))
            .filter(|e| !e.destroyed)
    }

    pub fn ship_id(&self) -> Option<EntityId> {
        self.ship_id
    }

    /// Tracked live asteroid population
    pub fn asteroid_count(&self) -> u32 {
        self.asteroid_count
    }

    /// Asteroids actually alive right now (should equal `asteroid_count`)
    pub fn live_asteroids(&self) -> usize {
        self.entities
            .iter()
            .filter(|e| e.is_asteroid() && !e.destroyed)
            .count()
    }

    pub fn missile_count(&self) -> usize {
        self.entities
            .iter()
            .filter(|e| e.is_missile() && !e.destroyed)
            .count()
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Ask the host to stop (once)
    pub fn request_quit(&mut self) {
        if !self.quit_requested {
            log::info!("Quit requested at tick {}", self.time_ticks);
            self.quit_requested = true;
            self.emit(GameEvent::Quit);
        }
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events raised since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Peek at pending events
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    fn push_entity(&mut self, body: Body, kind: EntityKind) -> EntityId {
        let id = self.next_entity_id();
        self.entities.push(Entity {
            id,
            body,
            kind,
            destroyed: false,
        });
        id
    }

    /// Add an asteroid with a freshly rolled drift velocity
    pub fn spawn_asteroid(&mut self, size: AsteroidSize, pos: Vec2) -> EntityId {
        let vel = Asteroid::random_velocity(size, self.config.asteroid.speed, &mut self.rng);
        let body = Body::new(pos, vel, Vec2::splat(size.half_extent()));
        self.asteroid_count += 1;
        let id = self.push_entity(body, EntityKind::Asteroid(Asteroid { size }));
        log::debug!("Spawned {:?} asteroid {:?} at {:?}", size, id, pos);
        id
    }

    /// Launch a missile ahead of `origin`
    pub fn spawn_missile(&mut self, origin: Vec2, angle: f32) -> EntityId {
        let mut body = Missile::launch_body(origin, angle, &self.config);
        body.wrap(self.config.screen.width, self.config.screen.height);
        let lifetime = self.config.missile.lifetime;
        self.emit(GameEvent::Sound(SoundEffect::MissileLaunch));
        self.push_entity(body, EntityKind::Missile(Missile { lifetime }))
    }

    pub fn spawn_explosion(&mut self, pos: Vec2) {
        self.explosions.push(Explosion {
            pos,
            ticks_left: self.config.explosion_ticks(),
        });
        self.emit(GameEvent::Sound(SoundEffect::Explosion));
        self.emit(GameEvent::Explosion { pos });
    }

    /// Put a centred message on screen
    pub fn show_message(&mut self, text: String, size: u32, ticks: u32, on_expire: OnExpire) {
        let pos = self.screen_centre();
        self.messages.push(Message {
            text,
            pos,
            size,
            ticks_left: ticks,
            on_expire,
        });
    }

    /// Draw list: live entities by id, then explosions on top
    pub fn sprites(&self) -> Vec<Sprite> {
        let total = self.config.explosion_ticks();
        let interval = self.config.explosion.repeat_interval;
        let entities = self
            .entities
            .iter()
            .filter(|e| !e.destroyed)
            .map(|e| Sprite {
                image: e.kind.image(),
                pos: e.body.pos,
                angle: e.body.angle,
            });
        let explosions = self.explosions.iter().map(|x| {
            let frame = x.frame(total, interval).min(EXPLOSION_IMAGES.len() - 1);
            Sprite {
                image: EXPLOSION_IMAGES[frame],
                pos: x.pos,
                angle: 0.0,
            }
        });
        entities.chain(explosions).collect()
    }

    /// Drop entities destroyed during the tick
    pub fn prune(&mut self) {
        self.entities.retain(|e| !e.destroyed);
    }

    pub(super) fn lose_asteroids(&mut self, count: u32) {
        self.asteroid_count = self.asteroid_count.saturating_sub(count);
    }
}
