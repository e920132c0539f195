//! Fixed-rate simulation tick
//!
//! One call advances every entity once, in id order. Entities spawned
//! during a tick are visible to overlap tests immediately but first move on
//! the next tick. Destroyed entities are only marked; they are pruned after
//! the whole tick has run so iteration never sees a shifting collection.

use super::effects::{Effects, Removal, Spawn};
use super::state::{EntityId, EntityKind, GameEvent, GamePhase, GameState, OnExpire};

/// Keys the host can be asked about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    S,
    A,
    D,
    Right,
    Left,
    Up,
    Digit1,
    Digit2,
    Q,
    Space,
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Move one step up / down / left / right (W S A D)
    pub nudge_up: bool,
    pub nudge_down: bool,
    pub nudge_left: bool,
    pub nudge_right: bool,
    /// Turn clockwise (Right arrow)
    pub rotate_right: bool,
    /// Turn counter-clockwise (Left arrow)
    pub rotate_left: bool,
    /// Set velocity along the facing (Up arrow)
    pub thrust: bool,
    /// Snap facing to 0° (1)
    pub face_up: bool,
    /// Snap facing to 180° (2)
    pub face_down: bool,
    /// End the game and leave (Q)
    pub quit: bool,
    /// Launch a missile (Space)
    pub fire: bool,
}

impl TickInput {
    /// Build from the host's keyboard `is_pressed` query
    pub fn from_keys(is_pressed: impl Fn(Key) -> bool) -> Self {
        Self {
            nudge_up: is_pressed(Key::W),
            nudge_down: is_pressed(Key::S),
            nudge_left: is_pressed(Key::A),
            nudge_right: is_pressed(Key::D),
            rotate_right: is_pressed(Key::Right),
            rotate_left: is_pressed(Key::Left),
            thrust: is_pressed(Key::Up),
            face_up: is_pressed(Key::Digit1),
            face_down: is_pressed(Key::Digit2),
            quit: is_pressed(Key::Q),
            fire: is_pressed(Key::Space),
        }
    }
}

/// Why an entity is being removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destruction {
    /// Contact with another entity: full destroy hook
    Collision,
    /// Lifetime ran out: silent removal
    Expired,
}

/// Advance the game state by one tick
pub fn tick(state: &mut GameState, input: &TickInput) {
    if state.quit_requested() {
        return;
    }

    state.time_ticks += 1;

    let ids: Vec<EntityId> = state.entities.iter().map(|e| e.id).collect();
    for id in ids {
        update_entity(state, id, input);
    }

    // With the ship gone the banner still offers exit on Q
    if state.phase == GamePhase::Ending && input.quit {
        state.end(true);
    }

    update_overlays(state);
    state.prune();
}

/// Move one entity, resolve its contacts, then run its behaviour
fn update_entity(state: &mut GameState, id: EntityId, input: &TickInput) {
    let Some(idx) = state.entity_index(id) else {
        return;
    };
    if state.entities[idx].destroyed {
        return;
    }

    let (width, height) = (state.config.screen.width, state.config.screen.height);
    state.entities[idx].body.step(width, height);

    if state.entities[idx].kind.initiates_collisions() && resolve_collisions(state, idx) {
        return;
    }

    // Spawns only append, so `idx` is still this entity
    let mut expired = false;
    let effects = {
        let config = &state.config;
        let entity = &mut state.entities[idx];
        match &mut entity.kind {
            EntityKind::Ship(ship) => ship.control(&mut entity.body, input, config),
            EntityKind::Missile(missile) => {
                expired = missile.age();
                Effects::default()
            }
            EntityKind::Asteroid(_) => Effects::default(),
        }
    };
    if expired {
        state.destroy(id, Destruction::Expired);
        return;
    }
    state.apply(id, effects);
}

/// Destroy everything overlapping the entity at `idx`, then the entity itself.
/// Returns true if anything was hit.
fn resolve_collisions(state: &mut GameState, idx: usize) -> bool {
    let me = state.entities[idx].id;
    let body = state.entities[idx].body;
    let hits: Vec<EntityId> = state
        .entities
        .iter()
        .filter(|other| other.id != me && !other.destroyed && other.body.overlaps(&body))
        .map(|other| other.id)
        .collect();

    if hits.is_empty() {
        return false;
    }

    for other in hits {
        state.destroy(other, Destruction::Collision);
    }
    state.destroy(me, Destruction::Collision);
    true
}

/// Count down explosions and messages; expired quit banners stop the game
fn update_overlays(state: &mut GameState) {
    for explosion in &mut state.explosions {
        explosion.ticks_left = explosion.ticks_left.saturating_sub(1);
    }
    state.explosions.retain(|e| e.ticks_left > 0);

    let mut quit = false;
    for message in &mut state.messages {
        message.ticks_left = message.ticks_left.saturating_sub(1);
        if message.ticks_left == 0 && message.on_expire == OnExpire::Quit {
            quit = true;
        }
    }
    state.messages.retain(|m| m.ticks_left > 0);

    if quit {
        state.request_quit();
    }
}

impl GameState {
    /// Remove an entity, running its destroy hook at most once.
    ///
    /// Already-destroyed or unknown ids are ignored, so mutual contacts
    /// within a tick never score or split twice.
    pub fn destroy(&mut self, id: EntityId, cause: Destruction) {
        let Some(idx) = self.entity_index(id) else {
            return;
        };
        if self.entities[idx].destroyed {
            return;
        }
        self.entities[idx].destroyed = true;

        let entity = &self.entities[idx];
        log::debug!("Destroying {:?} ({:?})", entity.id, cause);
        let effects = match cause {
            Destruction::Collision => entity.kind.on_destroyed(&entity.body, &self.config),
            Destruction::Expired => Effects::vanish(),
        };
        self.apply(id, effects);
    }

    /// Apply an effect descriptor raised by entity `source`.
    ///
    /// Order: population, score, game over, spawns, sounds, removal, and
    /// finally the level-clear check.
    pub fn apply(&mut self, source: EntityId, effects: Effects) {
        if effects.asteroids_lost > 0 {
            self.lose_asteroids(effects.asteroids_lost);
        }

        if effects.score > 0 {
            self.score += effects.score;
            if let Some(EntityKind::Asteroid(asteroid)) = self.entity(source).map(|e| e.kind) {
                self.emit(GameEvent::AsteroidDestroyed {
                    size: asteroid.size,
                    points: effects.score,
                });
            }
        }

        if effects.end_game {
            self.end(effects.quit);
        }

        for spawn in effects.spawns {
            match spawn {
                Spawn::Asteroid { size, pos } => {
                    self.spawn_asteroid(size, pos);
                }
                Spawn::Missile { origin, angle } => {
                    self.spawn_missile(origin, angle);
                }
            }
        }

        for sound in effects.sounds {
            self.emit(GameEvent::Sound(sound));
        }

        if let Some(removal) = effects.removal {
            if let Some(idx) = self.entity_index(source) {
                self.entities[idx].destroyed = true;
                if removal == Removal::Explode {
                    let pos = self.entities[idx].body.pos;
                    self.spawn_explosion(pos);
                }
            }
        }

        if effects.asteroids_lost > 0 && self.asteroid_count() == 0 {
            self.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::audio::SoundEffect;
    use crate::settings::Config;
    use crate::sim::state::AsteroidSize;

    fn new_game() -> GameState {
        GameState::new(Config::default(), 12345)
    }

    fn hold(input: TickInput, state: &mut GameState, ticks: u32) {
        for _ in 0..ticks {
            tick(state, &input);
        }
    }

    fn explosions_in(events: &[GameEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::Explosion { .. }))
            .count()
    }

    /// Park an asteroid where nothing will touch it
    fn still_asteroid(state: &mut GameState, size: AsteroidSize, pos: Vec2) -> EntityId {
        let id = state.spawn_asteroid(size, pos);
        let idx = state.entity_index(id).unwrap();
        state.entities[idx].body.vel = Vec2::ZERO;
        id
    }

    #[test]
    fn test_from_keys() {
        let input = TickInput::from_keys(|k| matches!(k, Key::Space | Key::Left | Key::W));
        assert!(input.fire && input.rotate_left && input.nudge_up);
        assert!(!input.quit && !input.thrust);
    }

    #[test]
    fn test_large_asteroid_splits_into_two_middles() {
        let mut state = new_game();
        let id = still_asteroid(&mut state, AsteroidSize::Large, Vec2::new(100.0, 100.0));
        state.destroy(id, Destruction::Collision);

        assert_eq!(state.asteroid_count(), 2);
        assert_eq!(state.live_asteroids(), 2);
        assert_eq!(state.score, 10);
        let children: Vec<_> = state
            .entities
            .iter()
            .filter(|e| !e.destroyed)
            .filter_map(|e| match e.kind {
                EntityKind::Asteroid(a) => Some((a.size, e.body.pos)),
                _ => None,
            })
            .collect();
        assert_eq!(children.len(), 2);
        for (size, pos) in children {
            assert_eq!(size, AsteroidSize::Middle);
            assert_eq!(pos, Vec2::new(100.0, 100.0));
        }
    }

    #[test]
    fn test_population_deltas() {
        let mut state = new_game();
        still_asteroid(&mut state, AsteroidSize::Large, Vec2::new(500.0, 400.0));

        let middle = still_asteroid(&mut state, AsteroidSize::Middle, Vec2::new(100.0, 100.0));
        let before = state.asteroid_count();
        state.destroy(middle, Destruction::Collision);
        assert_eq!(state.asteroid_count(), before + 1);
        assert_eq!(state.score, 15);

        let small = still_asteroid(&mut state, AsteroidSize::Small, Vec2::new(100.0, 300.0));
        let before = state.asteroid_count();
        state.destroy(small, Destruction::Collision);
        assert_eq!(state.asteroid_count(), before - 1);
        assert_eq!(state.score, 45);
        assert_eq!(state.asteroid_count() as usize, state.live_asteroids());
    }

    #[test]
    fn test_full_split_chain_advances_once() {
        let mut state = new_game();
        let large = still_asteroid(&mut state, AsteroidSize::Large, Vec2::new(100.0, 100.0));

        state.destroy(large, Destruction::Collision);
        assert_eq!(state.asteroid_count(), 2);

        let middles: Vec<EntityId> = state
            .entities
            .iter()
            .filter(|e| e.is_asteroid() && !e.destroyed)
            .map(|e| e.id)
            .collect();
        for id in middles {
            state.destroy(id, Destruction::Collision);
        }
        assert_eq!(state.asteroid_count(), 4);

        let smalls: Vec<EntityId> = state
            .entities
            .iter()
            .filter(|e| e.is_asteroid() && !e.destroyed)
            .map(|e| e.id)
            .collect();
        assert_eq!(smalls.len(), 4);
        assert_eq!(state.level, 0);
        for id in smalls {
            state.destroy(id, Destruction::Collision);
        }

        // Clearing the field ran advance() exactly once: level 1, one new rock
        assert_eq!(state.level, 1);
        assert_eq!(state.asteroid_count(), 1);
        assert_eq!(state.live_asteroids(), 1);
        assert_eq!(state.score, 10 + 2 * 15 + 4 * 30);
        let started = state
            .events()
            .iter()
            .filter(|e| matches!(e, GameEvent::LevelStarted { .. }))
            .count();
        assert_eq!(started, 1);
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let mut state = new_game();
        still_asteroid(&mut state, AsteroidSize::Small, Vec2::new(500.0, 400.0));
        let id = still_asteroid(&mut state, AsteroidSize::Large, Vec2::new(100.0, 100.0));
        state.destroy(id, Destruction::Collision);
        state.destroy(id, Destruction::Collision);
        assert_eq!(state.score, 10);
        assert_eq!(state.asteroid_count(), 3);
    }

    #[test]
    fn test_missile_hits_two_fragments_once() {
        let mut state = new_game();
        // Keep one rock elsewhere so clearing these does not advance the level
        still_asteroid(&mut state, AsteroidSize::Large, Vec2::new(560.0, 420.0));
        let a = still_asteroid(&mut state, AsteroidSize::Small, Vec2::new(100.0, 60.0));
        let b = still_asteroid(&mut state, AsteroidSize::Small, Vec2::new(104.0, 60.0));

        // Missile flying right, arriving on top of both fragments next tick
        let missile = state.spawn_missile(Vec2::new(0.0, 60.0), 90.0);
        let idx = state.entity_index(missile).unwrap();
        state.entities[idx].body.pos = Vec2::new(95.0, 60.0);
        state.drain_events();

        tick(&mut state, &TickInput::default());

        assert!(state.entity(a).is_none());
        assert!(state.entity(b).is_none());
        assert!(state.entity(missile).is_none());
        assert_eq!(state.score, 60);
        assert_eq!(state.asteroid_count(), 1);
        // Two rocks and the missile, one explosion each
        assert_eq!(explosions_in(&state.drain_events()), 3);
    }

    #[test]
    fn test_fire_twice_within_delay_gives_one_missile() {
        let mut state = new_game();
        let fire = TickInput {
            fire: true,
            ..Default::default()
        };

        hold(fire, &mut state, 2);
        assert_eq!(state.missile_count(), 1);

        // Held for a full delay: the cooldown reaches zero on tick 26
        hold(fire, &mut state, 23);
        assert_eq!(state.missile_count(), 1);
        hold(fire, &mut state, 1);
        assert_eq!(state.missile_count(), 2);

        let ship = state.ship().unwrap();
        match ship.kind {
            EntityKind::Ship(s) => assert_eq!(s.missile_wait, state.config.ship.msl_delay),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_fire_plays_launch_sound() {
        let mut state = new_game();
        let fire = TickInput {
            fire: true,
            ..Default::default()
        };
        tick(&mut state, &fire);
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::Sound(SoundEffect::MissileLaunch))
        );
    }

    #[test]
    fn test_missile_expires_silently_on_lifetime_tick() {
        let mut state = new_game();
        let missile = state.spawn_missile(Vec2::new(100.0, 50.0), 90.0);
        state.drain_events();
        let score = state.score;

        hold(TickInput::default(), &mut state, 39);
        assert!(state.entity(missile).is_some());

        tick(&mut state, &TickInput::default());
        assert!(state.entity(missile).is_none());
        assert_eq!(state.score, score);
        assert!(state.explosions.is_empty());
        assert_eq!(explosions_in(&state.drain_events()), 0);
    }

    #[test]
    fn test_expired_missile_is_not_destroyed_again() {
        let mut state = new_game();
        let missile = state.spawn_missile(Vec2::new(100.0, 50.0), 90.0);
        state.drain_events();

        state.destroy(missile, Destruction::Expired);
        state.destroy(missile, Destruction::Collision);

        assert!(state.entity(missile).unwrap().destroyed);
        assert_eq!(state.score, 0);
        assert!(state.explosions.is_empty());
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_ship_velocity_clamped_each_tick() {
        let mut state = new_game();
        let ship = state.ship_id().unwrap();
        let idx = state.entity_index(ship).unwrap();
        state.entities[idx].body.vel = Vec2::new(9.0, -9.0);

        tick(&mut state, &TickInput::default());

        let vel = state.entity(ship).unwrap().body.vel;
        assert_eq!(vel, Vec2::new(3.0, -3.0));
    }

    #[test]
    fn test_ship_collision_ends_game() {
        let mut state = new_game();
        still_asteroid(&mut state, AsteroidSize::Large, Vec2::new(560.0, 420.0));
        let centre = state.screen_centre();
        still_asteroid(&mut state, AsteroidSize::Small, centre);

        tick(&mut state, &TickInput::default());

        assert!(state.ship().is_none());
        assert_eq!(state.phase, GamePhase::Ending);
        assert_eq!(state.messages.len(), 1);
        assert!(state.messages[0].text.starts_with("Game Over"));
        assert_eq!(state.score, 30);
        assert!(!state.quit_requested());
    }

    #[test]
    fn test_ship_destroyed_and_quit_same_tick() {
        let mut state = new_game();
        still_asteroid(&mut state, AsteroidSize::Large, Vec2::new(560.0, 420.0));
        let centre = state.screen_centre();
        still_asteroid(&mut state, AsteroidSize::Small, centre);

        let quit = TickInput {
            quit: true,
            ..Default::default()
        };
        tick(&mut state, &quit);

        let game_overs = state
            .drain_events()
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(game_overs, 1);
        assert_eq!(state.messages.len(), 1);
        assert!(state.quit_requested());
    }

    #[test]
    fn test_quit_key_ends_and_stops() {
        let mut state = new_game();
        state.start();
        let quit = TickInput {
            quit: true,
            ..Default::default()
        };
        tick(&mut state, &quit);
        assert_eq!(state.phase, GamePhase::Ending);
        assert!(state.quit_requested());

        // Further ticks are ignored once quit was requested
        let ticks = state.time_ticks;
        tick(&mut state, &TickInput::default());
        assert_eq!(state.time_ticks, ticks);
    }

    #[test]
    fn test_game_over_banner_expiry_requests_quit() {
        let mut state = new_game();
        state.end(false);
        let ticks = state.config.game_over_ticks();

        hold(TickInput::default(), &mut state, ticks - 1);
        assert!(!state.quit_requested());
        tick(&mut state, &TickInput::default());
        assert!(state.quit_requested());
        assert!(state.drain_events().contains(&GameEvent::Quit));
    }

    #[test]
    fn test_thrust_and_heading_presets() {
        let mut state = new_game();
        let input = TickInput {
            rotate_right: true,
            ..Default::default()
        };
        hold(input, &mut state, 30);
        assert!((state.ship().unwrap().body.angle - 90.0).abs() < 1e-3);

        let thrust = TickInput {
            thrust: true,
            ..Default::default()
        };
        tick(&mut state, &thrust);
        let vel = state.ship().unwrap().body.vel;
        assert!((vel.x - 3.0).abs() < 1e-4 && vel.y.abs() < 1e-4);
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::Sound(SoundEffect::Thrust))
        );

        let preset = TickInput {
            face_down: true,
            ..Default::default()
        };
        tick(&mut state, &preset);
        assert_eq!(state.ship().unwrap().body.angle, 180.0);

        let preset = TickInput {
            face_up: true,
            ..Default::default()
        };
        tick(&mut state, &preset);
        assert_eq!(state.ship().unwrap().body.angle, 0.0);
    }

    #[test]
    fn test_nudge_keys() {
        let mut state = new_game();
        let start = state.ship().unwrap().body.pos;
        let input = TickInput {
            nudge_up: true,
            nudge_right: true,
            ..Default::default()
        };
        tick(&mut state, &input);
        assert_eq!(state.ship().unwrap().body.pos, start + Vec2::new(1.0, -1.0));
    }

    #[test]
    fn test_explosion_expires_after_animation() {
        let mut state = new_game();
        state.spawn_explosion(Vec2::new(10.0, 10.0));
        let ticks = state.config.explosion_ticks();
        hold(TickInput::default(), &mut state, ticks - 1);
        assert_eq!(state.explosions.len(), 1);
        tick(&mut state, &TickInput::default());
        assert!(state.explosions.is_empty());
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let mut state1 = new_game();
        let mut state2 = new_game();
        state1.start();
        state2.start();

        let inputs = [
            TickInput {
                rotate_right: true,
                fire: true,
                ..Default::default()
            },
            TickInput {
                thrust: true,
                ..Default::default()
            },
            TickInput::default(),
        ];

        for step in 0..300 {
            let input = &inputs[step % inputs.len()];
            tick(&mut state1, input);
            tick(&mut state2, input);
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.score, state2.score);
        assert_eq!(state1.entities, state2.entities);
    }
}
