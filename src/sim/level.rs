//! Level progression and game over
//!
//! The controller side of [`GameState`]: starting the run, spawning each
//! level's asteroid batch around the ship, and the one-way transition into
//! the game over banner.

use glam::Vec2;
use rand::Rng;

use super::state::{AsteroidSize, GameEvent, GamePhase, GameState, OnExpire};
use crate::audio::{Music, SoundEffect};
use crate::settings::SpawnSpan;

/// Font size of the level banner
const LEVEL_MESSAGE_SIZE: u32 = 30;
/// Font size of the game over banner
const GAME_OVER_MESSAGE_SIZE: u32 = 40;

pub const GAME_OVER_TEXT: &str = "Game Over. Press `q` key for exit.";

impl GameState {
    /// Start the run: music on, first level spawned
    pub fn start(&mut self) {
        self.emit(GameEvent::Music(Music::Theme));
        self.advance();
    }

    /// Start the next level.
    ///
    /// Spawns `level` large asteroids around the ship, shows the level
    /// banner and plays the level-up sound from level 2 on. Ignored once the
    /// game is ending.
    pub fn advance(&mut self) {
        if self.phase == GamePhase::Ending {
            log::debug!("Field cleared after game over, not advancing");
            return;
        }

        self.level += 1;
        let anchor = self
            .ship()
            .map(|ship| ship.body.pos)
            .unwrap_or_else(|| self.screen_centre());

        for _ in 0..self.level {
            let pos = self.asteroid_spawn_point(anchor);
            self.spawn_asteroid(AsteroidSize::Large, pos);
        }

        let ticks = self.config.level_message_ticks();
        self.show_message(
            format!("level {}", self.level),
            LEVEL_MESSAGE_SIZE,
            ticks,
            OnExpire::Nothing,
        );
        if self.level > 1 {
            self.emit(GameEvent::Sound(SoundEffect::LevelUp));
        }

        self.phase = GamePhase::Playing;
        self.emit(GameEvent::LevelStarted { level: self.level });
        log::info!(
            "Level {}: {} asteroids, score {}",
            self.level,
            self.asteroid_count(),
            self.score
        );
    }

    /// Enter the game over state.
    ///
    /// The banner is shown only on the first call; later calls (a quit key
    /// arriving with the ship's destruction, say) only honour `quit_pressed`.
    pub fn end(&mut self, quit_pressed: bool) {
        if self.phase != GamePhase::Ending {
            self.phase = GamePhase::Ending;
            let ticks = self.config.game_over_ticks();
            self.show_message(
                GAME_OVER_TEXT.to_string(),
                GAME_OVER_MESSAGE_SIZE,
                ticks,
                OnExpire::Quit,
            );
            self.emit(GameEvent::GameOver {
                score: self.score,
                level: self.level,
            });
            log::info!("Game over at level {} with score {}", self.level, self.score);
        }

        if quit_pressed {
            self.request_quit();
        }
    }

    /// Position for a new large asteroid, kept away from `anchor`.
    ///
    /// The x offset starts somewhere in `[0, buffer)` and the y offset at
    /// the remainder, so the two minimums always sum to `buffer`. Each is
    /// then pushed further by a random amount and the result wraps onto the
    /// screen.
    fn asteroid_spawn_point(&mut self, anchor: Vec2) -> Vec2 {
        let screen = &self.config.screen;
        let (width, height) = (screen.width, screen.height);
        let buffer = self.config.level.spawn_buffer as u32;
        let y_span = match self.config.level.spawn_y_span {
            SpawnSpan::ScreenWidth => width as u32,
            SpawnSpan::ScreenHeight => height as u32,
        };

        let x_min = self.rng.random_range(0..buffer.max(1));
        let y_min = buffer - x_min;
        let x_distance = spawn_offset(&mut self.rng, x_min, width as u32);
        let y_distance = spawn_offset(&mut self.rng, y_min, y_span);

        Vec2::new(
            (anchor.x + x_distance as f32).rem_euclid(width),
            (anchor.y + y_distance as f32).rem_euclid(height),
        )
    }
}

/// Random offset in `[min, span - min)`, or `min` when that range is empty
fn spawn_offset(rng: &mut impl Rng, min: u32, span: u32) -> u32 {
    let max = span.saturating_sub(min);
    if max <= min {
        log::warn!("Spawn range [{}, {}) is empty, using its start", min, max);
        return min;
    }
    rng.random_range(min..max)
}
