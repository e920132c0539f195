//! Game configuration
//!
//! Every tunable lives here with defaults taken from [`crate::consts`].
//! The host may override them from JSON; the simulation only reads them.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Errors raised while loading or validating a [`Config`]
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// JSON could not be parsed into a config
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field holds a value the simulation cannot run with
    #[error("Invalid config: {field} {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Range used for the vertical offset when placing a level's asteroids.
///
/// `ScreenWidth` sizes the vertical range by the screen width before the
/// result wraps by height, reaching further than the screen is tall. This is
/// the long-standing placement. `ScreenHeight` sizes it by the height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpawnSpan {
    #[default]
    ScreenWidth,
    ScreenHeight,
}

/// Screen geometry and tick rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenConfig {
    pub width: f32,
    pub height: f32,
    pub fps: u32,
}

/// Asteroid tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsteroidConfig {
    /// Base speed, divided by size tier
    pub speed: f32,
    /// Fragments spawned on a split
    pub spawn: u32,
    /// Base points, divided by size tier
    pub points: u64,
}

/// Ship tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipConfig {
    pub rot_step: f32,
    pub mov_step: f32,
    pub nudge_step: f32,
    pub msl_delay: u32,
    pub velocity_max: f32,
}

/// Missile tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissileConfig {
    /// Standoff distance from the ship at launch
    pub buffer: f32,
    pub vel_factor: f32,
    /// Ticks before self-destruct
    pub lifetime: u32,
}

/// Level progression tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Sum of the minimum x and y offsets between ship and new asteroids
    pub spawn_buffer: f32,
    pub message_secs: u32,
    pub game_over_secs: u32,
    #[serde(default)]
    pub spawn_y_span: SpawnSpan,
}

/// Explosion animation timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplosionConfig {
    pub frames: u32,
    pub repeat_interval: u32,
}

/// Full game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub screen: ScreenConfig,
    pub asteroid: AsteroidConfig,
    pub ship: ShipConfig,
    pub missile: MissileConfig,
    pub level: LevelConfig,
    pub explosion: ExplosionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            screen: ScreenConfig {
                width: SCREEN_WIDTH,
                height: SCREEN_HEIGHT,
                fps: FPS,
            },
            asteroid: AsteroidConfig {
                speed: ASTEROID_SPEED,
                spawn: ASTEROID_SPAWN,
                points: ASTEROID_POINTS,
            },
            ship: ShipConfig {
                rot_step: SHIP_ROT_STEP,
                mov_step: SHIP_MOV_STEP,
                nudge_step: SHIP_NUDGE_STEP,
                msl_delay: SHIP_MSL_DELAY,
                velocity_max: SHIP_VELOCITY_MAX,
            },
            missile: MissileConfig {
                buffer: MISSILE_BUFFER,
                vel_factor: MISSILE_VEL_FACTOR,
                lifetime: MISSILE_LIFETIME,
            },
            level: LevelConfig {
                spawn_buffer: LEVEL_SPAWN_BUFFER,
                message_secs: LEVEL_MESSAGE_SECS,
                game_over_secs: GAME_OVER_MESSAGE_SECS,
                spawn_y_span: SpawnSpan::default(),
            },
            explosion: ExplosionConfig {
                frames: EXPLOSION_FRAMES,
                repeat_interval: EXPLOSION_REPEAT_INTERVAL,
            },
        }
    }
}

impl Config {
    /// Parse and validate a config from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Pretty JSON dump (used by the host at startup)
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: &'static str) -> Result<(), ConfigError> {
            Err(ConfigError::Invalid { field, reason })
        }

        // Wrapping keeps a centre on screen only for boxes narrower than it
        let (min_width, min_height) = Self::min_screen_size();
        if !(self.screen.width > min_width) {
            return invalid("screen.width", "must exceed the largest entity box");
        }
        if !(self.screen.height > min_height) {
            return invalid("screen.height", "must exceed the largest entity box");
        }
        if self.screen.fps == 0 {
            return invalid("screen.fps", "must be positive");
        }
        if self.asteroid.spawn == 0 {
            return invalid("asteroid.spawn", "must be at least 1");
        }
        if self.missile.lifetime == 0 {
            return invalid("missile.lifetime", "must be at least 1 tick");
        }
        if !(self.level.spawn_buffer >= 1.0) {
            return invalid("level.spawn_buffer", "must be at least 1");
        }
        if self.level.spawn_buffer >= self.screen.width {
            return invalid("level.spawn_buffer", "must be smaller than screen.width");
        }
        Ok(())
    }

    /// Full width and height of the largest entity box
    fn min_screen_size() -> (f32, f32) {
        let widest = ASTEROID_LARGE_HALF_EXTENT
            .max(SHIP_HALF_EXTENT.0)
            .max(MISSILE_HALF_EXTENT.0);
        let tallest = ASTEROID_LARGE_HALF_EXTENT
            .max(SHIP_HALF_EXTENT.1)
            .max(MISSILE_HALF_EXTENT.1);
        (2.0 * widest, 2.0 * tallest)
    }

    /// Level banner lifetime in ticks
    pub fn level_message_ticks(&self) -> u32 {
        self.level.message_secs.saturating_mul(self.screen.fps)
    }

    /// Game over banner lifetime in ticks
    pub fn game_over_ticks(&self) -> u32 {
        self.level.game_over_secs.saturating_mul(self.screen.fps)
    }

    /// Explosion animation length in ticks
    pub fn explosion_ticks(&self) -> u32 {
        self.explosion
            .frames
            .saturating_mul(self.explosion.repeat_interval)
    }
}
