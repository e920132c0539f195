//! Space Rocks - A single-screen asteroid shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (motion, collisions, splitting, levels)
//! - `audio`: Sound catalogue and the playback seam implemented by the host
//! - `settings`: Runtime configuration with validated JSON round-trip
//!
//! Rendering, asset decoding and the window/main loop belong to the host.
//! The simulation only emits events describing what should be shown or heard.

pub mod audio;
pub mod settings;
pub mod sim;

pub use settings::{Config, ConfigError, SpawnSpan};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Screen dimensions (pixels)
    pub const SCREEN_WIDTH: f32 = 640.0;
    pub const SCREEN_HEIGHT: f32 = 480.0;
    /// Simulation ticks per second
    pub const FPS: u32 = 50;

    /// Asteroid base speed (pixels/tick, divided by size tier)
    pub const ASTEROID_SPEED: f32 = 2.0;
    /// Fragments spawned when a non-small asteroid breaks
    pub const ASTEROID_SPAWN: u32 = 2;
    /// Points for destroying an asteroid (divided by size tier)
    pub const ASTEROID_POINTS: u64 = 30;

    /// Ship rotation per tick (degrees)
    pub const SHIP_ROT_STEP: f32 = 3.0;
    /// Thrust speed along the facing (pixels/tick)
    pub const SHIP_MOV_STEP: f32 = 3.0;
    /// Directional nudge per tick (pixels)
    pub const SHIP_NUDGE_STEP: f32 = 1.0;
    /// Ticks between missile shots
    pub const SHIP_MSL_DELAY: u32 = 25;
    /// Per-axis velocity clamp
    pub const SHIP_VELOCITY_MAX: f32 = 3.0;

    /// Distance ahead of the ship where missiles appear
    pub const MISSILE_BUFFER: f32 = 90.0;
    /// Missile speed (pixels/tick)
    pub const MISSILE_VEL_FACTOR: f32 = 7.0;
    /// Missile lifetime (ticks)
    pub const MISSILE_LIFETIME: u32 = 40;

    /// Minimum Manhattan offset between the ship and a freshly spawned asteroid
    pub const LEVEL_SPAWN_BUFFER: f32 = 150.0;
    /// "level N" banner duration (seconds)
    pub const LEVEL_MESSAGE_SECS: u32 = 3;
    /// "Game Over" banner duration (seconds)
    pub const GAME_OVER_MESSAGE_SECS: u32 = 5;

    /// Explosion animation: frames x ticks per frame
    pub const EXPLOSION_FRAMES: u32 = 4;
    pub const EXPLOSION_REPEAT_INTERVAL: u32 = 7;

    /// Collision half-extents (pixels)
    pub const SHIP_HALF_EXTENT: (f32, f32) = (20.0, 24.0);
    pub const MISSILE_HALF_EXTENT: (f32, f32) = (4.0, 4.0);
    pub const ASTEROID_SMALL_HALF_EXTENT: f32 = 12.0;
    pub const ASTEROID_MIDDLE_HALF_EXTENT: f32 = 22.0;
    pub const ASTEROID_LARGE_HALF_EXTENT: f32 = 36.0;
}

/// Normalize an angle in degrees to [0, 360)
#[inline]
pub fn normalize_degrees(angle: f32) -> f32 {
    let a = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if a >= 360.0 { 0.0 } else { a }
}

/// Unit vector for a heading in degrees.
///
/// 0° points up the screen and angles grow clockwise, so with screen y
/// growing downward the vector is `(sin a, -cos a)`.
#[inline]
pub fn heading_vector(angle_deg: f32) -> Vec2 {
    let rad = angle_deg.to_radians();
    Vec2::new(rad.sin(), -rad.cos())
}
