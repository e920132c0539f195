//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed tick only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod effects;
pub mod level;
pub mod motion;
pub mod state;
pub mod tick;

pub use effects::{Effects, Removal, Spawn};
pub use level::GAME_OVER_TEXT;
pub use motion::Body;
pub use state::{
    Asteroid, AsteroidSize, Entity, EntityId, EntityKind, Explosion, GameEvent, GamePhase,
    GameState, Message, Missile, OnExpire, Ship, Sprite, EXPLOSION_IMAGES,
};
pub use tick::{Destruction, Key, TickInput, tick};
