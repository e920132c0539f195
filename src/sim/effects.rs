//! Side effects requested by entity hooks
//!
//! Entity behaviour never mutates the game directly. Per-tick and
//! on-destroy hooks describe what should happen in an [`Effects`] value and
//! the game controller applies it in a fixed order.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::AsteroidSize;
use crate::audio::SoundEffect;

/// A new entity the controller should create
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Spawn {
    /// Asteroid at a position; velocity is rolled by the controller's RNG
    Asteroid { size: AsteroidSize, pos: Vec2 },
    /// Missile launched from `origin` along `angle` (degrees)
    Missile { origin: Vec2, angle: f32 },
}

/// How an entity leaves the play field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Removal {
    /// Destroyed by contact: leaves an explosion behind
    Explode,
    /// Silent removal (expired missile)
    Vanish,
}

/// Effect descriptor consumed by `GameState::apply`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Effects {
    pub spawns: Vec<Spawn>,
    /// Points to add to the score
    pub score: u64,
    /// Asteroids leaving the live population
    pub asteroids_lost: u32,
    pub sounds: Vec<SoundEffect>,
    /// Run the game-over transition
    pub end_game: bool,
    /// The quit key was held when `end_game` was raised
    pub quit: bool,
    pub removal: Option<Removal>,
}

impl Effects {
    /// Plain removal, nothing else
    pub fn vanish() -> Self {
        Self {
            removal: Some(Removal::Vanish),
            ..Default::default()
        }
    }

    /// Removal with an explosion, nothing else
    pub fn explode() -> Self {
        Self {
            removal: Some(Removal::Explode),
            ..Default::default()
        }
    }
}
