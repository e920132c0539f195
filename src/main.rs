//! Space Rocks entry point
//!
//! Headless native host: logs the active configuration, then drives the
//! simulation at its fixed tick rate with a scripted pilot until the game
//! asks to quit. A windowed host would replace the pilot with keyboard
//! polling and draw `GameState` each frame.

use std::time::{Duration, Instant};

use space_rocks::Config;
use space_rocks::audio::{AudioBackend, AudioManager};
use space_rocks::sim::{GameEvent, GameState, Key, TickInput, tick};

/// Set to any value to silence the audio log
const MUTE_ENV: &str = "SPACE_ROCKS_MUTE";
/// Master volume override (0.0 - 1.0)
const VOLUME_ENV: &str = "SPACE_ROCKS_VOLUME";

/// Maximum ticks to catch up per frame to prevent spiral of death
const MAX_SUBSTEPS: u32 = 8;
/// Hard stop for the demo run (two minutes of game time at 50 fps)
const MAX_TICKS: u64 = 6_000;

/// Audio backend that only logs what would play
struct LogAudio;

impl AudioBackend for LogAudio {
    fn play_sample(&mut self, path: &str, volume: f32) {
        log::debug!("play {} @ {:.2}", path, volume);
    }

    fn play_music(&mut self, path: &str, volume: f32) {
        log::info!("music {} @ {:.2}", path, volume);
    }
}

/// Scripted pilot: sweep the turret round and keep firing
fn pilot_keys(tick_index: u64) -> impl Fn(Key) -> bool {
    move |key| match key {
        Key::Right => tick_index % 240 < 200,
        Key::Space => true,
        Key::Up => tick_index % 400 == 0,
        Key::Digit1 => tick_index % 400 == 200,
        _ => false,
    }
}

/// Forward simulation events to audio and the log
fn dispatch(events: Vec<GameEvent>, audio: &mut AudioManager<LogAudio>) {
    for event in events {
        match event {
            GameEvent::Sound(effect) => audio.play(effect),
            GameEvent::Music(music) => audio.play_music(music),
            GameEvent::LevelStarted { level } => log::info!("level {}", level),
            GameEvent::GameOver { score, level } => {
                log::info!("game over: score {} at level {}", score, level)
            }
            GameEvent::AsteroidDestroyed { size, points } => {
                log::debug!("{:?} asteroid destroyed (+{})", size, points)
            }
            GameEvent::Explosion { .. } | GameEvent::Quit => {}
        }
    }
}

/// Log what a windowed host would draw this tick
fn log_frame(state: &GameState) {
    if !log::log_enabled!(log::Level::Trace) {
        return;
    }
    for sprite in state.sprites() {
        log::trace!(
            "draw {} at ({:.0}, {:.0}) {:.0}deg",
            sprite.image,
            sprite.pos.x,
            sprite.pos.y,
            sprite.angle
        );
    }
}

fn main() {
    env_logger::init();
    log::info!("Space Rocks (headless) starting...");

    let config = Config::default();
    match config.to_json() {
        Ok(json) => log::info!("Config:\n{}", json),
        Err(e) => log::warn!("Could not serialize config: {}", e),
    }

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    log::info!("Seed: {}", seed);

    let tick_len = Duration::from_secs_f64(1.0 / config.screen.fps as f64);
    let mut state = GameState::new(config, seed);
    let mut audio = AudioManager::new(LogAudio);
    audio.set_muted(std::env::var_os(MUTE_ENV).is_some());
    if let Ok(volume) = std::env::var(VOLUME_ENV) {
        match volume.parse::<f32>() {
            Ok(volume) => audio.set_master_volume(volume),
            Err(e) => log::warn!("Ignoring {}={}: {}", VOLUME_ENV, volume, e),
        }
    }

    state.start();
    dispatch(state.drain_events(), &mut audio);

    let mut accumulator = Duration::ZERO;
    let mut last = Instant::now();
    while !state.quit_requested() && state.time_ticks < MAX_TICKS {
        let now = Instant::now();
        accumulator += now - last;
        last = now;

        let mut substeps = 0;
        while accumulator >= tick_len && substeps < MAX_SUBSTEPS {
            let input = TickInput::from_keys(pilot_keys(state.time_ticks));
            tick(&mut state, &input);
            dispatch(state.drain_events(), &mut audio);
            log_frame(&state);
            accumulator -= tick_len;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS {
            accumulator = Duration::ZERO;
        }

        std::thread::sleep(tick_len.saturating_sub(accumulator));
    }

    println!(
        "Final score: {} (level {}, {} ticks)",
        state.score, state.level, state.time_ticks
    );
}
