//! Sound catalogue and playback seam
//!
//! The simulation never touches an audio device. It emits [`SoundEffect`]s
//! and the host forwards them through an [`AudioManager`] to whatever
//! [`AudioBackend`] it owns.

/// Directory holding sound and image assets
pub const MEDIA_PATH: &str = "./media";

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum SoundEffect {
    /// Ship thrust engaged
    Thrust,
    /// Missile launched
    MissileLaunch,
    /// Something blew up
    Explosion,
    /// Level 2 and above started
    LevelUp,
}

impl SoundEffect {
    /// Asset file backing this effect
    pub fn file_name(&self) -> &'static str {
        match self {
            // One sample serves engine, launch and level-up
            SoundEffect::Thrust | SoundEffect::MissileLaunch | SoundEffect::LevelUp => {
                "missle.wav"
            }
            SoundEffect::Explosion => "explosion3.wav",
        }
    }

    /// Path relative to the working directory
    pub fn asset_path(&self) -> String {
        format!("{}/{}", MEDIA_PATH, self.file_name())
    }
}

/// Looping background music
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Music {
    Theme,
}

impl Music {
    pub fn asset_path(&self) -> String {
        match self {
            Music::Theme => format!("{}/theme.mid", MEDIA_PATH),
        }
    }
}

/// Playback implemented by the host's audio engine
pub trait AudioBackend {
    /// Play a one-shot sample at the given volume (0.0 - 1.0)
    fn play_sample(&mut self, path: &str, volume: f32);

    /// Start looping music at the given volume (0.0 - 1.0)
    fn play_music(&mut self, path: &str, volume: f32);
}

/// Audio manager for the game
pub struct AudioManager<B: AudioBackend> {
    backend: B,
    master_volume: f32,
    sfx_volume: f32,
    music_volume: f32,
    muted: bool,
}

impl<B: AudioBackend> AudioManager<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            muted: false,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, volume: f32) {
        self.master_volume = volume.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        if self.muted {
            return;
        }
        let volume = self.master_volume * self.sfx_volume;
        if volume <= 0.0 {
            return;
        }
        self.backend.play_sample(&effect.asset_path(), volume);
    }

    /// Start background music
    pub fn play_music(&mut self, music: Music) {
        if self.muted {
            return;
        }
        let volume = self.master_volume * self.music_volume;
        self.backend.play_music(&music.asset_path(), volume);
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}
