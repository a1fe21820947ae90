//! Ambient music, the arrival chime and the per-floor chime.

use crate::config::Settings;
use crate::host::{AudioBackend, AudioHints};

/// Owns the three audio handles of one widget.
///
/// Ambient and chime handles are built once at initialization and only ever
/// paused and rewound. The floor chime is reloaded at the start of each run.
pub struct AudioCoordinator<A> {
    ambient: Option<A>,
    chime: Option<A>,
    floor_chime: Option<A>,
}

impl<A> AudioCoordinator<A> {
    pub fn new<B>(backend: &mut B, settings: &Settings) -> Self
    where
        B: AudioBackend<Audio = A> + ?Sized,
    {
        let ambient_hints = AudioHints {
            preload: settings.preload_audio,
            looping: settings.loop_audio,
        };
        Self {
            ambient: load(backend, settings.ambient.as_deref(), ambient_hints),
            chime: load(backend, settings.chime.as_deref(), AudioHints::CHIME),
            floor_chime: None,
        }
    }

    /// A coordinator with nothing loaded, for a disabled widget.
    pub fn silent() -> Self {
        Self {
            ambient: None,
            chime: None,
            floor_chime: None,
        }
    }

    /// Start the ambient loop and load the chime for `floor`.
    pub fn start_run<B>(&mut self, backend: &mut B, settings: &Settings, floor: &str)
    where
        B: AudioBackend<Audio = A> + ?Sized,
    {
        if let Some(ambient) = &self.ambient {
            backend.play(ambient);
        }
        let path = settings.target_audio_path(floor);
        self.floor_chime = load(backend, path.as_deref(), AudioHints::CHIME);
    }

    /// Pause the ambient loop and seek it back to the start.
    pub fn stop_ambient<B>(&mut self, backend: &mut B)
    where
        B: AudioBackend<Audio = A> + ?Sized,
    {
        if let Some(ambient) = &self.ambient {
            backend.pause(ambient);
            backend.rewind(ambient);
        }
    }

    /// Arrival: completion chime, then the floor chime.
    pub fn play_arrival<B>(&mut self, backend: &mut B)
    where
        B: AudioBackend<Audio = A> + ?Sized,
    {
        if let Some(chime) = &self.chime {
            backend.play(chime);
        }
        if let Some(floor_chime) = &self.floor_chime {
            backend.play(floor_chime);
        }
    }

    pub fn has_ambient(&self) -> bool {
        self.ambient.is_some()
    }

    pub fn has_chime(&self) -> bool {
        self.chime.is_some()
    }
}

fn load<B>(backend: &mut B, path: Option<&str>, hints: AudioHints) -> Option<B::Audio>
where
    B: AudioBackend + ?Sized,
{
    let path = path?;
    match backend.load_audio(path, hints) {
        Ok(audio) => Some(audio),
        Err(e) => {
            tracing::warn!("audio disabled: {e}");
            None
        }
    }
}
