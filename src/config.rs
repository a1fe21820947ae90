//! Widget options, as handed over by the page, and their resolved form.

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use crate::error::{ElevatorError, Result};

/// Distance-derived runs take this many milliseconds per pixel travelled.
pub const MS_PER_PIXEL: f64 = 1.5;

pub const DEFAULT_AMBIENT_AUDIO: &str = "audio/elevator.mp3";
pub const DEFAULT_CHIME_AUDIO: &str = "audio/ding.mp3";
pub const DEFAULT_TARGET_AUDIO: &str = "audio/floor{floor}.mp3";
pub const DEFAULT_TRIGGER_PREFIX: &str = "button-";
pub const DEFAULT_TARGET_PREFIX: &str = "floor-";

/// An audio option: `false` disables it, `true` uses the default source,
/// a string names the source.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum AudioSource {
    Enabled(bool),
    Path(String),
}

impl AudioSource {
    pub fn resolve(&self, default: &str) -> Option<String> {
        match self {
            AudioSource::Enabled(false) => None,
            AudioSource::Enabled(true) => Some(default.to_string()),
            AudioSource::Path(p) if p.is_empty() => None,
            AudioSource::Path(p) => Some(p.clone()),
        }
    }
}

/// Options as the page supplies them. Every key is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    pub floors: Option<u32>,
    /// Fixed run length in milliseconds. Absent or zero means distance-derived.
    pub duration: Option<f64>,
    pub main_audio: AudioSource,
    pub end_audio: AudioSource,
    pub preload_audio: bool,
    pub loop_audio: bool,
    /// Overrides the completion chime source.
    pub floor_audio: Option<String>,
    /// Per-floor chime; a string is a template with a `{floor}` placeholder.
    pub target_audio: AudioSource,
    pub trigger_prefix: String,
    pub target_prefix: String,
    // Accepted for compatibility; nothing reads these.
    pub target_element: Option<IgnoredAny>,
    pub vertical_padding: Option<f64>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            floors: None,
            duration: None,
            main_audio: AudioSource::Enabled(false),
            end_audio: AudioSource::Enabled(false),
            preload_audio: true,
            loop_audio: true,
            floor_audio: None,
            target_audio: AudioSource::Enabled(true),
            trigger_prefix: DEFAULT_TRIGGER_PREFIX.to_string(),
            target_prefix: DEFAULT_TARGET_PREFIX.to_string(),
            target_element: None,
            vertical_padding: None,
        }
    }
}

impl Options {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Validate and fill in defaults.
    pub fn resolve(&self) -> Result<Settings> {
        let duration = match self.duration {
            None => DurationMode::Distance,
            Some(d) if d.is_nan() || d < 0.0 || d.is_infinite() => {
                return Err(ElevatorError::Options(format!(
                    "duration must be a non-negative number of milliseconds, got {d}"
                )));
            }
            Some(d) if d == 0.0 => DurationMode::Distance,
            Some(d) => DurationMode::Fixed(d),
        };

        if self.trigger_prefix.is_empty() {
            return Err(ElevatorError::Options(
                "triggerPrefix must not be empty".to_string(),
            ));
        }

        if self.target_element.is_some() || self.vertical_padding.is_some() {
            tracing::debug!("targetElement / verticalPadding are accepted but have no effect");
        }

        let chime = match &self.floor_audio {
            Some(path) if !path.is_empty() => Some(path.clone()),
            _ => self.end_audio.resolve(DEFAULT_CHIME_AUDIO),
        };

        Ok(Settings {
            floors: self.floors.unwrap_or(0),
            duration,
            ambient: self.main_audio.resolve(DEFAULT_AMBIENT_AUDIO),
            chime,
            target_audio: self.target_audio.resolve(DEFAULT_TARGET_AUDIO),
            preload_audio: self.preload_audio,
            loop_audio: self.loop_audio,
            trigger_prefix: self.trigger_prefix.clone(),
            target_prefix: self.target_prefix.clone(),
        })
    }
}

/// How long a run lasts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationMode {
    /// Every run takes this many milliseconds.
    Fixed(f64),
    /// `|end - start| * MS_PER_PIXEL`.
    Distance,
}

impl DurationMode {
    pub fn for_run(self, start: f64, end: f64) -> f64 {
        match self {
            DurationMode::Fixed(ms) => ms,
            DurationMode::Distance => (end - start).abs() * MS_PER_PIXEL,
        }
    }
}

/// Options after defaults and validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub floors: u32,
    pub duration: DurationMode,
    pub ambient: Option<String>,
    pub chime: Option<String>,
    pub target_audio: Option<String>,
    pub preload_audio: bool,
    pub loop_audio: bool,
    pub trigger_prefix: String,
    pub target_prefix: String,
}

impl Settings {
    pub fn trigger_id(&self, floor: u32) -> String {
        format!("{}{floor}", self.trigger_prefix)
    }

    pub fn target_id(&self, floor: &str) -> String {
        format!("{}{floor}", self.target_prefix)
    }

    /// Floor named by a trigger id. Ids without the prefix are taken whole.
    pub fn floor_of<'a>(&self, trigger_id: &'a str) -> &'a str {
        trigger_id
            .strip_prefix(self.trigger_prefix.as_str())
            .unwrap_or(trigger_id)
    }

    pub fn target_audio_path(&self, floor: &str) -> Option<String> {
        self.target_audio
            .as_ref()
            .map(|template| template.replace("{floor}", floor))
    }
}

impl Default for Settings {
    fn default() -> Self {
        // Default options always resolve.
        match Options::default().resolve() {
            Ok(s) => s,
            Err(_) => unreachable!("default options are valid"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        let s = Options::from_json("{}").unwrap().resolve().unwrap();
        assert_eq!(s.floors, 0);
        assert_eq!(s.duration, DurationMode::Distance);
        assert_eq!(s.ambient, None);
        assert_eq!(s.chime, None);
        assert_eq!(s.target_audio.as_deref(), Some(DEFAULT_TARGET_AUDIO));
        assert!(s.preload_audio);
        assert!(s.loop_audio);
    }

    #[test]
    fn audio_flags_and_paths() {
        let s = Options::from_json(
            r#"{ "mainAudio": true, "endAudio": "sounds/bell.ogg", "loopAudio": false }"#,
        )
        .unwrap()
        .resolve()
        .unwrap();
        assert_eq!(s.ambient.as_deref(), Some(DEFAULT_AMBIENT_AUDIO));
        assert_eq!(s.chime.as_deref(), Some("sounds/bell.ogg"));
        assert!(!s.loop_audio);
    }

    #[test]
    fn floor_audio_overrides_chime() {
        let s = Options::from_json(r#"{ "endAudio": true, "floorAudio": "custom/ding.wav" }"#)
            .unwrap()
            .resolve()
            .unwrap();
        assert_eq!(s.chime.as_deref(), Some("custom/ding.wav"));
    }

    #[test]
    fn fixed_and_zero_duration() {
        let fixed = Options::from_json(r#"{ "duration": 2000 }"#).unwrap().resolve().unwrap();
        assert_eq!(fixed.duration, DurationMode::Fixed(2000.0));
        assert_eq!(fixed.duration.for_run(0.0, 10.0), 2000.0);

        let zero = Options::from_json(r#"{ "duration": 0 }"#).unwrap().resolve().unwrap();
        assert_eq!(zero.duration, DurationMode::Distance);
        assert_eq!(zero.duration.for_run(500.0, 0.0), 750.0);
    }

    #[test]
    fn negative_duration_rejected() {
        let err = Options::from_json(r#"{ "duration": -5 }"#)
            .unwrap()
            .resolve()
            .unwrap_err();
        assert!(err.to_string().contains("duration"));
    }

    #[test]
    fn malformed_json_is_an_options_error() {
        let err = Options::from_json(r#"{ "floors": "three" }"#).unwrap_err();
        assert!(matches!(err, ElevatorError::Options(_)));
    }

    #[test]
    fn inert_options_are_accepted() {
        let opts = Options::from_json(
            r##"{ "targetElement": "#top", "verticalPadding": 40, "floors": 2 }"##,
        )
        .unwrap();
        assert!(opts.target_element.is_some());
        assert_eq!(opts.resolve().unwrap().floors, 2);
    }

    #[test]
    fn trigger_and_target_ids() {
        let s = Settings::default();
        assert_eq!(s.trigger_id(3), "button-3");
        assert_eq!(s.floor_of("button-3"), "3");
        assert_eq!(s.floor_of("lobby"), "lobby");
        assert_eq!(s.target_id("3"), "floor-3");
        assert_eq!(s.target_audio_path("3").as_deref(), Some("audio/floor3.mp3"));
    }

    #[test]
    fn target_audio_can_be_disabled() {
        let s = Options::from_json(r#"{ "targetAudio": false }"#).unwrap().resolve().unwrap();
        assert_eq!(s.target_audio_path("1"), None);
    }
}
