//! Host capabilities consumed by the elevator.
//!
//! The core never touches a browser API directly. A host supplies frame
//! scheduling, audio playback and DOM queries through these traits; the
//! browser implementation lives in `web`, the in-memory one in `headless`.

use crate::error::Result;

/// Which primitives the host environment actually provides.
///
/// Any missing primitive disables the widget at initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub frames: bool,
    pub audio: bool,
    pub events: bool,
}

impl Capabilities {
    pub const ALL: Capabilities = Capabilities {
        frames: true,
        audio: true,
        events: true,
    };

    pub fn complete(&self) -> bool {
        self.frames && self.audio && self.events
    }
}

/// Resource hints forwarded to the audio element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioHints {
    pub preload: bool,
    pub looping: bool,
}

impl AudioHints {
    /// One-shot chime: preloaded, not looped.
    pub const CHIME: AudioHints = AudioHints {
        preload: true,
        looping: false,
    };
}

/// Schedules a callback before the next repaint.
///
/// The host delivers the tick later by calling `Elevator::frame` with its
/// timestamp; requesting a frame never runs anything synchronously.
pub trait FrameScheduler {
    type FrameHandle: Copy + Eq + std::fmt::Debug;

    fn request_frame(&mut self) -> Self::FrameHandle;
    fn cancel_frame(&mut self, handle: Self::FrameHandle);
}

/// Playable audio resources.
pub trait AudioBackend {
    type Audio;

    fn load_audio(&mut self, path: &str, hints: AudioHints) -> Result<Self::Audio>;
    fn play(&mut self, audio: &Self::Audio);
    fn pause(&mut self, audio: &Self::Audio);
    /// Seek back to position zero.
    fn rewind(&mut self, audio: &Self::Audio);
}

/// Element lookup, offset chain and the window scroll position.
pub trait Document {
    type Element: Clone;

    fn element_by_id(&self, id: &str) -> Option<Self::Element>;
    fn offset_top(&self, element: &Self::Element) -> f64;
    fn offset_parent(&self, element: &Self::Element) -> Option<Self::Element>;

    fn scroll_y(&self) -> f64;
    fn scroll_to(&mut self, y: f64);
}

/// Everything the elevator needs from its environment.
pub trait Host: FrameScheduler + AudioBackend + Document {
    fn capabilities(&self) -> Capabilities;
}
