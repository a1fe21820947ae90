//! In-memory page: element tree, window scroll, a single-slot frame queue
//! and audio tracks. Every host call is appended to an event log.
//!
//! Used by the `simulate` command and by the tests.

use std::collections::HashMap;

use crate::error::{ElevatorError, Result};
use crate::host::{AudioBackend, AudioHints, Capabilities, Document, FrameScheduler, Host};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackId(usize);

/// One host call, as observed by the page.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    ScrollTo(f64),
    FrameRequested(FrameId),
    FrameCancelled(FrameId),
    AudioLoaded(String),
    Play(String),
    Pause(String),
    Rewind(String),
}

#[derive(Debug, Clone)]
struct Node {
    id: String,
    offset_top: f64,
    parent: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct Track {
    pub path: String,
    pub hints: AudioHints,
    pub playing: bool,
    pub plays: u32,
    pub position: f64,
}

pub struct Page {
    nodes: Vec<Node>,
    by_id: HashMap<String, NodeId>,
    scroll_y: f64,
    capabilities: Capabilities,
    next_frame: u32,
    pending_frame: Option<FrameId>,
    frames_requested: u32,
    tracks: Vec<Track>,
    failing_audio: Vec<String>,
    events: Vec<HostEvent>,
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl Page {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            by_id: HashMap::new(),
            scroll_y: 0.0,
            capabilities: Capabilities::ALL,
            next_frame: 1,
            pending_frame: None,
            frames_requested: 0,
            tracks: Vec::new(),
            failing_audio: Vec::new(),
            events: Vec::new(),
        }
    }

    /// A page with one `{prefix}{n}` element per offset, all top-level.
    pub fn with_floors(prefix: &str, offsets: &[f64]) -> Self {
        let mut page = Self::new();
        for (n, &top) in offsets.iter().enumerate() {
            page.add_element(&format!("{prefix}{n}"), top, None);
        }
        page
    }

    pub fn add_element(&mut self, id: &str, offset_top: f64, parent: Option<NodeId>) -> NodeId {
        let node = NodeId(self.nodes.len());
        self.nodes.push(Node {
            id: id.to_string(),
            offset_top,
            parent,
        });
        if !id.is_empty() {
            self.by_id.insert(id.to_string(), node);
        }
        node
    }

    pub fn element_id(&self, node: NodeId) -> &str {
        &self.nodes[node.0].id
    }

    pub fn set_capabilities(&mut self, capabilities: Capabilities) {
        self.capabilities = capabilities;
    }

    /// Make loading `path` fail.
    pub fn fail_audio(&mut self, path: &str) {
        self.failing_audio.push(path.to_string());
    }

    /// Move the window without logging an event (user scrolling).
    pub fn set_scroll(&mut self, y: f64) {
        self.scroll_y = y;
    }

    pub fn pending_frame(&self) -> Option<FrameId> {
        self.pending_frame
    }

    /// Hand the pending frame to the caller, as the host does when it fires.
    pub fn take_frame(&mut self) -> Option<FrameId> {
        self.pending_frame.take()
    }

    pub fn frames_requested(&self) -> u32 {
        self.frames_requested
    }

    pub fn track(&self, path: &str) -> Option<&Track> {
        self.tracks.iter().rev().find(|t| t.path == path)
    }

    pub fn events(&self) -> &[HostEvent] {
        &self.events
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Positions of every `ScrollTo` in the log, in order.
    pub fn scroll_trace(&self) -> Vec<f64> {
        self.events
            .iter()
            .filter_map(|e| match e {
                HostEvent::ScrollTo(y) => Some(*y),
                _ => None,
            })
            .collect()
    }
}

impl FrameScheduler for Page {
    type FrameHandle = FrameId;

    fn request_frame(&mut self) -> FrameId {
        let id = FrameId(self.next_frame);
        self.next_frame += 1;
        self.frames_requested += 1;
        self.pending_frame = Some(id);
        self.events.push(HostEvent::FrameRequested(id));
        id
    }

    fn cancel_frame(&mut self, handle: FrameId) {
        if self.pending_frame == Some(handle) {
            self.pending_frame = None;
        }
        self.events.push(HostEvent::FrameCancelled(handle));
    }
}

impl AudioBackend for Page {
    type Audio = TrackId;

    fn load_audio(&mut self, path: &str, hints: AudioHints) -> Result<TrackId> {
        if self.failing_audio.iter().any(|p| p == path) {
            return Err(ElevatorError::audio_load(path, "not found"));
        }
        self.tracks.push(Track {
            path: path.to_string(),
            hints,
            playing: false,
            plays: 0,
            position: 0.0,
        });
        self.events.push(HostEvent::AudioLoaded(path.to_string()));
        Ok(TrackId(self.tracks.len() - 1))
    }

    fn play(&mut self, audio: &TrackId) {
        let track = &mut self.tracks[audio.0];
        track.playing = true;
        track.plays += 1;
        // Stands in for some playback progress.
        track.position += 1.0;
        self.events.push(HostEvent::Play(track.path.clone()));
    }

    fn pause(&mut self, audio: &TrackId) {
        let track = &mut self.tracks[audio.0];
        track.playing = false;
        self.events.push(HostEvent::Pause(track.path.clone()));
    }

    fn rewind(&mut self, audio: &TrackId) {
        let track = &mut self.tracks[audio.0];
        track.position = 0.0;
        self.events.push(HostEvent::Rewind(track.path.clone()));
    }
}

impl Document for Page {
    type Element = NodeId;

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.by_id.get(id).copied()
    }

    fn offset_top(&self, element: &NodeId) -> f64 {
        self.nodes[element.0].offset_top
    }

    fn offset_parent(&self, element: &NodeId) -> Option<NodeId> {
        self.nodes[element.0].parent
    }

    fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    fn scroll_to(&mut self, y: f64) {
        self.scroll_y = y;
        self.events.push(HostEvent::ScrollTo(y));
    }
}

impl Host for Page {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }
}
