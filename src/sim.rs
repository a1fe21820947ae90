//! Frame-by-frame rides against a [`Page`], at a fixed frame interval.

use serde::Serialize;

use crate::completion::Outcome;
use crate::config::Options;
use crate::controller::{Elevator, FrameOutcome};
use crate::error::Result;
use crate::headless::{HostEvent, Page};
use crate::host::Document;

/// Upper bound on delivered frames, in case of absurd durations.
const MAX_FRAMES: usize = 1_000_000;

/// A single ride to simulate.
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Absolute offset of each floor target, indexed by floor number.
    pub floor_offsets: Vec<f64>,
    pub start_scroll: f64,
    pub floor: String,
    pub frame_interval_ms: f64,
    /// Timestamp of the first delivered frame.
    pub first_frame_ms: f64,
    /// Lose focus once this much time has elapsed since the first frame.
    pub blur_after_ms: Option<f64>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            floor_offsets: Vec::new(),
            start_scroll: 0.0,
            floor: "0".to_string(),
            frame_interval_ms: 1000.0 / 60.0,
            first_frame_ms: 0.0,
            blur_after_ms: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FrameRecord {
    pub elapsed_ms: f64,
    pub position: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Trace {
    pub floor: String,
    pub start_position: f64,
    pub end_position: f64,
    pub duration_ms: f64,
    pub frames: Vec<FrameRecord>,
    /// `None` when the ride never started (disabled widget).
    pub outcome: Option<Outcome>,
    pub final_position: f64,
    /// Audio calls in order, e.g. `play audio/ding.mp3`.
    pub audio: Vec<String>,
}

/// A page with a target and a trigger element for every floor offset.
pub fn building(options: &Options, offsets: &[f64]) -> Page {
    let mut page = Page::with_floors(&options.target_prefix, offsets);
    for n in 0..offsets.len() {
        page.add_element(&format!("{}{n}", options.trigger_prefix), 0.0, None);
    }
    page
}

pub fn simulate(options: &Options, scenario: &Scenario) -> Result<Trace> {
    let mut page = building(options, &scenario.floor_offsets);
    page.set_scroll(scenario.start_scroll);
    let mut elevator = Elevator::new(page, options)?;

    let trigger = format!("{}{}", elevator.settings().trigger_prefix, scenario.floor);
    let completion = elevator.click(&trigger);
    let (start_position, end_position, duration_ms) = match elevator.driver().run() {
        Some(run) => (run.start_position, run.end_position, run.duration_ms),
        None => (scenario.start_scroll, scenario.start_scroll, 0.0),
    };

    let mut frames = Vec::new();
    let mut now = scenario.first_frame_ms;
    while elevator.host().pending_frame().is_some() && frames.len() < MAX_FRAMES {
        let elapsed_ms = now - scenario.first_frame_ms;
        if scenario.blur_after_ms.is_some_and(|b| elapsed_ms >= b) {
            elevator.blur();
            break;
        }

        elevator.host_mut().take_frame();
        match elevator.frame(now) {
            FrameOutcome::Stale => break,
            FrameOutcome::Moving(position) => frames.push(FrameRecord {
                elapsed_ms,
                position,
            }),
            FrameOutcome::Arrived(_) => {
                frames.push(FrameRecord {
                    elapsed_ms,
                    position: elevator.host().scroll_y(),
                });
            }
        }
        now += scenario.frame_interval_ms;
    }

    let audio = elevator
        .host()
        .events()
        .iter()
        .filter_map(|e| match e {
            HostEvent::Play(p) => Some(format!("play {p}")),
            HostEvent::Pause(p) => Some(format!("pause {p}")),
            HostEvent::Rewind(p) => Some(format!("rewind {p}")),
            _ => None,
        })
        .collect();

    Ok(Trace {
        floor: scenario.floor.clone(),
        start_position,
        end_position,
        duration_ms,
        frames,
        outcome: completion.and_then(|c| c.outcome()),
        final_position: elevator.host().scroll_y(),
        audio,
    })
}
