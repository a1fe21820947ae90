//! The widget: binds floors to runs and orchestrates driver, offsets and audio.

use crate::audio::AudioCoordinator;
use crate::completion::{Completion, Outcome};
use crate::config::{Options, Settings};
use crate::driver::{Driver, Finished, Tick};
use crate::error::Result;
use crate::host::Host;
use crate::offset;

type Hook = Box<dyn FnMut(&str)>;

/// A trigger element found on the page and the floor it leads to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerBinding {
    pub trigger_id: String,
    pub floor: String,
}

/// What a delivered frame did.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// No run was active.
    Stale,
    /// Scrolled to the given position; another frame is scheduled.
    Moving(f64),
    /// The run arrived. Chimes and the end hook have fired.
    Arrived(Outcome),
}

/// One elevator widget and the page it animates.
pub struct Elevator<H: Host> {
    host: H,
    settings: Settings,
    enabled: bool,
    audio: AudioCoordinator<H::Audio>,
    driver: Driver<H::FrameHandle>,
    on_start: Option<Hook>,
    on_end: Option<Hook>,
}

impl<H: Host> Elevator<H> {
    pub fn new(host: H, options: &Options) -> Result<Self> {
        Ok(Self::with_settings(host, options.resolve()?))
    }

    /// Initialize against `host`. A host missing any required primitive
    /// yields a disabled widget that ignores every interaction.
    pub fn with_settings(mut host: H, settings: Settings) -> Self {
        let caps = host.capabilities();
        let enabled = caps.complete();
        let audio = if enabled {
            AudioCoordinator::new(&mut host, &settings)
        } else {
            tracing::info!(?caps, "host lacks required primitives, elevator disabled");
            AudioCoordinator::silent()
        };

        Self {
            host,
            settings,
            enabled,
            audio,
            driver: Driver::new(),
            on_start: None,
            on_end: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_animating(&self) -> bool {
        self.driver.is_animating()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn driver(&self) -> &Driver<H::FrameHandle> {
        &self.driver
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Called with the floor when a run departs.
    pub fn on_start(&mut self, f: impl FnMut(&str) + 'static) {
        self.on_start = Some(Box::new(f));
    }

    /// Called with the floor when a run arrives. Never called for an
    /// interrupted run.
    pub fn on_end(&mut self, f: impl FnMut(&str) + 'static) {
        self.on_end = Some(Box::new(f));
    }

    /// Trigger elements present on the page, one per configured floor.
    /// Empty for a disabled widget.
    pub fn bindings(&self) -> Vec<TriggerBinding> {
        if !self.enabled {
            return Vec::new();
        }

        let mut bindings = Vec::new();
        for n in 0..self.settings.floors {
            let trigger_id = self.settings.trigger_id(n);
            if self.host.element_by_id(&trigger_id).is_none() {
                tracing::warn!(trigger = %trigger_id, "trigger element not found, skipping");
                continue;
            }
            let floor = self.settings.floor_of(&trigger_id).to_string();
            bindings.push(TriggerBinding { trigger_id, floor });
        }
        bindings
    }

    /// A click on the trigger element `trigger_id`.
    pub fn click(&mut self, trigger_id: &str) -> Option<Completion> {
        let floor = self.settings.floor_of(trigger_id).to_string();
        self.elevate(&floor)
    }

    /// Start a run to `floor`. Ignored while disabled or already running.
    pub fn elevate(&mut self, floor: &str) -> Option<Completion> {
        if !self.enabled {
            return None;
        }
        if self.driver.is_animating() {
            tracing::debug!(floor, "already moving, ignoring call");
            return None;
        }

        let target_id = self.settings.target_id(floor);
        let target = offset::resolve(&self.host, &target_id);
        if target.is_missing() {
            tracing::warn!(element = %target_id, "target element not found, heading to the top");
        }

        let completion =
            self.driver
                .start(&mut self.host, floor, target.offset(), self.settings.duration)?;
        self.audio.start_run(&mut self.host, &self.settings, floor);
        if let Some(hook) = self.on_start.as_mut() {
            hook(floor);
        }
        Some(completion)
    }

    /// Deliver a frame callback with the host timestamp in milliseconds.
    pub fn frame(&mut self, now: f64) -> FrameOutcome {
        match self.driver.tick(&mut self.host, now) {
            Tick::Stale => FrameOutcome::Stale,
            Tick::Continue { position } => FrameOutcome::Moving(position),
            Tick::Completed(finished) => FrameOutcome::Arrived(self.arrive(finished)),
        }
    }

    /// The window lost focus. Interrupts an active run; returns its outcome.
    pub fn blur(&mut self) -> Option<Outcome> {
        let Finished {
            floor, completion, ..
        } = self.driver.interrupt(&mut self.host)?;
        self.audio.stop_ambient(&mut self.host);

        let outcome = Outcome::Interrupted { floor };
        completion.resolve(outcome.clone());
        Some(outcome)
    }

    fn arrive(&mut self, finished: Finished) -> Outcome {
        self.audio.stop_ambient(&mut self.host);
        self.audio.play_arrival(&mut self.host);
        if let Some(hook) = self.on_end.as_mut() {
            hook(&finished.floor);
        }
        tracing::debug!(floor = %finished.floor, "elevator arrived");

        let outcome = Outcome::Arrived {
            floor: finished.floor,
        };
        finished.completion.resolve(outcome.clone());
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HostEvent, Page};
    use crate::host::{Capabilities, Document};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn building(offsets: &[f64]) -> Page {
        let mut page = Page::with_floors("floor-", offsets);
        for n in 0..offsets.len() {
            page.add_element(&format!("button-{n}"), 0.0, None);
        }
        page
    }

    fn elevator(page: Page, json: &str) -> Elevator<Page> {
        Elevator::new(page, &Options::from_json(json).unwrap()).unwrap()
    }

    #[test]
    fn binds_only_existing_triggers() {
        let mut page = building(&[0.0, 500.0]);
        page.add_element("floor-2", 900.0, None);
        let e = elevator(page, r#"{ "floors": 3 }"#);

        let bound: Vec<_> = e.bindings().into_iter().map(|b| b.floor).collect();
        assert_eq!(bound, vec!["0", "1"]);
    }

    #[test]
    fn disabled_without_frames() {
        let mut page = building(&[0.0, 500.0]);
        page.set_capabilities(Capabilities {
            frames: false,
            ..Capabilities::ALL
        });
        let mut e = elevator(page, r#"{ "floors": 2, "mainAudio": true }"#);

        assert!(!e.is_enabled());
        assert!(e.bindings().is_empty());
        assert!(e.click("button-1").is_none());
        assert!(e.blur().is_none());
        assert!(e.host().events().is_empty());
    }

    #[test]
    fn click_strips_prefix_and_fires_start_hook() {
        let mut e = elevator(building(&[0.0, 500.0, 1200.0]), r#"{ "floors": 3 }"#);
        let started = Rc::new(RefCell::new(Vec::new()));
        let s = started.clone();
        e.on_start(move |floor| s.borrow_mut().push(floor.to_string()));

        let completion = e.click("button-2").unwrap();
        assert!(!completion.is_resolved());
        assert_eq!(e.driver().run().unwrap().end_position, 1200.0);
        assert_eq!(*started.borrow(), vec!["2"]);
    }

    #[test]
    fn missing_target_heads_to_top() {
        let mut page = building(&[0.0]);
        page.add_element("button-7", 0.0, None);
        page.set_scroll(400.0);
        let mut e = elevator(page, "{}");

        e.click("button-7").unwrap();
        assert_eq!(e.driver().run().unwrap().end_position, 0.0);
    }

    #[test]
    fn busy_click_changes_nothing() {
        let mut e = elevator(building(&[0.0, 500.0, 1200.0]), r#"{ "mainAudio": true }"#);
        e.click("button-1").unwrap();
        let events_before = e.host().events().len();

        assert!(e.click("button-2").is_none());
        assert_eq!(e.host().events().len(), events_before);
        assert_eq!(e.driver().run().unwrap().floor, "1");
    }

    #[test]
    fn blur_when_idle_is_ignored() {
        let mut e = elevator(building(&[0.0]), "{}");
        assert!(e.blur().is_none());
        assert!(e.host().events().is_empty());
    }

    #[test]
    fn blur_interrupts_without_chimes() {
        let mut e = elevator(
            building(&[0.0, 500.0]),
            r#"{ "mainAudio": true, "endAudio": true }"#,
        );
        let ended = Rc::new(RefCell::new(0));
        let n = ended.clone();
        e.on_end(move |_| *n.borrow_mut() += 1);

        let completion = e.click("button-1").unwrap();
        e.frame(0.0);
        e.frame(16.0);
        e.host_mut().clear_events();

        let outcome = e.blur().unwrap();
        assert!(!outcome.arrived());
        assert_eq!(completion.outcome(), Some(outcome));
        assert_eq!(*ended.borrow(), 0);
        assert_eq!(e.host().scroll_y(), 500.0);

        let events = e.host().events();
        assert!(events.contains(&HostEvent::Pause("audio/elevator.mp3".to_string())));
        assert!(events.contains(&HostEvent::Rewind("audio/elevator.mp3".to_string())));
        assert!(!events.iter().any(|ev| matches!(ev, HostEvent::Play(_))));
    }

    #[test]
    fn can_ride_again_after_arrival() {
        let mut e = elevator(building(&[0.0, 30.0]), "{}");
        e.click("button-1").unwrap();
        let mut now = 0.0;
        while e.host_mut().take_frame().is_some() {
            e.frame(now);
            now += 16.0;
        }
        assert!(!e.is_animating());
        assert!(e.click("button-0").is_some());
        assert_eq!(e.driver().run().unwrap().start_position, 30.0);
    }
}
