//! Frame-driven scroll animation.
//!
//! `Idle -> Running -> {Completed, Interrupted} -> Idle`. The driver owns the
//! timing state of the single active run and moves the viewport on every
//! tick; audio and notifications are left to the controller.

use crate::completion::Completion;
use crate::config::DurationMode;
use crate::easing::ease_in_out_quad;
use crate::host::{Document, FrameScheduler};

/// Timing state of the active run.
#[derive(Debug)]
pub struct Run<F> {
    pub floor: String,
    /// Timestamp of the first tick; unset until that tick arrives.
    pub start_time: Option<f64>,
    pub start_position: f64,
    pub end_position: f64,
    pub duration_ms: f64,
    /// Pending frame callback, if one is scheduled.
    pub frame: Option<F>,
    completion: Completion,
}

/// A run that left the `Running` state.
#[derive(Debug)]
pub struct Finished {
    pub floor: String,
    pub end_position: f64,
    pub completion: Completion,
}

#[derive(Debug)]
pub enum Tick {
    /// No run is active; the callback was stale.
    Stale,
    /// Scrolled to `position`, another frame is scheduled.
    Continue { position: f64 },
    /// Reached the end. The driver is idle again.
    Completed(Finished),
}

pub struct Driver<F> {
    run: Option<Run<F>>,
}

impl<F> Default for Driver<F> {
    fn default() -> Self {
        Self { run: None }
    }
}

impl<F: Copy + Eq + std::fmt::Debug> Driver<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_animating(&self) -> bool {
        self.run.is_some()
    }

    pub fn run(&self) -> Option<&Run<F>> {
        self.run.as_ref()
    }

    /// Begin a run towards `end_position`. Returns `None` while another run
    /// is active; nothing is changed or scheduled in that case.
    pub fn start<H>(
        &mut self,
        host: &mut H,
        floor: &str,
        end_position: f64,
        mode: DurationMode,
    ) -> Option<Completion>
    where
        H: FrameScheduler<FrameHandle = F> + Document + ?Sized,
    {
        if self.run.is_some() {
            return None;
        }

        let start_position = host.scroll_y();
        let duration_ms = mode.for_run(start_position, end_position);
        let completion = Completion::pending();
        let frame = host.request_frame();

        tracing::debug!(
            floor,
            start_position,
            end_position,
            duration_ms,
            "elevator departing"
        );

        self.run = Some(Run {
            floor: floor.to_string(),
            start_time: None,
            start_position,
            end_position,
            duration_ms,
            frame: Some(frame),
            completion: completion.clone(),
        });
        Some(completion)
    }

    /// Advance the active run to timestamp `now` (milliseconds).
    pub fn tick<H>(&mut self, host: &mut H, now: f64) -> Tick
    where
        H: FrameScheduler<FrameHandle = F> + Document + ?Sized,
    {
        let Some(run) = self.run.as_mut() else {
            return Tick::Stale;
        };
        run.frame = None;

        let start_time = *run.start_time.get_or_insert(now);
        let time_so_far = now - start_time;
        let position = ease_in_out_quad(
            time_so_far,
            run.start_position,
            run.end_position - run.start_position,
            run.duration_ms,
        );
        host.scroll_to(position);
        tracing::trace!(time_so_far, position, "frame");

        if time_so_far < run.duration_ms {
            run.frame = Some(host.request_frame());
            return Tick::Continue { position };
        }

        match self.finish() {
            Some(finished) => Tick::Completed(finished),
            None => Tick::Stale,
        }
    }

    /// Abort the active run: cancel its pending frame and snap to the end.
    /// Returns `None` when idle.
    pub fn interrupt<H>(&mut self, host: &mut H) -> Option<Finished>
    where
        H: FrameScheduler<FrameHandle = F> + Document + ?Sized,
    {
        let pending = self.run.as_mut()?.frame.take();
        if let Some(handle) = pending {
            host.cancel_frame(handle);
        }
        let finished = self.finish()?;
        host.scroll_to(finished.end_position);
        tracing::debug!(floor = %finished.floor, "elevator interrupted");
        Some(finished)
    }

    fn finish(&mut self) -> Option<Finished> {
        let run = self.run.take()?;
        Some(Finished {
            floor: run.floor,
            end_position: run.end_position,
            completion: run.completion,
        })
    }
}
