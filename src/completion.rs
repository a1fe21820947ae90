//! Per-run completion signal.
//!
//! Each started run hands its caller a [`Completion`]. It starts pending and
//! resolves exactly once, when the run arrives or is interrupted. It can be
//! polled, subscribed to, or awaited.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use serde::Serialize;

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// The run reached its floor; chimes played.
    Arrived { floor: String },
    /// Focus was lost mid-run; the page snapped to the floor without chimes.
    Interrupted { floor: String },
}

impl Outcome {
    pub fn floor(&self) -> &str {
        match self {
            Outcome::Arrived { floor } | Outcome::Interrupted { floor } => floor,
        }
    }

    pub fn arrived(&self) -> bool {
        matches!(self, Outcome::Arrived { .. })
    }
}

type Subscriber = Box<dyn FnOnce(&Outcome)>;

#[derive(Default)]
struct Shared {
    outcome: Option<Outcome>,
    subscribers: Vec<Subscriber>,
    waker: Option<Waker>,
}

/// Caller-side handle. Clones observe the same run.
#[derive(Clone, Default)]
pub struct Completion {
    shared: Rc<RefCell<Shared>>,
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("outcome", &self.shared.borrow().outcome)
            .finish()
    }
}

impl Completion {
    pub(crate) fn pending() -> Self {
        Self::default()
    }

    pub fn is_resolved(&self) -> bool {
        self.shared.borrow().outcome.is_some()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.shared.borrow().outcome.clone()
    }

    /// Run `f` once the run ends, or right away if it already has.
    pub fn on_resolve(&self, f: impl FnOnce(&Outcome) + 'static) {
        let ready = self.shared.borrow().outcome.clone();
        match ready {
            Some(outcome) => f(&outcome),
            None => self.shared.borrow_mut().subscribers.push(Box::new(f)),
        }
    }

    /// Resolve the signal. A second call is ignored.
    pub(crate) fn resolve(&self, outcome: Outcome) {
        let (subscribers, waker) = {
            let mut shared = self.shared.borrow_mut();
            if shared.outcome.is_some() {
                return;
            }
            shared.outcome = Some(outcome.clone());
            (std::mem::take(&mut shared.subscribers), shared.waker.take())
        };
        // Borrow released: subscribers may inspect this handle.
        for f in subscribers {
            f(&outcome);
        }
        if let Some(w) = waker {
            w.wake();
        }
    }
}

impl Future for Completion {
    type Output = Outcome;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Outcome> {
        let mut shared = self.shared.borrow_mut();
        if let Some(outcome) = shared.outcome.clone() {
            return Poll::Ready(outcome);
        }
        shared.waker = Some(cx.waker().clone());
        Poll::Pending
    }
}
