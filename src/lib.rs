//! Elevator: an eased scroll-to-floor animation with elevator music.
//!
//! A click on `#button-N` scrolls the window to `#floor-N` with a quadratic
//! ease-in-out, plays ambient music on the way and chimes on arrival. Losing
//! window focus mid-ride snaps straight to the floor.
//!
//! The widget runs against any [`host::Host`]; the browser host lives behind
//! the `wasm` feature, and [`headless::Page`] models a page in memory.

pub mod audio;
pub mod completion;
pub mod config;
pub mod controller;
pub mod driver;
pub mod easing;
pub mod error;
pub mod headless;
pub mod host;
pub mod offset;
pub mod sim;

#[cfg(feature = "wasm")]
pub mod web;

pub use completion::{Completion, Outcome};
pub use config::{Options, Settings};
pub use controller::{Elevator, FrameOutcome, TriggerBinding};
pub use error::{ElevatorError, Result};
