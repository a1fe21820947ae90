//! Browser host and the `Elevator` class exported to JavaScript.
//!
//! Build with: `wasm-pack build --target web --features wasm`
//!
//! ```js
//! import init, { Elevator } from "./pkg/elevator.js";
//! await init();
//! const elevator = new Elevator({ floors: 3, mainAudio: true, endAudio: true,
//!                                 endCallback: () => console.log("ding") });
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, HtmlAudioElement, HtmlElement, Window};

use crate::config::Options;
use crate::controller::{Elevator as Widget, FrameOutcome};
use crate::error::{ElevatorError, Result};
use crate::host::{AudioBackend, AudioHints, Capabilities, Document, FrameScheduler, Host};

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;
type Listener = Closure<dyn FnMut(Event)>;

fn js_error(e: JsValue) -> ElevatorError {
    ElevatorError::host(e.as_string().unwrap_or_else(|| format!("{e:?}")))
}

// ── Host ───────────────────────────────────────────────────────────────

pub struct WebHost {
    window: Window,
    document: web_sys::Document,
    frame_callback: FrameCallback,
}

impl WebHost {
    pub fn new(window: Window) -> Result<Self> {
        let document = window
            .document()
            .ok_or_else(|| ElevatorError::host("window has no document"))?;
        Ok(Self {
            window,
            document,
            frame_callback: Rc::new(RefCell::new(None)),
        })
    }
}

impl FrameScheduler for WebHost {
    type FrameHandle = i32;

    fn request_frame(&mut self) -> i32 {
        let slot = self.frame_callback.borrow();
        let Some(cb) = slot.as_ref() else {
            tracing::warn!("frame requested before the callback was installed");
            return 0;
        };
        match self.window.request_animation_frame(cb.as_ref().unchecked_ref()) {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!("requestAnimationFrame failed: {}", js_error(e));
                0
            }
        }
    }

    fn cancel_frame(&mut self, handle: i32) {
        let _ = self.window.cancel_animation_frame(handle);
    }
}

impl AudioBackend for WebHost {
    type Audio = HtmlAudioElement;

    fn load_audio(&mut self, path: &str, hints: AudioHints) -> Result<HtmlAudioElement> {
        let audio = HtmlAudioElement::new_with_src(path)
            .map_err(|e| ElevatorError::audio_load(path, js_error(e).to_string()))?;
        audio.set_preload(if hints.preload { "auto" } else { "none" });
        audio.set_loop(hints.looping);
        Ok(audio)
    }

    fn play(&mut self, audio: &HtmlAudioElement) {
        // Autoplay rejections surface on the returned promise; left to the page.
        let _ = audio.play();
    }

    fn pause(&mut self, audio: &HtmlAudioElement) {
        let _ = audio.pause();
    }

    fn rewind(&mut self, audio: &HtmlAudioElement) {
        audio.set_current_time(0.0);
    }
}

impl Document for WebHost {
    type Element = HtmlElement;

    fn element_by_id(&self, id: &str) -> Option<HtmlElement> {
        self.document
            .get_element_by_id(id)?
            .dyn_into::<HtmlElement>()
            .ok()
    }

    fn offset_top(&self, element: &HtmlElement) -> f64 {
        f64::from(element.offset_top())
    }

    fn offset_parent(&self, element: &HtmlElement) -> Option<HtmlElement> {
        element.offset_parent()?.dyn_into::<HtmlElement>().ok()
    }

    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn scroll_to(&mut self, y: f64) {
        self.window.scroll_to_with_x_and_y(0.0, y);
    }
}

impl Host for WebHost {
    fn capabilities(&self) -> Capabilities {
        let has = |target: &JsValue, name: &str| {
            js_sys::Reflect::has(target, &JsValue::from_str(name)).unwrap_or(false)
        };
        let window: &JsValue = self.window.as_ref();
        Capabilities {
            frames: has(window, "requestAnimationFrame") && has(window, "cancelAnimationFrame"),
            audio: has(window, "Audio"),
            events: has(window, "addEventListener"),
        }
    }
}

// ── JavaScript API ─────────────────────────────────────────────────────

fn callback(options: &JsValue, name: &str) -> Option<js_sys::Function> {
    if !options.is_object() {
        return None;
    }
    js_sys::Reflect::get(options, &JsValue::from_str(name))
        .ok()?
        .dyn_into::<js_sys::Function>()
        .ok()
}

fn notify(f: &Option<js_sys::Function>) {
    if let Some(f) = f {
        if let Err(e) = f.call0(&JsValue::NULL) {
            tracing::warn!("callback threw: {}", js_error(e));
        }
    }
}

/// Scrolls the page to `#floor-N` when `#button-N` is clicked.
#[wasm_bindgen(js_name = Elevator)]
pub struct WebElevator {
    widget: Rc<RefCell<Widget<WebHost>>>,
    window: Window,
    start_callback: Option<js_sys::Function>,
    // (target, event name, closure) so they can be removed on drop.
    listeners: Vec<(web_sys::EventTarget, &'static str, Listener)>,
}

#[wasm_bindgen(js_class = Elevator)]
impl WebElevator {
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> std::result::Result<WebElevator, JsError> {
        let window = web_sys::window().ok_or_else(|| JsError::new("no window"))?;
        let opts: Options = if options.is_undefined() || options.is_null() {
            Options::default()
        } else {
            serde_wasm_bindgen::from_value(options.clone())
                .map_err(|e| JsError::new(&ElevatorError::Options(e.to_string()).to_string()))?
        };
        let start_callback = callback(&options, "startCallback");
        let end_callback = callback(&options, "endCallback");

        let host = WebHost::new(window.clone()).map_err(|e| JsError::new(&e.to_string()))?;
        let frame_slot = host.frame_callback.clone();
        let widget = Widget::new(host, &opts).map_err(|e| JsError::new(&e.to_string()))?;
        let widget = Rc::new(RefCell::new(widget));

        install_frame_callback(&frame_slot, Rc::downgrade(&widget), end_callback);

        let mut this = WebElevator {
            widget,
            window,
            start_callback,
            listeners: Vec::new(),
        };
        this.bind().map_err(|e| JsError::new(&e.to_string()))?;
        Ok(this)
    }

    /// Ride to `floor` as if its trigger had been clicked. Returns whether a
    /// run started.
    pub fn elevate(&self, floor: &str) -> bool {
        let started = match self.widget.try_borrow_mut() {
            Ok(mut w) => w.elevate(floor).is_some(),
            Err(_) => false,
        };
        if started {
            notify(&self.start_callback);
        }
        started
    }

    #[wasm_bindgen(getter, js_name = isAnimating)]
    pub fn is_animating(&self) -> bool {
        self.widget
            .try_borrow()
            .map(|w| w.is_animating())
            .unwrap_or(true)
    }

    #[wasm_bindgen(getter, js_name = isEnabled)]
    pub fn is_enabled(&self) -> bool {
        self.widget.borrow().is_enabled()
    }
}

impl WebElevator {
    fn bind(&mut self) -> Result<()> {
        if !self.widget.borrow().is_enabled() {
            return Ok(());
        }

        let bindings = self.widget.borrow().bindings();
        for binding in bindings {
            let Some(element) = self.widget.borrow().host().element_by_id(&binding.trigger_id)
            else {
                continue;
            };
            let weak = Rc::downgrade(&self.widget);
            let start_callback = self.start_callback.clone();
            let trigger_id = binding.trigger_id;
            let on_click = Closure::wrap(Box::new(move |_event: Event| {
                let Some(widget) = weak.upgrade() else {
                    return;
                };
                let started = match widget.try_borrow_mut() {
                    Ok(mut w) => w.click(&trigger_id).is_some(),
                    Err(_) => false,
                };
                if started {
                    notify(&start_callback);
                }
            }) as Box<dyn FnMut(_)>);
            self.listen(element.into(), "click", on_click)?;
        }

        let weak = Rc::downgrade(&self.widget);
        let on_blur = Closure::wrap(Box::new(move |_event: Event| {
            if let Some(widget) = weak.upgrade() {
                if let Ok(mut w) = widget.try_borrow_mut() {
                    w.blur();
                }
            }
        }) as Box<dyn FnMut(_)>);
        self.listen(self.window.clone().into(), "blur", on_blur)
    }

    fn listen(
        &mut self,
        target: web_sys::EventTarget,
        event: &'static str,
        closure: Listener,
    ) -> Result<()> {
        target
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(js_error)?;
        self.listeners.push((target, event, closure));
        Ok(())
    }
}

impl Drop for WebElevator {
    fn drop(&mut self) {
        for (target, event, closure) in self.listeners.drain(..) {
            let _ = target
                .remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        }
        // A pending frame would call into a freed closure.
        if let Ok(mut w) = self.widget.try_borrow_mut() {
            w.blur();
        }
    }
}

fn install_frame_callback(
    slot: &FrameCallback,
    widget: Weak<RefCell<Widget<WebHost>>>,
    end_callback: Option<js_sys::Function>,
) {
    *slot.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        let Some(widget) = widget.upgrade() else {
            return;
        };
        let outcome = match widget.try_borrow_mut() {
            Ok(mut w) => w.frame(ts),
            Err(_) => return,
        };
        // Outside the borrow, so the callback may call back into the widget.
        if let FrameOutcome::Arrived(_) = outcome {
            notify(&end_callback);
        }
    }) as Box<dyn FnMut(f64)>));
}
