#![forbid(unsafe_code)]

//! `wasm-bindgen` exports for [`FrameSync`].
//!
//! Only compiled on `wasm32` targets.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use framesync_core::{HeightSync, HostCapabilities, SyncConfig, SyncError, TransitionSource};
use gloo_events::EventListener;
use gloo_timers::callback::Timeout;
use js_sys::{Array, Object, Reflect};
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, Event, EventTarget, MutationObserver, MutationObserverInit, Window,
};
use web_time::{Duration, Instant};

use crate::dom::{DomHeights, DomView, ParentWindow};
use crate::schedule::{load_config, wake_delay_ms};

type DomSync = HeightSync<DomHeights, ParentWindow, DomView>;

fn console_error(msg: &str) {
    let global = js_sys::global();
    let Ok(console) = Reflect::get(&global, &"console".into()) else {
        return;
    };
    let Ok(error) = Reflect::get(&console, &"error".into()) else {
        return;
    };
    let Ok(error_fn) = error.dyn_into::<js_sys::Function>() else {
        return;
    };
    let _ = error_fn.call1(&console, &JsValue::from_str(msg));
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = if let Some(loc) = info.location() {
                format!(
                    "panic at {}:{}:{}: {info}",
                    loc.file(),
                    loc.line(),
                    loc.column()
                )
            } else {
                format!("panic: {info}")
            };
            console_error(&msg);
        }));
    });
}

fn set_js(obj: &Object, key: &str, value: JsValue) {
    let _ = Reflect::set(obj, &JsValue::from_str(key), &value);
}

fn sync_error_to_js(err: &SyncError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Live `MutationObserver`, disconnected on drop.
struct MutationWatch {
    observer: MutationObserver,
    _callback: Closure<dyn FnMut(Array, MutationObserver)>,
}

impl Drop for MutationWatch {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

/// Shared state behind every listener and the wake timeout.
///
/// Callbacks hold `Weak` references, so dropping the last `FrameSync`
/// handle tears everything down.
struct Inner {
    engine: RefCell<DomSync>,
    window: Window,
    document: Document,
    origin: Instant,
    wake: RefCell<Option<Timeout>>,
    listeners: RefCell<Vec<EventListener>>,
    observer: RefCell<Option<MutationWatch>>,
}

impl Inner {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn content_element(&self) -> Option<Element> {
        let id = self.engine.borrow().config().content_id.clone();
        self.document.get_element_by_id(&id)
    }

    fn toggle_element(&self) -> Option<Element> {
        let id = self.engine.borrow().config().toggle_id.clone();
        self.document.get_element_by_id(&id)
    }

    /// Re-arm the single wake timeout for the engine's next deadline.
    fn reschedule(self: &Rc<Self>) {
        let next = self.engine.borrow().next_deadline();
        let timeout = next.map(|deadline| {
            let delay = wake_delay_ms(self.now(), deadline);
            let weak = Rc::downgrade(self);
            Timeout::new(delay, move || {
                if let Some(inner) = weak.upgrade() {
                    inner.wake();
                }
            })
        });
        // Replacing drops (and clears) any earlier timeout.
        *self.wake.borrow_mut() = timeout;
    }

    fn wake(self: &Rc<Self>) {
        let now = self.now();
        let fired = self.engine.borrow_mut().advance(now);
        if !fired.is_empty() {
            debug!(count = fired.len(), "deadlines fired");
        }
        self.reschedule();
    }

    /// Watch the whole body: any subtree, class or style change can move
    /// the rendered height.
    fn observe_mutations(self: &Rc<Self>, root: &Element) -> Option<MutationWatch> {
        let weak = Rc::downgrade(self);
        let callback = Closure::<dyn FnMut(Array, MutationObserver)>::new(
            move |_records: Array, _observer: MutationObserver| {
                if let Some(inner) = weak.upgrade() {
                    let now = inner.now();
                    inner.engine.borrow_mut().on_mutations(now);
                    inner.reschedule();
                }
            },
        );
        let observer = match MutationObserver::new(callback.as_ref().unchecked_ref()) {
            Ok(observer) => observer,
            Err(err) => {
                warn!(error = ?err, "MutationObserver unavailable");
                return None;
            }
        };

        let init = MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(true);
        init.set_attributes(true);
        let filter = Array::of2(&JsValue::from_str("class"), &JsValue::from_str("style"));
        init.set_attribute_filter(&filter);
        if let Err(err) = observer.observe_with_options(root, &init) {
            warn!(error = ?err, "MutationObserver.observe failed");
            return None;
        }
        Some(MutationWatch {
            observer,
            _callback: callback,
        })
    }

    fn listen(
        self: &Rc<Self>,
        target: &EventTarget,
        event: &'static str,
        f: fn(&Rc<Self>, &Event),
    ) {
        let weak: Weak<Self> = Rc::downgrade(self);
        let listener = EventListener::new(target, event, move |event| {
            if let Some(inner) = weak.upgrade() {
                f(&inner, event);
                inner.reschedule();
            }
        });
        self.listeners.borrow_mut().push(listener);
    }

    fn on_resize(self: &Rc<Self>, _event: &Event) {
        let now = self.now();
        self.engine.borrow_mut().on_resize(now);
    }

    fn on_click(self: &Rc<Self>, _event: &Event) {
        let now = self.now();
        if let Err(err) = self.engine.borrow_mut().on_toggle(now) {
            warn!(error = %err, "toggle ignored");
        }
    }

    fn on_transition_end(self: &Rc<Self>, event: &Event) {
        let from_content = match (event.target(), self.content_element()) {
            (Some(target), Some(content)) => Object::is(&target, &content),
            _ => false,
        };
        let source = if from_content {
            TransitionSource::Content
        } else {
            TransitionSource::Other
        };
        let now = self.now();
        self.engine.borrow_mut().on_transition_end(now, source);
    }

    /// Arm the engine and attach every DOM listener.
    fn start_now(self: &Rc<Self>) -> Result<(), SyncError> {
        if self.engine.borrow().is_running() {
            return Ok(());
        }
        let watch = self
            .document
            .body()
            .and_then(|body| self.observe_mutations(&body));
        let caps = HostCapabilities {
            mutation_observer: watch.is_some(),
        };

        let now = self.now();
        // On failure `watch` drops here and disconnects the observer.
        self.engine.borrow_mut().start(now, caps)?;

        *self.observer.borrow_mut() = watch;
        self.listen(&self.window, "resize", Self::on_resize);
        if let Some(toggle) = self.toggle_element() {
            self.listen(&toggle, "click", Self::on_click);
        }
        if let Some(content) = self.content_element() {
            self.listen(&content, "transitionend", Self::on_transition_end);
        }
        self.reschedule();
        Ok(())
    }

    fn stop(&self) {
        self.engine.borrow_mut().stop();
        self.wake.borrow_mut().take();
        self.listeners.borrow_mut().clear();
        self.observer.borrow_mut().take();
    }
}

/// Keeps the parent frame sized to this document.
///
/// Host-driven: DOM events and one re-armed timeout feed
/// `framesync_core::HeightSync`; the parent receives
/// `{ type: "height-change", height }` whenever the height changes.
#[wasm_bindgen]
pub struct FrameSync {
    inner: Rc<Inner>,
}

#[wasm_bindgen]
impl FrameSync {
    /// Create a frame sync bound to the current window.
    ///
    /// `config_json` optionally overrides any `SyncConfig` field.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<FrameSync, JsValue> {
        install_panic_hook();
        let config: SyncConfig =
            load_config(config_json.as_deref()).map_err(|err| sync_error_to_js(&err))?;
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("window has no document"))?;

        let engine = HeightSync::new(
            config.clone(),
            DomHeights::new(document.clone()),
            ParentWindow::new(window.clone()),
            DomView::new(document.clone()),
        )
        .map_err(|err| sync_error_to_js(&err))?;

        Ok(Self {
            inner: Rc::new(Inner {
                engine: RefCell::new(engine),
                window,
                document,
                origin: Instant::now(),
                wake: RefCell::new(None),
                listeners: RefCell::new(Vec::new()),
                observer: RefCell::new(None),
            }),
        })
    }

    /// Start syncing once the document structure is ready.
    ///
    /// Returns `false` if a required element is missing; the page keeps
    /// working, only without automatic resizing.
    pub fn start(&self) -> bool {
        if self.inner.document.ready_state() == "loading" {
            let weak = Rc::downgrade(&self.inner);
            let listener = EventListener::once(&self.inner.document, "DOMContentLoaded", move |_| {
                if let Some(inner) = weak.upgrade() {
                    if let Err(err) = inner.start_now() {
                        console_error(&format!("frame sync disabled: {err}"));
                    }
                }
            });
            self.inner.listeners.borrow_mut().push(listener);
            return true;
        }
        match self.inner.start_now() {
            Ok(()) => true,
            Err(err) => {
                console_error(&format!("frame sync disabled: {err}"));
                false
            }
        }
    }

    /// Remove every listener, the observer and pending timers.
    pub fn stop(&self) {
        self.inner.stop();
    }

    /// Run a height check right now. Returns the last reported height.
    #[wasm_bindgen(js_name = checkNow)]
    pub fn check_now(&self) -> Result<u32, JsValue> {
        let now = self.inner.now();
        let mut engine = self.inner.engine.borrow_mut();
        engine
            .check_now(now)
            .map_err(|err| sync_error_to_js(&err))?;
        Ok(engine.last_reported())
    }

    /// Flip the expand/collapse state as if the toggle were clicked.
    pub fn toggle(&self) -> Result<bool, JsValue> {
        let now = self.inner.now();
        let state = self
            .inner
            .engine
            .borrow_mut()
            .on_toggle(now)
            .map_err(|err| sync_error_to_js(&err))?;
        self.inner.reschedule();
        Ok(state.is_expanded())
    }

    #[wasm_bindgen(getter)]
    pub fn expanded(&self) -> bool {
        self.inner.engine.borrow().expansion().is_expanded()
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.inner.engine.borrow().is_running()
    }

    #[wasm_bindgen(js_name = lastReportedHeight)]
    pub fn last_reported_height(&self) -> u32 {
        self.inner.engine.borrow().last_reported()
    }

    /// Delivery counters: `{ posted, no_parent, failed }`.
    pub fn stats(&self) -> JsValue {
        let stats = self.inner.engine.borrow().delivery_stats();
        let obj = Object::new();
        set_js(&obj, "posted", JsValue::from_f64(stats.posted as f64));
        set_js(&obj, "no_parent", JsValue::from_f64(stats.no_parent as f64));
        set_js(&obj, "failed", JsValue::from_f64(stats.failed as f64));
        obj.into()
    }
}

impl Drop for FrameSync {
    fn drop(&mut self) {
        self.inner.stop();
    }
}

/// Create a [`FrameSync`] with an optional JSON config and start it.
#[wasm_bindgen(js_name = autoStart)]
pub fn auto_start(config_json: Option<String>) -> Result<FrameSync, JsValue> {
    let sync = FrameSync::new(config_json)?;
    sync.start();
    Ok(sync)
}
