#![cfg(target_arch = "wasm32")]
#![forbid(unsafe_code)]

use framesync_web::FrameSync;
use gloo_timers::future::TimeoutFuture;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{Document, Element, Event, EventInit, EventTarget};

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> Document {
    web_sys::window()
        .and_then(|w| w.document())
        .expect("test page has a document")
}

fn mount(ids: &[&str]) -> Vec<Element> {
    let document = document();
    let body = document.body().expect("test page has a body");
    ids.iter()
        .map(|id| {
            if let Some(stale) = document.get_element_by_id(id) {
                stale.remove();
            }
            let el = document.create_element("div").expect("create div");
            el.set_id(id);
            body.append_child(&el).expect("append");
            el
        })
        .collect()
}

fn unmount(elements: Vec<Element>) {
    for el in elements {
        el.remove();
    }
}

fn append_child(parent: &Element, style: &str) -> Element {
    let child = document().create_element("div").expect("create div");
    child.set_attribute("style", style).expect("style");
    parent.append_child(&child).expect("append");
    child
}

fn dispatch(target: &EventTarget, kind: &str) {
    let init = EventInit::new();
    init.set_bubbles(true);
    let event = Event::new_with_event_init_dict(kind, &init).expect("event");
    target.dispatch_event(&event).expect("dispatch");
}

const IDS: [&str; 4] = ["toggle-button", "content", "status", "height-display"];

/// Only the explicitly driven source may run a check.
const QUIET: &str = r#"{"startup_delay_ms": 60000, "poll_interval_ms": 60000}"#;

#[wasm_bindgen_test]
fn missing_elements_disable_sync() {
    let mounted = mount(&["content"]);
    let sync = FrameSync::new(None).expect("default config");
    assert!(!sync.start());
    assert!(!sync.is_running());
    assert!(sync.toggle().is_err());
    unmount(mounted);
}

#[wasm_bindgen_test]
fn toggle_updates_presentation() {
    let mounted = mount(&IDS);
    let sync = FrameSync::new(None).expect("default config");
    assert!(sync.start());
    assert!(sync.is_running());

    assert!(sync.toggle().expect("running"));
    assert!(sync.expanded());
    let content = document().get_element_by_id("content").expect("content");
    assert!(content.class_list().contains("expanded"));
    let status = document().get_element_by_id("status").expect("status");
    assert_eq!(status.text_content().as_deref(), Some("Expanded"));

    assert!(!sync.toggle().expect("running"));
    assert!(!content.class_list().contains("expanded"));

    sync.stop();
    assert!(!sync.is_running());
    unmount(mounted);
}

#[wasm_bindgen_test]
fn check_now_reports_measured_height() {
    let mounted = mount(&IDS);
    mounted[1]
        .set_attribute("style", "height: 321px")
        .expect("style");
    let sync = FrameSync::new(Some(QUIET.into())).expect("config");
    assert!(sync.start());
    let height = sync.check_now().expect("running");
    assert!(height >= 321, "body height {height} excludes the content");
    let label = document().get_element_by_id("height-display").expect("label");
    assert_eq!(label.text_content(), Some(format!("{height}px")));
    drop(sync);
    unmount(mounted);
}

#[wasm_bindgen_test]
fn clipped_content_lowers_reported_height() {
    let mounted = mount(&IDS);
    append_child(&mounted[1], "height: 2000px");
    let sync = FrameSync::new(Some(QUIET.into())).expect("config");
    assert!(sync.start());

    let open = sync.check_now().expect("running");
    assert!(open >= 2000, "open height {open}");
    mounted[1]
        .set_attribute("style", "max-height: 0px; overflow: hidden")
        .expect("style");
    let closed = sync.check_now().expect("running");
    assert!(closed + 1900 <= open, "collapse went unnoticed: {open} -> {closed}");
    assert_eq!(sync.last_reported_height(), closed);

    drop(sync);
    unmount(mounted);
}

#[wasm_bindgen_test]
fn collapse_settles_on_content_transition_end_only() {
    let mounted = mount(&IDS);
    let inner = append_child(&mounted[1], "height: 50px");
    let sync = FrameSync::new(Some(QUIET.into())).expect("config");
    assert!(sync.start());

    assert!(sync.toggle().expect("running"));
    assert!(!sync.toggle().expect("running"));
    assert_eq!(sync.last_reported_height(), 0);

    // Bubbles up to the content listener with a child as its target.
    dispatch(&inner, "transitionend");
    assert_eq!(sync.last_reported_height(), 0);

    dispatch(&mounted[1], "transitionend");
    let settled = sync.last_reported_height();
    assert!(settled > 0);

    // The collapse already settled; a second transition end is not a check.
    inner.set_attribute("style", "height: 900px").expect("style");
    dispatch(&mounted[1], "transitionend");
    assert_eq!(sync.last_reported_height(), settled);

    sync.stop();
    unmount(mounted);
}

#[wasm_bindgen_test]
fn window_resize_checks_immediately() {
    let mounted = mount(&IDS);
    let sync = FrameSync::new(Some(QUIET.into())).expect("config");
    assert!(sync.start());
    assert_eq!(sync.last_reported_height(), 0);

    let window = web_sys::window().expect("window");
    dispatch(&window, "resize");
    assert!(sync.last_reported_height() > 0);

    sync.stop();
    unmount(mounted);
}

#[wasm_bindgen_test]
async fn body_mutation_runs_debounced_check() {
    let mounted = mount(&IDS);
    let config = concat!(
        r#"{"startup_delay_ms": 60000, "poll_interval_ms": 60000, "#,
        r#""mutation_debounce_ms": 20}"#,
    );
    let sync = FrameSync::new(Some(config.into())).expect("config");
    assert!(sync.start());
    assert_eq!(sync.last_reported_height(), 0);

    append_child(&mounted[0], "height: 40px");
    TimeoutFuture::new(250).await;
    assert!(sync.last_reported_height() > 0);

    sync.stop();
    unmount(mounted);
}

#[wasm_bindgen_test]
fn invalid_config_is_rejected() {
    assert!(FrameSync::new(Some(r#"{"poll_interval_ms": 0}"#.into())).is_err());
}
