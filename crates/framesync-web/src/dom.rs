#![forbid(unsafe_code)]

//! `web-sys` implementations of the engine's host traits.

use framesync_core::{EmbeddingContext, HeightMessage, HeightSource, HostError, Presentation};
use js_sys::{JSON, Object};
use wasm_bindgen::JsValue;
use web_sys::{Document, Element, Window};

fn js_error(context: &str, err: JsValue) -> HostError {
    match err.as_string() {
        Some(msg) => HostError::new(format!("{context}: {msg}")),
        None => HostError::new(format!("{context}: {err:?}")),
    }
}

fn scroll_height(element: &Element) -> u32 {
    u32::try_from(element.scroll_height()).unwrap_or(0)
}

/// Scroll extents of the document body and the document root.
///
/// The body covers everything the page renders, including the toggle and
/// labels, and reflects a collapsed element's clipped box.
pub(crate) struct DomHeights {
    document: Document,
}

impl DomHeights {
    pub(crate) fn new(document: Document) -> Self {
        Self { document }
    }
}

impl HeightSource for DomHeights {
    fn content_height(&self) -> Result<u32, HostError> {
        self.document
            .body()
            .map(|body| scroll_height(&body))
            .ok_or_else(|| HostError::new("document has no body"))
    }

    fn root_height(&self) -> Result<u32, HostError> {
        self.document
            .document_element()
            .map(|el| scroll_height(&el))
            .ok_or_else(|| HostError::new("document has no root element"))
    }
}

/// The parent window, if this document is framed.
pub(crate) struct ParentWindow {
    window: Window,
}

impl ParentWindow {
    pub(crate) fn new(window: Window) -> Self {
        Self { window }
    }

    fn parent(&self) -> Option<Window> {
        let parent = self.window.parent().ok().flatten()?;
        // A top-level window is its own parent.
        if Object::is(&parent, &self.window) {
            None
        } else {
            Some(parent)
        }
    }
}

fn message_to_js(message: &HeightMessage) -> Result<JsValue, HostError> {
    let json = message
        .to_json()
        .map_err(|err| HostError::new(format!("encode height message: {err}")))?;
    JSON::parse(&json).map_err(|err| js_error("JSON.parse", err))
}

impl EmbeddingContext for ParentWindow {
    fn is_embedded(&self) -> bool {
        self.parent().is_some()
    }

    fn post(&mut self, message: &HeightMessage, target_origin: &str) -> Result<(), HostError> {
        let parent = self
            .parent()
            .ok_or_else(|| HostError::new("parent window went away"))?;
        parent
            .post_message(&message_to_js(message)?, target_origin)
            .map_err(|err| js_error("postMessage", err))
    }
}

/// Element lookup, class toggling and text updates by id.
pub(crate) struct DomView {
    document: Document,
}

impl DomView {
    pub(crate) fn new(document: Document) -> Self {
        Self { document }
    }

    fn element(&self, id: &str) -> Result<Element, HostError> {
        self.document
            .get_element_by_id(id)
            .ok_or_else(|| HostError::new(format!("#{id} not found")))
    }
}

impl Presentation for DomView {
    fn has_element(&self, id: &str) -> bool {
        self.document.get_element_by_id(id).is_some()
    }

    fn set_class(&mut self, id: &str, class: &str, enabled: bool) -> Result<(), HostError> {
        self.element(id)?
            .class_list()
            .toggle_with_force(class, enabled)
            .map(|_| ())
            .map_err(|err| js_error("classList.toggle", err))
    }

    fn set_text(&mut self, id: &str, text: &str) -> Result<(), HostError> {
        self.element(id)?.set_text_content(Some(text));
        Ok(())
    }
}
